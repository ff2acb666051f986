use std::env;
use std::str::FromStr;

use stratus_application::AuditEventQuery;
use stratus_core::AppError;
use stratus_domain::{OrganizationGuid, SpaceGuid};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventsCommand {
    Migrate,
    List,
}

#[derive(Debug, Clone)]
pub struct EventsConfig {
    pub command: EventsCommand,
    pub database_url: String,
    pub max_connections: u32,
    pub query: AuditEventQuery,
}

impl EventsConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_sources(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_sources(
        command: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let command = match command {
            None | Some("list") => EventsCommand::List,
            Some("migrate") => EventsCommand::Migrate,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "command must be either 'list' or 'migrate', got '{other}'"
                )));
            }
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let max_connections = parse_optional(&lookup, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(5);

        let defaults = AuditEventQuery::default();
        let query = AuditEventQuery {
            limit: parse_optional(&lookup, "EVENTS_LIMIT")?.unwrap_or(defaults.limit),
            offset: parse_optional(&lookup, "EVENTS_OFFSET")?.unwrap_or(defaults.offset),
            type_prefix: non_empty(&lookup, "EVENTS_TYPE_PREFIX"),
            actee: parse_optional::<Uuid>(&lookup, "EVENTS_ACTEE")?,
            actor: parse_optional::<Uuid>(&lookup, "EVENTS_ACTOR")?,
            space_guid: parse_optional::<SpaceGuid>(&lookup, "EVENTS_SPACE_GUID")?,
            organization_guid: parse_optional::<OrganizationGuid>(
                &lookup,
                "EVENTS_ORGANIZATION_GUID",
            )?,
        };

        Ok(Self {
            command,
            database_url,
            max_connections,
            query,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_empty(lookup, name)
        .map(|value| {
            value.trim().parse::<T>().map_err(|error| {
                AppError::Validation(format!("invalid {name} value '{value}': {error}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use stratus_core::AppError;

    use super::{EventsCommand, EventsConfig};

    fn lookup(values: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();

        move |name| values.get(name).cloned()
    }

    #[test]
    fn defaults_to_listing_with_default_page() {
        let config = EventsConfig::from_sources(
            None,
            lookup(&[("DATABASE_URL", "postgres://localhost/stratus")]),
        );
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert_eq!(config.command, EventsCommand::List);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.query.limit, 50);
        assert_eq!(config.query.type_prefix, None);
    }

    #[test]
    fn reads_filters_from_environment() {
        let config = EventsConfig::from_sources(
            Some("list"),
            lookup(&[
                ("DATABASE_URL", "postgres://localhost/stratus"),
                ("EVENTS_TYPE_PREFIX", "audit.space."),
                ("EVENTS_SPACE_GUID", "6f1a4f2e-7c8b-4d2a-9a4e-2f0b7c1d3e5a"),
                ("EVENTS_LIMIT", "10"),
            ]),
        );
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert_eq!(config.query.type_prefix.as_deref(), Some("audit.space."));
        assert_eq!(
            config.query.space_guid.map(|guid| guid.to_string()),
            Some("6f1a4f2e-7c8b-4d2a-9a4e-2f0b7c1d3e5a".to_owned())
        );
        assert_eq!(config.query.limit, 10);
    }

    #[test]
    fn rejects_missing_database_url_and_bad_values() {
        let missing = EventsConfig::from_sources(Some("migrate"), lookup(&[]));
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let bad_limit = EventsConfig::from_sources(
            None,
            lookup(&[
                ("DATABASE_URL", "postgres://localhost/stratus"),
                ("EVENTS_LIMIT", "many"),
            ]),
        );
        assert!(matches!(bad_limit, Err(AppError::Validation(message)) if message.contains("EVENTS_LIMIT")));

        let bad_command = EventsConfig::from_sources(
            Some("purge"),
            lookup(&[("DATABASE_URL", "postgres://localhost/stratus")]),
        );
        assert!(bad_command.is_err());
    }
}

//! Docflow access inspector.
//!
//! Prints the resolved access scope of one user as JSON:
//!
//! ```text
//! access-inspector <user-uuid> [<workflow-uuid>]
//! access-inspector migrate
//! ```

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;

use docflow_application::AccessResolutionService;
use docflow_core::{AppError, AppResult};
use docflow_domain::{DEFAULT_MAX_TREE_DEPTH, TraversalLimits, UserId, WorkflowId};
use docflow_infrastructure::PostgresAccessRepository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct InspectorConfig {
    database_url: String,
    max_connections: u32,
    max_tree_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Migrate,
    Resolve {
        user_id: UserId,
        workflow_id: Option<WorkflowId>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = parse_command(env::args().skip(1).collect())?;
    let config = InspectorConfig::load()?;
    let pool = connect_pool(&config).await?;

    let (user_id, workflow_id) = match command {
        Command::Migrate => {
            run_migrations(&pool).await?;
            info!("database migrations applied successfully");
            return Ok(());
        }
        Command::Resolve {
            user_id,
            workflow_id,
        } => (user_id, workflow_id),
    };

    let service = AccessResolutionService::new(Arc::new(PostgresAccessRepository::new(pool)))
        .with_traversal_limits(TraversalLimits::new(config.max_tree_depth)?);

    info!(
        user_id = %user_id,
        max_tree_depth = config.max_tree_depth,
        "resolving access scope"
    );

    let rendered = match workflow_id {
        Some(workflow_id) => {
            let scope = service.resolve_for_workflow(user_id, workflow_id).await?;
            serde_json::to_string_pretty(&scope)
        }
        None => {
            let scope = service.resolve(user_id).await?;
            serde_json::to_string_pretty(&scope)
        }
    }
    .map_err(|error| AppError::Internal(format!("failed to render access scope: {error}")))?;

    println!("{rendered}");
    Ok(())
}

impl InspectorConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?;
        let max_tree_depth = parse_env_usize("ACCESS_MAX_TREE_DEPTH", DEFAULT_MAX_TREE_DEPTH)?;

        if max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        if max_tree_depth == 0 {
            return Err(AppError::Validation(
                "ACCESS_MAX_TREE_DEPTH must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            max_tree_depth,
        })
    }
}

fn parse_command(arguments: Vec<String>) -> AppResult<Command> {
    let mut arguments = arguments.into_iter();
    let Some(first) = arguments.next() else {
        return Err(AppError::Validation(
            "usage: access-inspector <user-uuid> [<workflow-uuid>] | migrate".to_owned(),
        ));
    };

    if first == "migrate" {
        return match arguments.next() {
            Some(extra) => Err(AppError::Validation(format!(
                "unexpected argument '{extra}' after migrate"
            ))),
            None => Ok(Command::Migrate),
        };
    }

    let user_id = UserId::from_uuid(parse_uuid("user id", first.as_str())?);
    let workflow_id = arguments
        .next()
        .map(|value| parse_uuid("workflow id", value.as_str()).map(WorkflowId::from_uuid))
        .transpose()?;

    if let Some(extra) = arguments.next() {
        return Err(AppError::Validation(format!(
            "unexpected argument '{extra}'"
        )));
    }

    Ok(Command::Resolve {
        user_id,
        workflow_id,
    })
}

fn parse_uuid(label: &str, value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|error| AppError::Validation(format!("invalid {label} '{value}': {error}")))
}

async fn connect_pool(config: &InspectorConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    parse_setting(name, env::var(name).ok(), default)
}

fn parse_env_usize(name: &str, default: usize) -> AppResult<usize> {
    parse_setting(name, env::var(name).ok(), default)
}

fn parse_setting<T>(name: &str, value: Option<String>, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value.trim().parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arguments(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn parses_user_and_optional_workflow() {
        let user = Uuid::new_v4();
        let workflow = Uuid::new_v4();

        let scoped = parse_command(arguments(&[
            user.to_string().as_str(),
            workflow.to_string().as_str(),
        ]));
        assert_eq!(
            scoped.ok(),
            Some(Command::Resolve {
                user_id: UserId::from_uuid(user),
                workflow_id: Some(WorkflowId::from_uuid(workflow)),
            })
        );

        let global = parse_command(arguments(&[user.to_string().as_str()]));
        assert_eq!(
            global.ok(),
            Some(Command::Resolve {
                user_id: UserId::from_uuid(user),
                workflow_id: None,
            })
        );
    }

    #[test]
    fn parses_migrate_command() {
        assert_eq!(
            parse_command(arguments(&["migrate"])).ok(),
            Some(Command::Migrate)
        );
        assert!(matches!(
            parse_command(arguments(&["migrate", "now"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_or_malformed_arguments() {
        assert!(matches!(
            parse_command(Vec::new()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_command(arguments(&["not-a-uuid"])),
            Err(AppError::Validation(_))
        ));

        let user = Uuid::new_v4().to_string();
        let workflow = Uuid::new_v4().to_string();
        assert!(matches!(
            parse_command(arguments(&[user.as_str(), workflow.as_str(), "extra"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        assert_eq!(parse_setting::<usize>("ACCESS_MAX_TREE_DEPTH", None, 1024).ok(), Some(1024));
        assert_eq!(
            parse_setting::<u32>("DATABASE_MAX_CONNECTIONS", Some(" 8 ".to_owned()), 5).ok(),
            Some(8)
        );
        assert!(matches!(
            parse_setting::<u32>("DATABASE_MAX_CONNECTIONS", Some("many".to_owned()), 5),
            Err(AppError::Validation(_))
        ));
    }
}

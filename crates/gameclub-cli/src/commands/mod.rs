use std::sync::Arc;
use std::time::Duration;

use gameclub_core::{
    ApiService, ApiServiceBuilder, ClientConfig, GameClubApi, Resource, ResourceClient,
};
use serde_json::{json, Value};

use crate::cli::{Cli, Command, ResourceKind};
use crate::error::CliError;

/// One resource operation requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    List,
    Get(u64),
    Create(&'a str),
    Update(u64, &'a str),
    Delete(u64),
}

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config = resolve_config(cli, ClientConfig::from_env()?)?;
    tracing::debug!(
        base_url = %config.base_url,
        max_attempts = config.max_attempts,
        backoff = %config.backoff,
        "resolved client configuration"
    );

    let service: Arc<dyn ApiService> = Arc::new(ApiServiceBuilder::from_config(&config).build());
    let api = GameClubApi::new(service);

    let (resource, action) = match &cli.command {
        Command::List(args) => (args.resource, Action::List),
        Command::Get(args) => (args.resource, Action::Get(args.id)),
        Command::Create(args) => (args.resource, Action::Create(args.data.as_str())),
        Command::Update(args) => (args.resource, Action::Update(args.id, args.data.as_str())),
        Command::Delete(args) => (args.resource, Action::Delete(args.id)),
    };

    match resource {
        ResourceKind::Games => execute(&api.games, action).await,
        ResourceKind::Teams => execute(&api.teams, action).await,
        ResourceKind::Tournaments => execute(&api.tournaments, action).await,
        ResourceKind::News => execute(&api.news, action).await,
    }
}

/// Applies command-line overrides on top of the environment configuration.
pub fn resolve_config(cli: &Cli, base: ClientConfig) -> Result<ClientConfig, CliError> {
    let mut config = match cli.base_url.as_deref() {
        Some(base_url) => base.with_base_url(base_url)?,
        None => base,
    };
    if let Some(max_attempts) = cli.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(backoff) = cli.backoff {
        config.backoff = backoff;
    }
    if let Some(backoff_ms) = cli.backoff_ms {
        config.backoff_unit = Duration::from_millis(backoff_ms);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(timeout_ms);
    }
    Ok(config)
}

pub async fn execute<R: Resource>(
    client: &ResourceClient<R>,
    action: Action<'_>,
) -> Result<Value, CliError> {
    let value = match action {
        Action::List => serde_json::to_value(client.list().await?)?,
        Action::Get(id) => serde_json::to_value(client.get(id).await?)?,
        Action::Create(data) => {
            let item = parse_item::<R>(data)?;
            serde_json::to_value(client.create(&item).await?)?
        }
        Action::Update(id, data) => {
            let item = parse_item::<R>(data)?;
            serde_json::to_value(client.update(id, &item).await?)?
        }
        Action::Delete(id) => {
            client.delete(id).await?;
            json!({ "deleted": id, "collection": client.collection_path() })
        }
    };
    Ok(value)
}

fn parse_item<R: Resource>(data: &str) -> Result<R, CliError> {
    serde_json::from_str(data).map_err(CliError::InvalidData)
}

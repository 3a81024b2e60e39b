//! Pool construction.

use std::borrow::Cow;

use sqlx_postgres::PgPool;
use tracing::info;

use crate::config::PostgresConfig;
use crate::error::Result;

/// Connects a pool per `config`. Migrations are the caller's concern.
#[tracing::instrument(skip_all, fields(url = %redact(&config.url)))]
pub(crate) async fn connect(config: &PostgresConfig) -> Result<PgPool> {
    let pool = config.pool_options().connect(&config.url).await?;
    info!(
        max_connections = config.pool_size,
        idle_timeout = ?config.idle_timeout,
        "postgres pool connected"
    );
    Ok(pool)
}

/// `url` with its password replaced, for logs.
fn redact(url: &str) -> Cow<'_, str> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Cow::Borrowed(url);
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return Cow::Borrowed(url);
    };
    match userinfo.split_once(':') {
        Some((user, _)) => Cow::Owned(format!("{scheme}://{user}:****@{host}")),
        None => Cow::Borrowed(url),
    }
}

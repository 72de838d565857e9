//! MySQL gateway.
//!
//! A thin wrapper around a `sqlx` connection pool: statement text and
//! positional parameters in, driver rows out. No transactions, no retries,
//! no per-query timeouts. Checkout and checkin are the pool's; handlers
//! reach the gateway through the application context.

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::logger;
use sqlx::mysql::{
    MySql, MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlQueryResult,
    MySqlRow,
};
use sqlx::query::Query;
use sqlx::FromRow;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Pooled MySQL handle shared by all handlers.
#[derive(Debug, Clone)]
pub struct Database {
    pool: MySqlPool,
}

impl Database {
    /// Build the pool and verify connectivity with a single acquire.
    ///
    /// Connection errors propagate to the caller; there is no retry.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = pool_options(config)
            .connect_with(connect_options(config))
            .await
            .map_err(|e| {
                logger::log_error(&format!("Database connection failed: {e}"));
                e
            })?;
        logger::log_database_connected();
        Ok(Self { pool })
    }

    /// Build the pool without touching the network.
    ///
    /// The first query pays the connection cost and surfaces any failure.
    #[must_use]
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        Self {
            pool: pool_options(config).connect_lazy_with(connect_options(config)),
        }
    }

    /// Check out one connection and release it, proving the server reachable.
    pub async fn ping(&self) -> Result<()> {
        let _connection = self.pool.acquire().await.map_err(|e| {
            logger::log_error(&format!("Database ping failed: {e}"));
            Error::Database(e)
        })?;
        Ok(())
    }

    /// Run a parameterized query and return the driver rows.
    pub async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<MySqlRow>> {
        bind_params(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                logger::log_error(&format!("Query failed: {e}"));
                Error::Database(e)
            })
    }

    /// Run a parameterized query and map each row into `T`.
    pub async fn fetch_as<T>(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, MySqlRow>,
    {
        let rows = self.fetch_all(sql, params).await?;
        rows.iter()
            .map(T::from_row)
            .collect::<std::result::Result<Vec<T>, sqlx::Error>>()
            .map_err(Error::from)
    }

    /// Run a parameterized statement for its side effect.
    ///
    /// The returned result exposes `rows_affected` and `last_insert_id`.
    pub async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<MySqlQueryResult> {
        bind_params(sqlx::query(sql), params)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                logger::log_error(&format!("Statement failed: {e}"));
                Error::Database(e)
            })
    }

    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new().max_connections(config.pool_size)
}

fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }
    query
}

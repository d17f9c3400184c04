//! Per-session counters backed by Redis

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

/// Counter storage scoped to a visitor session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current value of a counter, 0 when unset
    async fn get(&self, session_id: &str, key: &str) -> AppResult<i64>;

    /// Increment a counter and return its new value
    async fn increment(&self, session_id: &str, key: &str) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Create the store and check the server answers
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let store = Self::lazy(url, ttl_seconds)?;

        let mut conn = store.connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(store)
    }

    /// Create the store without contacting the server
    pub fn lazy(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client, ttl_seconds })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }

    fn key(session_id: &str, key: &str) -> String {
        format!("session:{}:{}", session_id, key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, session_id: &str, key: &str) -> AppResult<i64> {
        let mut conn = self.connection().await?;
        let value: Option<i64> = conn
            .get(Self::key(session_id, key))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session counter: {}", e)))?;
        Ok(value.unwrap_or(0))
    }

    async fn increment(&self, session_id: &str, key: &str) -> AppResult<i64> {
        let mut conn = self.connection().await?;
        let key = Self::key(session_id, key);

        let value: i64 = conn
            .incr(&key, 1)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to increment session counter: {}", e)))?;
        // Sliding expiry: the session lives as long as it is used
        conn.expire::<_, ()>(&key, self.ttl_seconds as i64)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to refresh session expiry: {}", e)))?;

        Ok(value)
    }
}

/// Visit counter of the home page
#[derive(Clone)]
pub struct SessionService {
    store: std::sync::Arc<dyn SessionStore>,
}

impl SessionService {
    pub const VISITS_KEY: &'static str = "num_visits";

    pub fn new(store: std::sync::Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Record a visit and return the number of earlier visits in the session
    pub async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let previous = self.store.get(session_id, Self::VISITS_KEY).await?;
        self.store.increment(session_id, Self::VISITS_KEY).await?;
        Ok(previous)
    }
}

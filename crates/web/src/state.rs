//! Application state shared across handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::SqlitePool;

use crate::config::WebConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: SqlitePool,
    started_at: Instant,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Web configuration
    /// * `pool` - `SQLite` connection pool
    #[must_use]
    pub fn new(config: WebConfig, pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                started_at: Instant::now(),
            }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// How long this process has been serving.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}

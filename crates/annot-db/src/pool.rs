//! Connection pool construction and health reporting.
//!
//! Pool sizing comes from [`PoolConfig`], built programmatically or
//! from the `DATABASE_*` environment variables. [`create_pool`] applies
//! the environment overrides; callers with explicit sizing needs use
//! [`create_pool_with_config`].

use std::env;
use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use annot_core::{Error, Result};

/// Environment variable overriding the maximum pool size.
pub const ENV_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";

/// Environment variable overriding the minimum pool size.
pub const ENV_MIN_CONNECTIONS: &str = "DATABASE_MIN_CONNECTIONS";

/// Environment variable overriding the acquire timeout, in seconds.
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "DATABASE_CONNECT_TIMEOUT_SECS";

/// Environment variable overriding the idle timeout, in seconds.
pub const ENV_IDLE_TIMEOUT_SECS: &str = "DATABASE_IDLE_TIMEOUT_SECS";

/// Environment variable overriding the maximum connection lifetime, in
/// seconds. A value of `0` disables lifetime recycling.
pub const ENV_MAX_LIFETIME_SECS: &str = "DATABASE_MAX_LIFETIME_SECS";

/// Default maximum number of connections in the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// Pool sizing and timeout configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    /// `None` disables lifetime recycling.
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            max_lifetime: Some(Duration::from_secs(DEFAULT_MAX_LIFETIME_SECS)),
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from the `DATABASE_*` environment
    /// variables, falling back to the defaults for any that are unset.
    ///
    /// Returns `Config` when a variable is set but not a non-negative
    /// integer, rather than silently running with a default the
    /// operator did not ask for.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(n) = read_env(ENV_MAX_CONNECTIONS)? {
            config.max_connections = n;
        }
        if let Some(n) = read_env(ENV_MIN_CONNECTIONS)? {
            config.min_connections = n;
        }
        if let Some(secs) = read_env(ENV_CONNECT_TIMEOUT_SECS)? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env(ENV_IDLE_TIMEOUT_SECS)? {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env::<u64>(ENV_MAX_LIFETIME_SECS)? {
            config.max_lifetime = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set the maximum number of connections.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Set the minimum number of connections.
    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    /// Set the acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle connection timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the maximum connection lifetime.
    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }
}

fn read_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            Error::Config(format!(
                "{} must be a non-negative integer, got '{}'",
                key, value
            ))
        }),
        Err(_) => Ok(None),
    }
}

/// Connect a pool sized from the environment overrides (see the
/// `ENV_*` constants), with defaults for anything unset.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::from_env()?).await
}

/// Connect a pool with an explicit configuration.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    debug!(
        subsystem = "database",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_secs = config.connect_timeout.as_secs(),
        idle_timeout_secs = config.idle_timeout.as_secs(),
        "Opening connection pool"
    );

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout);

    if let Some(max_lifetime) = config.max_lifetime {
        options = options.max_lifetime(max_lifetime);
    }

    let pool = options
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "database",
        component = "pool",
        op = "established",
        pool_size = pool.size(),
        pool_idle = pool.num_idle(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Connection pool established"
    );
    Ok(pool)
}

/// Log current pool health.
///
/// Warns when no idle connections remain, the usual precursor to
/// acquire timeouts under load.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();

    debug!(
        subsystem = "database",
        component = "pool",
        op = "metrics",
        pool_size = size,
        pool_idle = idle,
        "Pool health check"
    );

    if idle == 0 && size > 0 {
        warn!(
            subsystem = "database",
            component = "pool",
            pool_size = size,
            "Connection pool has no idle connections, potential exhaustion"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_builder() {
        let config = PoolConfig::new()
            .max_connections(20)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(60))
            .max_lifetime(None);

        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.connect_timeout, Duration::from_secs(60));
        assert_eq!(config.max_lifetime, None);
    }

    // Environment variables are process-global, so every from_env case
    // lives in one test to keep parallel test threads from racing.
    #[test]
    fn test_pool_config_from_env() {
        let unset = || {
            for key in [
                ENV_MAX_CONNECTIONS,
                ENV_MIN_CONNECTIONS,
                ENV_CONNECT_TIMEOUT_SECS,
                ENV_IDLE_TIMEOUT_SECS,
                ENV_MAX_LIFETIME_SECS,
            ] {
                env::remove_var(key);
            }
        };

        unset();
        let defaults = PoolConfig::from_env().expect("defaults");
        assert_eq!(defaults.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            defaults.max_lifetime,
            Some(Duration::from_secs(DEFAULT_MAX_LIFETIME_SECS))
        );

        env::set_var(ENV_MAX_CONNECTIONS, "25");
        env::set_var(ENV_CONNECT_TIMEOUT_SECS, "5");
        env::set_var(ENV_MAX_LIFETIME_SECS, "0");
        let overridden = PoolConfig::from_env().expect("overrides");
        assert_eq!(overridden.max_connections, 25);
        assert_eq!(overridden.connect_timeout, Duration::from_secs(5));
        assert_eq!(overridden.max_lifetime, None);

        env::set_var(ENV_MAX_CONNECTIONS, "not-a-number");
        assert!(matches!(
            PoolConfig::from_env(),
            Err(Error::Config(_))
        ));

        unset();
    }
}

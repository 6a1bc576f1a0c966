//! Failed-login throttling.
//!
//! Each identity (a lowercased email) moves through
//! `Clear → Accumulating → Locked → Clear`. Failures are counted in an
//! [`AttemptStore`]; once `max_attempts` is reached further logins are
//! refused until `lockout_minutes` have passed since the last failure.
//! A successful login clears the record.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use core_config::{ConfigError, FromEnv, env_parse};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub max_attempts: u32,
    pub lockout_minutes: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_minutes: 30,
        }
    }
}

impl ThrottleConfig {
    pub fn lockout_window(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.lockout_minutes))
    }
}

impl FromEnv for ThrottleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_attempts: env_parse("LOGIN_MAX_ATTEMPTS", defaults.max_attempts)?,
            lockout_minutes: env_parse("LOGIN_LOCKOUT_MINUTES", defaults.lockout_minutes)?,
        })
    }
}

/// Failures recorded for one identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    pub failures: u32,
    pub last_failure: DateTime<Utc>,
}

/// Storage for attempt records. Every operation is atomic per identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn get(&self, identity: &str) -> Option<AttemptRecord>;

    /// Add one failure stamped `at` and return the updated record.
    async fn increment(&self, identity: &str, at: DateTime<Utc>) -> AttemptRecord;

    async fn clear(&self, identity: &str);
}

/// Process-local store, created at startup and lost on restart.
#[derive(Default)]
pub struct InMemoryAttemptStore {
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn get(&self, identity: &str) -> Option<AttemptRecord> {
        self.records.lock().await.get(identity).copied()
    }

    async fn increment(&self, identity: &str, at: DateTime<Utc>) -> AttemptRecord {
        let mut records = self.records.lock().await;
        let record = records
            .entry(identity.to_string())
            .and_modify(|record| {
                record.failures += 1;
                record.last_failure = at;
            })
            .or_insert(AttemptRecord {
                failures: 1,
                last_failure: at,
            });
        *record
    }

    async fn clear(&self, identity: &str) {
        self.records.lock().await.remove(identity);
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone)]
pub struct LoginThrottle {
    store: Arc<dyn AttemptStore>,
    clock: Arc<dyn Clock>,
    config: ThrottleConfig,
}

impl LoginThrottle {
    pub fn new(store: Arc<dyn AttemptStore>, config: ThrottleConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        store: Arc<dyn AttemptStore>,
        clock: Arc<dyn Clock>,
        config: ThrottleConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn in_memory(config: ThrottleConfig) -> Self {
        Self::new(Arc::new(InMemoryAttemptStore::new()), config)
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Whether a login for `identity` may proceed. An exhausted record whose
    /// lockout window has passed is cleared here.
    pub async fn check_allowed(&self, identity: &str) -> bool {
        let identity = normalize(identity);
        let Some(record) = self.store.get(&identity).await else {
            return true;
        };

        if record.failures < self.config.max_attempts {
            return true;
        }

        if self.clock.now() - record.last_failure < self.config.lockout_window() {
            tracing::warn!(identity = %identity, failures = record.failures, "Login locked out");
            return false;
        }

        self.store.clear(&identity).await;
        tracing::debug!(identity = %identity, "Lockout window elapsed, attempts reset");
        true
    }

    pub async fn record_failure(&self, identity: &str) {
        let identity = normalize(identity);
        let record = self.store.increment(&identity, self.clock.now()).await;
        tracing::info!(identity = %identity, failures = record.failures, "Failed login recorded");
    }

    pub async fn record_success(&self, identity: &str) {
        self.store.clear(&normalize(identity)).await;
    }

    pub async fn failure_count(&self, identity: &str) -> u32 {
        self.store
            .get(&normalize(identity))
            .await
            .map_or(0, |record| record.failures)
    }
}

fn normalize(identity: &str) -> String {
    identity.trim().to_lowercase()
}

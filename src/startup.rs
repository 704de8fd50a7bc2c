//! One-shot readiness gate run before a service starts accepting traffic.
//!
//! The database may come up after the service in a multi-container deployment,
//! so connectivity failures are retried a bounded number of times with a fixed
//! delay. Anything else, or running out of attempts, is fatal.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{config::StartupConfig, db::is_transient};

/// Something whose schema has to exist before the service is usable.
#[async_trait]
pub trait SchemaTarget: Send + Sync {
    /// Cheap round-trip proving the backend is reachable.
    async fn probe(&self) -> Result<(), sqlx::Error>;

    /// Creates missing tables and indexes. Must be idempotent.
    async fn ensure_schema(&self) -> Result<(), sqlx::Error>;
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database still unavailable after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
    #[error("unexpected error during database startup: {0}")]
    Fatal(#[source] sqlx::Error),
}

pub struct StartupGate {
    service: &'static str,
    max_attempts: u32,
    retry_delay: Duration,
}

impl StartupGate {
    pub fn new(service: &'static str, config: &StartupConfig) -> Self {
        Self {
            service,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay,
        }
    }

    /// Blocks until `target` is reachable and its schema exists.
    ///
    /// Returns the number of attempts it took.
    pub async fn open<T>(&self, target: &T) -> Result<u32, StartupError>
    where
        T: SchemaTarget + ?Sized,
    {
        let mut attempt = 1;
        loop {
            info!(
                service = self.service,
                attempt,
                max_attempts = self.max_attempts,
                "connecting to database and ensuring schema"
            );

            let outcome = match target.probe().await {
                Ok(()) => target.ensure_schema().await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {
                    info!(service = self.service, attempt, "database ready");
                    return Ok(attempt);
                }
                Err(e) if is_transient(&e) => {
                    warn!(service = self.service, attempt, error = %e, "database not reachable");
                    if attempt >= self.max_attempts {
                        return Err(StartupError::Exhausted {
                            attempts: attempt,
                            source: e,
                        });
                    }
                    info!(
                        service = self.service,
                        delay_secs = self.retry_delay.as_secs_f64(),
                        "retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(StartupError::Fatal(e)),
            }
        }
    }

    /// Like [`open`](Self::open), but terminates the process on failure.
    pub async fn open_or_exit<T>(&self, target: &T)
    where
        T: SchemaTarget + ?Sized,
    {
        if let Err(e) = self.open(target).await {
            error!(service = self.service, error = %e, "database startup failed, exiting");
            std::process::exit(1);
        }
    }
}

//! Storage provider retrieval with unbounded, cancellable retry
//!
//! The backing store is assumed to become reachable eventually, so
//! [`retrieve`] keeps asking the factory for a provider until it gets one.
//! The only way out other than success is a cancellation signal observed
//! while waiting between attempts; in that case the most recent creation
//! failure is returned.
//!
//! ```text
//! Idle ─► Attempting ─┬─► Success
//!            ▲        └─► Waiting ─┬─► Attempting
//!            └─────────────────────┘
//!                                  └─► CancelledWithLastError
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Creates handles to a storage provider
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    /// Connection parameters
    type Params: Send + Sync;

    /// Live data-access handle
    type Handle: Send;

    /// Creation failure
    type Error: std::error::Error + Send + Sync + 'static;

    async fn create(&self, params: &Self::Params) -> Result<Self::Handle, Self::Error>;
}

/// Obtain a provider handle, retrying every `retry_period_seconds`
///
/// Returns as soon as `factory.create` succeeds. Each failure is logged and
/// followed by a wait; the wait ends early when `cancel` reads `true`, and
/// the failure that preceded it is returned. `cancel` is left in its
/// cancelled state for the caller to observe. Dropping the sender side never
/// counts as cancellation.
pub async fn retrieve<F: ProviderFactory>(
    factory: &F,
    params: &F::Params,
    retry_period_seconds: u64,
    mut cancel: watch::Receiver<bool>,
) -> Result<F::Handle, F::Error> {
    let retry_period = Duration::from_secs(retry_period_seconds);
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        debug!(attempt, "Creating storage provider");

        let error = match factory.create(params).await {
            Ok(handle) => {
                info!(attempt, "✅ Storage provider created");
                return Ok(handle);
            }
            Err(e) => e,
        };

        warn!(
            error = %error,
            retry_period_seconds,
            "Storage provider creation failed, retrying in {}s",
            retry_period_seconds
        );

        tokio::select! {
            _ = tokio::time::sleep(retry_period) => {}
            _ = cancelled(&mut cancel) => {
                warn!(attempt, "Storage provider retrieval cancelled");
                return Err(error);
            }
        }
    }
}

/// Resolve once the cancellation flag reads `true`
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            // Sender gone: nobody can cancel any more.
            std::future::pending::<()>().await;
        }
    }
}

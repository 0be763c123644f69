use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::ProviderDefaults;
use crate::error::CredentialError;

/// Per-call context: cancellation, an optional deadline, and provider defaults
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub cancellation: CancellationToken,
    pub deadline: Option<Instant>,
    pub defaults: ProviderDefaults,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now; a timeout past the clock's range leaves the deadline as is
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn with_defaults(mut self, defaults: ProviderDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Fail if the context is already done
    pub fn check(&self) -> Result<(), CredentialError> {
        if self.cancellation.is_cancelled() {
            return Err(CredentialError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(CredentialError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` until it completes or the context is done, whichever comes first
    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, CredentialError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<CredentialError>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(CredentialError::Cancelled),
            _ = deadline => Err(CredentialError::DeadlineExceeded),
            result = fut => result.map_err(Into::into),
        }
    }
}

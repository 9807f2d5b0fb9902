//! Command dispatcher - routes each command to its single handler.

use std::sync::Arc;
use std::time::Duration;

use tracing::{instrument, trace, warn};

use crate::commands::Command;
use crate::error::{DispatchError, HandlerError};
use crate::metrics::{
    ProcessingTimer, record_command_dispatched, record_handler_error, record_handler_retry,
};
use crate::ports::HandlerRegistry;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the command dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Time budget for a single handler attempt.
    pub handler_timeout: Duration,
    /// Attempts per command, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled after each retry.
    pub retry_delay: Duration,
    /// Upper bound for the retry delay.
    pub max_retry_delay: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            handler_timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// CommandDispatcher
// =============================================================================

/// Routes commands to handlers, one at a time.
///
/// Transient failures are retried with exponential backoff; the final
/// failure is returned with the command context so the caller can log it
/// and move on to the next event.
pub struct CommandDispatcher {
    config: DispatcherConfig,
    registry: Arc<HandlerRegistry>,
}

impl CommandDispatcher {
    pub fn new(config: DispatcherConfig, registry: Arc<HandlerRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Apply a command through its handler.
    #[instrument(
        skip_all,
        fields(command = %command.kind(), block = command.block.block_number, event = command.block.event_index)
    )]
    pub async fn dispatch(&self, command: &Command) -> Result<(), DispatchError> {
        let kind = command.kind();
        let handler = self
            .registry
            .get(kind)
            .ok_or(DispatchError::NoHandler(kind))?;

        let _timer = ProcessingTimer::new(kind);
        let max_attempts = self.config.max_attempts.max(1);
        let mut delay = self.config.retry_delay;
        let mut attempt = 1;

        loop {
            let result =
                match tokio::time::timeout(self.config.handler_timeout, handler.execute(command))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(HandlerError::Timeout(self.config.handler_timeout)),
                };

            match result {
                Ok(()) => {
                    trace!(handler = handler.name(), attempt, "Command applied");
                    record_command_dispatched(kind);
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        handler = handler.name(),
                        attempt,
                        max_attempts,
                        retry_in_ms = delay.as_millis(),
                        error = %e,
                        "⚠️  Handler failed, retrying..."
                    );
                    record_handler_retry(kind);
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.config.max_retry_delay);
                    attempt += 1;
                }
                Err(source) => {
                    record_handler_error(kind);
                    return Err(DispatchError::Handler {
                        kind,
                        block: command.block.clone(),
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }
}

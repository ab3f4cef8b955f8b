//! The core `LogDecoder` trait and associated progress/batch types.
//!
//! The trait is object-safe so decoders can be stored as
//! `Arc<dyn LogDecoder>` and shared across threads.

use crate::error::{BatchDecodeError, DecodeError};
use crate::event::{DecodedEvent, LogEntry};

/// Callback invoked during long-running batch decodes.
/// `processed` is the number of logs visited so far;
/// `total` is the total count in the current batch.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, processed: usize, total: usize);
}

/// Blanket impl so closures can be used as progress callbacks.
impl<F: Fn(usize, usize) + Send + Sync> ProgressCallback for F {
    fn on_progress(&self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Controls how batch decoding reacts to individual decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Skip logs that fail to decode.
    #[default]
    Skip,
    /// Collect decode errors alongside successes and return both at the end.
    Collect,
    /// Abort the entire batch on first error.
    Throw,
}

/// The output of a batch decode: decoded events plus any collected errors.
#[derive(Debug, Default)]
pub struct BatchDecodeResult {
    pub events: Vec<DecodedEvent>,
    /// Populated only when `ErrorMode::Collect` is used.
    pub errors: Vec<(usize, DecodeError)>,
}

/// Decodes raw logs into named events.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so they can be shared across
/// Tokio tasks and Rayon threads without additional locking.
pub trait LogDecoder: Send + Sync {
    /// Decode a single log.
    ///
    /// Returns `Ok(None)` when the log has no topics, no data, or a topic
    /// identifier that matches no known event. A log that matches but is
    /// malformed is an error.
    fn decode_log(&self, log: &LogEntry) -> Result<Option<DecodedEvent>, DecodeError>;

    /// Decode a batch of logs in input order.
    ///
    /// Logs that do not match any event are dropped in every mode; only
    /// malformed matches are subject to `mode`.
    fn decode_batch(
        &self,
        logs: &[LogEntry],
        mode: ErrorMode,
        progress: Option<&dyn ProgressCallback>,
    ) -> Result<BatchDecodeResult, BatchDecodeError> {
        let mut result = BatchDecodeResult {
            events: Vec::with_capacity(logs.len()),
            errors: Vec::new(),
        };

        for (idx, log) in logs.iter().enumerate() {
            match self.decode_log(log) {
                Ok(Some(event)) => result.events.push(event),
                Ok(None) => {}
                Err(err) => match mode {
                    ErrorMode::Skip => {
                        tracing::warn!(index = idx, error = %err, "skipping malformed log");
                    }
                    ErrorMode::Collect => result.errors.push((idx, err)),
                    ErrorMode::Throw => {
                        return Err(BatchDecodeError::ItemFailed {
                            index: idx,
                            source: err,
                        });
                    }
                },
            }

            if let Some(cb) = progress {
                cb.on_progress(idx + 1, logs.len());
            }
        }

        Ok(result)
    }

    /// Decode every log, keeping successful matches in input order.
    fn decode_logs(&self, logs: &[LogEntry]) -> Vec<DecodedEvent> {
        match self.decode_batch(logs, ErrorMode::Skip, None) {
            Ok(result) => result.events,
            // Skip mode never aborts
            Err(_) => Vec::new(),
        }
    }
}

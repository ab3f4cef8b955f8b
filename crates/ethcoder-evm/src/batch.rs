//! Rayon-powered batch decode helpers.
//!
//! Every helper returns events in input order regardless of how the work was
//! scheduled across threads.

use ethcoder_core::{
    BatchDecodeError, BatchDecodeResult, DecodeError, DecodedEvent, ErrorMode, LogDecoder,
    LogEntry,
};
use rayon::prelude::*;

/// Decode a slice of logs in parallel. Returns `(successes, errors)`;
/// logs that match no event appear in neither.
pub fn parallel_decode<D>(
    decoder: &D,
    logs: &[LogEntry],
) -> (Vec<DecodedEvent>, Vec<(usize, DecodeError)>)
where
    D: LogDecoder + ?Sized,
{
    let results: Vec<(usize, Result<Option<DecodedEvent>, DecodeError>)> = logs
        .par_iter()
        .enumerate()
        .map(|(idx, log)| (idx, decoder.decode_log(log)))
        .collect();

    let mut events = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for (idx, r) in results {
        match r {
            Ok(Some(e)) => events.push(e),
            Ok(None) => {}
            Err(e) => errors.push((idx, e)),
        }
    }
    (events, errors)
}

/// Parallel counterpart of `LogDecoder::decode_logs`.
pub fn par_decode_logs<D>(decoder: &D, logs: &[LogEntry]) -> Vec<DecodedEvent>
where
    D: LogDecoder + ?Sized,
{
    let (events, errors) = parallel_decode(decoder, logs);
    for (index, err) in &errors {
        tracing::warn!(index, error = %err, "skipping malformed log");
    }
    events
}

/// Parallel counterpart of `LogDecoder::decode_batch`.
///
/// In `Throw` mode the error reported is the one with the lowest index.
pub fn par_decode_batch<D>(
    decoder: &D,
    logs: &[LogEntry],
    mode: ErrorMode,
) -> Result<BatchDecodeResult, BatchDecodeError>
where
    D: LogDecoder + ?Sized,
{
    let (events, mut errors) = parallel_decode(decoder, logs);
    match mode {
        ErrorMode::Skip => {
            for (index, err) in &errors {
                tracing::warn!(index, error = %err, "skipping malformed log");
            }
            errors.clear();
        }
        ErrorMode::Collect => {}
        ErrorMode::Throw => {
            if !errors.is_empty() {
                let (index, source) = errors.swap_remove(0);
                return Err(BatchDecodeError::ItemFailed { index, source });
            }
        }
    }
    Ok(BatchDecodeResult { events, errors })
}

/// Chunk `logs` into slices of at most `chunk_size` and decode each chunk
/// in parallel. Error indices are relative to the whole slice.
pub fn chunked_decode<D>(
    decoder: &D,
    logs: &[LogEntry],
    chunk_size: usize,
) -> (Vec<DecodedEvent>, Vec<(usize, DecodeError)>)
where
    D: LogDecoder + ?Sized,
{
    let mut all_events = Vec::new();
    let mut all_errors = Vec::new();
    let mut offset = 0;

    for chunk in logs.chunks(chunk_size.max(1)) {
        let (mut evts, errs) = parallel_decode(decoder, chunk);
        all_events.append(&mut evts);
        for (idx, err) in errs {
            all_errors.push((offset + idx, err));
        }
        offset += chunk.len();
    }

    (all_events, all_errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Topic "n<k>" decodes to an event named k, "bad" fails, anything else misses.
    struct Numbered;

    impl LogDecoder for Numbered {
        fn decode_log(&self, log: &LogEntry) -> Result<Option<DecodedEvent>, DecodeError> {
            match log.topics.first().map(String::as_str) {
                Some("bad") => Err(DecodeError::InvalidUtf8),
                Some(t) if t.starts_with('n') => Ok(Some(DecodedEvent::for_log(&t[1..], log))),
                _ => Ok(None),
            }
        }
    }

    fn input(n: usize) -> Vec<LogEntry> {
        (0..n)
            .map(|i| {
                let topic = match i % 5 {
                    3 => "bad".to_string(),
                    4 => "miss".to_string(),
                    _ => format!("n{i}"),
                };
                LogEntry::new(vec![topic], "0x")
            })
            .collect()
    }

    #[test]
    fn parallel_matches_sequential_order() {
        let logs = input(500);
        let sequential: Vec<_> = Numbered.decode_logs(&logs);
        let parallel = par_decode_logs(&Numbered, &logs);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.len(), 300);
        assert_eq!(parallel[3].event_name, "5");
    }

    #[test]
    fn collect_and_throw_modes() {
        let logs = input(20);
        let result = par_decode_batch(&Numbered, &logs, ErrorMode::Collect).unwrap();
        let idx: Vec<_> = result.errors.iter().map(|(i, _)| *i).collect();
        assert_eq!(idx, vec![3, 8, 13, 18]);

        let err = par_decode_batch(&Numbered, &logs, ErrorMode::Throw).unwrap_err();
        assert!(matches!(err, BatchDecodeError::ItemFailed { index: 3, .. }));

        let result = par_decode_batch(&Numbered, &logs, ErrorMode::Skip).unwrap();
        assert!(result.errors.is_empty());
        assert_eq!(result.events.len(), 12);
    }

    #[test]
    fn chunked_error_indices_are_global() {
        let logs = input(12);
        let (events, errors) = chunked_decode(&Numbered, &logs, 4);
        assert_eq!(events.len(), 8);
        let idx: Vec<_> = errors.iter().map(|(i, _)| *i).collect();
        assert_eq!(idx, vec![3, 8]);
    }
}

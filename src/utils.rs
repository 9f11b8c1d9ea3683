//! Utility functions for the queue engine

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Initialize structured logging with the configured level.
///
/// `RUST_LOG` takes precedence over the passed level when set. Intended
/// for binaries embedding the engine; calling it twice fails because the
/// global subscriber is already set.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Generate a fresh pairing code: two independently random zero-padded
/// 4-digit groups joined by a space, e.g. "0042 7318".
pub fn generate_link_code() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{:04} {:04}",
        rng.gen_range(0..10_000),
        rng.gen_range(0..10_000)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_code_shape() {
        for _ in 0..100 {
            let code = generate_link_code();
            assert_eq!(code.len(), 9);
            let (first, rest) = code.split_at(4);
            assert!(first.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(&rest[..1], " ");
            assert!(rest[1..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_init_logging_sets_global_once() {
        assert!(init_logging("debug").is_ok());
        // The global subscriber is already in place on the second call
        assert!(init_logging("info").is_err());
    }

    #[test]
    fn test_timestamps_advance() {
        let a = current_timestamp();
        let b = current_timestamp();
        assert!(b >= a);
    }
}

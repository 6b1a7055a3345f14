//! # Composable MVI Testing
//!
//! Testing utilities and helpers for the Composable MVI architecture.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness for pure reducer tests
//! - Effect assertion helpers
//! - Async helpers for driving a store under Tokio's test clock
//!
//! ## Example
//!
//! ```ignore
//! use composable_mvi_testing::{helpers::settle, ReducerTest};
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_search_flow() {
//!     let store = Store::new(SearchState::default(), SearchReducer, env);
//!
//!     store.submit(SearchAction::QueryChanged { query: "rust".into() })?;
//!     settle().await;
//!
//!     assert_eq!(store.current_state().query, "rust");
//! }
//! ```


pub use reducer_test::{assertions, ReducerTest};

/// Async test helpers
pub mod helpers {
    use std::time::Duration;
    use tokio::sync::broadcast;

    /// Let spawned store tasks run until they block
    ///
    /// Yields repeatedly so that feedback chains (effect → action → effect)
    /// of a few hops complete. Does not advance time; use
    /// `tokio::time::sleep` or [`advance`] for timers.
    pub async fn settle() {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    /// Advance the paused test clock by `duration`, then settle
    ///
    /// Only meaningful inside `#[tokio::test(start_paused = true)]`.
    pub async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
        settle().await;
    }

    /// Collect everything currently buffered in a broadcast receiver
    ///
    /// Lagged messages are skipped; the function returns once the channel
    /// is empty or closed.
    pub fn drain<T: Clone>(receiver: &mut broadcast::Receiver<T>) -> Vec<T> {
        let mut items = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(item) => items.push(item),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {},
                Err(_) => return items,
            }
        }
    }

    /// Install a test-friendly tracing subscriber
    ///
    /// Honors `RUST_LOG`; safe to call from every test.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::helpers::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn test_settle_runs_spawned_chain() {
        let hops = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hops);

        tokio::spawn(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        settle().await;
        assert_eq!(hops.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_fires_timers() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });

        advance(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        advance(Duration::from_millis(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drain_collects_buffered() {
        let (tx, mut rx) = broadcast::channel(4);
        tx.send(1).unwrap();
        tx.send(2).unwrap();

        assert_eq!(drain(&mut rx), vec![1, 2]);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_init_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}

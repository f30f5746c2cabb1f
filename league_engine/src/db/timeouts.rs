//! Store operation deadlines
//!
//! Wraps whole store operations so a stuck lock or connection surfaces as
//! [`LeagueError::Timeout`] instead of hanging a request handler.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::errors::{LeagueError, LeagueResult};

/// Default deadline for single-statement reads (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default deadline for multi-row transactions (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for bracket builds and standings rebuilds (30 seconds)
pub const LONG_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a store operation with a deadline
///
/// Dropping the future on expiry drops any open transaction with it, which
/// rolls the transaction back.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> LeagueResult<T>
where
    F: Future<Output = LeagueResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(LeagueError::Timeout(duration)),
    }
}

/// Run a read with the default query deadline
pub async fn with_default_timeout<F, T>(future: F) -> LeagueResult<T>
where
    F: Future<Output = LeagueResult<T>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}

/// Run a transaction with the default transaction deadline
pub async fn with_transaction_timeout<F, T>(future: F) -> LeagueResult<T>
where
    F: Future<Output = LeagueResult<T>>,
{
    with_timeout(DEFAULT_TRANSACTION_TIMEOUT, future).await
}

/// Run a long operation with the extended deadline
pub async fn with_long_timeout<F, T>(future: F) -> LeagueResult<T>
where
    F: Future<Output = LeagueResult<T>>,
{
    with_timeout(LONG_OPERATION_TIMEOUT, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let value = with_default_timeout(async { Ok::<_, LeagueError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: LeagueResult<()> =
            with_default_timeout(async { Err(LeagueError::MatchNotFound(3)) }).await;
        assert!(matches!(result, Err(LeagueError::MatchNotFound(3))));
    }

    #[tokio::test]
    async fn test_expired_deadline() {
        let result: LeagueResult<()> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        match result {
            Err(LeagueError::Timeout(d)) => assert_eq!(d, Duration::from_millis(10)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}

// Error taxonomy shared by the repository and the services
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a repository implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or did not answer in time.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with an error.
    #[error("store query failed: {0}")]
    Query(String),
}

/// Outcome of a query-layer operation that did not produce data.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Single-entity lookup miss. Not a failure.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => QueryError::StoreUnavailable(msg),
            StoreError::Query(msg) => QueryError::Unexpected(msg),
        }
    }
}

/// Runs one store round-trip under a fixed deadline.
pub async fn bounded<T, F>(deadline: Duration, round_trip: F) -> Result<T, QueryError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, round_trip).await {
        Ok(result) => result.map_err(QueryError::from),
        Err(_) => Err(QueryError::StoreUnavailable(format!(
            "no answer within {}ms",
            deadline.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_maps_store_errors() {
        let err = bounded(Duration::from_secs(1), async {
            Err::<(), _>(StoreError::Unavailable("connection refused".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, QueryError::StoreUnavailable(_)));

        let err = bounded(Duration::from_secs(1), async {
            Err::<(), _>(StoreError::Query("bad sort".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, QueryError::Unexpected(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let err = bounded(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, StoreError>(1)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, QueryError::StoreUnavailable(msg) if msg.contains("50ms")));
    }
}

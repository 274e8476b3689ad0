use std::future::Future;
use std::time::Duration;

use crate::Error;

/// Run a store/collaborator call with an upper bound. Expiry surfaces as
/// `Error::Timeout`, which callers treat as retryable.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    tokio::time::timeout(limit, fut).await?
}

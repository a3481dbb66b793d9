//! Emptying a bucket before it is removed.
//!
//! Both backends delete a bucket the same way: collect every key, delete them
//! in batches, and keep going past failures. Only the two primitives differ,
//! so they live behind [`PurgeSource`] and the loop lives here once.

use async_trait::async_trait;

use crate::error::BoxError;

/// One page of object keys from a listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Token for the next page, `None` on the last page.
    pub next_token: Option<String>,
}

/// Outcome of a purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: usize,
    pub failed: usize,
}

/// The list/delete primitives a backend exposes for purging.
#[async_trait]
pub trait PurgeSource: Send + Sync {
    /// Largest number of keys accepted by one [`delete_batch`](Self::delete_batch) call.
    fn max_batch(&self) -> usize;

    /// Fetch one page of keys, continuing from `token`.
    async fn list_page(&self, bucket: &str, token: Option<String>) -> Result<ObjectPage, BoxError>;

    /// Delete a batch of keys and return the keys that could not be deleted.
    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> Result<Vec<String>, BoxError>;
}

/// Delete every object in `bucket`, tolerating individual failures.
///
/// Never fails: listing errors end the purge early and deletion errors are
/// counted in the returned report.
pub async fn purge_bucket<S>(source: &S, bucket: &str) -> PurgeReport
where
    S: PurgeSource + ?Sized,
{
    let keys = match collect_keys(source, bucket).await {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!(bucket, error = %e, "Failed to list objects for purge");
            return PurgeReport::default();
        }
    };

    if keys.is_empty() {
        tracing::debug!(bucket, "No objects to delete");
        return PurgeReport::default();
    }

    let mut report = PurgeReport::default();
    for chunk in keys.chunks(source.max_batch().max(1)) {
        match source.delete_batch(bucket, chunk).await {
            Ok(failed) => {
                for key in &failed {
                    tracing::warn!(bucket, key = %key, "Failed to delete object during purge");
                }
                report.failed += failed.len();
                report.deleted += chunk.len().saturating_sub(failed.len());
            }
            Err(e) => {
                tracing::warn!(bucket, count = chunk.len(), error = %e, "Batch delete failed during purge");
                report.failed += chunk.len();
            }
        }
    }

    tracing::debug!(bucket, deleted = report.deleted, "Deleted objects from bucket");
    if report.failed > 0 {
        tracing::warn!(bucket, failed = report.failed, "Some objects could not be deleted");
    }

    report
}

async fn collect_keys<S>(source: &S, bucket: &str) -> Result<Vec<String>, BoxError>
where
    S: PurgeSource + ?Sized,
{
    let mut keys = Vec::new();
    let mut token = None;
    loop {
        let page = source.list_page(bucket, token).await?;
        keys.extend(page.keys);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    Ok(keys)
}

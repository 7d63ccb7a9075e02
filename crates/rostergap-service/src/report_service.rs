//! Report service trait and implementation.

use crate::cache::QueryCache;
use async_trait::async_trait;
use rostergap_core::{QueryKey, RostergapResult, UnenrolledReport};
use std::sync::Arc;

/// Serves unenrolled-user reports.
///
/// Callers hand in an already-validated [`QueryKey`]; validation of raw
/// client and data type strings is the request-facing layer's job.
#[async_trait]
pub trait UnenrolledReportService: Send + Sync {
    /// Returns the report for `key`, computed at most once per freshness
    /// window regardless of how many callers ask concurrently.
    async fn unenrolled_report(&self, key: QueryKey) -> RostergapResult<Arc<UnenrolledReport>>;

    /// Drops any cached report for `key`. Returns whether one existed.
    fn invalidate(&self, key: &QueryKey) -> bool;

    /// Drops all cached reports.
    fn clear_cache(&self);
}

/// Production implementation delegating to the query cache.
pub struct UnenrolledReportServiceImpl {
    cache: Arc<QueryCache>,
}

impl UnenrolledReportServiceImpl {
    #[must_use]
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl UnenrolledReportService for UnenrolledReportServiceImpl {
    async fn unenrolled_report(&self, key: QueryKey) -> RostergapResult<Arc<UnenrolledReport>> {
        self.cache.get_or_compute(key).await
    }

    fn invalidate(&self, key: &QueryKey) -> bool {
        self.cache.invalidate(key)
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostergap_core::{Client, DataType, RostergapError};
    use rostergap_warehouse::WarehouseExecutor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingExecutor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WarehouseExecutor for CountingExecutor {
        async fn execute(&self, key: &QueryKey) -> RostergapResult<UnenrolledReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(UnenrolledReport::new(key, vec![], 0, 0, "Email".to_string()))
        }
    }

    struct FailingExecutor;

    #[async_trait]
    impl WarehouseExecutor for FailingExecutor {
        async fn execute(&self, _key: &QueryKey) -> RostergapResult<UnenrolledReport> {
            Err(RostergapError::warehouse("down"))
        }
    }

    fn service_over(executor: Arc<dyn WarehouseExecutor>) -> UnenrolledReportServiceImpl {
        let cache = Arc::new(QueryCache::new(executor, Duration::from_secs(3600), true));
        UnenrolledReportServiceImpl::new(cache)
    }

    #[tokio::test]
    async fn test_service_caches_between_calls() {
        let executor = Arc::new(CountingExecutor {
            calls: AtomicUsize::new(0),
        });
        let service = service_over(Arc::clone(&executor) as Arc<dyn WarehouseExecutor>);
        let key = QueryKey::new(Client::Parana, DataType::Teachers).unwrap();

        service.unenrolled_report(key).await.unwrap();
        service.unenrolled_report(key).await.unwrap();
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

        assert!(service.invalidate(&key));
        service.unenrolled_report(key).await.unwrap();
        assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_service_propagates_upstream_failure() {
        let service = service_over(Arc::new(FailingExecutor));
        let key = QueryKey::new(Client::Goias, DataType::Students).unwrap();

        let err = service.unenrolled_report(key).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let executor = Arc::new(CountingExecutor {
            calls: AtomicUsize::new(0),
        });
        let service = service_over(Arc::clone(&executor) as Arc<dyn WarehouseExecutor>);
        let key = QueryKey::new(Client::MatoGrosso, DataType::Students).unwrap();

        service.unenrolled_report(key).await.unwrap();
        service.clear_cache();
        service.unenrolled_report(key).await.unwrap();
        assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
    }
}

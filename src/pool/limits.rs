//! Per-route and total connection caps.
//!
//! Each in-flight request holds a [`PoolLease`]: one permit from its route's
//! semaphore and one from the pool-wide semaphore. Callers past either cap
//! wait up to the connection request timeout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

use crate::error_handling::RequestError;
use crate::pool::Route;

/// Snapshot of pool accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub leased: usize,
    pub available: usize,
    pub max_total: usize,
    pub max_per_route: usize,
    /// Routes with a lease outstanding or a caller waiting
    pub routes: usize,
}

/// Permission to use one connection on a route. Released on drop.
#[derive(Debug)]
pub struct PoolLease {
    route: Route,
    _route_permit: OwnedSemaphorePermit,
    _total_permit: OwnedSemaphorePermit,
}

impl PoolLease {
    pub fn route(&self) -> &Route {
        &self.route
    }
}

#[derive(Debug)]
pub(crate) struct PoolLimits {
    max_per_route: usize,
    max_total: usize,
    total: Arc<Semaphore>,
    routes: Mutex<HashMap<Route, Arc<Semaphore>>>,
}

impl PoolLimits {
    /// Caps below one would make every acquisition time out, so they are raised to one.
    pub(crate) fn new(max_per_route: usize, max_total: usize) -> Self {
        let max_per_route = max_per_route.clamp(1, Semaphore::MAX_PERMITS);
        let max_total = max_total.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            max_per_route,
            max_total,
            total: Arc::new(Semaphore::new(max_total)),
            routes: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the semaphore of `route`, creating it on first use.
    ///
    /// Leases and waiters hold a clone of their route's semaphore, so an entry
    /// whose only owner is the map is idle and is dropped here. The map is
    /// bounded by the routes currently in use.
    fn route_semaphore(&self, route: &Route) -> Arc<Semaphore> {
        // A poisoned map is still structurally valid
        let mut routes = self
            .routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        routes.retain(|_, semaphore| Arc::strong_count(semaphore) > 1);
        routes
            .entry(route.clone())
            .or_insert_with(|| Arc::new(Semaphore::new(self.max_per_route)))
            .clone()
    }

    pub(crate) async fn acquire(
        &self,
        route: &Route,
        timeout: Duration,
    ) -> Result<PoolLease, RequestError> {
        let route_semaphore = self.route_semaphore(route);
        let total = Arc::clone(&self.total);
        let permits = async move {
            let route_permit = route_semaphore.acquire_owned().await?;
            let total_permit = total.acquire_owned().await?;
            Ok::<_, AcquireError>((route_permit, total_permit))
        };

        match tokio::time::timeout(timeout, permits).await {
            Ok(Ok((route_permit, total_permit))) => Ok(PoolLease {
                route: route.clone(),
                _route_permit: route_permit,
                _total_permit: total_permit,
            }),
            Ok(Err(_)) => Err(RequestError::PoolClosed),
            Err(_) => {
                log::warn!("Timed out after {timeout:?} waiting for a pooled connection to {route}");
                Err(RequestError::PoolTimeout {
                    route: route.clone(),
                    waited: timeout,
                })
            }
        }
    }

    pub(crate) fn stats(&self) -> PoolStats {
        let available = self.total.available_permits();
        let routes = self
            .routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|semaphore| Arc::strong_count(semaphore) > 1)
            .count();
        PoolStats {
            leased: self.max_total - available,
            available,
            max_total: self.max_total,
            max_per_route: self.max_per_route,
            routes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(50);

    fn route(host: &str) -> Route {
        Route::new("http", host, 80)
    }

    #[tokio::test]
    async fn test_per_route_cap_blocks_same_route() {
        let limits = PoolLimits::new(1, 10);
        let _held = limits.acquire(&route("a.example"), SHORT).await.unwrap();

        let result = limits.acquire(&route("a.example"), SHORT).await;
        assert!(matches!(result, Err(RequestError::PoolTimeout { .. })));

        // A different route still has capacity
        assert!(limits.acquire(&route("b.example"), SHORT).await.is_ok());
    }

    #[tokio::test]
    async fn test_total_cap_blocks_across_routes() {
        let limits = PoolLimits::new(10, 2);
        let _a = limits.acquire(&route("a.example"), SHORT).await.unwrap();
        let _b = limits.acquire(&route("b.example"), SHORT).await.unwrap();

        let result = limits.acquire(&route("c.example"), SHORT).await;
        assert!(matches!(result, Err(RequestError::PoolTimeout { .. })));
    }

    #[tokio::test]
    async fn test_dropping_lease_releases_slot() {
        let limits = PoolLimits::new(1, 1);
        let lease = limits.acquire(&route("a.example"), SHORT).await.unwrap();
        assert_eq!(limits.stats().leased, 1);
        drop(lease);
        assert_eq!(limits.stats().leased, 0);
        assert!(limits.acquire(&route("a.example"), SHORT).await.is_ok());
    }

    #[tokio::test]
    async fn test_waiter_gets_slot_when_released() {
        let limits = Arc::new(PoolLimits::new(1, 1));
        let lease = limits.acquire(&route("a.example"), SHORT).await.unwrap();

        let waiter = {
            let limits = Arc::clone(&limits);
            tokio::spawn(async move {
                limits
                    .acquire(&route("a.example"), Duration::from_secs(5))
                    .await
                    .map(|lease| lease.route().clone())
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(lease);

        let acquired = waiter.await.expect("waiter task panicked");
        assert_eq!(acquired.unwrap(), route("a.example"));
    }

    #[tokio::test]
    async fn test_idle_routes_are_forgotten() {
        let limits = PoolLimits::new(1, 10);
        for host in ["a.example", "b.example", "c.example"] {
            let lease = limits.acquire(&route(host), SHORT).await.unwrap();
            drop(lease);
        }
        assert_eq!(limits.stats().routes, 0);

        let _held = limits.acquire(&route("d.example"), SHORT).await.unwrap();
        let map_len = limits.routes.lock().unwrap().len();
        assert_eq!(map_len, 1);
        assert_eq!(limits.stats().routes, 1);
    }

    #[tokio::test]
    async fn test_pruning_keeps_busy_route_cap() {
        let limits = PoolLimits::new(1, 10);
        let _held = limits.acquire(&route("a.example"), SHORT).await.unwrap();

        // Touching other routes must not reset the cap of the busy one
        let _other = limits.acquire(&route("b.example"), SHORT).await.unwrap();
        let result = limits.acquire(&route("a.example"), SHORT).await;
        assert!(matches!(result, Err(RequestError::PoolTimeout { .. })));
    }

    #[test]
    fn test_zero_caps_are_raised_to_one() {
        let limits = PoolLimits::new(0, 0);
        let stats = limits.stats();
        assert_eq!(stats.max_total, 1);
        assert_eq!(stats.max_per_route, 1);
        assert_eq!(stats.available, 1);
    }
}

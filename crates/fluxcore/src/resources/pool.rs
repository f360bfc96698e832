use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use crate::config::PoolCapacities;
use crate::resources::{ResourceCounts, ResourceKind};

/// Bounded pool of interchangeable units of a single resource kind.
///
/// Waiters are woken in FIFO order. A unit is handed out as a [`ResourceGuard`]
/// and returned to the pool when the guard is released or dropped, so every
/// successful acquire is matched by exactly one release.
#[derive(Debug)]
pub struct ResourcePool {
    kind: ResourceKind,
    capacity: u32,
    semaphore: Arc<Semaphore>,
}

impl ResourcePool {
    pub fn new(kind: ResourceKind, capacity: u32) -> Self {
        Self {
            kind,
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity as usize)),
        }
    }

    #[inline]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of units that can be acquired right now.
    #[inline]
    pub fn available(&self) -> u32 {
        self.semaphore.available_permits() as u32
    }

    /// Number of units currently held by clients.
    #[inline]
    pub fn held(&self) -> u32 {
        self.capacity - self.available()
    }

    /// Waits until a unit is free. Never fails.
    pub async fn acquire(&self) -> ResourceGuard {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("Resource pool semaphore is never closed");
        self.guard(permit)
    }

    /// Takes a unit only if one is free at this moment.
    pub fn try_acquire(&self) -> Option<ResourceGuard> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| self.guard(permit))
    }

    /// Waits for a unit until `deadline`.
    ///
    /// Returns `None` when the deadline passes first; in that case the pool is
    /// left untouched and the caller leaves the wait queue.
    pub async fn acquire_until(&self, deadline: Instant) -> Option<ResourceGuard> {
        tokio::time::timeout_at(deadline, self.acquire()).await.ok()
    }

    fn guard(&self, permit: OwnedSemaphorePermit) -> ResourceGuard {
        debug_assert!(self.available() < self.capacity);
        ResourceGuard {
            kind: self.kind,
            _permit: permit,
        }
    }
}

/// One unit taken from a [`ResourcePool`].
#[derive(Debug)]
#[must_use = "dropping the guard immediately returns the unit to its pool"]
pub struct ResourceGuard {
    kind: ResourceKind,
    _permit: OwnedSemaphorePermit,
}

impl ResourceGuard {
    #[inline]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the unit to its pool.
    pub fn release(self) {
        drop(self);
    }
}

/// The three pools of the café.
#[derive(Debug)]
pub struct ResourcePools {
    compute_slots: ResourcePool,
    seats: ResourcePool,
    headsets: ResourcePool,
}

impl ResourcePools {
    pub fn new(capacities: &PoolCapacities) -> Self {
        Self {
            compute_slots: ResourcePool::new(ResourceKind::ComputeSlot, capacities.compute_slots),
            seats: ResourcePool::new(ResourceKind::Seat, capacities.seats),
            headsets: ResourcePool::new(ResourceKind::Headset, capacities.headsets),
        }
    }

    #[inline]
    pub fn get(&self, kind: ResourceKind) -> &ResourcePool {
        match kind {
            ResourceKind::ComputeSlot => &self.compute_slots,
            ResourceKind::Seat => &self.seats,
            ResourceKind::Headset => &self.headsets,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourcePool> {
        ResourceKind::ACQUISITION_ORDER
            .into_iter()
            .map(|kind| self.get(kind))
    }

    pub fn availability(&self) -> ResourceCounts {
        let mut counts = ResourceCounts::default();
        for pool in self.iter() {
            *counts.get_mut(pool.kind()) = pool.available() as u64;
        }
        counts
    }

    /// True when every pool has fewer than `threshold` free units.
    pub fn is_near_exhaustion(&self, threshold: u32) -> bool {
        self.iter().all(|pool| pool.available() < threshold)
    }

    /// True when no unit of any kind is held.
    pub fn is_idle(&self) -> bool {
        self.iter().all(|pool| pool.held() == 0)
    }
}

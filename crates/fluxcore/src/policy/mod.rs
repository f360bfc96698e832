//! Allocation policies deciding how a client collects its resources.
//!
//! Each pool is synchronized on its own and no lock spans several pools, so a
//! policy has to prevent circular waits by itself:
//!
//! * [`AllocationMode::Ordered`] waits for resources only in the global order
//!   compute slot, seat, headset. Optional resources are taken only when
//!   immediately free.
//! * [`AllocationMode::AllOrNothing`] never waits for a non-gate resource. It
//!   tries the whole set at once and rolls back on the first miss.
//!
//! In both modes only the gate resource carries a deadline while waiting.

mod all_or_nothing;
mod ordered;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use crate::client::ClientId;
use crate::events::SimulationObserver;
use crate::resources::{ResourceGuard, ResourceSet};
use crate::task::ClientTask;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationMode {
    #[default]
    Ordered,
    AllOrNothing,
}

impl AllocationMode {
    pub fn name(self) -> &'static str {
        match self {
            AllocationMode::Ordered => "ordered",
            AllocationMode::AllOrNothing => "all-or-nothing",
        }
    }
}

impl Display for AllocationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbandonReason {
    /// The deadline passed before the client got what it needed.
    Timeout,
}

impl Display for AbandonReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AbandonReason::Timeout => f.write_str("waited too long"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocationOutcome {
    Served { wait: Duration },
    Abandoned { reason: AbandonReason },
}

/// Resources collected by a single client, in acquisition order.
///
/// Releasing goes in reverse acquisition order. Whatever is still held when
/// the value is dropped is released the same way, so no exit path of a client
/// task can leak a unit.
pub struct HeldResources {
    client_id: ClientId,
    guards: SmallVec<[ResourceGuard; 3]>,
    observer: Arc<dyn SimulationObserver>,
}

impl HeldResources {
    pub(crate) fn new(client_id: ClientId, observer: Arc<dyn SimulationObserver>) -> Self {
        HeldResources {
            client_id,
            guards: SmallVec::new(),
            observer,
        }
    }

    pub(crate) fn push(&mut self, guard: ResourceGuard) {
        debug_assert!(self.guards.iter().all(|g| g.kind() != guard.kind()));
        self.observer
            .on_resource_acquired(self.client_id, guard.kind());
        self.guards.push(guard);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn kinds(&self) -> ResourceSet {
        self.guards.iter().map(|g| g.kind()).collect()
    }

    /// Releases everything acquired after the first `len` resources.
    pub(crate) fn rollback_to(&mut self, len: usize) -> ResourceSet {
        let mut released = ResourceSet::empty();
        while self.guards.len() > len {
            if let Some(guard) = self.guards.pop() {
                released.insert(guard.kind());
                self.release_guard(guard);
            }
        }
        released
    }

    pub(crate) fn release(mut self) {
        self.rollback_to(0);
    }

    fn release_guard(&self, guard: ResourceGuard) {
        let kind = guard.kind();
        guard.release();
        self.observer.on_resource_released(self.client_id, kind);
    }
}

impl Drop for HeldResources {
    fn drop(&mut self) {
        self.rollback_to(0);
    }
}

pub(crate) async fn acquire(
    mode: AllocationMode,
    task: &mut ClientTask,
) -> Result<HeldResources, AbandonReason> {
    match mode {
        AllocationMode::Ordered => ordered::acquire(task).await,
        AllocationMode::AllOrNothing => all_or_nothing::acquire(task).await,
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Error;
use crate::policy::AllocationMode;
use crate::resources::ResourceKind;

/// How long a client waits for the gate resource before giving up.
pub const DEFAULT_GATE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Pause between two all-or-nothing acquisition passes.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(50);

/// An arriving client raises a near-deadlock alert when every pool has fewer
/// free units than this.
pub const NEAR_EXHAUSTION_THRESHOLD: u32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PoolCapacities {
    pub compute_slots: u32,
    pub seats: u32,
    pub headsets: u32,
}

impl Default for PoolCapacities {
    fn default() -> Self {
        PoolCapacities {
            compute_slots: 10,
            seats: 8,
            headsets: 6,
        }
    }
}

impl PoolCapacities {
    pub fn uniform(capacity: u32) -> Self {
        PoolCapacities {
            compute_slots: capacity,
            seats: capacity,
            headsets: capacity,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::ComputeSlot => self.compute_slots,
            ResourceKind::Seat => self.seats,
            ResourceKind::Headset => self.headsets,
        }
    }
}

/// Parameters of the acquisition engine, fixed for the whole run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub mode: AllocationMode,
    pub capacities: PoolCapacities,
    pub gate_timeout: Duration,
    pub backoff: Duration,
    pub near_deadlock_alerts: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            mode: AllocationMode::Ordered,
            capacities: PoolCapacities::default(),
            gate_timeout: DEFAULT_GATE_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
            near_deadlock_alerts: false,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> crate::Result<()> {
        for kind in ResourceKind::ACQUISITION_ORDER {
            if self.capacities.get(kind) == 0 {
                return Err(Error::InvalidConfiguration(format!(
                    "capacity of {kind} pool has to be at least 1"
                )));
            }
        }
        if self.mode == AllocationMode::AllOrNothing && self.backoff.is_zero() {
            return Err(Error::InvalidConfiguration(
                "backoff of the all-or-nothing policy cannot be zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub mod pool;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub use pool::{ResourceGuard, ResourcePool, ResourcePools};

/// Kinds of resources offered by the café.
///
/// The declaration order is the global acquisition order used by the ordered
/// allocation policy: compute slot, then seat, then headset.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    ComputeSlot,
    Seat,
    Headset,
}

/// Every client has to pass through this resource first; the abandonment
/// deadline is measured on it.
pub const GATE_RESOURCE: ResourceKind = ResourceKind::ComputeSlot;

impl ResourceKind {
    pub const ACQUISITION_ORDER: [ResourceKind; 3] = [
        ResourceKind::ComputeSlot,
        ResourceKind::Seat,
        ResourceKind::Headset,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            ResourceKind::ComputeSlot => 0,
            ResourceKind::Seat => 1,
            ResourceKind::Headset => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::ComputeSlot => "compute slot",
            ResourceKind::Seat => "seat",
            ResourceKind::Headset => "VR headset",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Small set of resource kinds, stored as a bit mask.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceSet(u8);

impl ResourceSet {
    pub fn empty() -> Self {
        ResourceSet(0)
    }

    #[inline]
    pub fn insert(&mut self, kind: ResourceKind) {
        self.0 |= 1 << kind.index();
    }

    #[inline]
    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the kinds in the global acquisition order.
    pub fn iter(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        ResourceKind::ACQUISITION_ORDER
            .into_iter()
            .filter(|kind| self.contains(*kind))
    }
}

impl FromIterator<ResourceKind> for ResourceSet {
    fn from_iter<T: IntoIterator<Item = ResourceKind>>(iter: T) -> Self {
        let mut set = ResourceSet::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl std::fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Display for ResourceSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("nothing");
        }
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(&kind, f)?;
        }
        Ok(())
    }
}

/// One counter per resource kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceCounts {
    pub compute_slot: u64,
    pub seat: u64,
    pub headset: u64,
}

impl ResourceCounts {
    pub fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::ComputeSlot => self.compute_slot,
            ResourceKind::Seat => self.seat,
            ResourceKind::Headset => self.headset,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut u64 {
        match kind {
            ResourceKind::ComputeSlot => &mut self.compute_slot,
            ResourceKind::Seat => &mut self.seat,
            ResourceKind::Headset => &mut self.headset,
        }
    }

    pub fn add_set(&mut self, resources: ResourceSet) {
        for kind in resources.iter() {
            *self.get_mut(kind) += 1;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u64)> + '_ {
        ResourceKind::ACQUISITION_ORDER
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::{ResourceCounts, ResourceKind, ResourceSet};

    #[test]
    fn test_acquisition_order_matches_ord() {
        let mut kinds = vec![
            ResourceKind::Headset,
            ResourceKind::ComputeSlot,
            ResourceKind::Seat,
        ];
        kinds.sort();
        assert_eq!(kinds, ResourceKind::ACQUISITION_ORDER.to_vec());
    }

    #[test]
    fn test_resource_set_iterates_in_global_order() {
        let set: ResourceSet = [ResourceKind::Headset, ResourceKind::ComputeSlot]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(!set.contains(ResourceKind::Seat));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ResourceKind::ComputeSlot, ResourceKind::Headset]
        );
        assert_eq!(set.to_string(), "compute slot, VR headset");
        assert_eq!(ResourceSet::empty().to_string(), "nothing");
    }

    #[test]
    fn test_counts_add_set() {
        let mut counts = ResourceCounts::default();
        counts.add_set([ResourceKind::ComputeSlot, ResourceKind::Seat].into_iter().collect());
        counts.add_set([ResourceKind::ComputeSlot].into_iter().collect());
        assert_eq!(counts.compute_slot, 2);
        assert_eq!(counts.seat, 1);
        assert_eq!(counts.headset, 0);
    }
}

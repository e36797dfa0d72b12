//! Identifiers and simple allocators for factory-owned entities.
//!
//! Host-owned handles (`ContainerId`, `MaterialHandle`) are minted by the host
//! collaborators; the factory only stores and compares them.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ArmatureId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AtlasId(pub u32);

/// Host display container (scene node) handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

/// Host material handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub u64);

/// Monotonic allocator for ArmatureId and AtlasId.
/// IDs are never reused within one context, even after dispose/remove.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_armature: u32,
    next_atlas: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_armature(&mut self) -> ArmatureId {
        let id = ArmatureId(self.next_armature);
        self.next_armature = self.next_armature.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_atlas(&mut self) -> AtlasId {
        let id = AtlasId(self.next_atlas);
        self.next_atlas = self.next_atlas.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//! FactoryContext: explicit owner of every cache, the armature store and the
//! clock. Nothing in this crate is a global; hosts create one context, pass
//! host capabilities into each call, and tear it down explicitly.
//!
//! Operations are spread across modules as further `impl FactoryContext`
//! blocks: atlas resolution in `atlas`, build/dispose in `assembler`, slot
//! construction in `slots`, display replacement in `replace`.

use std::rc::Rc;

use serde_json::Value as JsonValue;

use crate::armature::{Armature, ArmatureStore};
use crate::atlas::{AtlasLibrary, MaterializedAtlas};
use crate::clock::Clock;
use crate::config::FactoryConfig;
use crate::data::SkeletonDefinition;
use crate::error::Result;
use crate::events::FactoryEvent;
use crate::host::AnimationEvaluator;
use crate::ids::{ArmatureId, AtlasId, IdAllocator};
use crate::registry::DataRegistry;

#[derive(Debug)]
pub struct FactoryContext {
    pub(crate) config: FactoryConfig,
    pub(crate) ids: IdAllocator,
    pub(crate) registry: DataRegistry,
    pub(crate) atlases: AtlasLibrary,
    pub(crate) armatures: ArmatureStore,
    pub(crate) clock: Clock,
    pub(crate) events: Vec<FactoryEvent>,
}

impl Default for FactoryContext {
    fn default() -> Self {
        Self::new(FactoryConfig::default())
    }
}

impl FactoryContext {
    pub fn new(config: FactoryConfig) -> Self {
        Self {
            config,
            ids: IdAllocator::new(),
            registry: DataRegistry::new(),
            atlases: AtlasLibrary::default(),
            armatures: ArmatureStore::default(),
            clock: Clock::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn registry(&self) -> &DataRegistry {
        &self.registry
    }

    pub fn atlases(&self) -> &AtlasLibrary {
        &self.atlases
    }

    pub fn atlas(&self, id: AtlasId) -> Option<&MaterializedAtlas> {
        self.atlases.get(id)
    }

    pub fn armatures(&self) -> &ArmatureStore {
        &self.armatures
    }

    pub fn armature(&self, id: ArmatureId) -> Option<&Armature> {
        self.armatures.get(id)
    }

    pub fn armature_mut(&mut self, id: ArmatureId) -> Option<&mut Armature> {
        self.armatures.get_mut(id)
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Load (or fetch the cached) skeleton dataset.
    pub fn load_skeleton(
        &mut self,
        doc: &JsonValue,
        name_override: Option<&str>,
    ) -> Result<Rc<SkeletonDefinition>> {
        self.registry.load_skeleton(doc, name_override, &self.config)
    }

    /// Load (or fetch the cached) skeleton dataset that came from `path`.
    pub fn load_skeleton_from_path(
        &mut self,
        path: &str,
        doc: &JsonValue,
        name_override: Option<&str>,
    ) -> Result<Rc<SkeletonDefinition>> {
        self.registry
            .load_skeleton_from_path(path, doc, name_override, &self.config)
    }

    pub fn get_skeleton(&self, name: &str) -> Option<Rc<SkeletonDefinition>> {
        self.registry.get_skeleton(name).cloned()
    }

    /// Remove a skeleton dataset. Live armatures keep their definitions.
    pub fn remove_skeleton(&mut self, name: &str) -> Option<Rc<SkeletonDefinition>> {
        self.registry.remove_skeleton(name)
    }

    /// Drop every cached skeleton and atlas. Live armatures are untouched.
    pub fn clear_data(&mut self) {
        self.registry.clear();
        self.atlases.clear();
    }

    /// Advance every registered armature by one host frame.
    pub fn advance_time(&mut self, dt: f32, evaluator: &mut dyn AnimationEvaluator) {
        self.clock.advance_time(dt, &mut self.armatures, evaluator);
    }

    pub fn drain_events(&mut self) -> Vec<FactoryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Dispose every live armature and drop all cached data. The context is
    /// reusable afterwards; ids keep counting up.
    pub fn teardown(&mut self) {
        let roots: Vec<ArmatureId> = self
            .armatures
            .iter()
            .filter(|a| a.parent.is_none())
            .map(|a| a.id)
            .collect();
        for id in roots {
            self.dispose(id);
        }
        // Orphans whose parent was disposed first are gone already; anything
        // left was detached from its parent.
        for id in self.armatures.ids() {
            self.dispose(id);
        }
        self.clock.clear();
        self.clear_data();
        log::debug!("factory context torn down");
    }
}

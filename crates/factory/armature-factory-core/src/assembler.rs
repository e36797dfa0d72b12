//! Armature assembly and disposal.
//!
//! `build` resolves a definition, binds a host container and delegates slot
//! construction to [`crate::slots`], which recurses back into
//! `build_armature` for nested armatures. The current build path is carried
//! along as a list of `dataset/definition` keys so a definition that nests
//! itself fails instead of recursing forever.

use std::rc::Rc;

use crate::armature::Armature;
use crate::context::FactoryContext;
use crate::error::{FactoryError, Result};
use crate::events::FactoryEvent;
use crate::host::Host;
use crate::ids::{ArmatureId, ContainerId};

/// Parameters of one `build` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildRequest {
    pub definition: String,
    /// Dataset to search; every loaded dataset in load order when unset.
    pub dataset: Option<String>,
    /// Skin to bind; unknown names fall back to the default skin.
    pub skin: Option<String>,
    /// Dataset whose atlases provide textures, if not the definition's own.
    pub atlas_dataset: Option<String>,
    /// Caller-supplied container. The armature never owns it.
    pub container: Option<ContainerId>,
    pub ui_mode: bool,
}

impl BuildRequest {
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            ..Default::default()
        }
    }

    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn skin(mut self, skin: impl Into<String>) -> Self {
        self.skin = Some(skin.into());
        self
    }

    pub fn atlas_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.atlas_dataset = Some(dataset.into());
        self
    }

    pub fn container(mut self, container: ContainerId) -> Self {
        self.container = Some(container);
        self
    }

    pub fn ui_mode(mut self, ui_mode: bool) -> Self {
        self.ui_mode = ui_mode;
        self
    }
}

impl FactoryContext {
    /// Build a live armature. `Ok(None)` when the definition cannot be
    /// resolved; `Err` only for cyclic nesting.
    pub fn build(
        &mut self,
        request: &BuildRequest,
        host: &mut Host<'_>,
    ) -> Result<Option<ArmatureId>> {
        let mut path = Vec::new();
        self.build_armature(request, None, None, true, &mut path, host)
    }

    pub(crate) fn build_armature(
        &mut self,
        request: &BuildRequest,
        container_name: Option<&str>,
        parent: Option<ArmatureId>,
        inherit_animation: bool,
        path: &mut Vec<String>,
        host: &mut Host<'_>,
    ) -> Result<Option<ArmatureId>> {
        let Some((dataset, definition)) = self
            .registry
            .find_armature(&request.definition, request.dataset.as_deref())
        else {
            log::warn!(
                "armature definition '{}' not found in {}",
                request.definition,
                request.dataset.as_deref().unwrap_or("any dataset")
            );
            return Ok(None);
        };

        let key = format!("{dataset}/{}", definition.name);
        if path.contains(&key) {
            let mut cycle = path.clone();
            cycle.push(key);
            return Err(FactoryError::CyclicDefinition { path: cycle });
        }

        let skin = request
            .skin
            .as_deref()
            .and_then(|name| {
                let found = definition.skin(name);
                if found.is_none() {
                    log::debug!("skin '{name}' not found, using default skin");
                }
                found
            })
            .or_else(|| definition.default_skin())
            .map(|s| s.name.clone())
            .unwrap_or_default();

        let (container, owns_container) = match request.container {
            Some(container) => (container, false),
            None => {
                let name = container_name.unwrap_or(&definition.name);
                (host.scene.create_container(name), true)
            }
        };

        let id = self.ids.alloc_armature();
        let mut armature = Armature::new(
            id,
            dataset,
            Rc::clone(&definition),
            skin,
            request.atlas_dataset.clone(),
            container,
            owns_container,
            request.ui_mode,
            parent,
        );

        path.push(key);
        let slots = self.build_slots(&armature, path, host);
        path.pop();
        armature.slots = slots?;

        // Children that do not follow their parent's animation start their
        // own before the evaluator first sees them.
        armature.inherit_animation = inherit_animation;
        if !inherit_animation {
            if definition.actions.is_empty() {
                armature.play(None);
            } else {
                for action in &definition.actions {
                    armature.buffer_action(action.clone());
                }
            }
        }

        host.animation.init(&armature, &definition);
        self.clock.add(id);
        log::debug!(
            "built armature '{}' from '{}' as {id:?} with {} slot(s)",
            armature.name,
            armature.dataset,
            armature.slots.len()
        );
        self.events.push(FactoryEvent::ArmatureBuilt {
            armature: id,
            name: armature.name.clone(),
            parent,
        });
        self.armatures.insert(armature);
        Ok(Some(id))
    }

    /// Dispose an armature and every nested armature its slots hold. Returns
    /// the container so the caller can destroy it (when the armature owned
    /// it) or keep it. `None` when the id is unknown.
    pub fn dispose(&mut self, id: ArmatureId) -> Option<ContainerId> {
        let armature = self.armatures.remove(id)?;
        for child in armature.child_armatures() {
            self.dispose(child);
        }
        for atlas in armature.referenced_atlases() {
            self.atlases.remove_synthetic(atlas);
        }
        self.clock.remove(id);

        if let Some(parent) = armature.parent.and_then(|p| self.armatures.get_mut(p)) {
            for slot in &mut parent.slots {
                slot.forget_child(id);
            }
        }

        log::debug!("disposed armature '{}' ({id:?})", armature.name);
        self.events
            .push(FactoryEvent::ArmatureDisposed { armature: id });
        Some(armature.container)
    }
}

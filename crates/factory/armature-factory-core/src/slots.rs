//! Per-slot display resolution.

use std::rc::Rc;

use crate::armature::{Armature, DisplayCandidate, Slot, TextureRef};
use crate::assembler::BuildRequest;
use crate::context::FactoryContext;
use crate::data::{DisplayDefinition, DisplayKind, NestedArmatureDisplay, SlotDefinition};
use crate::error::Result;
use crate::host::{Host, HostScene};
use crate::ids::{ArmatureId, ContainerId};

impl FactoryContext {
    /// Build every slot of `armature` in definition order. On error, nested
    /// children built so far are disposed before the error is returned.
    pub(crate) fn build_slots(
        &mut self,
        armature: &Armature,
        path: &mut Vec<String>,
        host: &mut Host<'_>,
    ) -> Result<Vec<Slot>> {
        let definition = Rc::clone(&armature.definition);
        let skin = definition.skin(&armature.skin);
        let mut slots = Vec::with_capacity(definition.slots.len());
        let mut children: Vec<ArmatureId> = Vec::new();

        for slot_def in &definition.slots {
            let container = slot_container(&mut *host.scene, armature.container, &slot_def.name);
            let mut slot = Slot::new(slot_def, container);
            let displays = skin.map(|s| s.displays(&slot_def.name)).unwrap_or(&[]);

            let mut candidates = Vec::with_capacity(displays.len());
            for display in displays {
                match self.resolve_candidate(armature, slot_def, display, path, host) {
                    Ok(candidate) => {
                        children.extend(candidate.child());
                        candidates.push(candidate);
                    }
                    Err(err) => {
                        for child in children {
                            self.dispose(child);
                        }
                        return Err(err);
                    }
                }
            }

            slot.install(candidates);
            // Children are built hidden; only the active one becomes visible.
            if let Some(active) = slot
                .active_display()
                .and_then(DisplayCandidate::child)
                .and_then(|id| self.armatures.get(id))
            {
                host.scene.show(active.container);
            }
            slots.push(slot);
        }
        Ok(slots)
    }

    fn resolve_candidate(
        &mut self,
        armature: &Armature,
        slot: &SlotDefinition,
        display: &Rc<DisplayDefinition>,
        path: &mut Vec<String>,
        host: &mut Host<'_>,
    ) -> Result<DisplayCandidate> {
        let candidate = match &display.kind {
            DisplayKind::Image => DisplayCandidate::Image {
                display: Rc::clone(display),
                texture: self.texture_for(armature, display),
            },
            DisplayKind::Mesh(_) => DisplayCandidate::Mesh {
                display: Rc::clone(display),
                texture: self.texture_for(armature, display),
            },
            DisplayKind::Armature(nested) => {
                match self.build_nested(armature, slot, display, nested, path, host)? {
                    Some(child) => DisplayCandidate::NestedArmature { child },
                    None => {
                        log::warn!(
                            "nested armature '{}' in slot '{}' could not be resolved",
                            display.path,
                            slot.name
                        );
                        DisplayCandidate::Absent
                    }
                }
            }
            DisplayKind::Unknown(tag) => {
                log::warn!(
                    "display '{}' in slot '{}' has unsupported type '{tag}'",
                    display.name,
                    slot.name
                );
                DisplayCandidate::Absent
            }
        };
        Ok(candidate)
    }

    fn texture_for(&self, armature: &Armature, display: &DisplayDefinition) -> Option<TextureRef> {
        let dataset = armature
            .atlas_dataset
            .as_deref()
            .unwrap_or(&armature.dataset);
        let texture = self.atlases.find_texture(dataset, &display.path);
        if texture.is_none() {
            log::warn!(
                "region '{}' not found in atlases of '{dataset}'",
                display.path
            );
        }
        texture
    }

    fn build_nested(
        &mut self,
        armature: &Armature,
        slot: &SlotDefinition,
        display: &DisplayDefinition,
        nested: &NestedArmatureDisplay,
        path: &mut Vec<String>,
        host: &mut Host<'_>,
    ) -> Result<Option<ArmatureId>> {
        let name = format!("{} ({})", slot.name, display.path);
        let prewired = host.scene.find_container(armature.container, &name);
        let request = BuildRequest {
            definition: display.path.clone(),
            dataset: Some(armature.dataset.clone()),
            skin: None,
            atlas_dataset: armature.atlas_dataset.clone(),
            container: prewired,
            ui_mode: armature.ui_mode,
        };

        let Some(id) = self.build_armature(
            &request,
            Some(&name),
            Some(armature.id),
            nested.inherit_animation,
            path,
            host,
        )?
        else {
            return Ok(None);
        };
        let Some(child) = self.armatures.get(id) else {
            return Ok(None);
        };

        // First build wins; later builds resolve to the same definition.
        let _ = nested.resolved.set(Rc::clone(&child.definition));

        if prewired.is_none() {
            host.scene.attach(child.container, armature.container);
        }
        host.scene.hide(child.container);
        Ok(Some(id))
    }

    /// Activate candidate `index` of a slot, or deactivate the slot with
    /// `None`. Nested armature containers follow the active index: the active
    /// one is shown (again, when re-selected) and a previously active one
    /// hidden.
    pub fn set_slot_display_index(
        &mut self,
        armature: ArmatureId,
        slot_name: &str,
        index: Option<usize>,
        scene: &mut dyn HostScene,
    ) -> bool {
        let Some(slot) = self
            .armatures
            .get_mut(armature)
            .and_then(|a| a.slot_mut(slot_name))
        else {
            return false;
        };

        let previous = slot.active_display().and_then(DisplayCandidate::child);
        if !slot.set_active(index) {
            return false;
        }
        let next = slot.active_display().and_then(DisplayCandidate::child);

        if previous != next {
            if let Some(prev) = previous.and_then(|id| self.armatures.get(id)) {
                scene.hide(prev.container);
            }
        }
        if let Some(next) = next.and_then(|id| self.armatures.get(id)) {
            scene.show(next.container);
        }
        true
    }
}

/// Slot container under the armature container: a pre-wired child with the
/// slot's name, else a fresh one.
fn slot_container(scene: &mut dyn HostScene, parent: ContainerId, name: &str) -> ContainerId {
    if let Some(existing) = scene.find_container(parent, name) {
        return existing;
    }
    let container = scene.create_container(name);
    scene.attach(container, parent);
    container
}

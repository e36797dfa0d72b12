//! Runtime display replacement.
//!
//! Swaps the texture behind one display candidate of a live slot for a
//! caller-supplied image and material. The replacement keeps the source
//! display's transform, pivot and mesh skinning so the swapped visual lines up
//! with the original one.

use std::rc::Rc;

use crate::armature::{DisplayCandidate, TextureRef};
use crate::atlas::MaterializedAtlas;
use crate::context::FactoryContext;
use crate::data::{AtlasDefinition, AtlasRegion, DisplayDefinition, DisplayKind};
use crate::host::{ImageInfo, MaterialFactory};
use crate::ids::{ArmatureId, MaterialHandle};

/// Parameters of one display replacement.
#[derive(Clone, Debug)]
pub struct DisplayReplacement {
    /// Dataset and definition holding the source display.
    pub dataset: String,
    pub definition: String,
    /// Slot of the definition's default skin holding the source display.
    pub slot: String,
    pub display: String,
    /// Live armature and slot receiving the replacement.
    pub target: ArmatureId,
    pub target_slot: String,
    pub image: ImageInfo,
    pub material: MaterialHandle,
    pub ui_mode: bool,
    /// Candidate index to overwrite; the slot's active index when `None`.
    pub display_index: Option<usize>,
}

impl FactoryContext {
    /// Replace one display of a live slot. Returns `false`, changing nothing,
    /// when the source display cannot be found or is not an image or mesh, the
    /// target slot does not exist, or no index was given and the target slot
    /// has no active display.
    pub fn replace_slot_display(
        &mut self,
        replacement: &DisplayReplacement,
        materials: &mut dyn MaterialFactory,
    ) -> bool {
        let Some(source) = self.source_display(replacement) else {
            return false;
        };
        if !source.kind.is_textured() {
            log::debug!(
                "display '{}' is a {} display and cannot be replaced",
                source.name,
                source.kind.tag()
            );
            return false;
        }

        let Some(index) = self
            .armatures
            .get(replacement.target)
            .and_then(|a| a.slot(&replacement.target_slot))
            .and_then(|s| replacement.display_index.or(s.active_index()))
        else {
            return false;
        };

        let image = &replacement.image;
        let region = AtlasRegion {
            name: source.path.clone(),
            x: 0.0,
            y: 0.0,
            width: image.width as f32,
            height: image.height as f32,
            rotated: false,
            frame: None,
        };
        let mut atlas = MaterializedAtlas {
            id: self.ids.alloc_atlas(),
            dataset: replacement.dataset.clone(),
            image: image.identity.clone(),
            image_path: Some(image.asset_path.clone()),
            definition: AtlasDefinition {
                name: image.identity.clone(),
                image_path: image.asset_path.clone(),
                width: image.width,
                height: image.height,
                scale: 1.0,
                regions: vec![region.clone()],
            },
            width: image.width,
            height: image.height,
            material: None,
            ui_material: None,
            owns_resource: false,
            synthetic: true,
        };
        if replacement.ui_mode {
            atlas.ui_material = Some(replacement.material);
        } else {
            atlas.material = Some(replacement.material);
        }
        materials.set_main_texture(replacement.material, image);
        let atlas_id = self.atlases.insert_synthetic(atlas);

        let texture = Some(TextureRef {
            atlas: atlas_id,
            region,
        });
        let display = Rc::new(DisplayDefinition::clone(&source));
        let candidate = if matches!(display.kind, DisplayKind::Mesh(_)) {
            DisplayCandidate::Mesh { display, texture }
        } else {
            DisplayCandidate::Image { display, texture }
        };

        let previous = match self
            .armatures
            .get_mut(replacement.target)
            .and_then(|a| a.slot_mut(&replacement.target_slot))
        {
            Some(slot) => slot.place_at(index, candidate),
            None => {
                self.atlases.remove_synthetic(atlas_id);
                return false;
            }
        };
        if let Some(child) = previous.child() {
            self.dispose(child);
        }
        // An earlier replacement's atlas is referenced by nothing else.
        if let Some(texture) = previous.texture() {
            self.atlases.remove_synthetic(texture.atlas);
        }

        log::debug!(
            "replaced display {index} of slot '{}' on {:?} with image '{}'",
            replacement.target_slot,
            replacement.target,
            image.identity
        );
        true
    }

    fn source_display(&self, replacement: &DisplayReplacement) -> Option<Rc<DisplayDefinition>> {
        let (_, definition) = self
            .registry
            .find_armature(&replacement.definition, Some(replacement.dataset.as_str()))?;
        let skin = definition.default_skin()?;
        skin.displays(&replacement.slot)
            .iter()
            .find(|d| d.name == replacement.display)
            .cloned()
    }
}

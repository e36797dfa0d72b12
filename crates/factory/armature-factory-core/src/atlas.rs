//! Texture atlas materialization and cache.
//!
//! Atlases are cached per (dataset, image identity). Material slots are filled
//! lazily per mode and never regenerated once bound.

use std::rc::Rc;

use hashbrown::HashMap;
use serde_json::Value as JsonValue;

use crate::armature::TextureRef;
use crate::config::FactoryConfig;
use crate::context::FactoryContext;
use crate::data::{strip_extension, AtlasDefinition, SkeletonDefinition};
use crate::document::parse_atlas_document;
use crate::error::{FactoryError, Result};
use crate::events::FactoryEvent;
use crate::host::Host;
use crate::ids::{AtlasId, MaterialHandle};

/// An atlas document plus the caller-side bindings that came with it.
#[derive(Clone, Debug)]
pub struct AtlasSource {
    pub document: JsonValue,
    /// Image identity; falls back to the document's `imagePath` without extension.
    pub image: Option<String>,
    /// Pre-bound standard-mode material.
    pub material: Option<MaterialHandle>,
    /// Pre-bound UI-mode material.
    pub ui_material: Option<MaterialHandle>,
}

impl AtlasSource {
    pub fn new(document: JsonValue) -> Self {
        Self {
            document,
            image: None,
            material: None,
            ui_material: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_material(mut self, material: MaterialHandle, ui_mode: bool) -> Self {
        if ui_mode {
            self.ui_material = Some(material);
        } else {
            self.material = Some(material);
        }
        self
    }

    fn image_identity(&self) -> Option<String> {
        self.image.clone().or_else(|| {
            self.document
                .get("imagePath")
                .and_then(JsonValue::as_str)
                .filter(|p| !p.is_empty())
                .map(|p| strip_extension(p).to_string())
        })
    }

    fn material_for(&self, ui_mode: bool) -> Option<MaterialHandle> {
        if ui_mode {
            self.ui_material
        } else {
            self.material
        }
    }
}

/// A skeleton document loaded together with its atlases.
#[derive(Clone, Debug)]
pub struct DataBundle {
    /// Dataset name override.
    pub name: Option<String>,
    pub skeleton: JsonValue,
    pub atlases: Vec<AtlasSource>,
}

/// Atlas definition plus generated material bindings.
#[derive(Clone, Debug)]
pub struct MaterializedAtlas {
    pub id: AtlasId,
    pub dataset: String,
    pub image: String,
    /// Host asset path of the source image, refreshed in authoring contexts.
    pub image_path: Option<String>,
    pub definition: AtlasDefinition,
    /// Resolved dimensions; inferred from the image when declared < 2.
    pub width: u32,
    pub height: u32,
    pub material: Option<MaterialHandle>,
    pub ui_material: Option<MaterialHandle>,
    /// The factory generated a material and owns its release.
    pub owns_resource: bool,
    /// Built for a runtime display replacement; not cached or searched.
    pub synthetic: bool,
}

impl MaterializedAtlas {
    pub fn material_for(&self, ui_mode: bool) -> Option<MaterialHandle> {
        if ui_mode {
            self.ui_material
        } else {
            self.material
        }
    }

    fn slot_mut(&mut self, ui_mode: bool) -> &mut Option<MaterialHandle> {
        if ui_mode {
            &mut self.ui_material
        } else {
            &mut self.material
        }
    }
}

/// Storage for every atlas known to a context.
#[derive(Debug, Default)]
pub struct AtlasLibrary {
    items: Vec<MaterializedAtlas>,
    /// (dataset, image identity) -> atlas.
    keys: HashMap<(String, String), AtlasId>,
}

impl AtlasLibrary {
    pub fn get(&self, id: AtlasId) -> Option<&MaterializedAtlas> {
        self.items.iter().find(|a| a.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: AtlasId) -> Option<&mut MaterializedAtlas> {
        self.items.iter_mut().find(|a| a.id == id)
    }

    pub fn lookup(&self, dataset: &str, image: &str) -> Option<AtlasId> {
        self.keys
            .get(&(dataset.to_string(), image.to_string()))
            .copied()
    }

    pub(crate) fn insert_keyed(&mut self, atlas: MaterializedAtlas) -> AtlasId {
        let id = atlas.id;
        self.keys
            .insert((atlas.dataset.clone(), atlas.image.clone()), id);
        self.items.push(atlas);
        id
    }

    pub(crate) fn insert_synthetic(&mut self, atlas: MaterializedAtlas) -> AtlasId {
        let id = atlas.id;
        self.items.push(atlas);
        id
    }

    /// Atlases of a dataset in resolution order.
    pub fn dataset_atlases<'a>(
        &'a self,
        dataset: &'a str,
    ) -> impl Iterator<Item = &'a MaterializedAtlas> + 'a {
        self.items
            .iter()
            .filter(move |a| !a.synthetic && a.dataset == dataset)
    }

    /// First region named `region` across the dataset's atlases.
    pub fn find_texture(&self, dataset: &str, region: &str) -> Option<TextureRef> {
        self.dataset_atlases(dataset).find_map(|a| {
            a.definition.region(region).map(|r| TextureRef {
                atlas: a.id,
                region: r.clone(),
            })
        })
    }

    /// Drop a replacement atlas. Keyed atlases are left alone.
    pub(crate) fn remove_synthetic(&mut self, id: AtlasId) -> bool {
        match self.items.iter().position(|a| a.id == id && a.synthetic) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every atlas of a dataset, synthetic ones included.
    pub fn remove_dataset(&mut self, dataset: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|a| a.dataset != dataset);
        self.keys.retain(|(d, _), _| d != dataset);
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Bind the mode's material if its slot is empty: reuse a material with the
/// deterministic name, else generate one from the source image.
fn fill_material(
    atlas: &mut MaterializedAtlas,
    ui_mode: bool,
    cfg: &FactoryConfig,
    host: &mut Host<'_>,
    events: &mut Vec<FactoryEvent>,
) -> Result<()> {
    if atlas.material_for(ui_mode).is_some() {
        return Ok(());
    }

    let name = cfg.material_name(&atlas.image, ui_mode);
    if let Some(existing) = host.materials.find_material(&name) {
        log::debug!("reusing material '{name}' for atlas {:?}", atlas.id);
        *atlas.slot_mut(ui_mode) = Some(existing);
        return Ok(());
    }

    let image = host
        .resources
        .locate_image(&atlas.image)
        .ok_or_else(|| FactoryError::MissingImage {
            dataset: atlas.dataset.clone(),
            image: atlas.image.clone(),
        })?;

    let material = host
        .materials
        .create_material(cfg.shader_for(ui_mode), &image, &name);
    if atlas.width < cfg.min_atlas_dimension {
        atlas.width = image.width;
    }
    if atlas.height < cfg.min_atlas_dimension {
        atlas.height = image.height;
    }
    atlas.owns_resource = true;
    *atlas.slot_mut(ui_mode) = Some(material);
    log::debug!(
        "generated material '{name}' ({}x{}) for dataset '{}'",
        atlas.width,
        atlas.height,
        atlas.dataset
    );
    events.push(FactoryEvent::MaterialGenerated {
        atlas: atlas.id,
        material,
        ui_mode,
    });

    if let Some(persistence) = host.persistence.as_deref_mut() {
        let suffix = if ui_mode {
            &cfg.ui_material_suffix
        } else {
            &cfg.material_suffix
        };
        let path = format!(
            "{}{suffix}.{}",
            strip_extension(&image.asset_path),
            cfg.material_extension
        );
        persistence.save_material(material, &path);
        persistence.mark_modified(&atlas.dataset);
        events.push(FactoryEvent::DatasetModified {
            dataset: atlas.dataset.clone(),
        });
    }
    Ok(())
}

impl FactoryContext {
    /// Materialize an atlas for `dataset`, or refresh the cached one with the
    /// same image identity. A missing source image fails the call and caches
    /// nothing.
    pub fn resolve_atlas(
        &mut self,
        source: &AtlasSource,
        dataset: &str,
        scale: f32,
        ui_mode: bool,
        host: &mut Host<'_>,
    ) -> Result<AtlasId> {
        let image = source
            .image_identity()
            .ok_or_else(|| FactoryError::malformed("atlas", "missing imagePath"))?;

        if let Some(id) = self.atlases.lookup(dataset, &image) {
            let cfg = &self.config;
            let events = &mut self.events;
            if let Some(atlas) = self.atlases.get_mut(id) {
                log::debug!("atlas cache hit for ('{dataset}', '{image}')");
                if host.is_authoring() {
                    if let Some(info) = host.resources.locate_image(&image) {
                        atlas.image_path = Some(info.asset_path);
                    }
                }
                fill_material(atlas, ui_mode, cfg, host, events)?;
            }
            return Ok(id);
        }

        let definition = parse_atlas_document(&source.document, scale)?;
        let mut atlas = MaterializedAtlas {
            id: self.ids.alloc_atlas(),
            dataset: dataset.to_string(),
            image_path: None,
            width: definition.width,
            height: definition.height,
            definition,
            image,
            material: source.material,
            ui_material: source.ui_material,
            owns_resource: false,
            synthetic: false,
        };
        if host.is_authoring() {
            atlas.image_path = host
                .resources
                .locate_image(&atlas.image)
                .map(|info| info.asset_path);
        }
        fill_material(&mut atlas, ui_mode, &self.config, host, &mut self.events)?;

        log::debug!(
            "cached atlas ('{dataset}', '{}') with {} region(s)",
            atlas.image,
            atlas.definition.regions.len()
        );
        Ok(self.atlases.insert_keyed(atlas))
    }

    /// Re-run material generation for every cached atlas, e.g. after a global
    /// switch between UI and standard rendering.
    pub fn refresh_all_atlases(&mut self, ui_mode: bool, host: &mut Host<'_>) -> Result<()> {
        let cfg = &self.config;
        let events = &mut self.events;
        for atlas in self.atlases.items.iter_mut().filter(|a| !a.synthetic) {
            fill_material(atlas, ui_mode, cfg, host, events)?;
        }
        Ok(())
    }

    /// Load a skeleton and its atlases in one step. In an authoring context a
    /// dataset whose atlases arrived without a material for `ui_mode` is
    /// marked modified once all atlases resolved.
    pub fn load_data(
        &mut self,
        bundle: &DataBundle,
        ui_mode: bool,
        scale: f32,
        host: &mut Host<'_>,
    ) -> Result<Rc<SkeletonDefinition>> {
        let skeleton =
            self.registry
                .load_skeleton(&bundle.skeleton, bundle.name.as_deref(), &self.config)?;
        let dataset = skeleton.name.clone();

        let dirty = host.is_authoring()
            && bundle
                .atlases
                .iter()
                .any(|a| a.material_for(ui_mode).is_none());

        for source in &bundle.atlases {
            self.resolve_atlas(source, &dataset, scale, ui_mode, host)?;
        }

        if dirty {
            if let Some(persistence) = host.persistence.as_deref_mut() {
                persistence.mark_modified(&dataset);
            }
            self.events.push(FactoryEvent::DatasetModified { dataset });
        }
        Ok(skeleton)
    }

    /// Drop every atlas resolved for `dataset`.
    pub fn remove_atlases(&mut self, dataset: &str) -> usize {
        self.atlases.remove_dataset(dataset)
    }
}

//! Skeleton definition cache.
//!
//! Datasets are indexed by logical name and, for path-based loads, by
//! normalized load path. Both indices always point at the same `Rc`.

use std::rc::Rc;

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::config::FactoryConfig;
use crate::data::{strip_extension, ArmatureDefinition, SkeletonDefinition};
use crate::document::{embedded_skeleton_name, parse_skeleton_document};
use crate::error::{FactoryError, Result};

#[derive(Debug, Default)]
pub struct DataRegistry {
    /// Load order is kept so unscoped lookups are deterministic.
    skeletons: IndexMap<String, Rc<SkeletonDefinition>>,
    /// Normalized load path -> dataset name.
    paths: HashMap<String, String>,
}

impl DataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a skeleton document, or return the cached dataset with the same
    /// effective name (override, else the document's embedded name).
    pub fn load_skeleton(
        &mut self,
        doc: &JsonValue,
        name_override: Option<&str>,
        cfg: &FactoryConfig,
    ) -> Result<Rc<SkeletonDefinition>> {
        self.load(doc, name_override, None, cfg)
    }

    /// Load a skeleton document that came from `path`. The normalized path is
    /// indexed too, and a dataset name can be derived from the file stem
    /// (`Dragon/Dragon_ske.json` -> `Dragon`) when neither an override nor an
    /// embedded name exists.
    pub fn load_skeleton_from_path(
        &mut self,
        path: &str,
        doc: &JsonValue,
        name_override: Option<&str>,
        cfg: &FactoryConfig,
    ) -> Result<Rc<SkeletonDefinition>> {
        let normalized = normalize_load_path(path, &cfg.resource_root_marker);
        if let Some(existing) = self
            .paths
            .get(&normalized)
            .and_then(|name| self.skeletons.get(name))
        {
            log::debug!("skeleton path '{normalized}' already loaded");
            return Ok(Rc::clone(existing));
        }
        self.load(doc, name_override, Some(normalized), cfg)
    }

    fn load(
        &mut self,
        doc: &JsonValue,
        name_override: Option<&str>,
        path: Option<String>,
        cfg: &FactoryConfig,
    ) -> Result<Rc<SkeletonDefinition>> {
        let name = name_override
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| embedded_skeleton_name(doc).map(str::to_string))
            .or_else(|| {
                path.as_deref()
                    .map(|p| dataset_name_from_path(p, &cfg.skeleton_name_marker))
            })
            .filter(|n| !n.is_empty())
            .ok_or(FactoryError::UnnamedSkeleton)?;

        let skeleton = match self.skeletons.get(&name) {
            Some(existing) => {
                log::debug!("skeleton '{name}' already loaded");
                Rc::clone(existing)
            }
            None => {
                let parsed = Rc::new(parse_skeleton_document(doc, &name, cfg.skeleton_scale)?);
                log::debug!(
                    "loaded skeleton '{name}' with {} armature(s)",
                    parsed.armatures.len()
                );
                self.skeletons.insert(name.clone(), Rc::clone(&parsed));
                parsed
            }
        };

        if let Some(path) = path {
            self.paths.insert(path, name);
        }
        Ok(skeleton)
    }

    pub fn get_skeleton(&self, name: &str) -> Option<&Rc<SkeletonDefinition>> {
        self.skeletons.get(name)
    }

    /// Dataset indexed under a load path, normalized the same way as loads.
    pub fn skeleton_for_path(&self, path: &str, cfg: &FactoryConfig) -> Option<&Rc<SkeletonDefinition>> {
        let normalized = normalize_load_path(path, &cfg.resource_root_marker);
        self.paths
            .get(&normalized)
            .and_then(|name| self.skeletons.get(name))
    }

    /// Drop a dataset and every path pointing at it. No-op when absent.
    pub fn remove_skeleton(&mut self, name: &str) -> Option<Rc<SkeletonDefinition>> {
        let removed = self.skeletons.shift_remove(name)?;
        self.paths.retain(|_, n| n != name);
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.skeletons.clear();
        self.paths.clear();
    }

    /// Find an armature definition in `dataset`, or in every dataset in load
    /// order when unset. Returns the owning dataset name with the definition.
    pub fn find_armature(
        &self,
        definition: &str,
        dataset: Option<&str>,
    ) -> Option<(String, Rc<ArmatureDefinition>)> {
        match dataset {
            Some(name) => self
                .skeletons
                .get(name)
                .and_then(|s| s.armature(definition))
                .map(|a| (name.to_string(), Rc::clone(a))),
            None => self.skeletons.iter().find_map(|(name, s)| {
                s.armature(definition)
                    .map(|a| (name.clone(), Rc::clone(a)))
            }),
        }
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.skeletons.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.skeletons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skeletons.is_empty()
    }
}

/// Reduce a load path to its logical resource path: everything up to the
/// resource root marker is dropped, as is the file extension.
pub fn normalize_load_path(path: &str, root_marker: &str) -> String {
    let path = path.replace('\\', "/");
    let mut rel = path.as_str();
    if !root_marker.is_empty() {
        if let Some(idx) = rel.rfind(root_marker) {
            let rest = &rel[idx + root_marker.len()..];
            if let Some(stripped) = rest.strip_prefix('/') {
                rel = stripped;
            }
        }
    }
    strip_extension(rel).to_string()
}

/// File stem of a normalized path, cut at the last skeleton marker.
fn dataset_name_from_path(path: &str, marker: &str) -> String {
    let stem = path.rsplit('/').next().unwrap_or(path);
    match stem.rfind(marker) {
        Some(idx) if idx > 0 && !marker.is_empty() => stem[..idx].to_string(),
        _ => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_resource_paths() {
        assert_eq!(
            normalize_load_path("Assets/Resources/Dragon/Dragon_ske.json", "Resources"),
            "Dragon/Dragon_ske"
        );
        assert_eq!(
            normalize_load_path("Dragon\\Dragon_ske.json", "Resources"),
            "Dragon/Dragon_ske"
        );
        assert_eq!(normalize_load_path("Dragon_ske", ""), "Dragon_ske");
    }

    #[test]
    fn derives_dataset_name_from_stem() {
        assert_eq!(dataset_name_from_path("Dragon/Dragon_ske", "_ske"), "Dragon");
        assert_eq!(dataset_name_from_path("Hero", "_ske"), "Hero");
        assert_eq!(dataset_name_from_path("_ske", "_ske"), "_ske");
    }
}

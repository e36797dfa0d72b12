use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    skeletons: HashMap<String, String>,
    atlases: HashMap<String, AtlasEntry>,
}

/// An atlas document plus the pixel size of the image it points at. Images
/// are not shipped; tests hand the size to their in-memory resource provider.
#[derive(Debug, Deserialize)]
struct AtlasEntry {
    path: String,
    image: ImageEntry,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ImageEntry {
    pub identity: String,
    pub width: u32,
    pub height: u32,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod skeletons {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.skeletons.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        read_to_string(rel)
    }

    /// Skeleton document as a generic JSON tree.
    pub fn document(name: &str) -> Result<Value> {
        let rel = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        Ok(resolve_path(rel))
    }

    /// Load path relative to the fixtures root, as a host would report it.
    pub fn load_path(name: &str) -> Result<String> {
        lookup(&MANIFEST.skeletons, "skeleton", name).cloned()
    }
}

pub mod atlases {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.atlases.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.atlases, "atlas", name)?;
        read_to_string(&entry.path)
    }

    /// Atlas document as a generic JSON tree.
    pub fn document(name: &str) -> Result<Value> {
        let entry = lookup(&MANIFEST.atlases, "atlas", name)?;
        super::load_json(&entry.path)
    }

    /// Identity and pixel size of the atlas's source image.
    pub fn image(name: &str) -> Result<ImageEntry> {
        let entry = lookup(&MANIFEST.atlases, "atlas", name)?;
        Ok(entry.image.clone())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.atlases, "atlas", name)?;
        Ok(resolve_path(&entry.path))
    }
}

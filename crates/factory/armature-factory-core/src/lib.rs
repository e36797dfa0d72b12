//! Armature Factory Core (engine-agnostic)
//!
//! Turns skeleton and texture-atlas documents into live armatures bound to
//! host display containers. Parsed skeletons and materialized atlases are
//! cached per dataset, nested armatures are built recursively, and live
//! armatures are advanced by a clock. All state lives in a [`FactoryContext`];
//! host engines plug in through the traits of [`host`].

pub mod armature;
pub mod assembler;
pub mod atlas;
pub mod clock;
pub mod config;
pub mod context;
pub mod data;
pub mod document;
pub mod error;
pub mod events;
pub mod host;
pub mod ids;
pub mod registry;
pub mod replace;
mod slots;

// Re-exports for consumers (adapters)
pub use armature::{AnimationCommand, Armature, ArmatureStore, DisplayCandidate, Slot, TextureRef};
pub use assembler::BuildRequest;
pub use atlas::{AtlasLibrary, AtlasSource, DataBundle, MaterializedAtlas};
pub use clock::Clock;
pub use config::FactoryConfig;
pub use context::FactoryContext;
pub use data::{
    ActionDefinition, ArmatureDefinition, AtlasDefinition, AtlasRegion, DisplayDefinition,
    DisplayKind, MeshSkinning, SkeletonDefinition, Transform,
};
pub use document::{parse_atlas_document, parse_skeleton_document};
pub use error::{FactoryError, Result};
pub use events::FactoryEvent;
pub use host::{
    AnimationEvaluator, AssetPersistence, Host, HostScene, ImageInfo, MaterialFactory,
    NoopEvaluator, ResourceProvider,
};
pub use ids::{ArmatureId, AtlasId, ContainerId, MaterialHandle};
pub use registry::{normalize_load_path, DataRegistry};
pub use replace::DisplayReplacement;

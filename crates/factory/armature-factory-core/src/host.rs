//! Host capability traits.
//!
//! The factory never touches a concrete engine. Adapters implement these
//! narrow traits and pass them into every factory call bundled in a [`Host`].

use crate::armature::Armature;
use crate::data::ArmatureDefinition;
use crate::ids::{ContainerId, MaterialHandle};

/// Scene-graph operations on display containers.
pub trait HostScene {
    /// Create a new, unparented container.
    fn create_container(&mut self, name: &str) -> ContainerId;
    /// Direct child of `parent` named `name`, if one exists.
    fn find_container(&self, parent: ContainerId, name: &str) -> Option<ContainerId>;
    fn attach(&mut self, child: ContainerId, parent: ContainerId);
    fn hide(&mut self, container: ContainerId);
    fn show(&mut self, container: ContainerId);
}

/// A source image as known to the host resource system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    /// Logical identity (the atlas image path without extension).
    pub identity: String,
    /// Host asset path including extension; used to place persisted materials.
    pub asset_path: String,
    pub width: u32,
    pub height: u32,
}

/// Locates source images by identity.
pub trait ResourceProvider {
    fn locate_image(&mut self, identity: &str) -> Option<ImageInfo>;
}

/// Material construction. Internals (shader compilation, GPU upload) stay on
/// the host side.
pub trait MaterialFactory {
    /// Previously created or persisted material with this deterministic name.
    fn find_material(&mut self, name: &str) -> Option<MaterialHandle>;
    /// New material using `shader` with `image` bound as main texture.
    fn create_material(&mut self, shader: &str, image: &ImageInfo, name: &str) -> MaterialHandle;
    fn set_main_texture(&mut self, material: MaterialHandle, image: &ImageInfo);
}

/// Authoring-time asset persistence. Its presence in [`Host`] marks a call as
/// running in an authoring context.
pub trait AssetPersistence {
    fn save_material(&mut self, material: MaterialHandle, path: &str);
    fn mark_modified(&mut self, dataset: &str);
}

/// Hooks consumed by the external animation evaluator.
pub trait AnimationEvaluator {
    /// Called once per armature after its slots are installed. Nested
    /// children are initialized before their parent, with
    /// `inherit_animation` and any entry commands already in place.
    fn init(&mut self, armature: &Armature, definition: &ArmatureDefinition);
    /// Called by the clock once per tick for every registered armature.
    fn advance_time(&mut self, armature: &mut Armature, dt: f32);
}

/// Evaluator that does nothing; for tooling that only assembles armatures.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvaluator;

impl AnimationEvaluator for NoopEvaluator {
    fn init(&mut self, _armature: &Armature, _definition: &ArmatureDefinition) {}
    fn advance_time(&mut self, _armature: &mut Armature, _dt: f32) {}
}

/// Per-call bundle of host capabilities.
pub struct Host<'a> {
    pub scene: &'a mut dyn HostScene,
    pub resources: &'a mut dyn ResourceProvider,
    pub materials: &'a mut dyn MaterialFactory,
    pub animation: &'a mut dyn AnimationEvaluator,
    pub persistence: Option<&'a mut dyn AssetPersistence>,
}

impl<'a> Host<'a> {
    pub fn new(
        scene: &'a mut dyn HostScene,
        resources: &'a mut dyn ResourceProvider,
        materials: &'a mut dyn MaterialFactory,
        animation: &'a mut dyn AnimationEvaluator,
    ) -> Self {
        Self {
            scene,
            resources,
            materials,
            animation,
            persistence: None,
        }
    }

    /// Enable the authoring context.
    pub fn with_persistence(mut self, persistence: &'a mut dyn AssetPersistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    #[inline]
    pub fn is_authoring(&self) -> bool {
        self.persistence.is_some()
    }
}

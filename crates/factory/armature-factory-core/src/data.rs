//! Immutable definition model for skeletons and texture atlases.
//!
//! Definitions are produced by [`crate::document`] and shared behind `Rc`, so
//! a cached skeleton handed out twice is the same allocation.

use std::cell::OnceCell;
use std::rc::Rc;

/// 2D point; used for pivots and region frame offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Local 2D transform of a bone or display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub skew_x: f32,
    pub skew_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// A parsed skeleton dataset: one or more armature definitions.
#[derive(Debug)]
pub struct SkeletonDefinition {
    pub name: String,
    pub version: String,
    pub frame_rate: u32,
    pub armatures: Vec<Rc<ArmatureDefinition>>,
}

impl SkeletonDefinition {
    pub fn armature(&self, name: &str) -> Option<&Rc<ArmatureDefinition>> {
        self.armatures.iter().find(|a| a.name == name)
    }

    pub fn armature_names(&self) -> impl Iterator<Item = &str> {
        self.armatures.iter().map(|a| a.name.as_str())
    }
}

#[derive(Debug)]
pub struct ArmatureDefinition {
    pub name: String,
    pub frame_rate: u32,
    pub bones: Vec<BoneDefinition>,
    /// Slots in draw (definition) order.
    pub slots: Vec<SlotDefinition>,
    pub skins: Vec<SkinDefinition>,
    pub animations: Vec<AnimationDefinition>,
    /// Entry actions replayed when the armature plays on its own.
    pub actions: Vec<ActionDefinition>,
}

impl ArmatureDefinition {
    /// Skin named `"default"`, else the first skin.
    pub fn default_skin(&self) -> Option<&SkinDefinition> {
        self.skins
            .iter()
            .find(|s| s.name == "default")
            .or_else(|| self.skins.first())
    }

    pub fn skin(&self, name: &str) -> Option<&SkinDefinition> {
        self.skins.iter().find(|s| s.name == name)
    }

    pub fn slot(&self, name: &str) -> Option<&SlotDefinition> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn default_animation(&self) -> Option<&AnimationDefinition> {
        self.animations.first()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoneDefinition {
    pub name: String,
    pub parent: Option<String>,
    pub length: f32,
    pub transform: Transform,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlotDefinition {
    pub name: String,
    /// Owning bone.
    pub parent: String,
    /// Initially displayed candidate; negative means none requested.
    pub display_index: i32,
}

#[derive(Debug)]
pub struct SkinDefinition {
    pub name: String,
    pub slots: Vec<SkinSlot>,
}

impl SkinDefinition {
    /// Candidate displays of a slot; empty when the skin does not mention it.
    pub fn displays(&self, slot: &str) -> &[Rc<DisplayDefinition>] {
        self.slots
            .iter()
            .find(|s| s.slot == slot)
            .map(|s| s.displays.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug)]
pub struct SkinSlot {
    pub slot: String,
    pub displays: Vec<Rc<DisplayDefinition>>,
}

#[derive(Clone, Debug)]
pub struct DisplayDefinition {
    pub name: String,
    /// Region name for textured displays, child definition name for armatures.
    pub path: String,
    pub transform: Transform,
    pub pivot: Point,
    pub kind: DisplayKind,
}

/// Display type tag, dispatched on the document's `type` field.
#[derive(Clone, Debug)]
pub enum DisplayKind {
    Image,
    Mesh(MeshSkinning),
    Armature(NestedArmatureDisplay),
    /// Any tag this factory does not build; kept so skins round-trip.
    Unknown(String),
}

impl DisplayKind {
    pub fn tag(&self) -> &str {
        match self {
            DisplayKind::Image => "image",
            DisplayKind::Mesh(_) => "mesh",
            DisplayKind::Armature(_) => "armature",
            DisplayKind::Unknown(tag) => tag,
        }
    }

    pub fn is_textured(&self) -> bool {
        matches!(self, DisplayKind::Image | DisplayKind::Mesh(_))
    }
}

/// Vertex data and bone weights of a mesh display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSkinning {
    pub vertices: Vec<f32>,
    pub uvs: Vec<f32>,
    pub triangles: Vec<u32>,
    /// Flat DragonBones-style weight stream; `None` for unweighted meshes.
    pub weights: Option<Vec<f32>>,
    pub inherit_deform: bool,
}

#[derive(Clone, Debug, Default)]
pub struct NestedArmatureDisplay {
    pub inherit_animation: bool,
    /// Child definition resolved by the first build that instantiated it.
    pub resolved: OnceCell<Rc<ArmatureDefinition>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationDefinition {
    pub name: String,
    /// Duration in frames at the armature's frame rate.
    pub duration: u32,
    /// 0 loops forever.
    pub play_times: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionDefinition {
    Play { animation: String },
    Stop { animation: Option<String> },
}

/// A rectangular region inside an atlas image.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasRegion {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotated: bool,
    /// Trimmed-sprite frame offset and original size, if trimmed.
    pub frame: Option<RegionFrame>,
}

impl AtlasRegion {
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        (self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionFrame {
    pub offset: Point,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AtlasDefinition {
    pub name: String,
    /// Image path as written in the document, extension included.
    pub image_path: String,
    /// Declared dimensions; 0 when absent.
    pub width: u32,
    pub height: u32,
    pub scale: f32,
    pub regions: Vec<AtlasRegion>,
}

impl AtlasDefinition {
    pub fn region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Image identity: the image path without its extension.
    pub fn image_identity(&self) -> &str {
        strip_extension(&self.image_path)
    }
}

/// Drops a trailing `.ext`, keeping dots that belong to directories.
pub(crate) fn strip_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) if dot > 0 && !path[dot..].contains('/') => &path[..dot],
        _ => path,
    }
}

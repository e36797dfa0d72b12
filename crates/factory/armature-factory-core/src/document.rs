use std::cell::OnceCell;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::data::{
    ActionDefinition, AnimationDefinition, ArmatureDefinition, AtlasDefinition, AtlasRegion,
    BoneDefinition, DisplayDefinition, DisplayKind, MeshSkinning, NestedArmatureDisplay, Point,
    RegionFrame, SkeletonDefinition, SkinDefinition, SkinSlot, SlotDefinition, Transform,
};
use crate::error::{FactoryError, Result};

/// Public API: interpret a generic skeleton document (DragonBones-style JSON
/// tree) as a [`SkeletonDefinition`] named `name`.
///
/// Notes:
/// - Translations of bones, displays and mesh vertices are multiplied by `scale`.
/// - Display `type` defaults to `"image"`; an unknown tag is preserved as
///   [`DisplayKind::Unknown`] rather than rejected.
/// - A display without `path` uses its `name` as path.
pub fn parse_skeleton_document(
    doc: &JsonValue,
    name: &str,
    scale: f32,
) -> Result<SkeletonDefinition> {
    let raw = RawSkeleton::deserialize(doc)
        .map_err(|e| FactoryError::malformed("skeleton", e.to_string()))?;

    let mut armatures = Vec::with_capacity(raw.armature.len());
    for ra in raw.armature {
        if ra.name.is_empty() {
            return Err(FactoryError::malformed("skeleton", "armature without a name"));
        }
        armatures.push(Rc::new(to_armature(ra, raw.frame_rate, scale)));
    }

    Ok(SkeletonDefinition {
        name: name.to_string(),
        version: raw.version,
        frame_rate: raw.frame_rate,
        armatures,
    })
}

/// Name embedded in a skeleton document, if any.
pub fn embedded_skeleton_name(doc: &JsonValue) -> Option<&str> {
    doc.get("name")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
}

/// Public API: interpret a generic atlas document as an [`AtlasDefinition`].
///
/// `scale` overrides the document's own scale when positive. Declared
/// `width`/`height` that are absent, negative or non-numeric become 0.
pub fn parse_atlas_document(doc: &JsonValue, scale: f32) -> Result<AtlasDefinition> {
    let raw = RawAtlas::deserialize(doc)
        .map_err(|e| FactoryError::malformed("atlas", e.to_string()))?;
    if raw.image_path.is_empty() {
        return Err(FactoryError::malformed("atlas", "missing imagePath"));
    }

    let regions = raw
        .sub_texture
        .into_iter()
        .map(|st| {
            let frame = match (st.frame_width, st.frame_height) {
                (Some(w), Some(h)) => Some(RegionFrame {
                    offset: Point {
                        x: st.frame_x.unwrap_or(0.0),
                        y: st.frame_y.unwrap_or(0.0),
                    },
                    width: w,
                    height: h,
                }),
                _ => None,
            };
            AtlasRegion {
                name: st.name,
                x: st.x,
                y: st.y,
                width: st.width,
                height: st.height,
                rotated: st.rotated,
                frame,
            }
        })
        .collect();

    Ok(AtlasDefinition {
        name: raw.name,
        image_path: raw.image_path,
        width: dimension(raw.width.as_ref()),
        height: dimension(raw.height.as_ref()),
        scale: if scale > 0.0 {
            scale
        } else {
            raw.scale.filter(|s| *s > 0.0).unwrap_or(1.0)
        },
        regions,
    })
}

fn dimension(v: Option<&JsonValue>) -> u32 {
    match v {
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u32)
            .unwrap_or(0),
        Some(JsonValue::String(s)) => s.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    }
}

fn to_armature(ra: RawArmature, parent_rate: u32, scale: f32) -> ArmatureDefinition {
    let bones = ra
        .bone
        .into_iter()
        .map(|b| BoneDefinition {
            name: b.name,
            parent: b.parent,
            length: b.length * scale,
            transform: b.transform.to_core(scale),
        })
        .collect();

    let slots = ra
        .slot
        .into_iter()
        .map(|s| SlotDefinition {
            name: s.name,
            parent: s.parent,
            display_index: s.display_index,
        })
        .collect();

    let skins = ra
        .skin
        .into_iter()
        .map(|sk| SkinDefinition {
            name: if sk.name.is_empty() {
                "default".to_string()
            } else {
                sk.name
            },
            slots: sk
                .slot
                .into_iter()
                .map(|ss| SkinSlot {
                    slot: ss.name,
                    displays: ss
                        .display
                        .into_iter()
                        .map(|d| Rc::new(to_display(d, scale)))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let animations = ra
        .animation
        .into_iter()
        .map(|a| AnimationDefinition {
            name: a.name,
            duration: a.duration,
            play_times: a.play_times,
        })
        .collect();

    let actions = ra
        .default_actions
        .into_iter()
        .filter_map(RawAction::into_core)
        .collect();

    ArmatureDefinition {
        name: ra.name,
        frame_rate: ra.frame_rate.unwrap_or(parent_rate),
        bones,
        slots,
        skins,
        animations,
        actions,
    }
}

fn to_display(d: RawDisplay, scale: f32) -> DisplayDefinition {
    let kind = match d.kind.as_str() {
        "image" => DisplayKind::Image,
        "mesh" => DisplayKind::Mesh(MeshSkinning {
            vertices: d.vertices.iter().map(|v| v * scale).collect(),
            uvs: d.uvs,
            triangles: d.triangles,
            weights: if d.weights.is_empty() {
                None
            } else {
                Some(d.weights)
            },
            inherit_deform: d.inherit_deform,
        }),
        "armature" => DisplayKind::Armature(NestedArmatureDisplay {
            inherit_animation: d.inherit_animation,
            resolved: OnceCell::new(),
        }),
        other => DisplayKind::Unknown(other.to_string()),
    };
    let path = d.path.unwrap_or_else(|| d.name.clone());
    DisplayDefinition {
        name: d.name,
        path,
        transform: d.transform.to_core(scale),
        pivot: Point {
            x: d.pivot.x,
            y: d.pivot.y,
        },
        kind,
    }
}

// ----- document schema (serde) -----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSkeleton {
    #[serde(default)]
    version: String,
    #[serde(default = "default_frame_rate")]
    frame_rate: u32,
    #[serde(default)]
    armature: Vec<RawArmature>,
}

fn default_frame_rate() -> u32 {
    24
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

fn default_half() -> f32 {
    0.5
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArmature {
    name: String,
    #[serde(default)]
    frame_rate: Option<u32>,
    #[serde(default)]
    bone: Vec<RawBone>,
    #[serde(default)]
    slot: Vec<RawSlot>,
    #[serde(default)]
    skin: Vec<RawSkin>,
    #[serde(default)]
    animation: Vec<RawAnimation>,
    #[serde(default)]
    default_actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
struct RawBone {
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    length: f32,
    #[serde(default)]
    transform: RawTransform,
}

#[derive(Debug, Deserialize)]
struct RawTransform {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default, rename = "skX")]
    skew_x: f32,
    #[serde(default, rename = "skY")]
    skew_y: f32,
    #[serde(default = "default_one", rename = "scX")]
    scale_x: f32,
    #[serde(default = "default_one", rename = "scY")]
    scale_y: f32,
}

impl Default for RawTransform {
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

impl RawTransform {
    fn to_core(&self, scale: f32) -> Transform {
        Transform {
            x: self.x * scale,
            y: self.y * scale,
            skew_x: self.skew_x,
            skew_y: self.skew_y,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlot {
    name: String,
    #[serde(default)]
    parent: String,
    #[serde(default)]
    display_index: i32,
}

#[derive(Debug, Deserialize)]
struct RawSkin {
    #[serde(default)]
    name: String,
    #[serde(default)]
    slot: Vec<RawSkinSlot>,
}

#[derive(Debug, Deserialize)]
struct RawSkinSlot {
    name: String,
    #[serde(default)]
    display: Vec<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawPivot {
    #[serde(default = "default_half")]
    x: f32,
    #[serde(default = "default_half")]
    y: f32,
}

impl Default for RawPivot {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDisplay {
    #[serde(default = "default_display_type", rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    transform: RawTransform,
    #[serde(default)]
    pivot: RawPivot,
    #[serde(default = "default_true")]
    inherit_animation: bool,
    #[serde(default = "default_true", alias = "inheritFFD")]
    inherit_deform: bool,
    #[serde(default)]
    vertices: Vec<f32>,
    #[serde(default)]
    uvs: Vec<f32>,
    #[serde(default)]
    triangles: Vec<u32>,
    #[serde(default)]
    weights: Vec<f32>,
}

fn default_display_type() -> String {
    "image".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnimation {
    name: String,
    #[serde(default)]
    duration: u32,
    #[serde(default = "default_play_times")]
    play_times: u32,
}

fn default_play_times() -> u32 {
    1
}

/// Accepts both the legacy `{ "gotoAndPlay": "walk" }` shape and the
/// `{ "type": "play", "name": "walk" }` shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAction {
    #[serde(default)]
    goto_and_play: Option<String>,
    #[serde(default)]
    goto_and_stop: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl RawAction {
    fn into_core(self) -> Option<ActionDefinition> {
        if let Some(animation) = self.goto_and_play {
            return Some(ActionDefinition::Play { animation });
        }
        if let Some(animation) = self.goto_and_stop {
            return Some(ActionDefinition::Stop {
                animation: Some(animation),
            });
        }
        match self.kind.as_deref() {
            Some("play") => self.name.map(|animation| ActionDefinition::Play { animation }),
            Some("stop") => Some(ActionDefinition::Stop {
                animation: self.name,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAtlas {
    #[serde(default)]
    name: String,
    #[serde(default)]
    image_path: String,
    #[serde(default)]
    width: Option<JsonValue>,
    #[serde(default)]
    height: Option<JsonValue>,
    #[serde(default)]
    scale: Option<f32>,
    #[serde(default, rename = "SubTexture")]
    sub_texture: Vec<RawSubTexture>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubTexture {
    name: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    rotated: bool,
    #[serde(default)]
    frame_x: Option<f32>,
    #[serde(default)]
    frame_y: Option<f32>,
    #[serde(default)]
    frame_width: Option<f32>,
    #[serde(default)]
    frame_height: Option<f32>,
}

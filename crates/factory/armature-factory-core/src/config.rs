//! Factory configuration.

use serde::{Deserialize, Serialize};

/// Naming conventions and defaults used while loading data and generating
/// materials. Every field has a default, so partial JSON configs are accepted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FactoryConfig {
    /// Shader used for generated standard-mode materials.
    pub default_shader: String,
    /// Shader used for generated UI-mode materials.
    pub default_ui_shader: String,
    /// Appended to the image identity to name a standard-mode material.
    pub material_suffix: String,
    /// Appended to the image identity to name a UI-mode material.
    pub ui_material_suffix: String,
    /// File extension of persisted materials (without the dot).
    pub material_extension: String,
    /// Marker stripped from skeleton file stems when deriving a dataset name.
    pub skeleton_name_marker: String,
    /// Path segment after which load paths become logical resource paths.
    pub resource_root_marker: String,
    /// Scale applied to bone and display translations while parsing skeletons.
    pub skeleton_scale: f32,
    /// Declared atlas dimensions below this are treated as missing.
    pub min_atlas_dimension: u32,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            default_shader: "Sprites/Default".to_string(),
            default_ui_shader: "UI/Default".to_string(),
            material_suffix: "_Mat".to_string(),
            ui_material_suffix: "_UI_Mat".to_string(),
            material_extension: "mat".to_string(),
            skeleton_name_marker: "_ske".to_string(),
            resource_root_marker: "Resources".to_string(),
            skeleton_scale: 0.01,
            min_atlas_dimension: 2,
        }
    }
}

impl FactoryConfig {
    /// Shader name for the given mode.
    pub fn shader_for(&self, ui_mode: bool) -> &str {
        if ui_mode {
            &self.default_ui_shader
        } else {
            &self.default_shader
        }
    }

    /// Deterministic material name for an image identity and mode.
    pub fn material_name(&self, image: &str, ui_mode: bool) -> String {
        let suffix = if ui_mode {
            &self.ui_material_suffix
        } else {
            &self.material_suffix
        };
        format!("{image}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FactoryConfig =
            serde_json::from_str(r#"{ "default_shader": "Custom/Sprite" }"#).unwrap();
        assert_eq!(cfg.default_shader, "Custom/Sprite");
        assert_eq!(cfg.default_ui_shader, "UI/Default");
        assert_eq!(cfg.min_atlas_dimension, 2);
    }

    #[test]
    fn material_names_follow_mode_suffix() {
        let cfg = FactoryConfig::default();
        assert_eq!(cfg.material_name("Dragon_tex", false), "Dragon_tex_Mat");
        assert_eq!(cfg.material_name("Dragon_tex", true), "Dragon_tex_UI_Mat");
        assert_eq!(cfg.shader_for(true), "UI/Default");
    }
}

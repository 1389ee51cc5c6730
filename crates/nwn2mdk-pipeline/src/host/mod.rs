//! Host scene collaborator
//!
//! The host owns the native interchange importer/exporter. The pipeline only
//! hands it a path and an options record.

mod document;

pub use document::{DocumentHost, InterchangeDocument, InterchangeObject};

use nwn2mdk_core::{Axis, Error, HostError, Result};
use nwn2mdk_metadata::SceneObject;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Host side of the interchange hand-off
pub trait SceneHost {
    /// Read an interchange file, returning the objects it created
    fn import_interchange(
        &mut self,
        path: &Path,
        options: &InterchangeOptions,
    ) -> std::result::Result<Vec<SceneObject>, HostError>;

    /// Write `objects` to an interchange file
    fn export_interchange(
        &mut self,
        path: &Path,
        objects: &[SceneObject],
        options: &InterchangeOptions,
    ) -> std::result::Result<(), HostError>;
}

/// Largest baked animation simplify factor the exporter accepts
pub const MAX_SIMPLIFY_FACTOR: f32 = 100.0;

/// Interchange import/export options, passed to the host verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterchangeOptions {
    pub axis_forward: Axis,
    pub axis_up: Axis,
    /// Write tangent space data
    pub use_tangent_space: bool,
    /// Carry object annotations through the interchange file
    pub use_custom_annotations: bool,
    pub add_leaf_bones: bool,
    pub bake_animation: bool,
    /// Baked keyframe simplification (0.0 disables it)
    pub bake_simplify_factor: f32,
    /// Bake deforming bones only when false
    pub bake_use_all_bones: bool,
    pub bake_use_nla_strips: bool,
    pub bake_use_all_actions: bool,
    /// Key the first and last frame of every baked channel
    pub bake_force_startend_keying: bool,
    /// Import only: align bones with their children
    pub automatic_bone_orientation: bool,
    /// Import only: search for referenced images
    pub use_image_search: bool,
}

impl Default for InterchangeOptions {
    fn default() -> Self {
        Self {
            axis_forward: Axis::NegZ,
            axis_up: Axis::PosY,
            use_tangent_space: true,
            use_custom_annotations: true,
            add_leaf_bones: false,
            bake_animation: false,
            bake_simplify_factor: 1.0,
            bake_use_all_bones: false,
            bake_use_nla_strips: false,
            bake_use_all_actions: false,
            bake_force_startend_keying: false,
            automatic_bone_orientation: true,
            use_image_search: false,
        }
    }
}

impl InterchangeOptions {
    /// Options for reading a converter-produced interchange file
    pub fn for_import(automatic_bone_orientation: bool) -> Self {
        Self {
            automatic_bone_orientation,
            ..Default::default()
        }
    }

    /// Export without animation
    pub fn static_pose() -> Self {
        Self::default()
    }

    /// Export with baked keyframe animation
    pub fn baked_animation(simplify_factor: f32) -> Result<Self> {
        let options = Self {
            bake_animation: true,
            bake_simplify_factor: simplify_factor,
            ..Default::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_SIMPLIFY_FACTOR).contains(&self.bake_simplify_factor) {
            return Err(Error::invalid_value(
                "bake_simplify_factor",
                format!("{} is outside 0.0..={MAX_SIMPLIFY_FACTOR}", self.bake_simplify_factor),
            ));
        }
        if self.axis_forward.is_parallel_to(&self.axis_up) {
            return Err(Error::invalid_value(
                "axis_up",
                format!("{} is parallel to forward axis {}", self.axis_up, self.axis_forward),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_pose_defaults() {
        let options = InterchangeOptions::static_pose();
        assert_eq!(options.axis_forward, Axis::NegZ);
        assert_eq!(options.axis_up, Axis::PosY);
        assert!(options.use_tangent_space);
        assert!(options.use_custom_annotations);
        assert!(!options.add_leaf_bones);
        assert!(!options.bake_animation);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_baked_animation_bounds() {
        assert!(InterchangeOptions::baked_animation(0.0).unwrap().bake_animation);
        assert!(InterchangeOptions::baked_animation(100.0).is_ok());
        assert!(InterchangeOptions::baked_animation(-0.5).is_err());
        assert!(InterchangeOptions::baked_animation(f32::NAN).is_err());
    }

    #[test]
    fn test_baked_animation_passes_bake_flags_through() {
        let options = InterchangeOptions::baked_animation(0.5).unwrap();
        assert!(!options.bake_use_all_bones);
        assert!(!options.bake_use_nla_strips);
        assert!(!options.bake_use_all_actions);
        assert!(!options.bake_force_startend_keying);

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["bake_force_startend_keying"], false);
        assert_eq!(json["bake_use_nla_strips"], false);

        let older: InterchangeOptions = serde_json::from_str(r#"{ "bake_animation": true }"#).unwrap();
        assert!(!older.bake_use_all_actions);
    }

    #[test]
    fn test_parallel_axes_rejected() {
        let options = InterchangeOptions {
            axis_up: Axis::PosZ,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }
}

//! Typed NWN2 object metadata
//!
//! Each scene object carries exactly one [`MetadataSchema`]. The variant
//! decides how the exporter writes the object into an MDB/GR2 file.

use nwn2mdk_core::{Error, Result, Rgb};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest tint map name the MDB format stores
pub const TINT_MAP_MAX_LEN: usize = 32;

/// Per-object metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MetadataSchema {
    /// No NWN2 specific data; the exporter auto-detects the type
    #[default]
    Unclassified,
    /// Rigid mesh or skin
    Mesh(MeshProperties),
    /// Hair info helper
    HairInfo {
        shortening_behavior: HairShorteningBehavior,
    },
    /// Helm info helper
    HelmInfo {
        hair_hiding_behavior: HelmHairHidingBehavior,
    },
}

impl MetadataSchema {
    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            MetadataSchema::Unclassified => "Unclassified",
            MetadataSchema::Mesh(_) => "Mesh",
            MetadataSchema::HairInfo { .. } => "HairInfo",
            MetadataSchema::HelmInfo { .. } => "HelmInfo",
        }
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, MetadataSchema::Unclassified)
    }

    pub fn as_mesh(&self) -> Option<&MeshProperties> {
        match self {
            MetadataSchema::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// Material and rendering flags of an MDB mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshProperties {
    /// Tint map file name without extension
    #[serde(deserialize_with = "deserialize_tint_map")]
    tint_map: Option<String>,
    pub diffuse_color: Rgb,
    pub specular_color: Rgb,
    pub specular_level: f32,
    pub glossiness: f32,
    /// Alpha-masked transparency
    pub use_transparency_mask: bool,
    /// Head weighted to facial bones (cutscenes)
    pub is_head: bool,
    pub cast_no_shadows: bool,
    pub use_environment_map: bool,
    /// Uses a glow map
    pub glow: bool,
    /// Receives interface projected textures
    pub receive_projected_textures: bool,
}

impl Default for MeshProperties {
    fn default() -> Self {
        Self {
            tint_map: None,
            diffuse_color: Rgb::WHITE,
            specular_color: Rgb::WHITE,
            specular_level: 1.0,
            glossiness: 20.0,
            use_transparency_mask: false,
            is_head: false,
            cast_no_shadows: false,
            use_environment_map: false,
            glow: false,
            receive_projected_textures: false,
        }
    }
}

impl MeshProperties {
    pub fn tint_map(&self) -> Option<&str> {
        self.tint_map.as_deref()
    }

    /// Set the tint map. An empty name clears it; names longer than
    /// [`TINT_MAP_MAX_LEN`] characters are rejected.
    pub fn set_tint_map(&mut self, name: impl Into<String>) -> Result<()> {
        self.tint_map = checked_tint_map(name.into())?;
        Ok(())
    }

    /// Set the tint map, cutting it down to [`TINT_MAP_MAX_LEN`] characters
    pub(crate) fn set_tint_map_truncated(&mut self, name: &str) -> bool {
        let truncated = name.chars().count() > TINT_MAP_MAX_LEN;
        let name: String = name.chars().take(TINT_MAP_MAX_LEN).collect();
        self.tint_map = if name.is_empty() { None } else { Some(name) };
        truncated
    }
}

fn checked_tint_map(name: String) -> Result<Option<String>> {
    let len = name.chars().count();
    if len > TINT_MAP_MAX_LEN {
        return Err(Error::invalid_value(
            "tint_map",
            format!("{len} characters, at most {TINT_MAP_MAX_LEN} allowed"),
        ));
    }
    Ok(if name.is_empty() { None } else { Some(name) })
}

fn deserialize_tint_map<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(name) => checked_tint_map(name).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// String tag written to the `NWN2MDK_*` annotation
            pub fn as_tag(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_tag())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    _ => Err(Error::invalid_value($field, format!("unknown tag {s:?}"))),
                }
            }
        }
    };
}

tagged_enum! {
    /// How hair is shortened under a helm
    HairShorteningBehavior, "hair_shortening_behavior" {
        #[default]
        Low => "LOW",
        Short => "SHORT",
        Ponytail => "PONYTAIL",
    }
}

tagged_enum! {
    /// Which parts of the head a helm hides
    HelmHairHidingBehavior, "helm_hair_hiding_behavior" {
        /// Nothing is hidden
        #[default]
        NoneHidden => "NONE_HIDDEN",
        /// Hair is hidden, but not the beard
        HairHidden => "HAIR_HIDDEN",
        /// Hair is partially hidden
        PartialHair => "PARTIAL_HAIR",
        /// Head is hidden
        HeadHidden => "HEAD_HIDDEN",
    }
}

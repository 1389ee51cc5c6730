//! Translation between legacy annotations and [`MetadataSchema`]
//!
//! Import direction: the `nw2fbx` converter attaches bare keys (`TINT_MAP`,
//! `HSB_LOW`, ...) to every object it writes. [`from_legacy`] folds them into
//! a schema and reports the keys it consumed.
//!
//! Export direction: [`to_legacy`] produces the `NWN2MDK_*` keys `fbx2nw`
//! reads, and [`purge`] strips them again once the export is over.

use nwn2mdk_core::Rgb;
use tracing::{debug, warn};

use crate::annotations::{AnnotationMap, AnnotationValue};
use crate::schema::{HairShorteningBehavior, HelmHairHidingBehavior, MeshProperties, MetadataSchema};

/// Prefix of every key produced for export
pub const EXPORT_PREFIX: &str = "NWN2MDK_";

/// Key holding the hair shortening tag on export
pub const EXPORT_HAIR_KEY: &str = "NWN2MDK_HSB";

/// Key holding the helm hair hiding tag on export
pub const EXPORT_HELM_KEY: &str = "NWN2MDK_HHHB";

/// Every key [`to_legacy`] can produce
pub const EXPORT_KEYS: [&str; 13] = [
    "NWN2MDK_TINT_MAP",
    "NWN2MDK_DIFFUSE_COLOR",
    "NWN2MDK_SPECULAR_COLOR",
    "NWN2MDK_SPECULAR_LEVEL",
    "NWN2MDK_GLOSSINESS",
    "NWN2MDK_TRANSPARENCY_MASK",
    "NWN2MDK_HEAD",
    "NWN2MDK_DONT_CAST_SHADOWS",
    "NWN2MDK_ENVIRONMENT_MAP",
    "NWN2MDK_GLOW",
    "NWN2MDK_PROJECTED_TEXTURES",
    EXPORT_HAIR_KEY,
    EXPORT_HELM_KEY,
];

/// Whether `key` is one of the thirteen export keys
pub fn is_export_key(key: &str) -> bool {
    EXPORT_KEYS.contains(&key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeshField {
    TintMap,
    DiffuseColor,
    SpecularColor,
    SpecularLevel,
    Glossiness,
    TransparencyMask,
    Head,
    DontCastShadows,
    EnvironmentMap,
    Glow,
    ProjectedTextures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegacyKey {
    Mesh(MeshField),
    Hair(HairShorteningBehavior),
    Helm(HelmHairHidingBehavior),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Mesh,
    Hair,
    Helm,
}

const LEGACY_KEYS: [(&str, LegacyKey); 18] = [
    ("TINT_MAP", LegacyKey::Mesh(MeshField::TintMap)),
    ("DIFFUSE_COLOR", LegacyKey::Mesh(MeshField::DiffuseColor)),
    ("SPECULAR_COLOR", LegacyKey::Mesh(MeshField::SpecularColor)),
    ("SPECULAR_LEVEL", LegacyKey::Mesh(MeshField::SpecularLevel)),
    ("GLOSSINESS", LegacyKey::Mesh(MeshField::Glossiness)),
    ("TRANSPARENCY_MASK", LegacyKey::Mesh(MeshField::TransparencyMask)),
    ("HEAD", LegacyKey::Mesh(MeshField::Head)),
    ("DONT_CAST_SHADOWS", LegacyKey::Mesh(MeshField::DontCastShadows)),
    ("ENVIRONMENT_MAP", LegacyKey::Mesh(MeshField::EnvironmentMap)),
    ("GLOW", LegacyKey::Mesh(MeshField::Glow)),
    ("PROJECTED_TEXTURES", LegacyKey::Mesh(MeshField::ProjectedTextures)),
    ("HSB_LOW", LegacyKey::Hair(HairShorteningBehavior::Low)),
    ("HSB_SHORT", LegacyKey::Hair(HairShorteningBehavior::Short)),
    ("HSB_PONYTAIL", LegacyKey::Hair(HairShorteningBehavior::Ponytail)),
    ("HHHB_NONE_HIDDEN", LegacyKey::Helm(HelmHairHidingBehavior::NoneHidden)),
    ("HHHB_HAIR_HIDDEN", LegacyKey::Helm(HelmHairHidingBehavior::HairHidden)),
    ("HHHB_PARTIAL_HAIR", LegacyKey::Helm(HelmHairHidingBehavior::PartialHair)),
    ("HHHB_HEAD_HIDDEN", LegacyKey::Helm(HelmHairHidingBehavior::HeadHidden)),
];

impl LegacyKey {
    fn parse(key: &str) -> Option<Self> {
        LEGACY_KEYS.iter().find(|(name, _)| *name == key).map(|(_, k)| *k)
    }

    fn name(&self) -> &'static str {
        LEGACY_KEYS
            .iter()
            .find(|(_, k)| k == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }

    fn family(&self) -> Family {
        match self {
            LegacyKey::Mesh(_) => Family::Mesh,
            LegacyKey::Hair(_) => Family::Hair,
            LegacyKey::Helm(_) => Family::Helm,
        }
    }
}

fn hair_flag_key(behavior: HairShorteningBehavior) -> &'static str {
    LegacyKey::Hair(behavior).name()
}

fn helm_flag_key(behavior: HelmHairHidingBehavior) -> &'static str {
    LegacyKey::Helm(behavior).name()
}

/// Result of [`from_legacy`]
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyImport {
    /// Schema built from the recognized keys (`Unclassified` if there were none)
    pub schema: MetadataSchema,
    /// Input annotations minus every recognized key
    pub remaining: AnnotationMap,
    /// Recognized keys, in scan order
    pub consumed: Vec<String>,
}

impl LegacyImport {
    /// Whether any recognized legacy key was present
    pub fn is_classified(&self) -> bool {
        !self.consumed.is_empty()
    }
}

/// Build a schema from legacy annotations
///
/// Keys are scanned in map order. Values of every family are collected; the
/// variant is that of the last recognized key. Within an enum family a flag
/// set to one overwrites earlier ones, so when several are set the last one
/// scanned wins.
pub fn from_legacy(annotations: &AnnotationMap) -> LegacyImport {
    let mut mesh = MeshProperties::default();
    let mut hair = HairShorteningBehavior::default();
    let mut helm = HelmHairHidingBehavior::default();
    let mut family = None;
    let mut remaining = AnnotationMap::new();
    let mut consumed = Vec::new();

    for (key, value) in annotations.iter() {
        let Some(legacy) = LegacyKey::parse(key) else {
            remaining.insert(key, value.clone());
            continue;
        };

        family = Some(legacy.family());
        consumed.push(key.to_string());

        match legacy {
            LegacyKey::Mesh(field) => apply_mesh_field(&mut mesh, field, key, value),
            LegacyKey::Hair(behavior) => {
                if value.is_one() {
                    hair = behavior;
                }
            }
            LegacyKey::Helm(behavior) => {
                if value.is_one() {
                    helm = behavior;
                }
            }
        }
    }

    let schema = match family {
        None => MetadataSchema::Unclassified,
        Some(Family::Mesh) => MetadataSchema::Mesh(mesh),
        Some(Family::Hair) => MetadataSchema::HairInfo {
            shortening_behavior: hair,
        },
        Some(Family::Helm) => MetadataSchema::HelmInfo {
            hair_hiding_behavior: helm,
        },
    };

    debug!(
        consumed = consumed.len(),
        remaining = remaining.len(),
        schema = schema.kind(),
        "Translated legacy annotations"
    );

    LegacyImport {
        schema,
        remaining,
        consumed,
    }
}

fn apply_mesh_field(mesh: &mut MeshProperties, field: MeshField, key: &str, value: &AnnotationValue) {
    let applied = match field {
        MeshField::TintMap => match value.as_text() {
            Some(name) => {
                if mesh.set_tint_map_truncated(name) {
                    warn!(key, "Tint map name truncated");
                }
                true
            }
            None => false,
        },
        MeshField::DiffuseColor | MeshField::SpecularColor => match value.as_color() {
            Some(c) if field == MeshField::DiffuseColor => {
                mesh.diffuse_color = Rgb::from_array(c);
                true
            }
            Some(c) => {
                mesh.specular_color = Rgb::from_array(c);
                true
            }
            None => false,
        },
        MeshField::SpecularLevel | MeshField::Glossiness => match value.as_f32() {
            Some(v) if field == MeshField::SpecularLevel => {
                mesh.specular_level = v;
                true
            }
            Some(v) => {
                mesh.glossiness = v;
                true
            }
            None => false,
        },
        MeshField::TransparencyMask => set_flag(&mut mesh.use_transparency_mask, value),
        MeshField::Head => set_flag(&mut mesh.is_head, value),
        MeshField::DontCastShadows => set_flag(&mut mesh.cast_no_shadows, value),
        MeshField::EnvironmentMap => set_flag(&mut mesh.use_environment_map, value),
        MeshField::Glow => set_flag(&mut mesh.glow, value),
        MeshField::ProjectedTextures => set_flag(&mut mesh.receive_projected_textures, value),
    };

    if !applied {
        warn!(key, kind = value.kind(), "Ignoring legacy annotation of unexpected type");
    }
}

// Any value is a valid flag: one is true, everything else false.
fn set_flag(flag: &mut bool, value: &AnnotationValue) -> bool {
    *flag = value.is_one();
    true
}

/// Produce the export annotations for a schema
pub fn to_legacy(schema: &MetadataSchema) -> AnnotationMap {
    let mut out = AnnotationMap::new();

    match schema {
        MetadataSchema::Unclassified => {}
        MetadataSchema::Mesh(mesh) => {
            out.insert("NWN2MDK_TINT_MAP", mesh.tint_map().unwrap_or_default());
            out.insert("NWN2MDK_DIFFUSE_COLOR", mesh.diffuse_color.to_array());
            out.insert("NWN2MDK_SPECULAR_COLOR", mesh.specular_color.to_array());
            out.insert("NWN2MDK_SPECULAR_LEVEL", mesh.specular_level);
            out.insert("NWN2MDK_GLOSSINESS", mesh.glossiness);
            out.insert("NWN2MDK_TRANSPARENCY_MASK", AnnotationValue::flag(mesh.use_transparency_mask));
            out.insert("NWN2MDK_HEAD", AnnotationValue::flag(mesh.is_head));
            out.insert("NWN2MDK_DONT_CAST_SHADOWS", AnnotationValue::flag(mesh.cast_no_shadows));
            out.insert("NWN2MDK_ENVIRONMENT_MAP", AnnotationValue::flag(mesh.use_environment_map));
            out.insert("NWN2MDK_GLOW", AnnotationValue::flag(mesh.glow));
            out.insert(
                "NWN2MDK_PROJECTED_TEXTURES",
                AnnotationValue::flag(mesh.receive_projected_textures),
            );
        }
        MetadataSchema::HairInfo { shortening_behavior } => {
            out.insert(EXPORT_HAIR_KEY, shortening_behavior.as_tag());
        }
        MetadataSchema::HelmInfo { hair_hiding_behavior } => {
            out.insert(EXPORT_HELM_KEY, hair_hiding_behavior.as_tag());
        }
    }

    out
}

/// Copy of `annotations` without any export key
pub fn purge(annotations: &AnnotationMap) -> AnnotationMap {
    let mut out = annotations.clone();
    out.retain(|key, _| !is_export_key(key));
    out
}

/// Annotations the import converter attaches to an object that was
/// exported with `exported`
///
/// Mesh keys lose their prefix; the hair and helm tags expand into one flag
/// per family member with exactly the selected one set. Keys that are not
/// export keys pass through unchanged.
pub fn loopback(exported: &AnnotationMap) -> AnnotationMap {
    let mut out = AnnotationMap::new();

    for (key, value) in exported.iter() {
        match key {
            EXPORT_HAIR_KEY => match value.as_text().map(str::parse::<HairShorteningBehavior>) {
                Some(Ok(selected)) => {
                    for behavior in HairShorteningBehavior::ALL {
                        out.insert(hair_flag_key(*behavior), i64::from(*behavior == selected));
                    }
                }
                _ => warn!(key, value = %value, "Unreadable hair shortening tag"),
            },
            EXPORT_HELM_KEY => match value.as_text().map(str::parse::<HelmHairHidingBehavior>) {
                Some(Ok(selected)) => {
                    for behavior in HelmHairHidingBehavior::ALL {
                        out.insert(helm_flag_key(*behavior), i64::from(*behavior == selected));
                    }
                }
                _ => warn!(key, value = %value, "Unreadable helm hair hiding tag"),
            },
            _ if is_export_key(key) => {
                out.insert(&key[EXPORT_PREFIX.len()..], value.clone());
            }
            _ => {
                out.insert(key, value.clone());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_key_table_is_consistent() {
        for (name, key) in LEGACY_KEYS {
            assert_eq!(LegacyKey::parse(name), Some(key));
            assert_eq!(key.name(), name);
        }
        assert_eq!(LegacyKey::parse("NWN2MDK_GLOW"), None);
    }

    #[test]
    fn test_mesh_export_keys_mirror_legacy_keys() {
        for key in &EXPORT_KEYS[..11] {
            let bare = &key[EXPORT_PREFIX.len()..];
            assert!(matches!(LegacyKey::parse(bare), Some(LegacyKey::Mesh(_))), "{bare}");
        }
    }

    #[test]
    fn test_unexpected_type_keeps_default_and_consumes_key() {
        let annotations: AnnotationMap = [("GLOSSINESS", AnnotationValue::from("shiny"))].into_iter().collect();
        let import = from_legacy(&annotations);

        assert_eq!(import.schema, MetadataSchema::Mesh(MeshProperties::default()));
        assert!(import.remaining.is_empty());
        assert_eq!(import.consumed, vec!["GLOSSINESS"]);
    }

    #[test]
    fn test_int_values_are_accepted_for_floats() {
        let annotations: AnnotationMap = [("SPECULAR_LEVEL", 3i64)].into_iter().collect();
        let mesh = from_legacy(&annotations).schema.as_mesh().cloned().unwrap();
        assert_eq!(mesh.specular_level, 3.0);
    }

    #[test]
    fn test_loopback_skips_unreadable_tag() {
        let exported: AnnotationMap = [(EXPORT_HAIR_KEY, "CURLY")].into_iter().collect();
        assert!(loopback(&exported).is_empty());
    }
}

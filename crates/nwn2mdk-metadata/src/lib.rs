//! NWN2 object metadata
//!
//! Typed per-object metadata ([`MetadataSchema`]), the untyped annotation
//! channel it travels through ([`AnnotationMap`]), and the translator that
//! moves values between the two.

pub mod annotations;
pub mod scene;
pub mod schema;
pub mod translator;

pub use annotations::{AnnotationMap, AnnotationValue};
pub use scene::{Scene, SceneObject};
pub use schema::{
    HairShorteningBehavior, HelmHairHidingBehavior, MeshProperties, MetadataSchema, TINT_MAP_MAX_LEN,
};
pub use translator::{from_legacy, loopback, purge, to_legacy, LegacyImport};

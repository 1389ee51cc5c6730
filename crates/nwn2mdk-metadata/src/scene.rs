//! Scene objects and their metadata
//!
//! A [`SceneObject`] owns its schema and its annotation map. The helpers on
//! it are the only places that move data between the two.

use nwn2mdk_core::{Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::annotations::AnnotationMap;
use crate::schema::MetadataSchema;
use crate::translator::{self, LegacyImport};

/// One object of the host scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub schema: MetadataSchema,
    #[serde(default, skip_serializing_if = "AnnotationMap::is_empty")]
    pub annotations: AnnotationMap,
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, schema: MetadataSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_annotations(mut self, annotations: AnnotationMap) -> Self {
        self.annotations = annotations;
        self
    }

    /// Fold recognized legacy annotations into the schema
    ///
    /// The schema is replaced only when at least one recognized key was
    /// present; every recognized key is removed either way.
    pub fn adopt_legacy_annotations(&mut self) -> bool {
        let LegacyImport {
            schema,
            remaining,
            consumed,
        } = translator::from_legacy(&self.annotations);

        self.annotations = remaining;
        if consumed.is_empty() {
            return false;
        }
        self.schema = schema;
        true
    }

    /// Attach the export annotations for the current schema
    pub fn stage_export_annotations(&mut self) {
        let exported = translator::to_legacy(&self.schema);
        self.annotations.extend(exported);
    }

    /// Remove every export annotation
    pub fn purge_export_annotations(&mut self) {
        self.annotations = translator::purge(&self.annotations);
    }

    pub fn has_export_annotations(&self) -> bool {
        self.annotations.keys().any(translator::is_export_key)
    }
}

/// Ordered collection of scene objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object, returning its index
    pub fn push(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    /// Apply [`SceneObject::adopt_legacy_annotations`] to every object,
    /// returning how many were classified
    pub fn adopt_legacy_annotations(&mut self) -> usize {
        self.objects
            .iter_mut()
            .map(SceneObject::adopt_legacy_annotations)
            .filter(|classified| *classified)
            .count()
    }

    /// Load a scene document
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let read = || -> Result<Self> {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        };
        read().with_context(|| format!("loading scene {}", path.display()))
    }

    /// Write the scene document as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let write = || -> Result<()> {
            let text = serde_json::to_string_pretty(self)?;
            fs::write(path, text)?;
            Ok(())
        };
        write().context(format!("saving scene {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::HairShorteningBehavior;

    #[test]
    fn test_adopt_keeps_schema_without_legacy_keys() {
        let hair = MetadataSchema::HairInfo {
            shortening_behavior: HairShorteningBehavior::Ponytail,
        };
        let mut object = SceneObject::new("hair")
            .with_schema(hair.clone())
            .with_annotations([("author", "someone")].into_iter().collect());

        assert!(!object.adopt_legacy_annotations());
        assert_eq!(object.schema, hair);
        assert!(object.annotations.contains_key("author"));
    }

    #[test]
    fn test_stage_and_purge_restore_annotations() {
        let mut object = SceneObject::new("body")
            .with_schema(MetadataSchema::Mesh(Default::default()))
            .with_annotations([("author", "someone")].into_iter().collect());
        let before = object.annotations.clone();

        object.stage_export_annotations();
        assert!(object.has_export_annotations());
        assert_eq!(object.annotations.len(), 12);

        object.purge_export_annotations();
        assert!(!object.has_export_annotations());
        assert_eq!(object.annotations, before);
    }

    #[test]
    fn test_scene_document_roundtrip() {
        let mut scene = Scene::new();
        scene.push(SceneObject::new("helm").with_schema(MetadataSchema::HelmInfo {
            hair_hiding_behavior: Default::default(),
        }));

        let json = serde_json::to_string(&scene).unwrap();
        let back: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scene);

        let minimal: Scene = serde_json::from_str(r#"{"objects":[{"name":"x"}]}"#).unwrap();
        assert!(minimal.objects[0].schema.is_unclassified());
    }

    #[test]
    fn test_scene_document_enforces_mesh_limits() {
        let long_tint = format!(
            r#"{{"objects":[{{"name":"c_body","schema":{{"type":"Mesh","tint_map":"{}"}}}}]}}"#,
            "t".repeat(40)
        );
        assert!(serde_json::from_str::<Scene>(&long_tint).is_err());

        let bright = r#"{"objects":[{"name":"c_body","schema":{"type":"Mesh","diffuse_color":{"r":2.0,"g":-1.0,"b":0.5}}}]}"#;
        let scene: Scene = serde_json::from_str(bright).unwrap();
        let mesh = scene.objects[0].schema.as_mesh().unwrap();
        assert_eq!(mesh.diffuse_color.to_array(), [1.0, 0.0, 0.5]);
    }
}

//! JSON scene-document host
//!
//! Stands in for a 3D application's interchange importer/exporter: the
//! interchange file is a JSON document listing object names and their
//! annotations. Converters that speak this form can be driven end to end
//! without a 3D application.

use nwn2mdk_core::HostError;
use nwn2mdk_metadata::{AnnotationMap, SceneObject};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use super::{InterchangeOptions, SceneHost};

/// On-disk interchange document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterchangeDocument {
    /// Options the document was written with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<InterchangeOptions>,
    #[serde(default)]
    pub objects: Vec<InterchangeObject>,
}

/// One object of an interchange document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterchangeObject {
    pub name: String,
    #[serde(default, skip_serializing_if = "AnnotationMap::is_empty")]
    pub annotations: AnnotationMap,
}

impl InterchangeDocument {
    pub fn read(path: &Path) -> std::result::Result<Self, HostError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn write(&self, path: &Path, pretty: bool) -> std::result::Result<(), HostError> {
        let mut writer = BufWriter::new(File::create(path)?);
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Host reading and writing [`InterchangeDocument`] files
#[derive(Debug, Clone)]
pub struct DocumentHost {
    pretty: bool,
}

impl DocumentHost {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Write compact JSON instead of pretty-printed
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl Default for DocumentHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHost for DocumentHost {
    fn import_interchange(
        &mut self,
        path: &Path,
        options: &InterchangeOptions,
    ) -> std::result::Result<Vec<SceneObject>, HostError> {
        let document = InterchangeDocument::read(path)?;
        debug!(path = %path.display(), objects = document.objects.len(), "Read interchange document");

        Ok(document
            .objects
            .into_iter()
            .map(|object| {
                let annotations = if options.use_custom_annotations {
                    object.annotations
                } else {
                    AnnotationMap::new()
                };
                SceneObject::new(object.name).with_annotations(annotations)
            })
            .collect())
    }

    fn export_interchange(
        &mut self,
        path: &Path,
        objects: &[SceneObject],
        options: &InterchangeOptions,
    ) -> std::result::Result<(), HostError> {
        let document = InterchangeDocument {
            options: Some(options.clone()),
            objects: objects
                .iter()
                .map(|object| InterchangeObject {
                    name: object.name.clone(),
                    annotations: if options.use_custom_annotations {
                        object.annotations.clone()
                    } else {
                        AnnotationMap::new()
                    },
                })
                .collect(),
        };

        document.write(path, self.pretty)?;
        debug!(path = %path.display(), objects = objects.len(), "Wrote interchange document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nwn2mdk_metadata::MetadataSchema;

    #[test]
    fn test_export_then_import_preserves_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.fbx");
        let mut host = DocumentHost::new().compact();

        let objects = vec![
            SceneObject::new("c_body")
                .with_schema(MetadataSchema::Mesh(Default::default()))
                .with_annotations([("NWN2MDK_GLOW", 1.0f32)].into_iter().collect()),
            SceneObject::new("c_hair"),
        ];
        host.export_interchange(&path, &objects, &InterchangeOptions::static_pose())
            .unwrap();

        let imported = host
            .import_interchange(&path, &InterchangeOptions::for_import(true))
            .unwrap();

        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].name, "c_body");
        assert!(imported[0].schema.is_unclassified(), "schema does not travel, only annotations");
        assert!(imported[0].annotations.contains_key("NWN2MDK_GLOW"));
        assert!(imported[1].annotations.is_empty());
    }

    #[test]
    fn test_annotations_dropped_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.fbx");
        let mut host = DocumentHost::new();
        let options = InterchangeOptions {
            use_custom_annotations: false,
            ..Default::default()
        };

        let objects = vec![SceneObject::new("c_body").with_annotations([("GLOW", 1i64)].into_iter().collect())];
        host.export_interchange(&path, &objects, &options).unwrap();

        let document = InterchangeDocument::read(&path).unwrap();
        assert!(document.objects[0].annotations.is_empty());
        assert_eq!(document.options, Some(options));
    }

    #[test]
    fn test_missing_file_is_host_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = DocumentHost::new();
        let result = host.import_interchange(&dir.path().join("absent.fbx"), &InterchangeOptions::default());
        assert!(result.is_err());
    }
}

//! Import and export orchestration
//!
//! Import: run `nw2fbx` on the game files, let the host read the interchange
//! file, then fold legacy annotations into schemas. Export: attach export
//! annotations, let the host write the interchange file, run `fbx2nw`, then
//! purge the annotations again. The interchange file never outlives a run.

use nwn2mdk_core::{Error, Result};
use nwn2mdk_metadata::Scene;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::converter::{ConverterExit, ConverterInvocation};
use crate::host::{InterchangeOptions, SceneHost};
use crate::report::Report;
use crate::staging::StagingWorkspace;

/// Files to import and where to run the import converter
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Selected file; its directory is the working directory
    pub target: PathBuf,
    /// Files to convert, relative to the working directory. Empty means
    /// just `target`.
    pub files: Vec<PathBuf>,
    pub automatic_bone_orientation: bool,
}

impl ImportRequest {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            files: Vec::new(),
            automatic_bone_orientation: true,
        }
    }

    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bone_orientation(mut self, enabled: bool) -> Self {
        self.automatic_bone_orientation = enabled;
        self
    }
}

/// Outcome of an import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Indices of the imported objects in the scene
    pub objects: Vec<usize>,
    /// Converter exit; a failure here did not stop the import
    pub converter: ConverterExit,
    pub log_path: PathBuf,
}

/// Output file and interchange options of an export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub target: PathBuf,
    pub options: InterchangeOptions,
}

impl ExportRequest {
    /// Static model export
    pub fn mdb(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            options: InterchangeOptions::static_pose(),
        }
    }

    /// Skeleton/animation export, baking keyframes when `bake` is set
    pub fn gr2(target: impl Into<PathBuf>, bake: Option<f32>) -> Result<Self> {
        let options = match bake {
            Some(simplify_factor) => InterchangeOptions::baked_animation(simplify_factor)?,
            None => InterchangeOptions::static_pose(),
        };
        Ok(Self {
            target: target.into(),
            options,
        })
    }
}

/// Outcome of an export that got as far as running the converter
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Absolute path of the file the converter was asked to write
    pub output: PathBuf,
    pub converter: ConverterExit,
    pub log_path: PathBuf,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.converter.is_success()
    }

    /// Message for the user, present only when the converter failed
    pub fn report(&self) -> Option<Report> {
        if self.is_success() {
            return None;
        }
        Some(Report::error(format!(
            "Error during export. See {} for errors.",
            self.log_path.display()
        )))
    }

    /// Turn a converter failure into [`Error::ConverterFailure`]
    pub fn into_result(self) -> Result<Self> {
        match self.converter {
            ConverterExit::Success => Ok(self),
            ConverterExit::Failure { code } => Err(Error::ConverterFailure {
                code,
                log: self.log_path,
            }),
        }
    }
}

/// Drives the converters against a host
pub struct Pipeline<H> {
    config: PipelineConfig,
    host: H,
}

impl<H: SceneHost> Pipeline<H> {
    pub fn new(config: PipelineConfig, host: H) -> Self {
        Self { config, host }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Convert game files and append the resulting objects to `scene`
    ///
    /// A nonzero converter exit is logged and recorded in the report; the
    /// run only fails if no interchange file was produced. The scene is left
    /// untouched on error.
    pub fn import(&mut self, scene: &mut Scene, request: &ImportRequest) -> Result<ImportReport> {
        let workspace = StagingWorkspace::resolve(&request.target)?;
        let executable = self.config.import_converter_path()?;
        let inputs = import_inputs(&workspace, request)?;

        info!(
            target = %request.target.display(),
            files = inputs.len(),
            work_dir = %workspace.work_dir().display(),
            "Starting import"
        );

        let staged = workspace.stage_interchange();
        let converter = ConverterInvocation::new(executable, workspace.work_dir(), workspace.log_path())
            .args(inputs)
            .output(StagingWorkspace::interchange_name())
            .invoke()?;

        if !converter.is_success() {
            warn!(
                exit = %converter,
                log = %workspace.log_path().display(),
                "Import converter reported errors"
            );
        }

        if !staged.exists() {
            return Err(Error::MissingArtifact(staged.path().to_path_buf()));
        }

        let options = InterchangeOptions::for_import(request.automatic_bone_orientation);
        let imported = self
            .host
            .import_interchange(staged.path(), &options)
            .map_err(Error::Host)?;
        drop(staged);

        let mut objects = Vec::with_capacity(imported.len());
        let mut classified = 0;
        for mut object in imported {
            if object.adopt_legacy_annotations() {
                classified += 1;
            }
            objects.push(scene.push(object));
        }

        info!(objects = objects.len(), classified, "Import complete");

        Ok(ImportReport {
            objects,
            converter,
            log_path: workspace.log_path(),
        })
    }

    /// Write `scene` to the game format at `request.target`
    ///
    /// A converter failure is not an error here: it shows up in the returned
    /// report (see [`ExportReport::report`]). Host and launch errors are
    /// returned after the scene has been purged and the interchange file
    /// removed.
    pub fn export(&mut self, scene: &mut Scene, request: &ExportRequest) -> Result<ExportReport> {
        let workspace = StagingWorkspace::resolve(&request.target)?;
        let output_name = request
            .target
            .file_name()
            .ok_or_else(|| Error::InvalidPath {
                path: request.target.clone(),
            })?
            .to_os_string();
        let executable = self.config.export_converter_path()?;
        request.options.validate()?;

        info!(
            target = %request.target.display(),
            objects = scene.len(),
            bake_animation = request.options.bake_animation,
            "Starting export"
        );

        for object in scene.iter_mut() {
            object.stage_export_annotations();
        }

        let staged = workspace.stage_interchange();
        let outcome = self
            .host
            .export_interchange(staged.path(), &scene.objects, &request.options)
            .map_err(Error::Host)
            .and_then(|()| {
                ConverterInvocation::new(executable, workspace.work_dir(), workspace.log_path())
                    .arg(staged.path())
                    .output(&output_name)
                    .invoke()
            });

        for object in scene.iter_mut() {
            object.purge_export_annotations();
        }
        drop(staged);

        let converter = outcome?;
        let report = ExportReport {
            output: workspace.work_dir().join(&output_name),
            converter,
            log_path: workspace.log_path(),
        };

        match report.report() {
            Some(message) => warn!(exit = %converter, "{}", message.message),
            None => info!(output = %report.output.display(), "Export complete"),
        }

        Ok(report)
    }
}

/// Converter inputs joined onto the working directory
fn import_inputs(workspace: &StagingWorkspace, request: &ImportRequest) -> Result<Vec<PathBuf>> {
    if request.files.is_empty() {
        let name = request.target.file_name().ok_or_else(|| Error::InvalidPath {
            path: request.target.clone(),
        })?;
        return Ok(vec![workspace.work_dir().join(name)]);
    }

    Ok(request
        .files
        .iter()
        .map(|file| workspace.work_dir().join(file))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gr2_request_options() {
        let static_pose = ExportRequest::gr2("c_dwarf_skel.gr2", None).unwrap();
        assert!(!static_pose.options.bake_animation);

        let baked = ExportRequest::gr2("c_dwarf_walk.gr2", Some(0.0)).unwrap();
        assert!(baked.options.bake_animation);
        assert_eq!(baked.options.bake_simplify_factor, 0.0);

        let err = ExportRequest::gr2("c_dwarf_walk.gr2", Some(250.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_report_only_on_failure() {
        let mut report = ExportReport {
            output: PathBuf::from("/work/c_dwarf.mdb"),
            converter: ConverterExit::Success,
            log_path: PathBuf::from("/work/log.txt"),
        };
        assert!(report.report().is_none());
        assert!(report.clone().into_result().is_ok());

        report.converter = ConverterExit::Failure { code: Some(1) };
        let message = report.report().unwrap();
        assert_eq!(message.message, "Error during export. See /work/log.txt for errors.");

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, Error::ConverterFailure { code: Some(1), .. }));
    }

    #[test]
    fn test_import_inputs_default_to_target() {
        let workspace = StagingWorkspace::resolve("/models/c_dwarf.mdb").unwrap();
        let request = ImportRequest::new("/models/c_dwarf.mdb");
        assert_eq!(
            import_inputs(&workspace, &request).unwrap(),
            vec![PathBuf::from("/models/c_dwarf.mdb")]
        );

        let request = request.with_files(["c_dwarf_skel.gr2", "c_dwarf.mdb"]);
        assert_eq!(
            import_inputs(&workspace, &request).unwrap(),
            vec![
                PathBuf::from("/models/c_dwarf_skel.gr2"),
                PathBuf::from("/models/c_dwarf.mdb"),
            ]
        );
    }
}

//! NWN2MDK conversion pipeline
//!
//! Drives the external `nw2fbx`/`fbx2nw` converters through a temporary
//! interchange file, handing scene-level I/O to a [`SceneHost`].

pub mod config;
pub mod converter;
pub mod host;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod staging;

pub use config::PipelineConfig;
pub use converter::{ConverterExit, ConverterInvocation};
pub use host::{DocumentHost, InterchangeOptions, SceneHost};
pub use pipeline::{ExportReport, ExportRequest, ImportReport, ImportRequest, Pipeline};
pub use report::{Report, Severity};
pub use staging::{cleanup, StagedFile, StagingWorkspace};

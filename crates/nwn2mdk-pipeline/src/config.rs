//! Pipeline configuration
//!
//! Where to find the converter executables. Values come from defaults, an
//! optional JSON file and the `NWN2MDK_TOOLS_DIR` environment variable, in
//! that order of increasing precedence.

use nwn2mdk_core::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`PipelineConfig::tools_dir`]
pub const TOOLS_DIR_ENV: &str = "NWN2MDK_TOOLS_DIR";

/// Converter locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory containing the converter executables
    pub tools_dir: PathBuf,
    /// MDB/GR2 to interchange converter
    pub import_converter: String,
    /// Interchange to MDB/GR2 converter
    pub export_converter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tools_dir: PathBuf::from("."),
            import_converter: "nw2fbx".to_string(),
            export_converter: "fbx2nw".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let read = || -> Result<Self> {
            let text = fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&text)?;
            config.validate()?;
            Ok(config)
        };
        read().with_context(|| format!("loading config {}", path.display()))
    }

    /// Apply `NWN2MDK_TOOLS_DIR` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = env::var_os(TOOLS_DIR_ENV).filter(|d| !d.is_empty()) {
            self.tools_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn with_tools_dir(mut self, tools_dir: impl Into<PathBuf>) -> Self {
        self.tools_dir = tools_dir.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (field, name) in [
            ("import_converter", &self.import_converter),
            ("export_converter", &self.export_converter),
        ] {
            if name.is_empty() {
                return Err(Error::invalid_config(format!("{field} is empty")));
            }
            if name.contains(['/', '\\']) {
                return Err(Error::invalid_config(format!(
                    "{field} must be a file name inside tools_dir, got {name:?}"
                )));
            }
        }
        Ok(())
    }

    /// Absolute path of the import converter
    pub fn import_converter_path(&self) -> Result<PathBuf> {
        self.executable(&self.import_converter)
    }

    /// Absolute path of the export converter
    pub fn export_converter_path(&self) -> Result<PathBuf> {
        self.executable(&self.export_converter)
    }

    fn executable(&self, name: &str) -> Result<PathBuf> {
        let file = format!("{name}{}", env::consts::EXE_SUFFIX);
        Ok(std::path::absolute(self.tools_dir.join(file))?)
    }
}

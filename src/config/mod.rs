//! Generator configuration
//!
//! Settings are layered: built-in defaults, then an optional `codegen.toml`,
//! then command-line flags (applied by the binary). Every key in the file is
//! optional.
//!
//! ```toml
//! input = "solver_functions.txt"
//! policy = "best-effort"
//!
//! [output]
//! declarations = "generated/SolverFunctions.h"
//! definitions = "generated/SolverFunctions.cpp"
//!
//! [templates]
//! definitions = "templates/definitions.cpp.tera"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{GeneratorError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "codegen.toml";
pub const DEFAULT_INPUT: &str = "solver_functions.txt";
pub const DEFAULT_DECLARATIONS: &str = "SolverFunctions.h";
pub const DEFAULT_DEFINITIONS: &str = "SolverFunctions.cpp";

/// What to do with a record that passes the line grammar but cannot be
/// split or compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the run; nothing is written.
    #[default]
    Abort,
    /// Drop the record, report it, and keep going.
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputPaths {
    pub declarations: PathBuf,
    pub definitions: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            declarations: PathBuf::from(DEFAULT_DECLARATIONS),
            definitions: PathBuf::from(DEFAULT_DEFINITIONS),
        }
    }
}

/// Template overrides. `None` selects the built-in template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatePaths {
    pub declarations: Option<PathBuf>,
    pub definitions: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub input: PathBuf,
    pub output: OutputPaths,
    pub templates: TemplatePaths,
    pub policy: FailurePolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: OutputPaths::default(),
            templates: TemplatePaths::default(),
            policy: FailurePolicy::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse configuration text. `origin` is only used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| GeneratorError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given, otherwise `codegen.toml` from the current
    /// directory when it exists, otherwise the defaults.
    ///
    /// An explicitly named file that does not exist is an error; a missing
    /// default file is not.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

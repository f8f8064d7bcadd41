//! SDK generators.
//!
//! One generator per target language, all consuming the same
//! [`ContractGraph`]. Generators are pure emitters: model in, source
//! tree out, no network or chain access.

pub mod naming;
pub mod python;
pub mod selectors;
pub mod typescript;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::{Language, SignaturesConfig, TargetConfig, TargetOptions};
use crate::model::{ContractGraph, NetworkModel};

/// Errors raised during SDK generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Error writing a generated file
    #[error("error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target options that the generator cannot honor
    #[error("invalid generator options: {0}")]
    InvalidOptions(String),

    /// Error serializing embedded JSON (ABIs, package manifests)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Cross-target data not carried by the graph itself.
#[derive(Debug, Clone, Default)]
pub struct GeneratorContext {
    pub networks: BTreeMap<String, NetworkModel>,
    pub signatures: SignaturesConfig,
}

/// A target-language SDK generator.
pub trait Generator {
    /// Human-readable generator name for progress output.
    fn name(&self) -> &'static str;

    /// Reject option combinations the generator cannot honor.
    fn validate_options(&self, options: &TargetOptions) -> Result<(), GeneratorError>;

    /// Emit the SDK source tree for the graph.
    fn generate(
        &self,
        graph: &ContractGraph,
        context: &GeneratorContext,
    ) -> Result<(), GeneratorError>;
}

/// Create the generator for a target. `out_dir` must already be
/// resolved (absolute or relative to the invoking directory).
pub fn create_generator(target: &TargetConfig, out_dir: PathBuf) -> Box<dyn Generator> {
    match target.language {
        Language::Python => Box::new(python::PythonGenerator::new(
            out_dir,
            target.options.clone(),
        )),
        Language::Ts => Box::new(typescript::TypeScriptGenerator::new(
            out_dir,
            target.options.clone(),
        )),
    }
}

/// Writes generated files under a fixed output root, creating parent
/// directories as needed.
pub(crate) struct Emitter {
    out_dir: PathBuf,
}

impl Emitter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn write(&self, relative: &str, contents: &str) -> Result<(), GeneratorError> {
        let path = self.out_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GeneratorError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, contents).map_err(|source| GeneratorError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "wrote generated file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emitter_creates_parent_directories() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let emitter = Emitter::new(tmp.path().join("sdk"));
        emitter.write("a/b/c.py", "x = 1\n").expect("write");
        let contents = fs::read_to_string(tmp.path().join("sdk/a/b/c.py")).expect("read");
        assert_eq!(contents, "x = 1\n");
    }

    #[test]
    fn factory_picks_language() {
        let target = TargetConfig {
            language: Language::Python,
            out_dir: "./sdk".into(),
            options: TargetOptions::default(),
        };
        let generator = create_generator(&target, PathBuf::from("./sdk"));
        assert!(generator.name().contains("Python"));

        let target = TargetConfig {
            language: Language::Ts,
            out_dir: "./sdk".into(),
            options: TargetOptions::default(),
        };
        let generator = create_generator(&target, PathBuf::from("./sdk"));
        assert!(generator.name().contains("TypeScript"));
    }
}

//! Error types for the build pipeline.

use std::path::PathBuf;

use ruleforge_compiler::{CompileError, Target, UnknownTarget};
use ruleforge_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{target}: {source}")]
    Compile {
        target: Target,
        #[source]
        source: CompileError,
    },

    #[error(transparent)]
    UnknownTarget(#[from] UnknownTarget),

    #[error("no *.{extension} rule lists found in {}", dir.display())]
    NoSources { dir: PathBuf, extension: String },

    #[error("{count} grammar error(s) in rule lists")]
    Grammar { count: usize },

    #[error("report serialization error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("compile task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

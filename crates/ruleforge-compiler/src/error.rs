//! Error types for the compiler.

use thiserror::Error;

/// Fatal compile failures.
///
/// Rules a target cannot express never end up here; they are skipped and
/// reported as [`CompileWarning`](crate::CompileWarning)s. Only rendering the
/// finished document can fail.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("json render error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml render error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

//! Rule-list discovery: one file per policy.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BuildError;

/// Raw text of one policy's rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySource {
    /// File stem, used as the policy name.
    pub policy: String,
    pub path: PathBuf,
    pub text: String,
}

/// Read every `<POLICY>.<extension>` file in `dir`.
///
/// Policies named in `order` come first, in that order (names without a file
/// are ignored). The rest follow sorted by name.
pub fn load_policy_sources(
    dir: &Path,
    extension: &str,
    order: &[String],
) -> Result<Vec<PolicySource>, BuildError> {
    let entries = fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BuildError::io(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some(extension) {
            continue;
        }
        let Some(policy) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let policy = policy.trim().to_string();
        if policy.is_empty() {
            continue;
        }
        found.push((policy, path));
    }

    if found.is_empty() {
        return Err(BuildError::NoSources {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    let mut ordered = Vec::with_capacity(found.len());
    for name in order {
        if let Some(idx) = found.iter().position(|(policy, _)| policy == name) {
            ordered.push(found.remove(idx));
        }
    }
    ordered.append(&mut found);

    ordered
        .into_iter()
        .map(|(policy, path)| {
            let text = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
            debug!(policy = %policy, path = %path.display(), bytes = text.len(), "rule list loaded");
            Ok(PolicySource { policy, path, text })
        })
        .collect()
}

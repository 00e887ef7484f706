//! Artifact and report output.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ruleforge_compiler::{CompileResult, CompileStats, CompileWarning, Target};
use ruleforge_core::{REPORT_FILE_NAME, VERSION};
use serde::Serialize;
use tracing::info;

use crate::error::BuildError;
use crate::pipeline::Diagnostic;

/// Machine-readable summary written next to the artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub version: &'static str,
    pub policies: Vec<String>,
    pub rules: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub targets: BTreeMap<Target, TargetReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub file: String,
    pub stats: CompileStats,
    pub warnings: Vec<CompileWarning>,
}

impl BuildReport {
    pub fn new(
        policies: Vec<String>,
        rules: usize,
        diagnostics: Vec<Diagnostic>,
        results: &[(Target, CompileResult)],
    ) -> Self {
        let targets = results
            .iter()
            .map(|(target, result)| {
                let report = TargetReport {
                    file: target.file_name().to_string(),
                    stats: result.stats.clone(),
                    warnings: result.warnings.clone(),
                };
                (*target, report)
            })
            .collect();
        Self {
            version: VERSION,
            policies,
            rules,
            diagnostics,
            targets,
        }
    }

    pub fn warning_count(&self) -> usize {
        self.targets.values().map(|t| t.warnings.len()).sum()
    }
}

/// Write each target's text to `<out_dir>/<file name>` plus the report.
/// Returns the written paths, report last.
pub fn write_artifacts(
    out_dir: &Path,
    results: &[(Target, CompileResult)],
    report: &BuildReport,
) -> Result<Vec<PathBuf>, BuildError> {
    fs::create_dir_all(out_dir).map_err(|e| BuildError::io(out_dir, e))?;

    let mut written = Vec::with_capacity(results.len() + 1);
    for (target, result) in results {
        let path = out_dir.join(target.file_name());
        fs::write(&path, &result.text).map_err(|e| BuildError::io(&path, e))?;
        info!(
            target_name = %target,
            path = %path.display(),
            emitted = result.stats.emitted(),
            skipped = result.stats.skipped(),
            "artifact written"
        );
        written.push(path);
    }

    let path = out_dir.join(REPORT_FILE_NAME);
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    fs::write(&path, json).map_err(|e| BuildError::io(&path, e))?;
    written.push(path);
    Ok(written)
}

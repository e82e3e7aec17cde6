//! Check command implementation.

use anyhow::{Context, Result};
use dataverse_lint_core::{Analyzer, Config, LintResult};
use dataverse_lint_csharp::CSharpFrontend;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use crate::OutputFormat;

/// Flags of the check command.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule codes or names.
    pub rules: Option<String>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Worker thread cap.
    pub jobs: Option<usize>,
}

/// Runs the check command.
pub fn run(path: &Path, options: &CheckOptions, config: Config) -> Result<ExitCode> {
    let threshold = config.fail_threshold();
    let result = analyze(path, options, config)?;
    super::output::print(&result, options.format)?;

    if result.has_diagnostics_at(threshold) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn analyze(path: &Path, options: &CheckOptions, config: Config) -> Result<LintResult> {
    let catalog = super::select_rules(options.rules.as_deref())?;

    let mut builder = Analyzer::builder(Arc::new(CSharpFrontend), catalog)
        .root(path)
        .config(config)
        .excludes(options.exclude.iter().cloned());
    if let Some(jobs) = options.jobs {
        builder = builder.parallelism(jobs);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        path.display(),
        analyzer.catalog().len()
    );

    let result = analyzer.analyze().context("Analysis failed")?;
    for failure in &result.failures {
        tracing::warn!(
            "{} failed at {}:{}: {}",
            failure.code,
            failure.location.file.display(),
            failure.location.line,
            failure.message
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataverse_lint_core::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn options(rules: Option<&str>) -> CheckOptions {
        CheckOptions {
            format: OutputFormat::Compact,
            rules: rules.map(str::to_string),
            exclude: Vec::new(),
            jobs: Some(2),
        }
    }

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("Plugin.cs"),
            "class Plugin\n{\n    public Plugin(IAuditService a, IAuditService b)\n    {\n    }\n\n    void M(bool a)\n    {\n        if (a) Work();\n    }\n}\n",
        )
        .unwrap();
        fs::create_dir_all(tmp.path().join("obj")).unwrap();
        fs::write(tmp.path().join("obj/Generated.cs"), "class G { void M(bool a) { if (a) Work(); } }").unwrap();
        tmp
    }

    #[test]
    fn reports_diagnostics_outside_build_output() {
        let tmp = project();
        let result = analyze(tmp.path(), &options(None), Config::default()).unwrap();

        assert_eq!(result.files_checked, 1);
        let codes: Vec<&str> = result.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert!(codes.contains(&"CT0001"), "{codes:?}");
        assert!(result.diagnostics.iter().all(|d| d.location.file.ends_with("Plugin.cs")));
    }

    #[test]
    fn rule_selection_and_excludes_apply() {
        let tmp = project();
        let mut opts = options(Some("CT0002"));
        let result = analyze(tmp.path(), &opts, Config::default()).unwrap();
        assert!(result.diagnostics.iter().all(|d| d.code == "CT0002"));

        opts.rules = None;
        opts.exclude.push("**/Plugin.cs".to_string());
        let result = analyze(tmp.path(), &opts, Config::default()).unwrap();
        assert_eq!(result.files_checked, 0);
    }

    #[test]
    fn warning_threshold_comes_from_config() {
        let tmp = project();
        let config = Config::parse("fail_on = \"warning\"\n").unwrap();
        assert_eq!(config.fail_threshold(), Severity::Warning);

        let result = analyze(tmp.path(), &options(Some("CT0005")), config.clone()).unwrap();
        assert!(result.has_diagnostics_at(config.fail_threshold()));
        assert!(!result.has_errors());
    }
}

//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# dataverse-lint configuration
# Rules run with fixed severities; this file shapes the run itself.

# Lowest severity that makes `dataverse-lint check` exit non-zero
# ("error" or "warning", default: "error")
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/bin/**",
    "**/obj/**",
]

# Respect .gitignore files
respect_gitignore = true

# Maximum number of worker threads (default: one per core)
# parallelism = 4
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_default(Path::new("dataverse-lint.toml"), force)?;

    println!("Created dataverse-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit dataverse-lint.toml to adjust excludes and the failure threshold");
    println!("  2. Run: dataverse-lint check");

    Ok(())
}

fn write_default(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataverse_lint_core::{Config, Severity};
    use tempfile::TempDir;

    #[test]
    fn default_config_parses_to_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.fail_threshold(), Severity::Error);
        assert_eq!(config.analyzer, Config::default().analyzer);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dataverse-lint.toml");
        std::fs::write(&path, "fail_on = \"warning\"\n").unwrap();

        assert!(write_default(&path, false).is_err());
        write_default(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}

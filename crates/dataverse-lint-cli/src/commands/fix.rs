//! Fix command implementation.
//!
//! Runs the fixable rules, applies their edits per file with
//! [`apply_batch`], and repeats on the rewritten trees so that edits skipped
//! for overlapping an outer one get their turn. Every applied edit is listed
//! by line and fix title; `--dry-run` lists them without writing.

use anyhow::{bail, Context, Result};
use dataverse_lint_core::{
    apply_batch, Analyzer, CancellationToken, Config, Diagnostic, RewriteEdit, SkipReason, SyntaxTree,
};
use dataverse_lint_csharp::CSharpFrontend;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Upper bound on check-and-rewrite rounds.
const MAX_PASSES: usize = 8;

/// One applied edit: 1-based line and fix title. Brace fixes never add or
/// remove line breaks, so lines stay valid across passes.
type Change = (usize, &'static str);

/// Runs the fix command.
pub fn run(
    path: &Path,
    rules: Option<&str>,
    dry_run: bool,
    config: Config,
) -> Result<ExitCode> {
    let selected = super::select_rules(rules)?;
    let fixable: Vec<&str> = selected
        .rules()
        .filter(|rule| rule.fix().is_some())
        .map(|rule| rule.code())
        .collect();
    if fixable.is_empty() {
        bail!("None of the selected rules has an automatic fix");
    }
    let catalog = selected.filter(&fixable)?;

    let analyzer = Analyzer::builder(Arc::new(CSharpFrontend), catalog)
        .root(path)
        .config(config)
        .build()
        .context("Failed to build analyzer")?;
    let files = analyzer.discover_files().context("File discovery failed")?;
    let mut trees = analyzer.load(&files).context("Failed to read sources")?;

    let (total, mut changed) = fix_trees(&analyzer, &mut trees)?;

    for tree in &trees {
        let Some(changes) = changed.get_mut(tree.path()) else {
            continue;
        };
        if dry_run {
            println!("Would fix {}", tree.path().display());
        } else {
            std::fs::write(tree.path(), tree.text())
                .with_context(|| format!("Failed to write {}", tree.path().display()))?;
            println!("Fixed {}", tree.path().display());
        }
        changes.sort_unstable();
        print!("{}", describe(changes));
    }
    let verb = if dry_run { "Would apply" } else { "Applied" };
    println!("{verb} {total} fix(es) in {} file(s)", changed.len());

    Ok(ExitCode::SUCCESS)
}

/// Runs check-and-rewrite passes until no fix applies. Returns the number of
/// applied edits and the changes per file.
fn fix_trees(
    analyzer: &Analyzer,
    trees: &mut [SyntaxTree],
) -> Result<(usize, BTreeMap<PathBuf, Vec<Change>>)> {
    let cancel = CancellationToken::new();
    let mut changed: BTreeMap<PathBuf, Vec<Change>> = BTreeMap::new();
    let mut total = 0;
    for pass in 1..=MAX_PASSES {
        let result = analyzer.check_trees(trees).context("Analysis failed")?;
        let edits = edits_by_file(&result.diagnostics);
        if edits.is_empty() {
            break;
        }
        let applied = apply_pass(trees, &edits, &cancel, &mut changed)?;
        tracing::debug!("Fix pass {pass}: {applied} edits applied");
        if applied == 0 {
            break;
        }
        total += applied;
    }
    Ok((total, changed))
}

/// Per-file change listing, one `  line N: title` row per edit.
fn describe(changes: &[Change]) -> String {
    changes
        .iter()
        .map(|(line, title)| format!("  line {line}: {title}\n"))
        .collect()
}

fn edits_by_file(diagnostics: &[Diagnostic]) -> HashMap<PathBuf, Vec<RewriteEdit>> {
    let mut edits: HashMap<PathBuf, Vec<RewriteEdit>> = HashMap::new();
    for diagnostic in diagnostics {
        if let Some(edit) = diagnostic.edit() {
            edits
                .entry(diagnostic.location.file.clone())
                .or_default()
                .push(edit);
        }
    }
    edits
}

/// Applies one batch per tree; returns how many edits landed.
fn apply_pass(
    trees: &mut [SyntaxTree],
    edits: &HashMap<PathBuf, Vec<RewriteEdit>>,
    cancel: &CancellationToken,
    changed: &mut BTreeMap<PathBuf, Vec<Change>>,
) -> Result<usize> {
    let mut applied = 0;
    for tree in trees.iter_mut() {
        let Some(file_edits) = edits.get(tree.path()) else {
            continue;
        };
        let outcome = apply_batch(tree, file_edits, cancel)?;
        for skipped in &outcome.skipped {
            if !matches!(skipped.reason, SkipReason::Overlap { .. }) {
                tracing::warn!(
                    "{}: skipped '{}' at {}: {}",
                    tree.path().display(),
                    skipped.edit.fix.title(),
                    skipped.edit.span,
                    skipped.reason
                );
            }
        }
        if !outcome.applied.is_empty() {
            applied += outcome.applied.len();
            let changes = changed.entry(tree.path().to_path_buf()).or_default();
            for edit in &outcome.applied {
                changes.push((tree.line_col(edit.span.start).0, edit.fix.title()));
            }
            *tree = outcome.tree;
        }
    }
    Ok(applied)
}

//! File-level orchestration: discovery, parsing, binding and dispatch.

use crate::cancellation::CancellationToken;
use crate::catalog::RuleCatalog;
use crate::config::Config;
use crate::dispatcher::{DiagnosticSink, DispatchError, Dispatcher};
use crate::semantic::SemanticModel;
use crate::syntax::SyntaxTree;
use crate::types::LintResult;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading a source file.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The analysis root does not exist.
    #[error("Root path does not exist: {0}")]
    RootNotFound(PathBuf),

    /// Directory walk error.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was cancelled.
    #[error("analysis cancelled")]
    Cancelled,
}

impl From<DispatchError> for AnalyzerError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Cancelled => Self::Cancelled,
        }
    }
}

/// A language front-end: turns source text into trees and binds them.
pub trait Frontend: Send + Sync {
    /// Human-readable language name.
    fn name(&self) -> &'static str;

    /// File extensions this front-end claims, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Parses one file. Parsing never fails; problems are recorded on the tree.
    fn parse(&self, path: &Path, source: &str) -> SyntaxTree;

    /// Binds every tree of a run together and returns one model per tree,
    /// in the same order.
    fn bind(&self, trees: &[SyntaxTree]) -> Vec<Box<dyn SemanticModel>>;
}

/// Builder for configuring an [`Analyzer`].
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    frontend: Arc<dyn Frontend>,
    catalog: RuleCatalog,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    parallelism: Option<usize>,
    cancel: CancellationToken,
}

impl AnalyzerBuilder {
    /// Creates a builder for `frontend` running `catalog`.
    #[must_use]
    pub fn new(frontend: Arc<dyn Frontend>, catalog: RuleCatalog) -> Self {
        Self {
            root: None,
            frontend,
            catalog,
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
            config: None,
            parallelism: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the root directory (or single file) to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Caps the number of worker threads.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Shares a cancellation token with the run.
    #[must_use]
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the root doesn't exist or a pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            let cwd = std::env::current_dir().map_err(|e| AnalyzerError::Io {
                path: root.clone(),
                source: e,
            })?;
            cwd.join(&root)
        };
        if !root.exists() {
            return Err(AnalyzerError::RootNotFound(root));
        }

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let mut include_patterns = self.include_patterns;
        include_patterns.extend(config.analyzer.include.iter().cloned());

        let exclude = compile_patterns(&exclude_patterns)?;
        let include = compile_patterns(&include_patterns)?;

        Ok(Analyzer {
            root,
            frontend: self.frontend,
            catalog: self.catalog,
            exclude_patterns,
            exclude,
            include,
            respect_gitignore: config.analyzer.respect_gitignore,
            parallelism: self.parallelism.or(config.analyzer.parallelism),
            cancel: self.cancel,
        })
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>, AnalyzerError> {
    patterns
        .iter()
        .map(|p| glob::Pattern::new(p).map_err(AnalyzerError::from))
        .collect()
}

/// Runs a rule catalog over every source file under a root.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    frontend: Arc<dyn Frontend>,
    catalog: RuleCatalog,
    exclude_patterns: Vec<String>,
    exclude: Vec<glob::Pattern>,
    include: Vec<glob::Pattern>,
    respect_gitignore: bool,
    parallelism: Option<usize>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("root", &self.root)
            .field("frontend", &self.frontend.name())
            .field("catalog", &self.catalog)
            .field("exclude", &self.exclude_patterns)
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder(frontend: Arc<dyn Frontend>, catalog: RuleCatalog) -> AnalyzerBuilder {
        AnalyzerBuilder::new(frontend, catalog)
    }

    /// Returns the root being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the rule catalog.
    #[must_use]
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Returns the front-end.
    #[must_use]
    pub fn frontend(&self) -> &dyn Frontend {
        &*self.frontend
    }

    /// Discovers, parses, binds and checks every file under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or reading fails, or the run is cancelled.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.discover_files()?;
        info!("Found {} {} files to analyze", files.len(), self.frontend.name());

        let mut result = self.in_pool(|| {
            let trees = self.load(&files)?;
            self.check_trees(&trees)
        })??;
        result.sort();

        info!(
            "Analysis complete: {} diagnostics in {} files",
            result.diagnostics.len(),
            result.files_checked
        );
        Ok(result)
    }

    /// Checks one in-memory source file on its own.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Cancelled`] if the run is cancelled.
    pub fn check_source(&self, path: &Path, source: &str) -> Result<LintResult, AnalyzerError> {
        let tree = self.frontend.parse(path, source);
        let mut result = self.check_trees(std::slice::from_ref(&tree))?;
        result.sort();
        Ok(result)
    }

    /// Reads and parses `files` in parallel.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or the run is cancelled.
    pub fn load(&self, files: &[PathBuf]) -> Result<Vec<SyntaxTree>, AnalyzerError> {
        files
            .par_iter()
            .map(|path| {
                if self.cancel.is_cancelled() {
                    return Err(AnalyzerError::Cancelled);
                }
                debug!("Parsing: {}", path.display());
                let source = std::fs::read_to_string(path).map_err(|e| AnalyzerError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                let tree = self.frontend.parse(path, &source);
                if !tree.errors().is_empty() {
                    warn!(
                        "{} parse errors in {}; analysing the recovered tree",
                        tree.errors().len(),
                        path.display()
                    );
                }
                Ok(tree)
            })
            .collect()
    }

    /// Binds `trees` into one compilation and checks each tree in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Cancelled`] if the run is cancelled.
    ///
    /// # Panics
    ///
    /// Panics if the front-end returns a different number of models than trees.
    pub fn check_trees(&self, trees: &[SyntaxTree]) -> Result<LintResult, AnalyzerError> {
        let models = self.frontend.bind(trees);
        assert_eq!(
            models.len(),
            trees.len(),
            "front-end {} bound {} trees into {} models",
            self.frontend.name(),
            trees.len(),
            models.len()
        );

        let dispatcher = Dispatcher::new(&self.catalog);
        let results = trees
            .par_iter()
            .zip(models.par_iter())
            .map(|(tree, model)| {
                let sink = DiagnosticSink::new();
                let report = dispatcher.run(tree, &**model, &sink, &self.cancel)?;
                debug!(
                    "{}: {} nodes, {} evaluations",
                    tree.path().display(),
                    report.nodes_visited,
                    report.evaluations
                );
                Ok(LintResult {
                    diagnostics: sink.into_vec(),
                    files_checked: 1,
                    failures: report.failures,
                })
            })
            .collect::<Result<Vec<_>, AnalyzerError>>()?;

        let mut combined = LintResult::new();
        for result in results {
            combined.extend(result);
        }
        Ok(combined)
    }

    /// Discovers every file under the root that the front-end claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory walk fails.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let extensions = self.frontend.extensions();

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let claimed = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|c| c.eq_ignore_ascii_case(ext)));
            if !claimed {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            if !self.is_included(path) {
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        if self.exclude.iter().any(|p| p.matches(&relative)) {
            return true;
        }

        // Also check as substring for patterns like "**/bin/**"
        let anchored = format!("/{relative}");
        self.exclude_patterns.iter().any(|pattern| {
            let normalized = pattern.replace("**", "");
            normalized.len() > 2 && anchored.contains(&normalized)
        })
    }

    fn is_included(&self, path: &Path) -> bool {
        if self.include.is_empty() {
            return true;
        }
        let relative = self.relative(path);
        self.include.iter().any(|p| p.matches(&relative))
    }

    fn in_pool<T, F>(&self, f: F) -> Result<T, AnalyzerError>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match self.parallelism {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                Ok(pool.install(f))
            }
            None => Ok(f()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RuleContext;
    use crate::rule::Rule;
    use crate::semantic::EmptyModel;
    use crate::syntax::{GreenNode, GreenToken, SyntaxKind, SyntaxNode, TokenKind};
    use crate::types::{Category, Diagnostic};
    use std::fs;

    /// Whole file as one token.
    struct PlainText;

    impl Frontend for PlainText {
        fn name(&self) -> &'static str {
            "plain"
        }
        fn extensions(&self) -> &'static [&'static str] {
            &["cs"]
        }
        fn parse(&self, path: &Path, source: &str) -> SyntaxTree {
            let root = GreenNode::new(
                SyntaxKind::CompilationUnit,
                vec![
                    GreenToken::new(TokenKind::Identifier, source).into(),
                    GreenToken::new(TokenKind::EndOfFile, "").into(),
                ],
            );
            SyntaxTree::new(path, root, vec![])
        }
        fn bind(&self, trees: &[SyntaxTree]) -> Vec<Box<dyn SemanticModel>> {
            trees
                .iter()
                .map(|_| Box::new(EmptyModel) as Box<dyn SemanticModel>)
                .collect()
        }
    }

    struct NoTodo;

    impl Rule for NoTodo {
        fn code(&self) -> &'static str {
            "CT9001"
        }
        fn name(&self) -> &'static str {
            "no-todo"
        }
        fn category(&self) -> Category {
            Category::Style
        }
        fn message_format(&self) -> &'static str {
            "File contains TODO"
        }
        fn triggers(&self) -> &'static [SyntaxKind] {
            &[SyntaxKind::CompilationUnit]
        }
        fn check(&self, ctx: &RuleContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
            if node.text().contains("TODO") {
                vec![ctx.diagnostic(self, node.span(), &[])]
            } else {
                Vec::new()
            }
        }
    }

    fn analyzer(root: &Path) -> AnalyzerBuilder {
        let catalog = RuleCatalog::new(vec![Box::new(NoTodo)]).unwrap();
        Analyzer::builder(Arc::new(PlainText), catalog).root(root)
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = analyzer(&dir.path().join("nope")).build().unwrap_err();
        assert!(matches!(err, AnalyzerError::RootNotFound(_)));
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = analyzer(dir.path()).exclude("[").build().unwrap_err();
        assert!(matches!(err, AnalyzerError::Glob(_)));
    }

    #[test]
    fn test_discovery_skips_build_output_and_other_languages() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/Account.cs", "class Account {}");
        write(dir.path(), "src/bin/Debug/Generated.cs", "class G {}");
        write(dir.path(), "obj/Temp.cs", "class T {}");
        write(dir.path(), "README.md", "# readme");

        let analyzer = analyzer(dir.path()).config(Config::default()).build().unwrap();
        let files = analyzer.discover_files().unwrap();
        assert_eq!(files, vec![dir.path().join("src/Account.cs")]);
    }

    #[test]
    fn test_discovery_honours_gitignore_and_includes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", "Legacy/\n");
        write(dir.path(), "Legacy/Old.cs", "class Old {}");
        write(dir.path(), "Plugins/Account.cs", "class A {}");
        write(dir.path(), "Tests/AccountTests.cs", "class T {}");

        let analyzer = analyzer(dir.path()).include("Plugins/**").build().unwrap();
        let files = analyzer.discover_files().unwrap();
        assert_eq!(files, vec![dir.path().join("Plugins/Account.cs")]);
    }

    #[test]
    fn test_analyze_collects_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.cs", "// TODO");
        write(dir.path(), "a.cs", "// TODO");
        write(dir.path(), "c.cs", "done");

        let result = analyzer(dir.path()).parallelism(2).build().unwrap().analyze().unwrap();
        assert_eq!(result.files_checked, 3);
        let files: Vec<_> = result
            .diagnostics
            .iter()
            .map(|d| d.location.file.file_name().unwrap().to_owned())
            .collect();
        assert_eq!(files, vec!["a.cs", "b.cs"]);
    }

    #[test]
    fn test_cancelled_run_reports_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.cs", "// TODO");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = analyzer(dir.path())
            .cancellation(cancel)
            .build()
            .unwrap()
            .analyze()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Cancelled));
    }

    #[test]
    fn test_check_source_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer(dir.path()).build().unwrap();
        let result = analyzer
            .check_source(Path::new("Inline.cs"), "// TODO later")
            .unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "CT9001");
    }
}

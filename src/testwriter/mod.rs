//! Test writer bot: proposes unit tests for the changed code of a pull
//! request, guided by a line coverage report.
//!
//! In `suggest` mode each proposal is posted as a review comment at the
//! end of the file's diff. In `implement` mode the generated tests are
//! written into the working tree.

pub mod collector;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::{list_repository_files, read_file, read_file_content};
use crate::coverage::{CoverageReport, uncovered_lines};
use crate::diff::last_line_number;
use crate::github::CodeHost;
use crate::models::{
    PullRequestRef, ReviewComment, RunSummary, TestImplementationResult, TestMode,
    TestSuggestionResult,
};
use crate::output::test_suggestion_body;
use crate::pipeline::{
    FileUnderAnalysis, ModelJob, PipelineError, RunSettings, post_comment, run_model_jobs,
};
use crate::prompts::{
    TEST_SYSTEM_PROMPT, TestPromptContext, build_test_implementation_prompt,
    build_test_suggestion_prompt,
};
use crate::providers::{CompletionProvider, ProviderError, parse_analysis};
use crate::testmap::{
    HeuristicMapper, MapperKind, ModelAssistedMapper, TestFileMap, TestFileMapper, select_mapper,
};

pub use collector::{PendingTestFile, TestFileCollector};

/// Test writer run options.
#[derive(Debug, Clone)]
pub struct TestWriterOptions {
    pub repo_root: PathBuf,
    /// Coverage report, relative to `repo_root` unless absolute.
    pub coverage_path: PathBuf,
    /// Extensions (without the dot) of files to write tests for.
    pub extensions: Vec<String>,
    pub mode: TestMode,
    pub test_dir: String,
    pub model_mapping_threshold: usize,
    pub code_fence_language: String,
    pub settings: RunSettings,
}

/// Per-file inputs gathered before the model calls.
struct PreparedFile {
    unit: FileUnderAnalysis,
    content: Option<String>,
    uncovered: Vec<u32>,
}

/// Runs the test writer pipeline for one pull request.
pub struct TestWriter {
    provider: Arc<dyn CompletionProvider>,
    options: TestWriterOptions,
}

impl TestWriter {
    pub fn new(provider: Arc<dyn CompletionProvider>, options: TestWriterOptions) -> Self {
        Self { provider, options }
    }

    /// Whether `filename` has one of the configured extensions.
    fn has_supported_extension(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        self.options.extensions.iter().any(|e| e == ext)
    }

    pub async fn run(
        &self,
        host: &dyn CodeHost,
        pr: &PullRequestRef,
    ) -> Result<RunSummary, PipelineError> {
        info!(pr = %pr, mode = %self.options.mode, "processing pull request");
        let files = host.list_files(pr).await?;

        let selected: Vec<FileUnderAnalysis> = files
            .into_iter()
            .filter(|file| {
                let supported = self.has_supported_extension(&file.filename);
                if !supported {
                    debug!(file = %file.filename, "skipping file with unsupported extension");
                }
                supported
            })
            .filter_map(FileUnderAnalysis::from_changed)
            .collect();

        if selected.is_empty() {
            info!("no files to write tests for");
            return Ok(RunSummary::default());
        }

        let coverage_path = self.options.repo_root.join(&self.options.coverage_path);
        let coverage = CoverageReport::load_or_empty(&coverage_path).await;
        let prepared = self.prepare(selected, &coverage).await;

        let summary = match self.options.mode {
            TestMode::Suggest => self.suggest(host, pr, &prepared, &coverage).await?,
            TestMode::Implement => self.implement(&prepared, &coverage).await,
        };

        info!(
            analyzed = summary.files_analyzed,
            posted = summary.comments_posted,
            failed = summary.comments_failed,
            written = summary.test_files_written.len(),
            "test analysis completed"
        );
        Ok(summary)
    }

    async fn prepare(
        &self,
        selected: Vec<FileUnderAnalysis>,
        coverage: &CoverageReport,
    ) -> Vec<PreparedFile> {
        let mut prepared = Vec::with_capacity(selected.len());
        for unit in selected {
            info!(
                file = %unit.filename(),
                added_lines = unit.added_lines.len(),
                "analyzing"
            );
            let content = read_file_content(&self.options.repo_root, unit.filename()).await;
            let uncovered = coverage
                .get(unit.filename())
                .map(uncovered_lines)
                .unwrap_or_default();
            if !uncovered.is_empty() {
                debug!(file = %unit.filename(), count = uncovered.len(), "found uncovered lines");
            }
            prepared.push(PreparedFile {
                unit,
                content,
                uncovered,
            });
        }
        prepared
    }

    async fn suggest(
        &self,
        host: &dyn CodeHost,
        pr: &PullRequestRef,
        prepared: &[PreparedFile],
        coverage: &CoverageReport,
    ) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        let commit_id = host.head_sha(pr).await?;

        let jobs = prepared
            .iter()
            .map(|file| {
                let code = file.unit.added_code();
                let ctx = prompt_context(file, &code, coverage);
                ModelJob {
                    system: TEST_SYSTEM_PROMPT,
                    prompt: build_test_suggestion_prompt(&ctx),
                }
            })
            .collect();
        let replies = run_model_jobs(Arc::clone(&self.provider), jobs, self.options.settings).await;

        for (file, reply) in prepared.iter().zip(replies) {
            let Some(text) = accept_reply(file, reply, &mut summary) else {
                continue;
            };
            let result: TestSuggestionResult = parse_analysis(&text);
            let line = last_line_number(file.unit.patch());

            for suggestion in &result.suggestions {
                let body = test_suggestion_body(suggestion, &self.options.code_fence_language);
                let comment =
                    ReviewComment::anchored(file.unit.filename(), &commit_id, body, line, line);
                post_comment(host, pr, &comment, &mut summary).await;
            }
        }
        Ok(summary)
    }

    async fn implement(&self, prepared: &[PreparedFile], coverage: &CoverageReport) -> RunSummary {
        let mut summary = RunSummary::default();
        let root = &self.options.repo_root;

        let tree = list_repository_files(root);
        let sources: Vec<String> = prepared
            .iter()
            .map(|f| f.unit.filename().to_string())
            .collect();
        let mapping = self.map_test_files(&sources, &tree).await;

        let mut jobs = Vec::with_capacity(prepared.len());
        let mut targets = Vec::with_capacity(prepared.len());
        for file in prepared {
            let source = file.unit.filename();
            let test_file = mapping
                .get(source)
                .cloned()
                .unwrap_or_else(|| HeuristicMapper::new(&self.options.test_dir).resolve(source, &tree));
            let existing = read_file(root, &test_file).await.ok();

            let code = file.unit.added_code();
            let ctx = prompt_context(file, &code, coverage);
            jobs.push(ModelJob {
                system: TEST_SYSTEM_PROMPT,
                prompt: build_test_implementation_prompt(
                    &ctx,
                    source,
                    &test_file,
                    existing.as_deref(),
                ),
            });
            targets.push(test_file);
        }
        let replies = run_model_jobs(Arc::clone(&self.provider), jobs, self.options.settings).await;

        let mut collector = TestFileCollector::new();
        for ((file, test_file), reply) in prepared.iter().zip(&targets).zip(replies) {
            let Some(text) = accept_reply(file, reply, &mut summary) else {
                continue;
            };
            let result: TestImplementationResult = parse_analysis(&text);
            for generated in &result.tests {
                if !generated.file.is_empty() && generated.file != *test_file {
                    debug!(
                        requested = %generated.file,
                        target = %test_file,
                        "model named a different test file, using the mapped one"
                    );
                }
                collector.add(test_file, &generated.test_code);
            }
        }

        if collector.is_empty() {
            info!("model produced no tests");
        }
        summary.test_files_written = collector.flush(root).await;
        summary
    }

    async fn map_test_files(&self, sources: &[String], tree: &[String]) -> TestFileMap {
        let heuristic = HeuristicMapper::new(&self.options.test_dir);
        let kind = select_mapper(tree.len(), self.options.model_mapping_threshold);
        debug!(?kind, tree = tree.len(), "mapping source files to test files");
        match kind {
            MapperKind::Heuristic => heuristic.map(sources, tree).await,
            MapperKind::ModelAssisted => {
                ModelAssistedMapper::new(
                    Arc::clone(&self.provider),
                    heuristic,
                    self.options.settings.retry,
                )
                .map(sources, tree)
                .await
            }
        }
    }
}

fn prompt_context<'a>(
    file: &'a PreparedFile,
    code: &'a str,
    coverage: &'a CoverageReport,
) -> TestPromptContext<'a> {
    TestPromptContext {
        code,
        full_file: file.content.as_deref(),
        coverage: coverage.get(file.unit.filename()),
        uncovered: &file.uncovered,
    }
}

/// Unwrap a model reply, counting the file as analysed or failed.
fn accept_reply(
    file: &PreparedFile,
    reply: Result<String, ProviderError>,
    summary: &mut RunSummary,
) -> Option<String> {
    match reply {
        Ok(text) => {
            summary.files_analyzed += 1;
            Some(text)
        }
        Err(e) => {
            warn!(file = %file.unit.filename(), error = %e, "model call failed, skipping file");
            summary.files_failed += 1;
            None
        }
    }
}

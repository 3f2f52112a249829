//! Mapping changed source files to the test files that should cover them.
//!
//! [`HeuristicMapper`] follows the Mix layout (`lib/a/b.ex` is tested by
//! `test/a/b_test.exs`). [`ModelAssistedMapper`] asks the model, which
//! copes with unconventional layouts but needs the repository tree in its
//! prompt, so it is only selected for trees up to a configured size.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::models::TestMappingResult;
use crate::prompts::{MAPPING_SYSTEM_PROMPT, build_mapping_prompt};
use crate::providers::{CompletionProvider, RetryPolicy, complete_with_retry, parse_analysis};

/// Source path to test path, in source order.
pub type TestFileMap = IndexMap<String, String>;

/// Decides where the tests for a source file live.
#[async_trait]
pub trait TestFileMapper: Send + Sync {
    /// Map every path in `sources` to a repo-relative test file path.
    /// `tree` lists the repository's existing files.
    async fn map(&self, sources: &[String], tree: &[String]) -> TestFileMap;
}

/// Which mapper a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    Heuristic,
    ModelAssisted,
}

/// Model-assisted mapping for trees of at most `threshold` files.
pub fn select_mapper(tree_len: usize, threshold: usize) -> MapperKind {
    if tree_len <= threshold {
        MapperKind::ModelAssisted
    } else {
        MapperKind::Heuristic
    }
}

/// Naming-convention mapper.
#[derive(Debug, Clone)]
pub struct HeuristicMapper {
    test_dir: String,
}

impl HeuristicMapper {
    pub fn new(test_dir: impl Into<String>) -> Self {
        let test_dir: String = test_dir.into();
        Self {
            test_dir: test_dir.trim_end_matches('/').to_string(),
        }
    }

    /// Conventional test path for `source`, ignoring what exists.
    ///
    /// A leading `lib/` or `src/` is replaced by the test directory,
    /// `_test` is appended to the stem and `.ex` becomes `.exs`. Files that
    /// already are tests map to themselves.
    pub fn candidate(&self, source: &str) -> String {
        if self.is_test_file(source) {
            return source.to_string();
        }

        let rest = source
            .strip_prefix("lib/")
            .or_else(|| source.strip_prefix("src/"))
            .unwrap_or(source);
        let path = Path::new(rest);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = match path.extension().map(|e| e.to_string_lossy().into_owned()) {
            Some(ext) if ext == "ex" => "exs".to_string(),
            Some(ext) => ext,
            None => String::new(),
        };
        let file_name = if ext.is_empty() {
            format!("{stem}_test")
        } else {
            format!("{stem}_test.{ext}")
        };

        match path.parent().map(|p| p.to_string_lossy().into_owned()) {
            Some(dir) if !dir.is_empty() => format!("{}/{dir}/{file_name}", self.test_dir),
            _ => format!("{}/{file_name}", self.test_dir),
        }
    }

    /// Test path for `source`, preferring an existing file with the
    /// candidate's file name.
    pub fn resolve(&self, source: &str, tree: &[String]) -> String {
        let candidate = self.candidate(source);
        if tree.iter().any(|p| *p == candidate) {
            return candidate;
        }

        let file_name = candidate.rsplit('/').next().unwrap_or(&candidate);
        let suffix = format!("/{file_name}");
        tree.iter()
            .find(|p| p.as_str() == file_name || p.ends_with(&suffix))
            .cloned()
            .unwrap_or(candidate)
    }

    fn is_test_file(&self, source: &str) -> bool {
        let stem = Path::new(source)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        stem.ends_with("_test") || source.starts_with(&format!("{}/", self.test_dir))
    }
}

#[async_trait]
impl TestFileMapper for HeuristicMapper {
    async fn map(&self, sources: &[String], tree: &[String]) -> TestFileMap {
        sources
            .iter()
            .map(|source| (source.clone(), self.resolve(source, tree)))
            .collect()
    }
}

/// Asks the model for the mapping; falls back to the heuristic for any
/// source the reply does not cover.
pub struct ModelAssistedMapper {
    provider: Arc<dyn CompletionProvider>,
    fallback: HeuristicMapper,
    retry: RetryPolicy,
}

impl ModelAssistedMapper {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        fallback: HeuristicMapper,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            fallback,
            retry,
        }
    }
}

#[async_trait]
impl TestFileMapper for ModelAssistedMapper {
    async fn map(&self, sources: &[String], tree: &[String]) -> TestFileMap {
        let prompt = build_mapping_prompt(sources, tree);
        let reply = match complete_with_retry(
            self.provider.as_ref(),
            MAPPING_SYSTEM_PROMPT,
            &prompt,
            self.retry,
        )
        .await
        {
            Ok(text) => parse_analysis::<TestMappingResult>(&text),
            Err(e) => {
                warn!(error = %e, "test mapping call failed, using naming conventions");
                TestMappingResult::default()
            }
        };

        let suggested: IndexMap<&str, &str> = reply
            .mappings
            .iter()
            .map(|m| (m.source.as_str(), m.test_file.as_str()))
            .collect();

        sources
            .iter()
            .map(|source| {
                let test_file = match suggested.get(source.as_str()) {
                    Some(test_file) => {
                        debug!(source = %source, test_file, "model mapped test file");
                        (*test_file).to_string()
                    }
                    None => {
                        let fallback = self.fallback.resolve(source, tree);
                        info!(source = %source, test_file = %fallback, "no model mapping, using naming conventions");
                        fallback
                    }
                };
                (source.clone(), test_file)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use pretty_assertions::assert_eq;

    struct Canned(Result<&'static str, &'static str>);

    #[async_trait]
    impl CompletionProvider for Canned {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ProviderError> {
            self.0
                .map(str::to_string)
                .map_err(|e| ProviderError::ApiError(e.to_string()))
        }
    }

    fn tree(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn select_by_tree_size() {
        assert_eq!(select_mapper(10, 500), MapperKind::ModelAssisted);
        assert_eq!(select_mapper(500, 500), MapperKind::ModelAssisted);
        assert_eq!(select_mapper(501, 500), MapperKind::Heuristic);
        assert_eq!(select_mapper(1, 0), MapperKind::Heuristic);
    }

    #[test]
    fn mix_layout_candidates() {
        let m = HeuristicMapper::new("test");
        assert_eq!(m.candidate("lib/shop/cart.ex"), "test/shop/cart_test.exs");
        assert_eq!(m.candidate("lib/shop.ex"), "test/shop_test.exs");
        assert_eq!(m.candidate("mix.exs"), "test/mix_test.exs");
        assert_eq!(m.candidate("src/parser.rs"), "test/parser_test.rs");
        assert_eq!(m.candidate("bin/run"), "test/bin/run_test");
    }

    #[test]
    fn test_files_map_to_themselves() {
        let m = HeuristicMapper::new("test/");
        assert_eq!(m.candidate("test/shop/cart_test.exs"), "test/shop/cart_test.exs");
        assert_eq!(m.candidate("test/support/factory.ex"), "test/support/factory.ex");
    }

    #[test]
    fn existing_file_with_same_name_wins() {
        let m = HeuristicMapper::new("test");
        let t = tree(&["apps/shop/test/cart_test.exs", "lib/shop/cart.ex"]);
        assert_eq!(m.resolve("lib/shop/cart.ex", &t), "apps/shop/test/cart_test.exs");
    }

    #[test]
    fn exact_candidate_beats_name_match() {
        let m = HeuristicMapper::new("test");
        let t = tree(&["other/cart_test.exs", "test/shop/cart_test.exs"]);
        assert_eq!(m.resolve("lib/shop/cart.ex", &t), "test/shop/cart_test.exs");
    }

    #[test]
    fn name_match_respects_path_boundaries() {
        let m = HeuristicMapper::new("test");
        let t = tree(&["test/big_cart_test.exs"]);
        assert_eq!(m.resolve("lib/cart.ex", &t), "test/cart_test.exs");
    }

    #[tokio::test]
    async fn heuristic_mapper_keeps_source_order() {
        let m = HeuristicMapper::new("test");
        let sources = tree(&["lib/b.ex", "lib/a.ex"]);
        let map = m.map(&sources, &[]).await;
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["lib/b.ex", "lib/a.ex"]);
        assert_eq!(map["lib/a.ex"], "test/a_test.exs");
    }

    #[tokio::test]
    async fn model_mapping_with_fallback_for_omitted_sources() {
        let provider = Arc::new(Canned(Ok(
            r#"{"mappings":[{"source":"lib/a.ex","test_file":"test/unit/a_test.exs"}]}"#,
        )));
        let m = ModelAssistedMapper::new(provider, HeuristicMapper::new("test"), RetryPolicy::none());
        let sources = tree(&["lib/a.ex", "lib/b.ex"]);
        let map = m.map(&sources, &tree(&["lib/a.ex", "lib/b.ex"])).await;
        assert_eq!(map["lib/a.ex"], "test/unit/a_test.exs");
        assert_eq!(map["lib/b.ex"], "test/b_test.exs");
    }

    #[tokio::test]
    async fn failed_model_call_uses_heuristic() {
        let provider = Arc::new(Canned(Err("401 unauthorized")));
        let m = ModelAssistedMapper::new(provider, HeuristicMapper::new("test"), RetryPolicy::none());
        let map = m.map(&tree(&["lib/a.ex"]), &[]).await;
        assert_eq!(map["lib/a.ex"], "test/a_test.exs");
    }

    #[tokio::test]
    async fn unparseable_reply_uses_heuristic() {
        let provider = Arc::new(Canned(Ok("I think tests go in test/.")));
        let m = ModelAssistedMapper::new(provider, HeuristicMapper::new("test"), RetryPolicy::none());
        let map = m.map(&tree(&["lib/a.ex"]), &[]).await;
        assert_eq!(map["lib/a.ex"], "test/a_test.exs");
    }
}

//! prbot: AI pull-request bots.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use prbot::analyzer::{CodeAnalyzer, ReviewOptions};
use prbot::config::Config;
use prbot::diff::{locate, reformat};
use prbot::env::Env;
use prbot::github::{CodeHost, GithubClient};
use prbot::models::{PullRequestRef, RunSummary};
use prbot::output::{DryRunHost, render_run};
use prbot::pipeline::{PipelineError, RunSettings};
use prbot::providers::rig::RigProvider;
use prbot::providers::{CompletionProvider, RetryPolicy};
use prbot::testwriter::{TestWriter, TestWriterOptions};

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, LocateArgs, ReviewArgs, TargetArgs, TestsArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

/// Logs go to stderr so `--dry-run` JSON on stdout stays clean.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Review(args) => run_review(args).await,
        Command::Tests(args) => run_tests(args).await,
        Command::Locate(args) => run_locate(args).await,
    }
}

/// Everything a pull request command needs once setup succeeded.
struct Session {
    repo_root: PathBuf,
    config: Config,
    provider: Arc<dyn CompletionProvider>,
    client: GithubClient,
    pr: PullRequestRef,
}

async fn open_session(target: &TargetArgs) -> Result<Session> {
    let env = Env::real();
    let repo_root = std::fs::canonicalize(&target.path)
        .with_context(|| format!("--path directory not found: {}", target.path.display()))?;

    let config =
        Config::load(Some(&repo_root), &env).context("failed to load configuration")?;

    let token = config
        .github
        .token
        .clone()
        .context("GITHUB_TOKEN is not set")?;
    let provider = RigProvider::new(config.provider.clone())
        .context("failed to configure the model provider")?;
    info!(provider = %config.provider.name, model = %provider.model(), "using model");

    let pr = PullRequestRef::resolve(&env, target.repo.as_deref(), target.pr)
        .context("could not determine the pull request")?;
    let client = GithubClient::new(&config.github.api_url, token);

    Ok(Session {
        repo_root,
        config,
        provider: Arc::new(provider),
        client,
        pr,
    })
}

/// The bot a command runs.
enum Bot {
    Review(CodeAnalyzer),
    Tests(TestWriter),
}

impl Bot {
    async fn run(
        &self,
        host: &dyn CodeHost,
        pr: &PullRequestRef,
    ) -> Result<RunSummary, PipelineError> {
        match self {
            Bot::Review(analyzer) => analyzer.run(host, pr).await,
            Bot::Tests(writer) => writer.run(host, pr).await,
        }
    }
}

/// Run `bot` against the real host, or record its comments and print them
/// as JSON when `dry_run` is set.
async fn dispatch(session: &Session, bot: Bot, dry_run: bool) -> Result<(), PipelineError> {
    if !dry_run {
        bot.run(&session.client, &session.pr).await?;
        return Ok(());
    }

    let recorder = DryRunHost::new(&session.client);
    let summary = bot.run(&recorder, &session.pr).await?;
    let comments = recorder.into_comments();
    println!("{}", render_run(&session.pr, &comments, &summary));
    Ok(())
}

async fn run_review(args: ReviewArgs) -> Result<()> {
    let session = open_session(&args.target).await?;
    let review = &session.config.review;

    let options = ReviewOptions {
        repo_root: session.repo_root.clone(),
        rules_path: args.rules_path.unwrap_or_else(|| review.rules_path.clone()),
        ignore_file: args.ignore_file.unwrap_or_else(|| review.ignore_file.clone()),
        settings: RunSettings {
            max_concurrent: args.max_concurrent.unwrap_or(review.max_concurrent),
            retry: RetryPolicy::default(),
        },
    };
    let bot = Bot::Review(CodeAnalyzer::new(Arc::clone(&session.provider), options));

    dispatch(&session, bot, args.target.dry_run)
        .await
        .context("code review failed")
}

async fn run_tests(args: TestsArgs) -> Result<()> {
    let session = open_session(&args.target).await?;
    let tests = &session.config.tests;

    let options = TestWriterOptions {
        repo_root: session.repo_root.clone(),
        coverage_path: args
            .coverage_path
            .clone()
            .unwrap_or_else(|| tests.coverage_path.clone()),
        extensions: args
            .normalized_extensions()
            .unwrap_or_else(|| tests.extensions.clone()),
        mode: args.mode.unwrap_or(tests.mode),
        test_dir: tests.test_dir.clone(),
        model_mapping_threshold: tests.model_mapping_threshold,
        code_fence_language: tests.code_fence_language.clone(),
        settings: RunSettings {
            max_concurrent: args.max_concurrent.unwrap_or(tests.max_concurrent),
            retry: RetryPolicy::default(),
        },
    };
    let bot = Bot::Tests(TestWriter::new(Arc::clone(&session.provider), options));

    dispatch(&session, bot, args.target.dry_run)
        .await
        .context("test analysis failed")
}

async fn run_locate(args: LocateArgs) -> Result<()> {
    let patch = tokio::fs::read_to_string(&args.patch_file)
        .await
        .with_context(|| format!("failed to read {}", args.patch_file.display()))?;

    let snippet = match (&args.snippet, &args.snippet_file) {
        (Some(snippet), _) => snippet.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("either --snippet or --snippet-file is required"),
    };

    let location = locate(Some(&patch), Some(&snippet));
    let suggestion = reformat(args.suggestion.as_deref(), location.indentation.as_deref());

    let output = serde_json::json!({
        "location": location,
        "suggestion": suggestion,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to serialize location")?
    );
    Ok(())
}

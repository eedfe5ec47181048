//! quill - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;
use tracing_subscriber::EnvFilter;

use quill::config::{self, Config};
use quill::editor::ExternalEditor;
use quill::git::GitRepository;
use quill::github::{GitHubClient, resolve_github_token};
use quill::llm::GeminiClient;
use quill::prompt::PromptTemplates;
use quill::review::TerminalPrompter;
use quill::workflow::{
    Collaborators, CommitOptions, DiffMode, Outcome, PullRequestOptions, run_commit,
    run_pull_request,
};

/// Draft commit messages and pull requests with an LLM, then review before acting.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Draft commit messages and pull requests with an LLM")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to $QUILL_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging (long form only; `-v` is passed through to `git commit`)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a commit message for the pending changes and commit
    Commit(CommitArgs),

    /// Generate a pull request for the current branch and open it on GitHub
    Pr(PrArgs),

    /// Write a default config file and prompt templates
    Init {
        /// Overwrite existing files without asking
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct CommitArgs {
    /// Describe and commit all tracked changes, not just staged ones
    #[arg(short, long, conflicts_with = "amend")]
    all: bool,

    /// Rewrite the previous commit, folding in staged changes
    #[arg(long)]
    amend: bool,

    /// Extra arguments passed to `git commit` unchanged
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    git_args: Vec<String>,
}

impl CommitArgs {
    /// Fold mode flags into the diff mode wherever they appear.
    ///
    /// Once a passthrough argument is seen clap collects everything after it,
    /// so `--amend`, `--all`, and `-a` may land in `git_args`. They are taken
    /// back out (up to a `--` separator) and re-added by the commit action.
    fn into_options(self) -> Result<CommitOptions> {
        let mut all = self.all;
        let mut amend = self.amend;
        let mut passthrough = Vec::with_capacity(self.git_args.len());
        let mut args = self.git_args.into_iter();

        for arg in args.by_ref() {
            match arg.as_str() {
                "--amend" => amend = true,
                "--all" | "-a" => all = true,
                "--" => {
                    passthrough.push(arg);
                    break;
                }
                _ => passthrough.push(arg),
            }
        }
        passthrough.extend(args);

        if all && amend {
            bail!("--all cannot be used with --amend");
        }

        Ok(CommitOptions {
            mode: DiffMode::from_commit_flags(all, amend),
            passthrough,
        })
    }
}

#[derive(Args, Debug)]
struct PrArgs {
    /// Branch the pull request merges into
    #[arg(long, default_value = "main")]
    base: String,

    /// Open the pull request as a draft
    #[arg(long)]
    draft: bool,

    /// Reviewers to request (repeat or comma-separate)
    #[arg(long)]
    reviewers: Vec<String>,

    /// Users to assign (repeat or comma-separate)
    #[arg(long)]
    assignees: Vec<String>,

    /// Labels to apply (repeat or comma-separate)
    #[arg(long)]
    labels: Vec<String>,

    /// Milestone title to attach
    #[arg(long)]
    milestone: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path =
        config::resolve_config_path(cli.config).context("Could not locate the config file")?;

    match cli.command {
        Command::Init { force } => init(&config_path, force),
        Command::Commit(args) => commit(&config_path, args).await,
        Command::Pr(args) => pr(&config_path, args).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "quill=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn init(config_path: &std::path::Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(format!(
                "{} already exists. Overwrite it and the default prompt templates?",
                config_path.display()
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

        if !overwrite {
            println!("Left the existing configuration untouched.");
            return Ok(());
        }
    }

    let written = config::write_default_files(config_path)
        .context("Failed to write the default configuration")?;

    for path in &written {
        println!("✓ Wrote {}", path.display());
    }
    println!(
        "\nSet your Gemini API key in {} (or export GEMINI_API_KEY).",
        config_path.display()
    );

    Ok(())
}

fn load_config(config_path: &std::path::Path) -> Result<Config> {
    Config::load(config_path).context("Invalid configuration. Run `quill init` to create one.")
}

fn open_repository() -> Result<GitRepository> {
    GitRepository::open(".").context("Not a git repository. Run quill from within a git repository.")
}

fn gemini_client(config: &Config) -> GeminiClient {
    GeminiClient::new(config.gemini_api_key.clone())
        .with_model(config.model.clone())
        .with_base_url(config.llm_base_url.clone())
}

async fn commit(config_path: &std::path::Path, args: CommitArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let templates =
        PromptTemplates::load(&config.commit_prompts.system, &config.commit_prompts.user)
            .context("Failed to load commit prompt templates")?;

    let repo = open_repository()?;
    let generator = gemini_client(&config);
    let editor = ExternalEditor::from_config(config.editor.as_deref());
    let collaborators = Collaborators {
        vcs: &repo,
        generator: &generator,
        prompter: &TerminalPrompter,
        editor: &editor,
    };

    let options = args.into_options()?;

    let outcome = run_commit(&collaborators, &templates, &options)
        .await
        .context("Commit failed")?;

    report(&outcome);
    Ok(())
}

async fn pr(config_path: &std::path::Path, args: PrArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let templates = PromptTemplates::load(&config.pr_prompts.system, &config.pr_prompts.user)
        .context("Failed to load pull request prompt templates")?;

    let token = resolve_github_token(config.github_token.as_deref())
        .context("GitHub authentication required to open pull requests")?;
    let host = GitHubClient::new(&token).context("Failed to create GitHub client")?;

    let repo = open_repository()?;
    let generator = gemini_client(&config);
    let editor = ExternalEditor::from_config(config.editor.as_deref());
    let collaborators = Collaborators {
        vcs: &repo,
        generator: &generator,
        prompter: &TerminalPrompter,
        editor: &editor,
    };

    let options = PullRequestOptions {
        base: args.base,
        draft: args.draft,
        reviewers: args.reviewers,
        assignees: args.assignees,
        labels: args.labels,
        milestone: args.milestone,
    };

    let outcome = run_pull_request(&collaborators, &host, &templates, &options)
        .await
        .context("Pull request failed")?;

    report(&outcome);
    Ok(())
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Committed { commit } => println!("✓ Committed {}", commit),
        Outcome::PullRequestOpened { url } => println!("✓ Opened pull request: {}", url),
        Outcome::NoChanges => println!("No changes found. Nothing to do."),
        Outcome::Cancelled => println!("Cancelled. Nothing was changed."),
    }
}

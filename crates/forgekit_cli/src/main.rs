//! Forgekit CLI - drive issues and merge requests on GitHub or GitLab.

mod commands;
mod config;

use clap::{Parser, Subcommand, ValueEnum};
use console::Term;
use forgekit::{IssueState, ProviderKind, PullRequestState, RepositoryRef};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forgekit")]
#[command(version)]
#[command(about = "Work with issues and pull requests on GitHub and GitLab")]
#[command(after_long_help = r#"EXAMPLES
    List open issues of a GitLab project:
        $ forgekit --provider gitlab --repo acme/widgets issue list --state open

    Merge a pull request:
        $ forgekit --repo acme/widgets pr merge 42 -m "Release 1.2"

CONFIGURATION
    Forgekit reads configuration from:
      1. ~/.config/forgekit/config.toml (or $XDG_CONFIG_HOME/forgekit/config.toml)
      2. ./forgekit.toml
      3. Environment variables (FORGEKIT_* prefix, e.g., FORGEKIT_GITLAB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    FORGEKIT_PROVIDER         Default provider (github or gitlab)
    FORGEKIT_REPO             Default repository (owner/name)
    FORGEKIT_GITHUB_TOKEN     GitHub personal access token (or password)
    FORGEKIT_GITLAB_TOKEN     GitLab personal access token
    FORGEKIT_GITLAB_API       GitLab API base URL (default: https://gitlab.com/api/v4)
"#)]
struct Cli {
    /// Hosting provider (github or gitlab); falls back to config
    #[arg(short, long, global = true)]
    provider: Option<ProviderKind>,

    /// Repository as owner/name; falls back to config
    #[arg(short, long, global = true)]
    repo: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authentication
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Show the configured project
    Project,
    /// Fork the configured project
    Fork {
        /// Organization to fork into (default: your own namespace)
        #[arg(short, long)]
        organization: Option<String>,
    },
    /// Issue operations
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
    /// Pull (merge) request operations
    #[command(alias = "mr")]
    Pr {
        #[command(subcommand)]
        action: PullAction,
    },
    /// List labels
    Labels,
    /// List milestones
    Milestones {
        #[arg(short, long, value_enum)]
        state: Option<StateArg>,
    },
    /// List releases
    Releases,
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Check the configured credentials against the provider
    Status,
}

#[derive(Subcommand)]
enum IssueAction {
    /// List issues
    List {
        #[arg(short, long, value_enum)]
        state: Option<StateArg>,
        /// Only issues opened by this user
        #[arg(long)]
        creator: Option<String>,
        /// Only issues assigned to this user
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Show one issue
    Show { number: u64 },
    /// Print the web URL of an issue
    Url { number: u64 },
    /// Open an issue
    Open {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        body: String,
        /// Label to apply (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,
        #[arg(short, long)]
        assignee: Option<String>,
    },
    /// Assign an issue to a user
    Assign { number: u64, assignee: String },
    /// Close an issue
    Close { number: u64 },
    /// Comment on an issue
    Comment { number: u64, body: String },
    /// List comments on an issue
    Comments { number: u64 },
}

#[derive(Subcommand)]
enum PullAction {
    /// List pull requests
    List {
        #[arg(short, long, value_enum)]
        state: Option<PullStateArg>,
    },
    /// Show one pull request
    Show { number: u64 },
    /// List the commits of a pull request
    Commits { number: u64 },
    /// Open a pull request
    Open {
        /// Target branch
        #[arg(long, default_value = "main")]
        base: String,
        /// Source branch, or owner:branch for a fork
        #[arg(long)]
        head: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        body: String,
        #[arg(long)]
        draft: bool,
    },
    /// Merge a pull request
    Merge {
        number: u64,
        #[arg(short, long, default_value = "")]
        message: String,
    },
    /// Close a pull request without merging
    Close { number: u64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum StateArg {
    Open,
    Closed,
    All,
}

impl StateArg {
    fn issue_state(self) -> Option<IssueState> {
        match self {
            StateArg::Open => Some(IssueState::Open),
            StateArg::Closed => Some(IssueState::Closed),
            StateArg::All => None,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PullStateArg {
    Open,
    Closed,
    Merged,
    All,
}

impl PullStateArg {
    fn pull_state(self) -> Option<PullRequestState> {
        match self {
            PullStateArg::Open => Some(PullRequestState::Open),
            PullStateArg::Closed => Some(PullRequestState::Closed),
            PullStateArg::Merged => Some(PullRequestState::Merged),
            PullStateArg::All => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when not attached to a terminal
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("forgekit=info,forgekit_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        commands::meta::handle_completions(*shell)?;
        return Ok(());
    }

    let provider = match cli.provider {
        Some(provider) => provider,
        None => config
            .provider
            .as_deref()
            .ok_or("No provider given (use --provider or FORGEKIT_PROVIDER)")?
            .parse::<ProviderKind>()?,
    };
    let repository: RepositoryRef = cli
        .repo
        .as_deref()
        .or(config.repo.as_deref())
        .ok_or("No repository given (use --repo or FORGEKIT_REPO)")?
        .parse()?;

    let adapter_config = config.to_adapter_config(provider)?;
    let mut adapter = forgekit::build_adapter(&adapter_config, repository)?;
    adapter.authenticate().await?;
    let adapter = adapter.as_ref();

    match cli.command {
        Commands::Auth { action } => commands::project::handle_auth(action, adapter).await?,
        Commands::Project => commands::project::handle_project(adapter).await?,
        Commands::Fork { organization } => {
            commands::project::handle_fork(organization, adapter).await?
        }
        Commands::Issue { action } => commands::issue::handle_issue(action, adapter).await?,
        Commands::Pr { action } => commands::pull::handle_pull(action, adapter).await?,
        Commands::Labels => commands::project::handle_labels(adapter).await?,
        Commands::Milestones { state } => {
            commands::project::handle_milestones(state, adapter).await?
        }
        Commands::Releases => commands::project::handle_releases(adapter).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}

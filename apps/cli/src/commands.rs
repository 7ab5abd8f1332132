//! CLI command definitions, routing, and tracing setup.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::{debug, info, warn};

use codecache_core::{
    Availability, BranchSummary, EntityAction, GraphIntegrator, IssueIntegrator,
    RepoCoordinates, SimulatedExecutor,
};
use codecache_extract::extract_file;
use codecache_shared::{AppConfig, CacheConfig, init_config, load_config, resolve_path};
use codecache_storage::KnowledgeCache;

/// File name of the hook log inside the logs directory.
const HOOK_LOG_FILE: &str = "hooks.log";

const DEFAULT_ACTIVITY_DETAILS: &str = "File operation";

const DEFAULT_PR_BASE: &str = "main";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// codecache: per-file knowledge for editor hooks.
#[derive(Parser)]
#[command(
    name = "codecache",
    version,
    about = "Extract, cache, and share per-file knowledge from editor hooks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Knowledge cache directory (overrides `[cache] root`).
    #[arg(long, env = "CODECACHE_ROOT", global = true)]
    pub cache_root: Option<String>,

    /// Project name recorded in activities and issues.
    #[arg(long, env = "PROJECT_NAME", global = true)]
    pub project: Option<String>,

    /// Directory for hooks.log (overrides `[logging] logs_dir`).
    #[arg(long, env = "CLAUDE_LOGS_DIR", global = true)]
    pub logs_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Hook actions. Names are snake_case to match existing hook scripts.
#[derive(Subcommand)]
#[command(rename_all = "snake_case")]
pub(crate) enum Command {
    /// Record a newly created file in the knowledge graph.
    Create {
        file: String,
        /// File content; read from disk when omitted.
        content: Option<String>,
    },

    /// Record an edit to an existing file in the knowledge graph.
    Edit {
        file: String,
        /// File content; read from disk when omitted.
        content: Option<String>,
    },

    /// Print the extracted file record as JSON.
    Extract {
        file: String,
        /// File content; read from disk when omitted.
        content: Option<String>,
    },

    /// Cache whitespace-separated imports and exports for a file.
    StoreFileContext {
        file: String,
        imports: String,
        exports: String,
    },

    /// Cache dependency-impact data for a file.
    StoreImpactAnalysis { file: String, data: String },

    /// Cache pattern-violation data for a file.
    StorePatternViolations { file: String, data: String },

    /// Cache optimization metrics for a file.
    StoreOptimizationMetrics { file: String, data: String },

    /// Print the cached context summary for a file.
    GetContext { file: String },

    /// Record a development activity in the knowledge graph.
    LogActivity {
        file: String,
        details: Option<String>,
    },

    /// File issues for TODO, FIXME, and HACK markers in a file.
    CreateTodosIssues { file: String },

    /// Open a review notice when a critical file changes.
    NotifyCriticalChange { file: String, change_type: String },

    /// Open a draft pull request for a feature branch with enough commits.
    CreateFeaturePr {
        branch: String,
        #[arg(default_value = DEFAULT_PR_BASE)]
        base: String,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// Config file values with CLI and environment overrides applied.
pub(crate) struct Settings {
    pub config: AppConfig,
    pub cwd: PathBuf,
    /// Problems met while resolving, logged once tracing is up.
    pub warnings: Vec<String>,
}

impl Settings {
    /// Resolve settings for this run. An unreadable config file or working
    /// directory falls back to defaults so hook commands still answer.
    pub(crate) fn resolve(cli: &Cli) -> Self {
        let mut warnings = Vec::new();
        let cwd = std::env::current_dir().unwrap_or_else(|e| {
            warnings.push(format!("cannot determine working directory: {e}"));
            PathBuf::from(".")
        });

        let mut settings = Self::from_loaded(cli, load_config(), cwd);
        warnings.append(&mut settings.warnings);
        settings.warnings = warnings;
        settings
    }

    fn from_loaded(cli: &Cli, loaded: codecache_shared::Result<AppConfig>, cwd: PathBuf) -> Self {
        let (config, warnings) = match loaded {
            Ok(config) => (config, Vec::new()),
            Err(e) => (
                AppConfig::default(),
                vec![format!("{e}; using default configuration")],
            ),
        };

        Self {
            config: apply_overrides(config, cli, &cwd),
            cwd,
            warnings,
        }
    }

    fn cache(&self) -> KnowledgeCache {
        KnowledgeCache::new(&CacheConfig::resolve(&self.config, &self.cwd))
    }

    fn logs_dir(&self) -> PathBuf {
        resolve_path(&self.config.logging.logs_dir, &self.cwd)
    }

    fn project(&self) -> &str {
        self.config.project.name.as_deref().unwrap_or("unknown")
    }
}

fn apply_overrides(mut config: AppConfig, cli: &Cli, cwd: &Path) -> AppConfig {
    if let Some(root) = &cli.cache_root {
        config.cache.root = root.clone();
    }
    if let Some(dir) = &cli.logs_dir {
        config.logging.logs_dir = dir.clone();
    }
    if let Some(name) = &cli.project {
        config.project.name = Some(name.clone());
    }
    if config.project.name.is_none() {
        config.project.name = cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
    }
    config
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags, plus an appending `hooks.log` layer.
pub(crate) fn init_tracing(cli: &Cli, settings: &Settings) {
    use tracing_subscriber::fmt::time::ChronoLocal;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = match cli.verbose {
        0 => "codecache=info",
        1 => "codecache=debug",
        _ => "codecache=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    let file_layer = open_hook_log(&settings.logs_dir()).map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
    });

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match cli.log_format {
        LogFormat::Text => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .init();
        }
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }

    for warning in &settings.warnings {
        warn!("{warning}");
    }
}

/// Open `<dir>/hooks.log` for appending. Any failure disables the file layer.
fn open_hook_log(dir: &Path) -> Option<std::fs::File> {
    std::fs::create_dir_all(dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(HOOK_LOG_FILE))
        .ok()
}

// ---------------------------------------------------------------------------
// Remote executors
// ---------------------------------------------------------------------------

fn graph_executor(config: &AppConfig) -> SimulatedExecutor {
    SimulatedExecutor::new(
        "Memory graph",
        Availability::Tcp {
            addr: config.graph.probe_addr.clone(),
            timeout: config.graph.probe_timeout(),
        },
    )
}

fn issue_executor(config: &AppConfig) -> SimulatedExecutor {
    let github = &config.github;

    let detected = if github.owner.is_none() || github.repo.is_none() {
        detect_origin()
    } else {
        None
    };
    let owner = github
        .owner
        .clone()
        .or_else(|| detected.as_ref().map(|r| r.owner.clone()));
    let repo = github
        .repo
        .clone()
        .or_else(|| detected.as_ref().map(|r| r.name.clone()));
    let token = std::env::var(&github.token_env).ok();

    let mut executor = SimulatedExecutor::new(
        "GitHub",
        Availability::Credentials {
            token,
            owner: owner.clone(),
            repo: repo.clone(),
        },
    );
    if let Some(owner) = owner {
        executor = executor.with_param("owner", owner);
    }
    if let Some(repo) = repo {
        executor = executor.with_param("repo", repo);
    }
    executor
}

/// Stdout of a successful `git` invocation.
fn git(args: &[&str]) -> Option<String> {
    let output = std::process::Command::new("git").args(args).output().ok()?;

    if !output.status.success() {
        debug!(?args, "git command failed");
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Owner and name from `git remote get-url origin`, if it points at github.com.
fn detect_origin() -> Option<RepoCoordinates> {
    RepoCoordinates::parse_remote(&git(&["remote", "get-url", "origin"])?)
}

/// Commits on `branch` that are not on `base`. `None` when the branch does
/// not exist or git cannot answer.
fn branch_summary(branch: &str, base: &str) -> Option<BranchSummary> {
    git(&["rev-parse", "--verify", branch])?;

    let range = format!("{base}..{branch}");
    let commit_count = git(&["rev-list", "--count", range.as_str()])?.trim().parse().ok()?;
    let commits = git(&["log", "--oneline", range.as_str()])?
        .lines()
        .map(String::from)
        .collect();

    Some(BranchSummary {
        branch: branch.to_string(),
        base: base.to_string(),
        commit_count,
        commits,
    })
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli, settings: Settings) -> Result<()> {
    match cli.command {
        Command::Create { file, content } => {
            cmd_record(&settings, &file, EntityAction::Create, content.as_deref())
        }
        Command::Edit { file, content } => {
            cmd_record(&settings, &file, EntityAction::Edit, content.as_deref())
        }
        Command::Extract { file, content } => cmd_extract(&file, content.as_deref()),
        Command::StoreFileContext {
            file,
            imports,
            exports,
        } => {
            let stored = settings.cache().store_file_context(&file, &imports, &exports);
            print_outcome(stored);
            Ok(())
        }
        Command::StoreImpactAnalysis { file, data } => {
            print_outcome(settings.cache().store_impact(&file, &data));
            Ok(())
        }
        Command::StorePatternViolations { file, data } => {
            print_outcome(settings.cache().store_violations(&file, &data));
            Ok(())
        }
        Command::StoreOptimizationMetrics { file, data } => {
            print_outcome(settings.cache().store_optimization(&file, &data));
            Ok(())
        }
        Command::GetContext { file } => {
            let summary = settings.cache().get_context(&file);
            println!("{}", summary.as_deref().unwrap_or("None"));
            Ok(())
        }
        Command::LogActivity { file, details } => {
            let graph =
                GraphIntegrator::new(graph_executor(&settings.config), settings.project());
            let details = details.as_deref().unwrap_or(DEFAULT_ACTIVITY_DETAILS);
            print_delivery(graph.record_activity("log_activity", &file, details));
            Ok(())
        }
        Command::CreateTodosIssues { file } => {
            let issues =
                IssueIntegrator::new(issue_executor(&settings.config), settings.project());
            let filed = issues.issues_from_markers(&file);
            println!("{filed}");
            Ok(())
        }
        Command::NotifyCriticalChange { file, change_type } => {
            let issues =
                IssueIntegrator::new(issue_executor(&settings.config), settings.project());
            print_delivery(issues.notify_critical_change(&file, &change_type));
            Ok(())
        }
        Command::CreateFeaturePr { branch, base } => cmd_feature_pr(&settings, &branch, &base),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&settings.config),
        },
    }
}

fn print_outcome(stored: bool) {
    println!("{}", if stored { "success" } else { "failed" });
}

fn print_delivery(delivered: bool) {
    println!("{}", if delivered { "success" } else { "skipped" });
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_record(
    settings: &Settings,
    file: &str,
    action: EntityAction,
    content: Option<&str>,
) -> Result<()> {
    let graph = GraphIntegrator::new(graph_executor(&settings.config), settings.project());

    let recorded = graph.record_entity(file, action, content);
    let related = graph.record_relationships(file, content);
    info!(file, ?action, recorded, related, "graph update finished");

    print_delivery(recorded);
    Ok(())
}

fn cmd_feature_pr(settings: &Settings, branch: &str, base: &str) -> Result<()> {
    let Some(summary) = branch_summary(branch, base) else {
        warn!(branch, base, "branch not found, skipping draft pull request");
        print_delivery(false);
        return Ok(());
    };

    let issues = IssueIntegrator::new(issue_executor(&settings.config), settings.project());
    print_delivery(issues.create_feature_pr(&summary));
    Ok(())
}

fn cmd_extract(file: &str, content: Option<&str>) -> Result<()> {
    let record = extract_file(file, content);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

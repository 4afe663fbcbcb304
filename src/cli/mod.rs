mod commands;
pub mod error;
pub mod utils;

use clap::{Args, Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;

use crate::remote::HttpRemote;
use crate::sync::{RealGit, Settings, SyncManager, SyncTarget, get_settings_path};

use commands::sync::Mode;
use error::CliResult;

#[derive(Parser)]
#[command(name = "vsync")]
#[command(author, version, about = "Sync a local vault folder to a remote repository", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Input fields shared by every action. Flags override the settings
/// cache; omitted fields fall back to the cached values.
#[derive(Args)]
struct TargetArgs {
    /// Git username / personal access token for the hosting API
    #[arg(short, long)]
    username: Option<String>,

    /// Git identity email
    #[arg(short, long)]
    email: Option<String>,

    /// Repository web URL (https://host/owner/repo)
    #[arg(long)]
    url: Option<String>,

    /// Vault directory to synchronize
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Optional second working copy, synced after the vault (local mode)
    #[arg(long)]
    mirror: Option<PathBuf>,

    /// Commit message (defaults to "Auto sync")
    #[arg(short, long)]
    message: Option<String>,

    /// Target branch (defaults to "main")
    #[arg(short, long)]
    branch: Option<String>,
}

impl TargetArgs {
    fn into_target(self, cached: &Settings) -> SyncTarget {
        SyncTarget {
            username: pick(self.username, &cached.username),
            email: pick(self.email, &cached.email),
            repo_url: pick(self.url, &cached.repo_url),
            vault_dir: self
                .vault
                .unwrap_or_else(|| PathBuf::from(&cached.vault_dir)),
            mirror_dir: self
                .mirror
                .or_else(|| non_empty(&cached.mirror_dir).map(PathBuf::from)),
            commit_message: self
                .message
                .or_else(|| non_empty(&cached.commit_message).map(str::to_string)),
            branch: self
                .branch
                .or_else(|| non_empty(&cached.branch).map(str::to_string)),
        }
    }
}

fn pick(flag: Option<String>, cached: &str) -> String {
    flag.unwrap_or_else(|| cached.to_string())
}

fn non_empty(cached: &str) -> Option<&str> {
    if cached.is_empty() { None } else { Some(cached) }
}

#[derive(Subcommand)]
enum Commands {
    /// List the remote repository's branches
    Branches(TargetArgs),
    /// Sync the vault into the remote repository
    Sync {
        #[command(flatten)]
        target: TargetArgs,
        /// Sync path to use
        #[arg(long, value_enum, default_value_t = Mode::Remote)]
        mode: Mode,
    },
    /// Back up the vault as a zip artifact
    Backup {
        #[command(flatten)]
        target: TargetArgs,
        /// Upload the backup to the repository's backup branch
        #[arg(long)]
        remote: bool,
        /// Destination directory for a local backup
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Restore the vault from a backup artifact
    Restore {
        #[command(flatten)]
        target: TargetArgs,
        /// Restore from the repository's backup branch
        #[arg(long)]
        remote: bool,
        /// Local archive to restore from
        #[arg(long)]
        archive: Option<PathBuf>,
    },
    /// Clear the settings cache
    ClearCache,
}

/// Initialize tracing subscriber with env filter
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vaultsync=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn new_manager(target: &SyncTarget) -> CliResult<SyncManager<RealGit, HttpRemote>> {
    Ok(SyncManager::new(
        RealGit::new(),
        HttpRemote::new(&target.username)?,
    ))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings_path = get_settings_path();

    match cli.command {
        Some(Commands::Branches(args)) => {
            let target = args.into_target(&Settings::load(&settings_path));
            let manager = new_manager(&target)?;
            println!("{}", commands::branches::run(&manager, &target).await?);
        }
        Some(Commands::Sync { target, mode }) => {
            let target = target.into_target(&Settings::load(&settings_path));
            let manager = new_manager(&target)?;
            println!(
                "{}",
                commands::sync::run(&manager, &target, mode, &settings_path).await?
            );
        }
        Some(Commands::Backup {
            target,
            remote,
            dest,
        }) => {
            let target = target.into_target(&Settings::load(&settings_path));
            let manager = new_manager(&target)?;
            println!(
                "{}",
                commands::backup::backup(&manager, &target, remote, dest.as_deref()).await?
            );
        }
        Some(Commands::Restore {
            target,
            remote,
            archive,
        }) => {
            let target = target.into_target(&Settings::load(&settings_path));
            let manager = new_manager(&target)?;
            println!(
                "{}",
                commands::backup::restore(&manager, &target, remote, archive.as_deref()).await?
            );
        }
        Some(Commands::ClearCache) => {
            println!("{}", commands::cache::clear(&settings_path)?);
        }
        None => {
            // Show help when no command provided
            let _ = Cli::parse_from(["vsync", "--help"]);
        }
    }
    Ok(())
}

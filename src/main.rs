//! template-sync CLI
//!
//! Command-line interface for synchronizing a project with its template.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::env;
use std::path::PathBuf;

use template_sync::{
    GitRepository, SyncConfig, SyncError, SyncOptions, SyncOutcome, SyncReport, Syncer,
    UpdateStatus, init,
};

#[derive(Parser)]
#[command(name = "template-sync")]
#[command(
    author,
    version,
    about = "Pull updates from the project template into this repository"
)]
struct Cli {
    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt (with --init: overwrite an existing config)
    #[arg(short, long)]
    force: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Only check whether template updates are available (exit 1 if so)
    #[arg(long, conflicts_with_all = ["dry_run", "init"])]
    check: bool,

    /// Print the --check result as JSON
    #[arg(long, requires = "check")]
    json: bool,

    /// Write a default configuration file and exit
    #[arg(long)]
    init: bool,

    /// Project directory to search for the configuration (default: current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, env = "TEMPLATE_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Template branch or ref to sync from, overriding the configuration
    #[arg(short, long)]
    branch: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "✘ error:".red().bold(), e);
            let code = e
                .downcast_ref::<SyncError>()
                .map(SyncError::exit_code)
                .unwrap_or(1);
            std::process::exit(code);
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let start_dir = match cli.path {
        Some(p) => p,
        None => env::current_dir()?,
    };

    if cli.init {
        print_header();
        println!("{}", "Initializing template-sync configuration...\n".cyan());
        let (config_path, written) = init::init(&start_dir, cli.force)?;
        if written {
            println!("\n{}", "✨ Initialization complete!".green().bold());
            println!(
                "\nNext steps:\n  1. Point {} at your template in {}\n  2. Run {} to preview a sync",
                "template.repository".cyan(),
                config_path.display().to_string().cyan(),
                "template-sync --dry-run".cyan()
            );
        }
        return Ok(0);
    }

    let config_path = match cli.config {
        Some(p) => p,
        None => SyncConfig::find_config(&start_dir)?,
    };

    if cli.verbose {
        println!(
            "Using config: {}\n",
            config_path.display().to_string().dimmed()
        );
    }

    let mut config = SyncConfig::load(&config_path)?;
    if let Some(branch) = cli.branch {
        config.template.branch = branch;
    }
    let project_root = SyncConfig::project_root(&config_path);

    let repository = GitRepository::new(&config.template, &project_root)?;
    let syncer = Syncer::new(config, project_root, Box::new(repository))?;

    if cli.check {
        let status = syncer.check_for_updates()?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            print_status(&status);
        }
        return Ok(if status.updates_available { 1 } else { 0 });
    }

    print_header();
    println!("{}", "➤ Syncing template files".cyan().bold());
    let options = SyncOptions {
        dry_run: cli.dry_run,
        force: cli.force,
        verbose: cli.verbose,
    };
    let report = syncer.sync(&options)?;

    if report.outcome == SyncOutcome::Declined {
        println!("\n{}", "Sync cancelled, no changes made.".yellow());
        return Ok(0);
    }

    print_summary(&report);
    Ok(0)
}

fn print_status(status: &UpdateStatus) {
    println!(
        "  Current version: {}",
        status.current_display().to_string().bold()
    );
    println!("  Latest version:  {}", status.latest.bold());
    if status.updates_available {
        println!(
            "\n{} Template updates available. Run {} to apply them.",
            "!".yellow(),
            "template-sync".cyan()
        );
    } else {
        println!("\n{} Up to date with the template.", "✔".green());
    }
}

fn print_summary(report: &SyncReport) {
    if report.dry_run {
        println!(
            "\n{}",
            "✨ Dry run complete, no files were changed.".green().bold()
        );
    } else {
        println!("\n{}", "✨ Sync complete!".green().bold());
    }

    println!(
        "  Updated: {}, Created: {}, Needs merge: {}, Unchanged: {}, Skipped: {}",
        report.updated.len().to_string().yellow(),
        report.created.len().to_string().green(),
        if report.merge_pending.is_empty() {
            "0".dimmed()
        } else {
            report.merge_pending.len().to_string().red()
        },
        (report.unchanged + report.kept).to_string().dimmed(),
        (report.skipped + report.excluded).to_string().dimmed(),
    );

    if let Some(version) = &report.version {
        let previous = report.previous_version.as_deref().unwrap_or("none");
        if previous == version {
            println!("  Template version: {}", version.bold());
        } else {
            println!("  Template version: {} → {}", previous.dimmed(), version.bold());
        }
    }

    if let Some(dir) = &report.backup_dir {
        println!("  Backups: {}", dir.display().to_string().dimmed());
    }

    if !report.hook_failures.is_empty() {
        println!(
            "  {} {} hook(s) failed; see warnings above",
            "!".yellow(),
            report.hook_failures.len()
        );
    }

    if !report.merge_pending.is_empty() {
        println!("\n{}", "Files needing a manual merge:".bold());
        for path in &report.merge_pending {
            println!(
                "  • {} ← {}",
                path.display().to_string().yellow(),
                template_sync::syncer::merge_file_path(path).display()
            );
        }
    }
}

fn print_header() {
    println!(
        "{}",
        r#"
╔═══════════════════════════════════════════════════════════════════╗
║                         Template Sync                             ║
║             Keep your project in step with its template           ║
╚═══════════════════════════════════════════════════════════════════╝
"#
        .cyan()
        .bold()
    );
}

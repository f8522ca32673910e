//! Pre/post sync hook execution
//!
//! Hooks are opaque shell command strings. The engine only looks at whether a
//! command succeeded; a failing hook is reported and the run carries on.

use colored::Colorize;
use std::path::Path;
use std::process::Command;

use crate::error::SyncError;

/// What a hook command produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Executes a single command string in a working directory
pub trait CommandRunner {
    fn run(&self, command: &str, cwd: &Path) -> std::io::Result<CommandOutput>;
}

/// Runs commands through `sh -c`
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, cwd: &Path) -> std::io::Result<CommandOutput> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Which side of the file application a hook list runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    PreSync,
    PostSync,
}

impl HookStage {
    pub fn label(self) -> &'static str {
        match self {
            HookStage::PreSync => "pre-sync",
            HookStage::PostSync => "post-sync",
        }
    }
}

/// Tally of one hook stage
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HookReport {
    pub ran: usize,
    pub failed: Vec<String>,
}

/// Run every hook in order. Failures are logged and collected, never raised.
/// Under `dry_run` the hooks are only announced.
pub fn run_hooks(
    runner: &dyn CommandRunner,
    stage: HookStage,
    commands: &[String],
    cwd: &Path,
    dry_run: bool,
    verbose: bool,
) -> HookReport {
    let mut report = HookReport::default();

    for command in commands {
        if dry_run {
            println!(
                "  {} Would run {} hook: {}",
                "→".cyan(),
                stage.label(),
                command
            );
            continue;
        }

        if verbose {
            println!("  Running {} hook: {}", stage.label(), command.dimmed());
        }

        report.ran += 1;
        let failure = match runner.run(command, cwd) {
            Ok(output) if output.success => {
                if verbose && !output.stdout.trim().is_empty() {
                    println!("{}", output.stdout.trim_end().dimmed());
                }
                println!("  {} {} hook: {}", "✔".green(), stage.label(), command);
                None
            }
            Ok(output) => {
                let stderr = output.stderr.trim();
                Some(if stderr.is_empty() {
                    "exited with non-zero status".to_string()
                } else {
                    stderr.to_string()
                })
            }
            Err(e) => Some(e.to_string()),
        };

        if let Some(reason) = failure {
            let err = SyncError::Hook {
                command: command.clone(),
                reason,
            };
            tracing::warn!(stage = stage.label(), error = %err, "Hook failed, continuing");
            println!("  {} {}", "!".yellow(), err);
            report.failed.push(command.clone());
        }
    }

    report
}

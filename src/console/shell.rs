use super::cli::TaskCommand;
use super::status_watch::StatusWatch;
use crate::flight_control::Supervisor;
use crate::{info, log, warn};
use clap::{Parser, Subcommand};
use std::ops::ControlFlow;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line typed into the shell.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub(super) struct ShellLine {
    #[command(subcommand)]
    pub(super) command: ShellCommand,
}

#[derive(Debug, Subcommand)]
pub(super) enum ShellCommand {
    #[command(flatten)]
    Task(TaskCommand),
    /// Cancel the running task
    Stop,
    /// Show the running task and the latest status
    Status,
    /// Cancel the running task and leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Line-oriented operator shell on stdin.
pub struct Shell<'a> {
    supervisor: &'a Supervisor,
    watch: StatusWatch,
}

impl<'a> Shell<'a> {
    pub fn new(supervisor: &'a Supervisor) -> Self {
        let watch = StatusWatch::spawn(supervisor.keychain().status());
        Self { supervisor, watch }
    }

    /// Reads commands until `quit` or end of input. Ctrl-C stops the running
    /// task, or leaves the shell if nothing is running.
    pub async fn run(&self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        info!("Shell ready, type `help` for the list of commands");
        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    if self.supervisor.is_active().await {
                        self.supervisor.stop().await;
                        continue;
                    }
                    None
                }
            };
            let Some(line) = line else { break };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            match ShellLine::try_parse_from(input.split_whitespace()) {
                Ok(parsed) => {
                    if self.execute(parsed.command).await.is_break() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = e.print();
                }
            }
        }
        if let Some(kind) = self.supervisor.stop().await {
            log!("{kind} task stopped on exit");
        }
        Ok(())
    }

    async fn execute(&self, cmd: ShellCommand) -> ControlFlow<()> {
        match cmd {
            ShellCommand::Task(task) => {
                super::launch(self.supervisor, task).await;
            }
            ShellCommand::Stop => match self.supervisor.stop().await {
                Some(kind) => log!("{kind} task stopped"),
                None => warn!("No task running"),
            },
            ShellCommand::Status => {
                let last = self.watch.last().await.map_or_else(String::new, |s| format!(" | last: {s}"));
                match self.supervisor.active_kind().await {
                    Some(kind) => info!("{kind} running{last}"),
                    None => info!("Idle{last}"),
                }
            }
            ShellCommand::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

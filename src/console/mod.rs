//! The operator surface: command-line parsing, input files and the
//! interactive shell.

mod cli;
mod coordinates;
mod input_file;
mod shell;
mod status_watch;

pub use cli::{Cli, Command, TaskCommand};
pub use shell::Shell;

use crate::flight_control::{Status, Supervisor};

/// Validates `cmd` and hands it to the supervisor. Rejected input is
/// reported on the status channel and leaves the running task alone.
pub async fn launch(supervisor: &Supervisor, cmd: TaskCommand) -> bool {
    match cmd.into_target().await {
        Ok(target) => {
            supervisor.start(target).await;
            true
        }
        Err(e) => {
            supervisor.keychain().status().report(Status::InputRejected(e.to_string()));
            false
        }
    }
}

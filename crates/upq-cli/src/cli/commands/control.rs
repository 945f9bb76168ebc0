//! `upq cancel|retry|clear` – send a command to the running uploader.

use anyhow::Result;
use upq_core::control::{default_control_socket_path, ControlCommand, ControlReply};

use crate::cli::control_socket;

pub async fn run_control(command: ControlCommand) -> Result<()> {
    let path = default_control_socket_path()?;
    let reply = control_socket::send_command(&path, command).await?;
    println!("{}", describe(command, &reply));
    Ok(())
}

pub(crate) fn describe(command: ControlCommand, reply: &ControlReply) -> String {
    match (command, reply) {
        (ControlCommand::Cancel(id), ControlReply::Ok) => format!("Canceling task {id}"),
        (ControlCommand::Cancel(id), ControlReply::Ignored) => {
            format!("Task {id} is not uploading; nothing to cancel")
        }
        (ControlCommand::Retry(id), ControlReply::Ok) => format!("Task {id} queued for retry"),
        (ControlCommand::Retry(id), ControlReply::Ignored) => {
            format!("Task {id} cannot be retried (only failed or canceled tasks can)")
        }
        (_, ControlReply::Cleared(n)) => format!("Cleared {n} completed task(s)"),
        (_, ControlReply::Invalid(line)) => format!("Uploader rejected command: {line}"),
        (_, other) => format!("Unexpected reply: {other:?}"),
    }
}

//! `upq status` – show tasks of the running uploader.

use anyhow::Result;
use upq_core::control::{default_control_socket_path, ControlCommand, ControlReply};
use upq_core::TaskSnapshot;

use crate::cli::control_socket;

pub async fn run_status() -> Result<()> {
    let path = default_control_socket_path()?;
    match control_socket::send_command(&path, ControlCommand::Status).await? {
        ControlReply::Tasks(tasks) => print!("{}", render_table(&tasks)),
        other => anyhow::bail!("unexpected reply to status: {:?}", other),
    }
    Ok(())
}

pub(crate) fn render_table(tasks: &[TaskSnapshot]) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }
    let mut out = format!("{:<6} {:<10} {:>5} {}\n", "ID", "STATUS", "PCT", "NAME");
    for t in tasks {
        out.push_str(&format!(
            "{:<6} {:<10} {:>4}% {}",
            t.id, t.status, t.progress, t.name
        ));
        if let Some(msg) = &t.error_message {
            out.push_str(&format!("  ({msg})"));
        }
        out.push('\n');
    }
    out
}

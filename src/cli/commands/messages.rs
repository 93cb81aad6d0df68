//! Contact inbox listing

use anyhow::Result;
use colored::Colorize;

use super::{open_store, runtime};
use crate::cli::Cli;

pub(crate) fn cmd_messages(cli: &Cli, unread_only: bool, json: bool) -> Result<()> {
    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(cli).await?;
        let messages = store.list_messages(unread_only).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&messages)?);
        } else if messages.is_empty() {
            println!("No messages.");
        } else {
            for msg in &messages {
                let marker = if msg.read { " ".normal() } else { "●".yellow() };
                println!(
                    "{} {} <{}> {} {}",
                    marker,
                    msg.name.bold(),
                    msg.email,
                    msg.phone,
                    msg.created_at.dimmed()
                );
                for line in msg.message.lines() {
                    println!("    {}", line);
                }
            }
            if !cli.quiet {
                let unread = store.unread_message_count().await?;
                println!();
                println!("{} message(s), {} unread", messages.len(), unread);
            }
        }

        store.close().await?;
        Ok::<_, anyhow::Error>(())
    })
}

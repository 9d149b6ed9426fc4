// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier send`, `courier batch`, and `courier delete` command
//! implementations.

use std::path::Path;

use clap::Args;
use colored::Colorize;
use courier_config::CourierConfig;
use courier_core::{
    CourierError, CreateMessage, MessageApi, MessageId, MessagePayload, SendBatch, SendMessage,
};

use crate::list::{colored_status, to_pretty_json};

/// Arguments for `courier create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Owning bot id.
    #[arg(long)]
    pub bot_id: String,

    /// Message text.
    #[arg(long)]
    pub content: String,

    /// Destination address to attach to the draft.
    #[arg(long)]
    pub to: Option<String>,
}

/// Run the `courier create` command: persists a draft in `pending` state.
pub async fn run_create(
    config: &CourierConfig,
    args: CreateArgs,
    json: bool,
) -> Result<(), CourierError> {
    let repo = crate::repository(config)?;
    let message = repo
        .create(CreateMessage {
            bot_id: args.bot_id,
            content: args.content,
            payload: MessagePayload::Text,
            to_number: args.to,
        })
        .await?;

    if json {
        println!("{}", to_pretty_json(&message)?);
    } else {
        println!(
            "{} {} ({})",
            "created".green(),
            message.id,
            colored_status(message.status)
        );
    }
    Ok(())
}

/// Arguments for `courier send`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Destination address (phone number or channel address).
    #[arg(long)]
    pub to: String,

    /// Message text.
    #[arg(long)]
    pub content: String,

    /// Owning bot id.
    #[arg(long)]
    pub bot_id: Option<String>,
}

/// Run the `courier send` command.
pub async fn run_send(
    config: &CourierConfig,
    args: SendArgs,
    json: bool,
) -> Result<(), CourierError> {
    let repo = crate::repository(config)?;
    let message = repo
        .send(SendMessage {
            to: args.to,
            content: args.content,
            payload: MessagePayload::Text,
            bot_id: args.bot_id,
            idempotency_key: None,
        })
        .await?;

    if json {
        println!("{}", to_pretty_json(&message)?);
    } else {
        println!(
            "{} {} ({})",
            "dispatched".green(),
            message.id,
            colored_status(message.status)
        );
    }
    Ok(())
}

/// Run the `courier batch` command: dispatches a JSON array of send
/// payloads and reports accepted and rejected counts.
pub async fn run_batch(
    config: &CourierConfig,
    file: &Path,
    json: bool,
) -> Result<(), CourierError> {
    let raw = std::fs::read_to_string(file).map_err(|e| CourierError::Validation {
        field: "file",
        message: format!("cannot read {}: {e}", file.display()),
    })?;
    let messages = parse_batch_file(&raw)?;

    let repo = crate::repository(config)?;
    let outcome = repo.send_batch(SendBatch { messages }).await?;

    if json {
        println!("{}", to_pretty_json(&outcome)?);
        return Ok(());
    }

    println!(
        "accepted {} of {}",
        outcome.total.to_string().green(),
        outcome.total as usize + outcome.rejected.len()
    );
    for rejection in &outcome.rejected {
        println!(
            "  {} entry {}: {}",
            "rejected".red(),
            rejection.index,
            rejection.reason
        );
    }
    Ok(())
}

/// Parses the batch file: a JSON array of send payloads. Entries without a
/// `type` tag default to `text`.
fn parse_batch_file(raw: &str) -> Result<Vec<SendMessage>, CourierError> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| CourierError::Validation {
            field: "file",
            message: format!("batch file must be a JSON array: {e}"),
        })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, mut entry)| {
            if let Some(obj) = entry.as_object_mut()
                && !obj.contains_key("type")
            {
                obj.insert("type".to_string(), serde_json::Value::String("text".into()));
            }
            serde_json::from_value(entry).map_err(|e| CourierError::Validation {
                field: "file",
                message: format!("entry {index} is not a valid send payload: {e}"),
            })
        })
        .collect()
}

/// Run the `courier delete` command. Deleting an id the backend no longer
/// knows is reported as already gone, not as a failure.
pub async fn run_delete(config: &CourierConfig, id: &str) -> Result<(), CourierError> {
    let repo = crate::repository(config)?;
    match repo.remove(&MessageId::from(id)).await {
        Ok(()) => {
            println!("{} {id}", "deleted".green());
            Ok(())
        }
        Err(CourierError::NotFound { .. }) => {
            println!("{} {id} (already gone)", "deleted".yellow());
            Ok(())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::MessageKind;

    #[test]
    fn batch_entries_default_to_text() {
        let raw = r#"[{"to": "+5511999999999", "content": "hi"}]"#;
        let messages = parse_batch_file(raw).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].payload.kind(), MessageKind::Text);
    }

    #[test]
    fn batch_entries_keep_explicit_payloads() {
        let raw = r#"[{
            "to": "+5511999999999",
            "content": "your invoice",
            "type": "template",
            "metadata": {"name": "invoice", "variables": {"month": "August"}}
        }]"#;
        let messages = parse_batch_file(raw).unwrap();
        assert_eq!(messages[0].payload.kind(), MessageKind::Template);
    }

    #[test]
    fn malformed_entry_names_its_index() {
        let raw = r#"[{"to": "+55", "content": "ok"}, 42]"#;
        let err = parse_batch_file(raw).unwrap_err();
        assert!(err.to_string().contains("entry 1"), "got: {err}");
    }
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier list` and `courier get` command implementations.

use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use courier_config::CourierConfig;
use courier_core::{
    CourierError, Message, MessageApi, MessageFilter, MessageId, MessageKind, MessageStatus,
    Page, SortOrder,
};

/// Arguments for `courier list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only messages owned by this bot.
    #[arg(long)]
    pub bot_id: Option<String>,

    /// Only messages in this delivery state (pending, sent, failed, delivered).
    #[arg(long)]
    pub status: Option<String>,

    /// Only messages of this payload kind (text, media, template).
    #[arg(long, value_name = "TYPE")]
    pub kind: Option<String>,

    /// Only messages created at or after this RFC 3339 timestamp.
    #[arg(long)]
    pub since: Option<String>,

    /// Only messages created at or before this RFC 3339 timestamp.
    #[arg(long)]
    pub until: Option<String>,

    /// Page size (defaults to query.default_limit).
    #[arg(long)]
    pub limit: Option<u32>,

    /// Page offset.
    #[arg(long)]
    pub offset: Option<u32>,
}

/// Run the `courier list` command.
pub async fn run_list(
    config: &CourierConfig,
    args: ListArgs,
    json: bool,
) -> Result<(), CourierError> {
    let repo = crate::repository(config)?;
    let filter = build_filter(&args)?;
    let page = Page {
        limit: args.limit.unwrap_or(config.query.default_limit),
        offset: args.offset.unwrap_or(0),
        order_by: config.query.order_by.clone(),
        order: parse_order(&config.query.order)?,
    };

    let messages = repo.list(&page, &filter).await?;
    if json {
        println!("{}", to_pretty_json(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("no messages match");
        return Ok(());
    }
    for message in &messages {
        print_message_line(message);
    }
    Ok(())
}

/// Run the `courier get` command.
pub async fn run_get(config: &CourierConfig, id: &str, json: bool) -> Result<(), CourierError> {
    let repo = crate::repository(config)?;
    let message = repo.get(&MessageId::from(id)).await?;

    if json {
        println!("{}", to_pretty_json(&message)?);
        return Ok(());
    }

    print_message_line(&message);
    if let Some(error) = &message.error_message {
        println!("  error: {}", error.red());
    }
    if let Some(sent_at) = message.sent_at {
        println!("  sent at: {sent_at}");
    }
    if let Some(delivered_at) = message.delivered_at {
        println!("  delivered at: {delivered_at}");
    }
    if message.retry_count > 0 {
        println!("  retries: {}", message.retry_count);
    }
    Ok(())
}

fn build_filter(args: &ListArgs) -> Result<MessageFilter, CourierError> {
    Ok(MessageFilter {
        bot_id: args.bot_id.clone(),
        kind: args.kind.as_deref().map(parse_kind).transpose()?,
        status: args.status.as_deref().map(parse_status).transpose()?,
        start_date: args.since.as_deref().map(parse_timestamp).transpose()?,
        end_date: args.until.as_deref().map(parse_timestamp).transpose()?,
    })
}

fn parse_status(s: &str) -> Result<MessageStatus, CourierError> {
    s.parse().map_err(|_| CourierError::Validation {
        field: "status",
        message: format!("`{s}` is not one of pending, sent, failed, delivered"),
    })
}

fn parse_kind(s: &str) -> Result<MessageKind, CourierError> {
    s.parse().map_err(|_| CourierError::Validation {
        field: "type",
        message: format!("`{s}` is not one of text, media, template"),
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, CourierError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CourierError::Validation {
            field: "date",
            message: format!("`{s}` is not an RFC 3339 timestamp: {e}"),
        })
}

fn parse_order(s: &str) -> Result<SortOrder, CourierError> {
    s.parse().map_err(|_| {
        CourierError::Config(format!("query.order `{s}` is not `asc` or `desc`"))
    })
}

pub(crate) fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, CourierError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CourierError::Internal(format!("failed to render output: {e}")))
}

pub(crate) fn colored_status(status: MessageStatus) -> colored::ColoredString {
    match status {
        MessageStatus::Pending => "pending".yellow(),
        MessageStatus::Sent => "sent".green(),
        MessageStatus::Failed => "failed".red(),
        MessageStatus::Delivered => "delivered".blue(),
    }
}

fn print_message_line(message: &Message) {
    println!(
        "{}  {:>9}  {:8}  {}  {}",
        message.id.to_string().dimmed(),
        colored_status(message.status),
        message.payload.kind().to_string(),
        message.to_number.as_deref().unwrap_or("-"),
        message.content,
    );
}

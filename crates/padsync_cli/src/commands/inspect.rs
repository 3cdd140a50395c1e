//! Inspect command implementation.

use padsync_store::{FileStore, LocalRecord, LocalStore};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Mirror inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Mirror directory.
    pub path: String,
    /// Mirrored records.
    pub records: Vec<RecordSummary>,
}

/// Summary of a single mirrored record.
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    /// User id.
    pub user_id: String,
    /// Last version known to match the server.
    pub version: u64,
    /// Unconfirmed edit pending.
    pub dirty: bool,
    /// Content length in bytes.
    pub content_len: usize,
    /// Content (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RecordSummary {
    fn new(user_id: String, record: LocalRecord, show_content: bool) -> Self {
        Self {
            user_id,
            version: record.version,
            dirty: record.dirty,
            content_len: record.content.len(),
            content: show_content.then_some(record.content),
        }
    }
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    user: Option<&str>,
    show_content: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No mirror found at {:?}", path).into());
    }

    let store = FileStore::open(path)?;
    let users = match user {
        Some(user) => vec![user.to_string()],
        None => store.users(),
    };

    debug!(path = %store.path().display(), users = users.len(), "inspecting mirror");

    let mut records = Vec::with_capacity(users.len());
    for user_id in users {
        match store.get(&user_id)? {
            Some(record) => records.push(RecordSummary::new(user_id, record, show_content)),
            None if user.is_some() => {
                return Err(format!("No mirrored record for user {user_id}").into())
            }
            None => {}
        }
    }

    let result = InspectResult {
        path: store.path().display().to_string(),
        records,
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Mirror: {}", result.path);
    println!("Records: {}", result.records.len());

    for record in &result.records {
        println!();
        println!("  User:    {}", record.user_id);
        println!("  Version: {}", record.version);
        println!("  Dirty:   {}", record.dirty);
        println!("  Length:  {} bytes", record.content_len);
        if let Some(content) = &record.content {
            println!("  Content:");
            for line in content.lines() {
                println!("    {line}");
            }
        }
    }
}

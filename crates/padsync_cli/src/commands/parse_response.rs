//! Parse-response command implementation.

use padsync_protocol::{parse_response, TransportResponse, STATUS_OK};
use serde::Serialize;
use std::io::Read;

/// How the engine would read a response.
#[derive(Debug, Serialize)]
pub struct ParseResult {
    /// Whether the engine would consider itself online afterwards.
    pub online: bool,
    /// Reported version.
    pub version: Option<u64>,
    /// Reported content.
    pub content: Option<String>,
    /// Error, if the response is a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the parse-response command.
pub fn run(
    status: Option<u16>,
    status_text: &str,
    body: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = if body == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        body.to_string()
    };

    let response = match status {
        Some(status) => TransportResponse::with_status(status, status_text, body),
        None => TransportResponse::unreachable(),
    };

    let result = match parse_response(&response, STATUS_OK) {
        Ok(parsed) => ParseResult {
            online: true,
            version: parsed.version,
            content: parsed.content,
            error: None,
        },
        Err(e) => ParseResult {
            online: !e.is_offline(),
            version: None,
            content: None,
            error: Some(e.to_string()),
        },
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            println!("Online:  {}", result.online);
            match result.version {
                Some(version) => println!("Version: {version}"),
                None => println!("Version: (absent)"),
            }
            match &result.content {
                Some(content) => println!("Content: {content:?}"),
                None => println!("Content: (absent)"),
            }
            if let Some(error) = &result.error {
                println!("Error:   {error}");
            }
        }
    }

    Ok(())
}

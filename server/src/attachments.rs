//! Attachment decoding and staging
//!
//! Attachments arrive inline as `data:<mime>;base64,<payload>` URLs and are
//! staged on local disk for the lifetime of one orchestration run.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use tracing::warn;

use crate::errors::EngineError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::models::artifact::ProcessedAttachment;
use crate::models::request::AttachmentRef;

/// Name used when an attachment does not carry one
const UNTITLED_NAME: &str = "untitled_attachment";

/// Filename extensions treated as text regardless of declared mime type
const TEXT_EXTENSIONS: [&str; 4] = [".md", ".csv", ".json", ".txt"];

/// Maximum characters of text preview per attachment summary
const PREVIEW_CHARS: usize = 800;

/// Decode inline data URLs into staged files.
///
/// Non-data URLs are skipped silently. Decode or write failures are logged
/// and skipped so one bad attachment never sinks the rest.
pub async fn process_attachments(
    refs: &[AttachmentRef],
    staging: &Dir,
) -> Vec<ProcessedAttachment> {
    let mut processed = Vec::new();

    for attachment in refs {
        let name = if attachment.name.is_empty() {
            UNTITLED_NAME.to_string()
        } else {
            attachment.name.clone()
        };

        if !attachment.url.starts_with("data:") {
            continue;
        }

        match stage_attachment(&name, &attachment.url, staging).await {
            Ok(item) => processed.push(item),
            Err(e) => warn!("Failed to process attachment {}: {}", name, e),
        }
    }

    processed
}

async fn stage_attachment(
    name: &str,
    data_url: &str,
    staging: &Dir,
) -> Result<ProcessedAttachment, EngineError> {
    // Staged files must stay inside the staging directory
    if name.contains("..") || name.starts_with('/') {
        return Err(EngineError::DecodeError(format!(
            "attachment name escapes the staging directory: {}",
            name
        )));
    }

    let (mime, bytes) = decode_data_url(data_url)?;
    let file = staging.file(name);
    file.write_bytes(&bytes).await?;

    Ok(ProcessedAttachment {
        name: name.to_string(),
        storage_path: file.path().to_path_buf(),
        mime,
        size: bytes.len() as u64,
    })
}

/// Split a data URL into its declared mime type and decoded payload
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), EngineError> {
    let (header, payload) = data_url.split_once(',').ok_or_else(|| {
        EngineError::DecodeError("data URL has no payload separator".to_string())
    })?;

    let mime = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .unwrap_or("")
        .to_string();

    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| EngineError::DecodeError(format!("invalid base64 payload: {}", e)))?;

    Ok((mime, bytes))
}

/// Whether an attachment should be committed as UTF-8 text
pub fn is_text_like(mime: &str, name: &str) -> bool {
    mime.starts_with("text") || TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Build one summary line per staged attachment for prompt context.
///
/// Text-like files carry a short content preview with newlines escaped so
/// each summary stays on one line, CSV files their first rows, everything
/// else its byte size.
pub async fn summarize_attachments(processed: &[ProcessedAttachment]) -> String {
    let mut summaries = Vec::with_capacity(processed.len());
    for item in processed {
        summaries.push(summarize(item).await);
    }
    summaries.join("\n")
}

async fn summarize(item: &ProcessedAttachment) -> String {
    if !is_text_like(&item.mime, &item.name) {
        return format!("- {} ({}): {} bytes", item.name, item.mime, item.size);
    }

    match File::new(&item.storage_path).read_bytes().await {
        Ok(bytes) => {
            let contents = String::from_utf8_lossy(&bytes);
            let preview = if item.name.ends_with(".csv") {
                contents.lines().take(3).collect::<Vec<_>>().join("\\n")
            } else {
                let head: String = contents.chars().take(PREVIEW_CHARS).collect();
                head.replace('\n', "\\n").chars().take(PREVIEW_CHARS).collect()
            };
            format!("- {} ({}): {}", item.name, item.mime, preview)
        }
        Err(e) => format!("- {} ({}): (preview unavailable: {})", item.name, item.mime, e),
    }
}

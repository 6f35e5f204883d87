//! Turns fetched memo records into the markdown blocks that land in
//! daily notes.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use vault_sync_types::{DailyRecord, MemoResource};

/// Tag token appended to every imported record line.
pub const DAILY_RECORD_TAG: &str = "#daily-record";

static CHECKBOX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^- \[.*?\]").unwrap());
static BULLET_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([-*\u{2022}]|\d+\.) ").unwrap());

/// One record rendered for insertion: the daily note date it belongs to,
/// the effective unix timestamp (also the block anchor), and the markdown
/// block itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRecord {
    pub date: String,
    pub timestamp: i64,
    pub markdown: String,
}

/// True for lines already shaped like a list item (bullet, star, unicode
/// bullet, or a "1."-style ordered prefix).
pub fn is_bullet_list(line: &str) -> bool {
    BULLET_LIST_RE.is_match(line)
}

/// Render one memo record as a markdown block.
///
/// The first line carries the time, the `#daily-record` tag, and a
/// `^<timestamp>` block anchor. Remaining non-blank lines are indented one
/// level as bullets, and each attached resource contributes one indented
/// link line.
pub fn format_daily_record(record: &DailyRecord) -> Result<FormattedRecord, String> {
    let timestamp = effective_timestamp(record)?;
    let moment = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| format!("Record timestamp {} is out of range", timestamp))?;
    let date = moment.format("%Y-%m-%d").to_string();
    let time = moment.format("%H:%M").to_string();

    let content = record.content.trim();
    let mut lines = content.split('\n');
    let first_line = lines.next().unwrap_or("");
    let mut remainder: Vec<&str> = lines.collect();

    let mut anchor_line = if CHECKBOX_RE.is_match(first_line) {
        let rest = CHECKBOX_RE.replace(first_line, "");
        join_anchor_line(format!("- [ ] {}", time), rest.trim_start())
    } else if first_line.contains("```") {
        // a code fence must never open on the anchor line
        remainder.insert(0, first_line);
        format!("- {}", time)
    } else {
        let rest = first_line.strip_prefix("- ").unwrap_or(first_line);
        join_anchor_line(format!("- {}", time), rest.trim_start())
    };

    anchor_line.push_str(&format!(" {} ^{}", DAILY_RECORD_TAG, timestamp));

    let mut markdown = anchor_line;

    let continuation: Vec<String> = remainder
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if is_bullet_list(line) {
                format!("\t{}", line)
            } else {
                format!("\t- {}", line)
            }
        })
        .collect();
    if !continuation.is_empty() {
        markdown.push('\n');
        markdown.push_str(continuation.join("\n").trim_end());
    }

    if !record.resource_list.is_empty() {
        let resource_lines: Vec<String> = record
            .resource_list
            .iter()
            .map(|resource| format!("\t- {}", generate_file_link(resource)))
            .collect();
        markdown.push('\n');
        markdown.push_str(&resource_lines.join("\n"));
    }

    Ok(FormattedRecord {
        date,
        timestamp,
        markdown,
    })
}

fn join_anchor_line(prefix: String, rest: &str) -> String {
    if rest.is_empty() {
        prefix
    } else {
        format!("{} {}", prefix, rest)
    }
}

/// The effective timestamp of a record: the ISO `createdAt` field when it
/// is present and non-empty, else the unix-seconds `createdTs` field.
fn effective_timestamp(record: &DailyRecord) -> Result<i64, String> {
    if let Some(created_at) = record.created_at.as_deref().filter(|value| !value.is_empty()) {
        return parse_iso_seconds(created_at);
    }
    record
        .created_ts
        .ok_or_else(|| "Record has no creation timestamp".to_string())
}

fn parse_iso_seconds(value: &str) -> Result<i64, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.timestamp());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(parsed.and_utc().timestamp());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(parsed.and_utc().timestamp());
    }
    Err(format!("Unrecognized record timestamp '{}'", value))
}

/// Markdown link line for one attached resource.
///
/// Resources with an external link become `[name](url)`, embedded with a
/// `!` prefix only when the type string contains "image". Everything else
/// becomes a vault embed of the downloaded file.
pub fn generate_file_link(resource: &MemoResource) -> String {
    let external_link = resource
        .external_link
        .as_deref()
        .filter(|link| !link.is_empty());
    let Some(link) = external_link else {
        return format!("![[{}]]", generate_file_name(resource));
    };

    let is_image = resource
        .mime_type
        .as_deref()
        .map(|mime| mime.contains("image"))
        .unwrap_or(false);
    let prefix = if is_image { "!" } else { "" };
    let label = resource
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(resource.filename.as_str());
    format!("{}[{}]({})", prefix, label, link)
}

/// Identifier used for download URLs and local file names: the explicit id
/// when present, else the second segment of the API resource name
/// ("resources/7" style). The name split follows the remote naming
/// convention and must stay as-is.
pub fn resource_identifier(resource: &MemoResource) -> Option<String> {
    if let Some(id) = &resource.id {
        return Some(id.to_string());
    }
    resource
        .name
        .as_deref()
        .and_then(|name| name.split('/').nth(1))
        .map(str::to_string)
}

/// Local file name for a downloaded resource: `<identifier>-<filename>`
/// with path-hostile characters replaced by `-`.
pub fn generate_file_name(resource: &MemoResource) -> String {
    let identifier = resource_identifier(resource).unwrap_or_default();
    format!("{}-{}", identifier, sanitize_filename(&resource.filename))
}

fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '-',
            other => other,
        })
        .collect()
}

use std::time::Duration;

use regex::Regex;

/// Milliseconds to wait after creating a note before reading it back.
pub const INDEX_SETTLE_MS: u64 = 30;

/// Severity for user-facing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Emit a notice at the given severity. Error severity also hands the
/// message back as an `Err` so callers can abort with `?`.
pub fn log_message(message: &str, level: LogLevel) -> Result<(), String> {
    match level {
        LogLevel::Info => {
            log::info!("{}", message);
            Ok(())
        }
        LogLevel::Warn => {
            log::warn!("{}", message);
            Ok(())
        }
        LogLevel::Error => Err(notice_error(message)),
    }
}

/// Log at error severity and return the message for an early `Err` return.
pub fn notice_error(message: &str) -> String {
    log::error!("{}", message);
    message.to_string()
}

/// Build the matcher for a heading section inside a note.
///
/// A configured heading without a leading `#` gets one prepended. The
/// pattern is deliberately unanchored, so "# Daily Record" also matches
/// inside "## Daily Record" at any heading depth. Three capture groups:
/// the heading line, the section body, and the terminator (the newline
/// before the next `##` heading, or empty at end of note).
pub fn header_regex(header: &str) -> Result<Regex, String> {
    let trimmed = header.trim();
    let formatted = if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("# {}", trimmed)
    };
    let pattern = format!(r"(?s)({}[^\n]*)(.*?)(\n##|\z)", regex::escape(&formatted));
    Regex::new(&pattern).map_err(|e| format!("Invalid daily record header '{}': {}", header, e))
}

/// Short pause after creating a note so immediately-following reads see
/// the file on disk.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(INDEX_SETTLE_MS)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "# 2023-11-14\n\n## Daily Record\n\n- 09:00 old ^1699947600\n\n## Tasks\n- [ ] thing\n";

    #[test]
    fn test_matches_deeper_heading_levels() {
        let re = header_regex("Daily Record").unwrap();
        let caps = re.captures(NOTE).expect("section should match");
        assert_eq!(&caps[1], "# Daily Record");
        assert_eq!(&caps[2], "\n\n- 09:00 old ^1699947600\n");
        assert_eq!(&caps[3], "\n##");
    }

    #[test]
    fn test_section_extends_to_end_of_note() {
        let re = header_regex("Daily Record").unwrap();
        let note = "## Daily Record\n\n- 09:00 old ^1699947600\n";
        let caps = re.captures(note).expect("section should match");
        assert_eq!(&caps[2], "\n\n- 09:00 old ^1699947600\n");
        assert_eq!(&caps[3], "");
    }

    #[test]
    fn test_keeps_explicit_heading_prefix() {
        let re = header_regex("### Log").unwrap();
        assert!(re.captures("### Log\nbody\n").is_some());
        assert!(re.captures("## Log\nbody\n").is_none());
    }

    #[test]
    fn test_missing_header_does_not_match() {
        let re = header_regex("Daily Record").unwrap();
        assert!(re.captures("# 2023-11-14\n\n## Tasks\n").is_none());
    }

    #[test]
    fn test_error_level_returns_the_message() {
        assert_eq!(log_message("fine", LogLevel::Info), Ok(()));
        assert_eq!(log_message("also fine", LogLevel::Warn), Ok(()));
        assert_eq!(
            log_message("broken", LogLevel::Error),
            Err("broken".to_string())
        );
    }
}

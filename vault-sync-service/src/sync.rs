//! One-shot import of memo records into daily notes.
//!
//! The pipeline pages through the memo listing, formats each record,
//! groups them by day, downloads missing attachments, then ensures each
//! daily note exists and inserts unseen records under the configured
//! heading. Everything runs sequentially inside the calling request and
//! every step is attempt-once with no retries.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use vault_sync_types::{
    DailyRecord, ListMemosResult, ListResourcesResult, PeriodKind, SyncReport,
};

use crate::config::{Settings, defaults};
use crate::memos_client::MemosClient;
use crate::periodic::create_periodic_file;
use crate::record::{format_daily_record, generate_file_name, resource_identifier};
use crate::util::{LogLevel, header_regex, log_message, notice_error};
use crate::vault::file_ops;
use crate::vault::template::CreateOutcome;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\^(\d+)").unwrap());

/// Run one full import against the configured vault.
pub async fn run_sync(settings: &Settings, client: &MemosClient) -> Result<SyncReport, String> {
    let Some(vault_root) = settings.vault_root.clone() else {
        return Err(notice_error(
            "Vault root is not configured; set VAULT_SYNC_VAULT_ROOT",
        ));
    };
    if settings.periodic_notes_path.is_none() {
        return Err(notice_error(
            "Periodic notes path is not configured; set VAULT_SYNC_PERIODIC_PATH",
        ));
    }

    let header_re = header_regex(&settings.daily_record_header)?;
    let mut report = SyncReport::default();

    // 1. page through the memo listing until a short page
    let mut records: Vec<DailyRecord> = Vec::new();
    let mut page = 0usize;
    loop {
        match client.list_memos(page, defaults::MEMOS_PAGE_SIZE).await? {
            ListMemosResult::Failure(failure) => {
                let message = format!("Memos list failed: {}", failure.describe());
                log::warn!("[VAULT_SYNC] {}", message);
                report.messages.push(message);
                break;
            }
            result => {
                let batch = result.records();
                let count = batch.len();
                records.extend(batch);
                if count < defaults::MEMOS_PAGE_SIZE {
                    break;
                }
                page += 1;
            }
        }
    }
    report.fetched = records.len();
    log::info!(
        "[VAULT_SYNC] Fetched {} memo record(s) over {} page(s)",
        report.fetched,
        page + 1
    );

    // 2. download attachments that are not on disk yet
    match client.list_resources().await {
        Ok(ListResourcesResult::Failure(failure)) => {
            let message = format!("Resource list failed: {}", failure.describe());
            log::warn!("[VAULT_SYNC] {}", message);
            report.messages.push(message);
        }
        Ok(result) => {
            let attachment_folder = vault_root.join(&settings.attachment_folder);
            for resource in result.records() {
                if resource
                    .external_link
                    .as_deref()
                    .is_some_and(|link| !link.is_empty())
                {
                    continue;
                }
                let Some(identifier) = resource_identifier(&resource) else {
                    log::warn!(
                        "[VAULT_SYNC] Resource '{}' has no usable identifier, skipped",
                        resource.filename
                    );
                    continue;
                };
                let target = attachment_folder.join(generate_file_name(&resource));
                if target.exists() {
                    continue;
                }
                match client.download_resource(&identifier).await {
                    Ok(bytes) => match file_ops::write_binary(&target, &bytes) {
                        Ok(()) => {
                            report.resources_downloaded += 1;
                            log::info!(
                                "[VAULT_SYNC] Downloaded resource to {}",
                                target.display()
                            );
                        }
                        Err(e) => {
                            let message =
                                format!("Failed to save resource {}: {}", target.display(), e);
                            log::warn!("[VAULT_SYNC] {}", message);
                            report.messages.push(message);
                        }
                    },
                    Err(e) => {
                        let message = format!("Failed to download resource {}: {}", identifier, e);
                        log::warn!("[VAULT_SYNC] {}", message);
                        report.messages.push(message);
                    }
                }
            }
        }
        Err(e) => {
            let message = format!("Resource list failed: {}", e);
            log::warn!("[VAULT_SYNC] {}", message);
            report.messages.push(message);
        }
    }

    // 3. ensure each day's note and insert unseen records
    for (date_str, day_records) in group_by_date(&records) {
        let Ok(date) = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d") else {
            log::warn!("[VAULT_SYNC] Skipping unparseable date {}", date_str);
            continue;
        };

        let note_path = match create_periodic_file(date, PeriodKind::Daily, settings).await? {
            CreateOutcome::Created(path) | CreateOutcome::AlreadyExists(path) => path,
            CreateOutcome::TemplateMissing(template) => {
                let message = format!(
                    "Daily template missing at {}, skipped {}",
                    template.display(),
                    date_str
                );
                log::warn!("[VAULT_SYNC] {}", message);
                report.messages.push(message);
                continue;
            }
            CreateOutcome::NotConfigured => {
                return Err(notice_error(
                    "Periodic notes path is not configured; set VAULT_SYNC_PERIODIC_PATH",
                ));
            }
        };

        let content = file_ops::read_note(&note_path)
            .map_err(|e| format!("Failed to read {}: {}", note_path.display(), e))?;
        let Some(merge) = merge_day_records(&content, &header_re, &day_records) else {
            return Err(notice_error(&format!(
                "No '{}' heading found in {}",
                settings.daily_record_header,
                note_path.display()
            )));
        };

        report.skipped_existing += merge.skipped;
        if merge.inserted > 0 {
            file_ops::write_note(&note_path, &merge.content)
                .map_err(|e| format!("Failed to write {}: {}", note_path.display(), e))?;
            report.imported += merge.inserted;
            report.days_touched += 1;
            log::info!(
                "[VAULT_SYNC] Added {} record(s) to {}",
                merge.inserted,
                note_path.display()
            );
        }
    }

    log_message(
        &format!(
            "Sync complete: {} fetched, {} imported, {} already present, {} day(s) touched, {} resource(s) downloaded",
            report.fetched,
            report.imported,
            report.skipped_existing,
            report.days_touched,
            report.resources_downloaded
        ),
        LogLevel::Info,
    )?;

    Ok(report)
}

/// Formatted records bucketed by date, each day keyed by anchor
/// timestamp so insertion order is oldest-first. Records that cannot be
/// formatted are logged and dropped.
fn group_by_date(records: &[DailyRecord]) -> BTreeMap<String, BTreeMap<i64, String>> {
    let mut by_date: BTreeMap<String, BTreeMap<i64, String>> = BTreeMap::new();
    for record in records {
        match format_daily_record(record) {
            Ok(formatted) => {
                by_date
                    .entry(formatted.date)
                    .or_default()
                    .insert(formatted.timestamp, formatted.markdown);
            }
            Err(e) => log::warn!("[VAULT_SYNC] Skipping record: {}", e),
        }
    }
    by_date
}

/// Every `^<digits>` block anchor present anywhere in the note.
fn existing_anchors(content: &str) -> HashSet<i64> {
    ANCHOR_RE
        .captures_iter(content)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

struct SectionMerge {
    content: String,
    inserted: usize,
    skipped: usize,
}

/// Insert records whose anchors are not yet in the note into the
/// daily-record section, oldest first. Returns None when the note has no
/// matching heading.
fn merge_day_records(
    content: &str,
    header_re: &Regex,
    day_records: &BTreeMap<i64, String>,
) -> Option<SectionMerge> {
    let caps = header_re.captures(content)?;
    let body = caps.get(2)?;

    let anchors = existing_anchors(content);
    let mut fresh: Vec<&str> = Vec::new();
    let mut skipped = 0usize;
    for (timestamp, markdown) in day_records {
        if anchors.contains(timestamp) {
            skipped += 1;
        } else {
            fresh.push(markdown.as_str());
        }
    }

    if fresh.is_empty() {
        return Some(SectionMerge {
            content: content.to_string(),
            inserted: 0,
            skipped,
        });
    }

    let inserted = fresh.len();
    let block = fresh.join("\n");
    let old_body = body.as_str();
    let merged_body = if old_body.trim().is_empty() {
        format!("\n\n{}\n", block)
    } else {
        format!("{}\n{}\n", old_body.trim_end(), block)
    };

    let mut merged = String::with_capacity(content.len() + merged_body.len());
    merged.push_str(&content[..body.start()]);
    merged.push_str(&merged_body);
    merged.push_str(&content[body.end()..]);

    Some(SectionMerge {
        content: merged,
        inserted,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(records: &[(i64, &str)]) -> BTreeMap<i64, String> {
        records
            .iter()
            .map(|(ts, md)| (*ts, md.to_string()))
            .collect()
    }

    fn re() -> Regex {
        header_regex("Daily Record").unwrap()
    }

    #[test]
    fn test_groups_records_by_day_sorted_by_timestamp() {
        let records = vec![
            DailyRecord {
                created_ts: Some(1700000500),
                content: "later".to_string(),
                ..DailyRecord::default()
            },
            DailyRecord {
                created_ts: Some(1700000000),
                content: "earlier".to_string(),
                ..DailyRecord::default()
            },
            DailyRecord {
                created_ts: Some(1700100000), // next day
                content: "tomorrow".to_string(),
                ..DailyRecord::default()
            },
            DailyRecord {
                // no timestamp at all, dropped
                content: "broken".to_string(),
                ..DailyRecord::default()
            },
        ];

        let grouped = group_by_date(&records);
        assert_eq!(
            grouped.keys().collect::<Vec<_>>(),
            vec!["2023-11-14", "2023-11-16"]
        );
        let day = &grouped["2023-11-14"];
        assert_eq!(
            day.keys().copied().collect::<Vec<_>>(),
            vec![1700000000, 1700000500]
        );
    }

    #[test]
    fn test_merge_appends_only_unseen_records() {
        let note = "# 2023-11-14\n\n## Daily Record\n\n- 09:00 old #daily-record ^1700000000\n\n## Tasks\nafter\n";
        let merge = merge_day_records(
            note,
            &re(),
            &day(&[
                (1700000000, "- 09:00 old #daily-record ^1700000000"),
                (1700000500, "- 22:21 new #daily-record ^1700000500"),
            ]),
        )
        .unwrap();

        assert_eq!(merge.inserted, 1);
        assert_eq!(merge.skipped, 1);
        assert_eq!(
            merge.content,
            "# 2023-11-14\n\n## Daily Record\n\n- 09:00 old #daily-record ^1700000000\n- 22:21 new #daily-record ^1700000500\n\n## Tasks\nafter\n"
        );
    }

    #[test]
    fn test_merge_fills_an_empty_section() {
        let note = "## Daily Record\n\n## Tasks\n";
        let merge = merge_day_records(
            note,
            &re(),
            &day(&[(1700000500, "- 22:21 new #daily-record ^1700000500")]),
        )
        .unwrap();

        assert_eq!(merge.inserted, 1);
        assert_eq!(
            merge.content,
            "## Daily Record\n\n- 22:21 new #daily-record ^1700000500\n\n## Tasks\n"
        );
    }

    #[test]
    fn test_merge_at_end_of_note() {
        let note = "## Daily Record\n";
        let merge = merge_day_records(
            note,
            &re(),
            &day(&[(1700000500, "- 22:21 new #daily-record ^1700000500")]),
        )
        .unwrap();
        assert_eq!(
            merge.content,
            "## Daily Record\n\n- 22:21 new #daily-record ^1700000500\n"
        );
    }

    #[test]
    fn test_merge_inserts_multiple_records_oldest_first() {
        let note = "## Daily Record\n";
        let merge = merge_day_records(
            note,
            &re(),
            &day(&[
                (1700000500, "- 22:21 b #daily-record ^1700000500"),
                (1700000000, "- 22:13 a #daily-record ^1700000000"),
            ]),
        )
        .unwrap();
        assert_eq!(merge.inserted, 2);
        let a = merge.content.find("^1700000000").unwrap();
        let b = merge.content.find("^1700000500").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_anchors_anywhere_in_the_note_count_as_seen() {
        // anchor lives outside the daily-record section
        let note = "## Daily Record\n\n## Archive\n- moved #daily-record ^1700000500\n";
        let merge = merge_day_records(
            note,
            &re(),
            &day(&[(1700000500, "- 22:21 new #daily-record ^1700000500")]),
        )
        .unwrap();
        assert_eq!(merge.inserted, 0);
        assert_eq!(merge.skipped, 1);
        assert_eq!(merge.content, note);
    }

    #[test]
    fn test_merge_without_heading_is_none() {
        let note = "# 2023-11-14\n\nno sections here\n";
        assert!(
            merge_day_records(
                note,
                &re(),
                &day(&[(1700000500, "- 22:21 new #daily-record ^1700000500")])
            )
            .is_none()
        );
    }

    #[test]
    fn test_multi_line_records_merge_intact() {
        let note = "## Daily Record\n";
        let merge = merge_day_records(
            note,
            &re(),
            &day(&[(
                1700000000,
                "- 22:13 head #daily-record ^1700000000\n\t- tail\n\t- ![[7-pic.png]]",
            )]),
        )
        .unwrap();
        assert!(
            merge
                .content
                .contains("^1700000000\n\t- tail\n\t- ![[7-pic.png]]\n")
        );
    }
}

//! Periodic note path resolution and creation.
//!
//! Each period kind maps a date to a fixed folder layout under the
//! periodic root and to a template under `Templates/`. Weekly notes
//! follow ISO week numbering, so a date in early January can land in the
//! previous week-year's folder.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use vault_sync_types::PeriodKind;

use crate::config::{Settings, defaults};
use crate::vault::template::{CreateFileOptions, CreateOutcome, create_from_template};

/// Resolved locations for one periodic note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicPaths {
    pub folder: PathBuf,
    pub file: PathBuf,
    pub template: PathBuf,
    /// Base name of the note, e.g. "2023-11-14" or "2022-W52".
    pub value: String,
}

/// Folder, file, and template paths for the periodic note of `date`.
/// Returns None when the vault root or periodic folder is unconfigured.
pub fn periodic_paths(
    date: NaiveDate,
    kind: PeriodKind,
    settings: &Settings,
) -> Option<PeriodicPaths> {
    let root = settings.periodic_root()?;
    let year = date.year();

    let (folder, value) = match kind {
        PeriodKind::Daily => (
            root.join(year.to_string())
                .join(kind.as_str())
                .join(format!("{:02}", date.month())),
            date.format("%Y-%m-%d").to_string(),
        ),
        PeriodKind::Weekly => {
            let week = date.iso_week();
            (
                root.join(week.year().to_string()).join(kind.as_str()),
                format!("{}-W{:02}", week.year(), week.week()),
            )
        }
        PeriodKind::Monthly => (
            root.join(year.to_string()).join(kind.as_str()),
            date.format("%Y-%m").to_string(),
        ),
        PeriodKind::Quarterly => (
            root.join(year.to_string()).join(kind.as_str()),
            format!("{}-Q{}", year, date.month0() / 3 + 1),
        ),
        PeriodKind::Yearly => (root.join(year.to_string()), year.to_string()),
    };

    let file = folder.join(format!("{}.md", value));
    let template = match settings.template_override(kind) {
        Some(override_path) => settings.vault_path(override_path)?,
        None => root
            .join(defaults::TEMPLATE_FOLDER)
            .join(format!("{}.md", kind.as_str())),
    };

    Some(PeriodicPaths {
        folder,
        file,
        template,
        value,
    })
}

/// Ensure the periodic note for `date` exists, creating it from its
/// template when absent.
pub async fn create_periodic_file(
    date: NaiveDate,
    kind: PeriodKind,
    settings: &Settings,
) -> Result<CreateOutcome, String> {
    let Some(paths) = periodic_paths(date, kind, settings) else {
        return Ok(CreateOutcome::NotConfigured);
    };

    log::debug!(
        "[PERIODIC] Ensuring {} note {} (locale {})",
        kind,
        paths.value,
        settings.locale
    );

    create_from_template(&CreateFileOptions {
        template_file: &paths.template,
        file: &paths.file,
        tag: None,
    })
    .await
}

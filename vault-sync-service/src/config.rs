use std::env;
use std::path::PathBuf;

use vault_sync_types::{MemosVersion, PeriodKind};

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Filesystem root of the Obsidian-compatible vault the service works in.
    pub const VAULT_ROOT: &str = "VAULT_SYNC_VAULT_ROOT";
    /// Vault-relative folder that holds the periodic note tree.
    pub const PERIODIC_PATH: &str = "VAULT_SYNC_PERIODIC_PATH";
    /// Set to "true" or "1" to honor the per-kind template overrides below.
    pub const PERIODIC_ADVANCED: &str = "VAULT_SYNC_PERIODIC_ADVANCED";
    pub const TEMPLATE_DAILY: &str = "VAULT_SYNC_TEMPLATE_DAILY";
    pub const TEMPLATE_WEEKLY: &str = "VAULT_SYNC_TEMPLATE_WEEKLY";
    pub const TEMPLATE_MONTHLY: &str = "VAULT_SYNC_TEMPLATE_MONTHLY";
    pub const TEMPLATE_QUARTERLY: &str = "VAULT_SYNC_TEMPLATE_QUARTERLY";
    pub const TEMPLATE_YEARLY: &str = "VAULT_SYNC_TEMPLATE_YEARLY";
    /// Heading under which daily records are collected inside daily notes.
    pub const DAILY_HEADER: &str = "VAULT_SYNC_DAILY_HEADER";
    /// Vault-relative folder for downloaded memo attachments.
    pub const ATTACHMENT_FOLDER: &str = "VAULT_SYNC_ATTACHMENT_FOLDER";
    pub const MEMOS_ENDPOINT: &str = "MEMOS_ENDPOINT";
    pub const MEMOS_TOKEN: &str = "MEMOS_TOKEN";
    pub const MEMOS_API_VERSION: &str = "MEMOS_API_VERSION";
    /// v2-only CEL filter applied to memo listings.
    pub const MEMOS_FILTER: &str = "MEMOS_FILTER";
    pub const LOCALE: &str = "VAULT_SYNC_LOCALE";
    pub const PORT: &str = "VAULT_SYNC_PORT";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 9104;
    pub const DAILY_HEADER: &str = "Daily Record";
    pub const ATTACHMENT_FOLDER: &str = "attachments";
    pub const LOCALE: &str = "en";
    /// Records fetched per Memos API page.
    pub const MEMOS_PAGE_SIZE: usize = 50;
    /// Folder under the periodic root that holds the fallback templates.
    pub const TEMPLATE_FOLDER: &str = "Templates";
}

/// Runtime settings, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub vault_root: Option<PathBuf>,
    pub periodic_notes_path: Option<String>,
    pub use_periodic_advanced: bool,
    pub template_daily: Option<String>,
    pub template_weekly: Option<String>,
    pub template_monthly: Option<String>,
    pub template_quarterly: Option<String>,
    pub template_yearly: Option<String>,
    pub daily_record_header: String,
    pub attachment_folder: String,
    pub memos_endpoint: Option<String>,
    pub memos_token: Option<String>,
    pub memos_version: MemosVersion,
    pub memos_filter: Option<String>,
    pub locale: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_root: None,
            periodic_notes_path: None,
            use_periodic_advanced: false,
            template_daily: None,
            template_weekly: None,
            template_monthly: None,
            template_quarterly: None,
            template_yearly: None,
            daily_record_header: defaults::DAILY_HEADER.to_string(),
            attachment_folder: defaults::ATTACHMENT_FOLDER.to_string(),
            memos_endpoint: None,
            memos_token: None,
            memos_version: MemosVersion::V2,
            memos_filter: None,
            locale: defaults::LOCALE.to_string(),
            port: defaults::PORT,
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|value| {
            let value = value.trim();
            value == "1" || value.eq_ignore_ascii_case("true")
        })
        .unwrap_or(false)
}

impl Settings {
    pub fn from_env() -> Self {
        let memos_version = env_opt(env_vars::MEMOS_API_VERSION)
            .and_then(|value| {
                let parsed = MemosVersion::parse(&value);
                if parsed.is_none() {
                    log::warn!("Unknown {} '{}', using v2", env_vars::MEMOS_API_VERSION, value);
                }
                parsed
            })
            .unwrap_or(MemosVersion::V2);

        Self {
            vault_root: env_opt(env_vars::VAULT_ROOT).map(PathBuf::from),
            periodic_notes_path: env_opt(env_vars::PERIODIC_PATH),
            use_periodic_advanced: env_flag(env_vars::PERIODIC_ADVANCED),
            template_daily: env_opt(env_vars::TEMPLATE_DAILY),
            template_weekly: env_opt(env_vars::TEMPLATE_WEEKLY),
            template_monthly: env_opt(env_vars::TEMPLATE_MONTHLY),
            template_quarterly: env_opt(env_vars::TEMPLATE_QUARTERLY),
            template_yearly: env_opt(env_vars::TEMPLATE_YEARLY),
            daily_record_header: env_opt(env_vars::DAILY_HEADER)
                .unwrap_or_else(|| defaults::DAILY_HEADER.to_string()),
            attachment_folder: env_opt(env_vars::ATTACHMENT_FOLDER)
                .unwrap_or_else(|| defaults::ATTACHMENT_FOLDER.to_string()),
            memos_endpoint: env_opt(env_vars::MEMOS_ENDPOINT),
            memos_token: env_opt(env_vars::MEMOS_TOKEN),
            memos_version,
            memos_filter: env_opt(env_vars::MEMOS_FILTER),
            locale: env_opt(env_vars::LOCALE).unwrap_or_else(|| defaults::LOCALE.to_string()),
            port: env_opt(env_vars::PORT)
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults::PORT),
        }
    }

    /// Absolute path of the periodic note tree, if both the vault root and
    /// the periodic folder are configured.
    pub fn periodic_root(&self) -> Option<PathBuf> {
        let vault_root = self.vault_root.as_ref()?;
        let periodic = self.periodic_notes_path.as_ref()?;
        Some(vault_root.join(periodic))
    }

    /// Resolve a vault-relative path against the configured vault root.
    pub fn vault_path(&self, relative: &str) -> Option<PathBuf> {
        self.vault_root.as_ref().map(|root| root.join(relative))
    }

    /// Per-kind template override, only honored in advanced mode.
    pub fn template_override(&self, kind: PeriodKind) -> Option<&str> {
        if !self.use_periodic_advanced {
            return None;
        }
        match kind {
            PeriodKind::Daily => self.template_daily.as_deref(),
            PeriodKind::Weekly => self.template_weekly.as_deref(),
            PeriodKind::Monthly => self.template_monthly.as_deref(),
            PeriodKind::Quarterly => self.template_quarterly.as_deref(),
            PeriodKind::Yearly => self.template_yearly.as_deref(),
        }
    }
}

//! Shared types for the vault sync module service and its RPC clients.

use std::fmt;

use serde::{Deserialize, Serialize};

// =====================================================
// RPC Request Types
// =====================================================

/// Create (or confirm) a periodic note for a given date
#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodicRequest {
    /// Which periodic note kind to create
    pub period: PeriodKind,
    /// Target date as YYYY-MM-DD (defaults to today)
    pub date: Option<String>,
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Result of a periodic note creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicResult {
    /// One of: created, already-exists, template-missing, not-configured
    pub outcome: String,
    /// Path of the note (or of the missing template)
    pub path: Option<String>,
}

/// Counters for one sync run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Records fetched from the Memos API
    pub fetched: usize,
    /// Records newly written into daily notes
    pub imported: usize,
    /// Records skipped because their anchor was already present
    pub skipped_existing: usize,
    /// Daily notes that received at least one new record
    pub days_touched: usize,
    /// Resource files downloaded into the attachment folder
    pub resources_downloaded: usize,
    /// Non-fatal problems encountered during the run
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Service health status
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub vault_configured: bool,
    pub vault_root: Option<String>,
    pub memos_configured: bool,
    pub memos_version: String,
    pub locale: String,
    pub uptime_secs: u64,
    pub total_syncs: u64,
    pub total_periodic_created: u64,
    pub last_sync_at: Option<String>,
}

// =====================================================
// Periodic Note Types
// =====================================================

/// The five periodic note granularities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Daily => "daily",
            PeriodKind::Weekly => "weekly",
            PeriodKind::Monthly => "monthly",
            PeriodKind::Quarterly => "quarterly",
            PeriodKind::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Some(PeriodKind::Daily),
            "weekly" => Some(PeriodKind::Weekly),
            "monthly" => Some(PeriodKind::Monthly),
            "quarterly" => Some(PeriodKind::Quarterly),
            "yearly" => Some(PeriodKind::Yearly),
            _ => None,
        }
    }

    pub fn all() -> &'static [PeriodKind] {
        &[
            PeriodKind::Daily,
            PeriodKind::Weekly,
            PeriodKind::Monthly,
            PeriodKind::Quarterly,
            PeriodKind::Yearly,
        ]
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which generation of the Memos REST API the server speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemosVersion {
    V1,
    V2,
}

impl MemosVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemosVersion::V1 => "v1",
            MemosVersion::V2 => "v2",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "v1" => Some(MemosVersion::V1),
            "v2" => Some(MemosVersion::V2),
            _ => None,
        }
    }
}

impl fmt::Display for MemosVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =====================================================
// Memos API Types
// =====================================================

/// Record ids arrive as integers from v1 servers and as strings from v2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Str(id) => f.write_str(id),
        }
    }
}

/// One memo as returned by the Memos API.
///
/// The two API generations disagree on field names, so the v2 spellings
/// (`createTime`, `resources`) are accepted as aliases of the v1 ones.
/// Exactly one of `created_ts` (unix seconds) and `created_at` (ISO string)
/// is normally present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    /// v2 resource-name identifier, e.g. "memos/42"
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "createdTs")]
    pub created_ts: Option<i64>,
    #[serde(default, rename = "createdAt", alias = "createTime")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "resourceList", alias = "resources")]
    pub resource_list: Vec<MemoResource>,
}

/// One attachment as returned by the Memos API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoResource {
    #[serde(default)]
    pub id: Option<RecordId>,
    /// v2 resource-name identifier, e.g. "resources/7"
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub filename: String,
    /// MIME-ish type string such as "image/png"
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default, rename = "externalLink")]
    pub external_link: Option<String>,
}

/// Error payload the Memos API returns in place of a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FetchError {
    /// First non-empty message field, or the bare code
    pub fn describe(&self) -> String {
        for field in [&self.message, &self.msg, &self.error] {
            if let Some(text) = field {
                if !text.is_empty() {
                    return text.clone();
                }
            }
        }
        match self.code {
            Some(code) => format!("Memos API error code {}", code),
            None => "Unknown Memos API error".to_string(),
        }
    }
}

/// v2 paged memo listing envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemosPage {
    pub memos: Vec<DailyRecord>,
    #[serde(default, rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// v2 resource listing envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesPage {
    pub resources: Vec<MemoResource>,
}

/// Whatever a memo listing endpoint sent back, decoded without reshaping.
///
/// v1 answers with a bare array, v2 with a page envelope. Error payloads
/// decode into `Failure` because [`FetchError`] accepts any object; it
/// must therefore stay the last variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListMemosResult {
    Records(Vec<DailyRecord>),
    Page(MemosPage),
    Failure(FetchError),
}

impl ListMemosResult {
    pub fn records(self) -> Vec<DailyRecord> {
        match self {
            ListMemosResult::Records(records) => records,
            ListMemosResult::Page(page) => page.memos,
            ListMemosResult::Failure(_) => Vec::new(),
        }
    }
}

/// Resource listing payload, same passthrough contract as [`ListMemosResult`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResourcesResult {
    Records(Vec<MemoResource>),
    Page(ResourcesPage),
    Failure(FetchError),
}

impl ListResourcesResult {
    pub fn records(self) -> Vec<MemoResource> {
        match self {
            ListResourcesResult::Records(resources) => resources,
            ListResourcesResult::Page(page) => page.resources,
            ListResourcesResult::Failure(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_v1_memo_array() {
        let body = r#"[
            {"id": 7, "createdTs": 1700000000, "content": "hello",
             "resourceList": [{"id": 3, "filename": "a.png", "type": "image/png"}]}
        ]"#;
        let result: ListMemosResult = serde_json::from_str(body).unwrap();
        match result {
            ListMemosResult::Records(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].created_ts, Some(1700000000));
                assert_eq!(records[0].content, "hello");
                assert_eq!(records[0].resource_list[0].filename, "a.png");
            }
            other => panic!("expected Records, got {:?}", other),
        }
    }

    #[test]
    fn test_decodes_v2_memo_page() {
        let body = r#"{"memos": [
            {"name": "memos/42", "createTime": "2023-11-14T22:13:20Z", "content": "from v2",
             "resources": [{"name": "resources/7", "filename": "b.pdf", "type": "application/pdf"}]}
        ], "nextPageToken": ""}"#;
        let result: ListMemosResult = serde_json::from_str(body).unwrap();
        match result {
            ListMemosResult::Page(page) => {
                assert_eq!(page.memos.len(), 1);
                assert_eq!(page.memos[0].name.as_deref(), Some("memos/42"));
                assert_eq!(
                    page.memos[0].created_at.as_deref(),
                    Some("2023-11-14T22:13:20Z")
                );
                assert_eq!(page.memos[0].resource_list[0].name.as_deref(), Some("resources/7"));
            }
            other => panic!("expected Page, got {:?}", other),
        }
    }

    #[test]
    fn test_decodes_error_payload_as_failure() {
        let body = r#"{"code": 16, "message": "unauthenticated"}"#;
        let result: ListMemosResult = serde_json::from_str(body).unwrap();
        match result {
            ListMemosResult::Failure(err) => {
                assert_eq!(err.code, Some(16));
                assert_eq!(err.describe(), "unauthenticated");
            }
            other => panic!("expected Failure, got {:?}", other),
        }
    }

    #[test]
    fn test_record_id_accepts_both_wire_shapes() {
        let int_id: RecordId = serde_json::from_str("42").unwrap();
        let str_id: RecordId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(int_id.to_string(), "42");
        assert_eq!(str_id.to_string(), "42");
    }

    #[test]
    fn test_period_kind_round_trips_through_serde_and_parse() {
        for kind in PeriodKind::all() {
            assert_eq!(PeriodKind::parse(kind.as_str()), Some(*kind));
            let encoded = serde_json::to_string(kind).unwrap();
            assert_eq!(encoded, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(PeriodKind::parse("Weekly"), Some(PeriodKind::Weekly));
        assert_eq!(PeriodKind::parse("hourly"), None);
    }

    #[test]
    fn test_fetch_error_describe_falls_back_through_fields() {
        let err: FetchError = serde_json::from_str(r#"{"msg": "bad token"}"#).unwrap();
        assert_eq!(err.describe(), "bad token");
        let bare: FetchError = serde_json::from_str(r#"{"code": 13}"#).unwrap();
        assert_eq!(bare.describe(), "Memos API error code 13");
    }
}

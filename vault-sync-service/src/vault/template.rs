//! Template-based note creation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::util::{self, LogLevel, log_message};
use crate::vault::{file_ops, frontmatter};

/// How an ensure-from-template call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The note was created from the template.
    Created(PathBuf),
    /// The note already existed; nothing was written.
    AlreadyExists(PathBuf),
    /// The template file is missing; nothing was written.
    TemplateMissing(PathBuf),
    /// Required settings are absent; nothing was attempted.
    NotConfigured,
}

impl CreateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreateOutcome::Created(_) => "created",
            CreateOutcome::AlreadyExists(_) => "already-exists",
            CreateOutcome::TemplateMissing(_) => "template-missing",
            CreateOutcome::NotConfigured => "not-configured",
        }
    }

    /// The note path this outcome refers to (the template path for
    /// `TemplateMissing`).
    pub fn path(&self) -> Option<&Path> {
        match self {
            CreateOutcome::Created(path)
            | CreateOutcome::AlreadyExists(path)
            | CreateOutcome::TemplateMissing(path) => Some(path),
            CreateOutcome::NotConfigured => None,
        }
    }

    pub fn did_create(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Inputs for [`create_from_template`].
pub struct CreateFileOptions<'a> {
    pub template_file: &'a Path,
    /// Target note path; ".md" is appended when missing.
    pub file: &'a Path,
    /// Tag appended to the new note's frontmatter tag list.
    pub tag: Option<&'a str>,
}

/// Ensure a note exists, creating it from a template when absent.
///
/// Never overwrites an existing note. A missing template is a warning
/// outcome rather than a fault. Parent folders are created as needed.
/// After writing, waits briefly so callers that immediately read the
/// note back observe it on disk.
pub async fn create_from_template(
    options: &CreateFileOptions<'_>,
) -> Result<CreateOutcome, String> {
    let template_content = match fs::read_to_string(options.template_file) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log_message(
                &format!("No template found at {}", options.template_file.display()),
                LogLevel::Warn,
            )?;
            return Ok(CreateOutcome::TemplateMissing(
                options.template_file.to_path_buf(),
            ));
        }
        Err(e) => {
            return Err(format!(
                "Failed to read template {}: {}",
                options.template_file.display(),
                e
            ));
        }
    };

    let file = ensure_md_extension(options.file);
    if file.exists() {
        return Ok(CreateOutcome::AlreadyExists(file));
    }

    let content = match options.tag {
        Some(tag) => frontmatter::append_tag(&template_content, tag),
        None => template_content,
    };
    file_ops::write_note(&file, &content)
        .map_err(|e| format!("Failed to create {}: {}", file.display(), e))?;
    util::settle().await;

    Ok(CreateOutcome::Created(file))
}

fn ensure_md_extension(file: &Path) -> PathBuf {
    if file.extension().map(|ext| ext == "md").unwrap_or(false) {
        file.to_path_buf()
    } else {
        let mut with_ext = file.as_os_str().to_os_string();
        with_ext.push(".md");
        PathBuf::from(with_ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_creates_from_template_then_leaves_existing_alone() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("Templates/daily.md");
        file_ops::write_note(&template, "# Daily\n\n## Daily Record\n").unwrap();

        let target = dir.path().join("2023/daily/11/2023-11-14");
        let options = CreateFileOptions {
            template_file: &template,
            file: &target,
            tag: None,
        };

        let outcome = create_from_template(&options).await.unwrap();
        let created = match &outcome {
            CreateOutcome::Created(path) => path.clone(),
            other => panic!("expected Created, got {:?}", other),
        };
        assert!(created.to_string_lossy().ends_with("2023-11-14.md"));
        assert_eq!(
            fs::read_to_string(&created).unwrap(),
            "# Daily\n\n## Daily Record\n"
        );

        // user edits must survive a second ensure call
        fs::write(&created, "# Daily\n\nedited\n").unwrap();
        let outcome = create_from_template(&options).await.unwrap();
        assert_eq!(outcome, CreateOutcome::AlreadyExists(created.clone()));
        assert_eq!(fs::read_to_string(&created).unwrap(), "# Daily\n\nedited\n");
    }

    #[tokio::test]
    async fn test_missing_template_is_a_warning_outcome() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("Templates/weekly.md");
        let target = dir.path().join("2023/weekly/2023-W46");

        let outcome = create_from_template(&CreateFileOptions {
            template_file: &template,
            file: &target,
            tag: None,
        })
        .await
        .unwrap();

        assert_eq!(outcome, CreateOutcome::TemplateMissing(template));
        assert!(!dir.path().join("2023/weekly/2023-W46.md").exists());
    }

    #[tokio::test]
    async fn test_tag_lands_in_new_note_frontmatter() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("Templates/daily.md");
        file_ops::write_note(&template, "---\ntags: [daily]\n---\n\nBody\n").unwrap();

        let target = dir.path().join("2023-11-14.md");
        let outcome = create_from_template(&CreateFileOptions {
            template_file: &template,
            file: &target,
            tag: Some("#periodic"),
        })
        .await
        .unwrap();

        assert!(outcome.did_create());
        let content = fs::read_to_string(&target).unwrap();
        assert!(content.contains("tags: [daily, periodic]"));
    }

    #[test]
    fn test_md_extension_is_only_added_when_missing() {
        assert_eq!(
            ensure_md_extension(Path::new("notes/2023-11-14")),
            PathBuf::from("notes/2023-11-14.md")
        );
        assert_eq!(
            ensure_md_extension(Path::new("notes/2023-11-14.md")),
            PathBuf::from("notes/2023-11-14.md")
        );
    }
}

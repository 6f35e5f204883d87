//! Vault-facing file operations: notes, frontmatter editing, and
//! template-based note creation.

pub mod file_ops;
pub mod frontmatter;
pub mod template;

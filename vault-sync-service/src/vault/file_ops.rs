//! File operations for the vault tree.
//!
//! Handles reading/writing markdown notes and saving downloaded
//! attachment binaries, creating parent directories as needed.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Write a note file (creates parent directories as needed)
pub fn write_note(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Write a binary attachment file (creates parent directories as needed)
pub fn write_binary(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}

/// Read a note file, returning empty string if not found
pub fn read_note(path: &Path) -> io::Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

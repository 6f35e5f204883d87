//! Frontmatter editing for notes.
//!
//! Hand-rolled YAML handling (no serde_yaml). Only the tag list is ever
//! modified; every other frontmatter line passes through unchanged.

/// Append a tag to a note's frontmatter tag list.
///
/// Handles the inline form (`tags: [a, b]`), the block-list form, a bare
/// scalar value, and notes with no `tags:` key or no frontmatter at all.
/// A leading `#` on the tag is stripped, matching how tags are stored in
/// frontmatter.
pub fn append_tag(content: &str, tag: &str) -> String {
    let tag = tag.trim().trim_start_matches('#');
    if tag.is_empty() {
        return content.to_string();
    }

    if !content.trim_start().starts_with("---") {
        return format!("---\ntags: [{}]\n---\n\n{}", tag, content);
    }

    let mut result: Vec<String> = Vec::new();
    let mut in_frontmatter = false;
    let mut in_tag_block = false;
    let mut item_indent = "  ".to_string();
    let mut handled = false;

    for line in content.lines() {
        if !handled && line.trim() == "---" {
            if !in_frontmatter {
                in_frontmatter = true;
                result.push(line.to_string());
                continue;
            }
            // closing fence: insert before it if no tags key was seen
            if in_tag_block {
                result.push(format!("{}- {}", item_indent, tag));
            } else {
                result.push(format!("tags: [{}]", tag));
            }
            handled = true;
            result.push(line.to_string());
            continue;
        }

        if !handled && in_tag_block {
            let trimmed = line.trim_start();
            if trimmed.starts_with("- ") || trimmed == "-" {
                item_indent = line[..line.len() - trimmed.len()].to_string();
                result.push(line.to_string());
                continue;
            }
            // list ended, append our item before whatever follows
            result.push(format!("{}- {}", item_indent, tag));
            handled = true;
            result.push(line.to_string());
            continue;
        }

        if !handled && in_frontmatter {
            if let Some(rest) = line.trim_start().strip_prefix("tags:") {
                let rest = rest.trim();
                if rest.is_empty() {
                    in_tag_block = true;
                    result.push(line.to_string());
                    continue;
                }
                if rest == "[]" {
                    result.push(format!("tags: [{}]", tag));
                } else if rest.starts_with('[') && rest.ends_with(']') {
                    let inner = rest[1..rest.len() - 1].trim();
                    result.push(format!("tags: [{}, {}]", inner, tag));
                } else {
                    // bare scalar, promote to an inline list
                    result.push(format!("tags: [{}, {}]", rest, tag));
                }
                handled = true;
                continue;
            }
        }

        result.push(line.to_string());
    }

    let mut output = result.join("\n");
    if content.ends_with('\n') {
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_to_inline_list() {
        let note = "---\ntitle: Day\ntags: [daily, journal]\n---\n\nBody\n";
        let result = append_tag(note, "imported");
        assert!(result.contains("tags: [daily, journal, imported]"));
        assert!(result.contains("title: Day"));
        assert!(result.ends_with("Body\n"));
    }

    #[test]
    fn test_fills_empty_inline_list() {
        let note = "---\ntags: []\n---\nBody";
        let result = append_tag(note, "daily");
        assert!(result.contains("tags: [daily]"));
        assert!(result.ends_with("Body"));
    }

    #[test]
    fn test_appends_to_block_list_with_matching_indent() {
        let note = "---\ntags:\n  - daily\n  - journal\ndate: 2023-11-14\n---\nBody\n";
        let result = append_tag(note, "imported");
        assert_eq!(
            result,
            "---\ntags:\n  - daily\n  - journal\n  - imported\ndate: 2023-11-14\n---\nBody\n"
        );
    }

    #[test]
    fn test_block_list_at_end_of_frontmatter() {
        let note = "---\ntags:\n- daily\n---\nBody\n";
        let result = append_tag(note, "imported");
        assert_eq!(result, "---\ntags:\n- daily\n- imported\n---\nBody\n");
    }

    #[test]
    fn test_inserts_tags_key_when_missing() {
        let note = "---\ntitle: Day\n---\nBody\n";
        let result = append_tag(note, "daily");
        assert_eq!(result, "---\ntitle: Day\ntags: [daily]\n---\nBody\n");
    }

    #[test]
    fn test_promotes_scalar_tags_value() {
        let note = "---\ntags: daily\n---\nBody\n";
        let result = append_tag(note, "imported");
        assert!(result.contains("tags: [daily, imported]"));
    }

    #[test]
    fn test_creates_frontmatter_when_absent() {
        let result = append_tag("# Heading\nBody\n", "daily");
        assert_eq!(result, "---\ntags: [daily]\n---\n\n# Heading\nBody\n");
    }

    #[test]
    fn test_strips_leading_hash_from_tag() {
        let result = append_tag("---\ntags: []\n---\n", "#daily");
        assert!(result.contains("tags: [daily]"));
    }

    #[test]
    fn test_empty_tag_changes_nothing() {
        let note = "---\ntags: [daily]\n---\nBody\n";
        assert_eq!(append_tag(note, ""), note);
        assert_eq!(append_tag(note, "#"), note);
    }
}

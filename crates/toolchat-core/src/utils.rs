//! Utility helpers — path resolution and string trimming.

use std::path::PathBuf;

/// Get the toolchat data directory (e.g. `~/.toolchat/`).
pub fn get_data_path() -> PathBuf {
    home_dir().join(".toolchat")
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// The user's home directory, or the working directory when it can't be found.
fn home_dir() -> PathBuf {
    dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_string("こんにちは世界です", 5), "こん...");
    }

    #[test]
    fn test_expand_home_tilde() {
        let expanded = expand_home("~/notes/xbox.txt");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.ends_with("notes/xbox.txt"));
    }

    #[test]
    fn test_expand_home_absolute() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
    }

    #[test]
    fn test_expand_home_bare_tilde() {
        let expanded = expand_home("~");
        assert_eq!(Some(expanded), dirs_next::home_dir());
    }

    #[test]
    fn test_expand_home_relative() {
        assert_eq!(expand_home("notes/~/x"), PathBuf::from("notes/~/x"));
    }

    #[test]
    fn test_data_path_ends_with_toolchat() {
        assert!(get_data_path().ends_with(".toolchat"));
    }
}

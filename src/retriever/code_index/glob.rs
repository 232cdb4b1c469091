//! Minimal glob-to-regex translation for `CodeIndexConfig::file_pattern`.
//!
//! Supports `**` (any depth), `*` (any run within one path segment), and
//! `?` (single character); everything else is matched literally.

use regex::Regex;

use crate::error::{ChunkingError, Result};

/// Compiles a glob pattern (`**/*.rs`-style) into a [`Regex`] matched
/// against a forward-slash path.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut out = String::from("^");
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push_str(".*");
                i += 2;
                if chars.get(i) == Some(&'/') {
                    i += 1;
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            c => {
                if "\\.+^$()[]{}|".contains(c) {
                    out.push('\\');
                }
                out.push(c);
                i += 1;
            }
        }
    }
    out.push('$');
    Regex::new(&out).map_err(|e| {
        ChunkingError::InvalidConfig {
            reason: format!("invalid file pattern {pattern:?}: {e}"),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_star_matches_any_depth() {
        let re = glob_to_regex("**/*.rs").unwrap();
        assert!(re.is_match("src/retriever/code.rs"));
        assert!(re.is_match("main.rs"));
        assert!(!re.is_match("main.py"));
    }

    #[test]
    fn single_star_confined_to_segment() {
        let re = glob_to_regex("*.rs").unwrap();
        assert!(re.is_match("main.rs"));
        assert!(!re.is_match("src/main.rs"));
    }

    #[test]
    fn literal_dots_are_escaped() {
        let re = glob_to_regex("*.rs").unwrap();
        assert!(!re.is_match("mainXrs"));
    }
}

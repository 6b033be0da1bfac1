//! `extract_sql_block` (spec.md §4.3 step 3): turns an LLM's free-text
//! reply to a natural-language query into a `SELECT …` statement, trying
//! three forms in order.

use regex::Regex;
use std::sync::OnceLock;

fn fenced_sql_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)```sql\s*(.*?)```").expect("valid regex"))
}

fn fenced_plain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)```\s*(.*?)```").expect("valid regex"))
}

/// Tries, in order: a ` ```sql ` fenced block, a plain ` ``` ` fenced
/// block, then the trimmed plain text itself. Returns `None` only if
/// none of the three candidates contain a recognizable `SELECT`.
pub fn extract_sql_block(response: &str) -> Option<String> {
    let candidates = [
        fenced_sql_pattern().captures(response).map(|c| c[1].trim().to_string()),
        fenced_plain_pattern().captures(response).map(|c| c[1].trim().to_string()),
        Some(response.trim().to_string()),
    ];

    candidates.into_iter().flatten().find_map(|candidate| {
        let upper = candidate.to_ascii_uppercase();
        upper.find("SELECT").map(|start| candidate[start..].trim_end_matches(';').trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_sql_fenced_block() {
        let response = "Here you go:\n```sql\nSELECT * FROM orders\n```\nLet me know if you need more.";
        assert_eq!(extract_sql_block(response).as_deref(), Some("SELECT * FROM orders"));
    }

    #[test]
    fn extracts_from_plain_fenced_block() {
        let response = "```\nSELECT id FROM users WHERE active = true\n```";
        assert_eq!(extract_sql_block(response).as_deref(), Some("SELECT id FROM users WHERE active = true"));
    }

    #[test]
    fn extracts_from_trimmed_plain_text() {
        let response = "  SELECT name FROM customers  ";
        assert_eq!(extract_sql_block(response).as_deref(), Some("SELECT name FROM customers"));
    }

    #[test]
    fn sql_fenced_block_takes_priority_over_plain_fenced_block() {
        // a response could contain both a generic fence and a sql fence;
        // the sql-tagged one must win.
        let response = "```\nnot sql here\n```\n```sql\nSELECT 1\n```";
        assert_eq!(extract_sql_block(response).as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn no_select_anywhere_returns_none() {
        assert_eq!(extract_sql_block("I don't have enough information to answer that."), None);
    }

    #[test]
    fn strips_trailing_semicolon() {
        let response = "SELECT 1;";
        assert_eq!(extract_sql_block(response).as_deref(), Some("SELECT 1"));
    }
}

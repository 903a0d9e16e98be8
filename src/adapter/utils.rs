//! 查询文本工具

use once_cell::sync::Lazy;
use regex::Regex;

/// 写语句关键字（允许前置的 WITH 子句）
static WRITE_QUERY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^\s*(?:with\b.*?\)\s*)?(insert|update|delete|replace|upsert|merge|create|alter|drop|truncate)\b",
    )
    .unwrap_or_else(|e| panic!("写语句匹配正则无效: {}", e))
});

/// 判断查询是否为写操作
///
/// 写操作永远不会进入结果缓存，执行成功后还会使缓存失效
pub fn is_write_query(query: &str) -> bool {
    WRITE_QUERY_PATTERN.is_match(query)
}

/// 规范化查询文本
///
/// 去掉首尾空白和结尾分号，并把引号外的连续空白折叠为一个空格，
/// 引号内的字面量保持原样。引号内的 `\` 转义下一个字符，
/// 连写的两个引号（`''`）视为字面量内的一个引号
pub fn normalize_query(query: &str) -> String {
    let trimmed = query.trim().trim_end_matches(';').trim_end();
    let mut normalized = String::with_capacity(trimmed.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for ch in trimmed.chars() {
        match quote {
            Some(_) if escaped => {
                normalized.push(ch);
                escaped = false;
            }
            Some(_) if ch == '\\' => {
                normalized.push(ch);
                escaped = true;
            }
            Some(q) => {
                normalized.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None if ch.is_whitespace() => {
                pending_space = true;
            }
            None => {
                if pending_space {
                    normalized.push(' ');
                    pending_space = false;
                }
                if ch == '\'' || ch == '"' || ch == '`' {
                    quote = Some(ch);
                }
                normalized.push(ch);
            }
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_query_detection() {
        assert!(is_write_query("INSERT INTO users VALUES (1)"));
        assert!(is_write_query("  update users set name = 'a'"));
        assert!(is_write_query("DELETE FROM users"));
        assert!(is_write_query("with x as (select 1) delete from users"));
        assert!(!is_write_query("SELECT * FROM users"));
        assert!(!is_write_query("select updated_at from users"));
        assert!(!is_write_query("with x as (select 1) select * from x"));
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize_query("  SELECT *\n\tFROM   users ;  "),
            "SELECT * FROM users"
        );
    }

    #[test]
    fn test_normalize_keeps_quoted_literals() {
        assert_eq!(
            normalize_query("SELECT * FROM t WHERE name = 'a   b'"),
            "SELECT * FROM t WHERE name = 'a   b'"
        );
    }

    #[test]
    fn test_normalize_respects_escaped_quotes() {
        assert_eq!(
            normalize_query(r"SELECT 'x\'   y'"),
            r"SELECT 'x\'   y'"
        );
        assert_eq!(
            normalize_query("SELECT 'it''s   here'   FROM t"),
            "SELECT 'it''s   here' FROM t"
        );
        assert_eq!(normalize_query(r"SELECT 'a\\'   b"), r"SELECT 'a\\' b");
    }
}

//! Textual query scoping.
//!
//! The access predicate is conjoined into a caller-supplied SELECT before the
//! earliest top-level `GROUP BY`, `ORDER BY`, `LIMIT` or `HAVING` keyword, or
//! appended when none is present. An existing top-level `WHERE` condition is
//! parenthesized so the predicate restricts every row it admits.
//!
//! Keyword search runs over a masked copy of the query in which quoted text
//! and everything inside parentheses is blanked out, so literals and
//! subqueries never receive the predicate.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::predicate::{AccessPredicate, ScopeColumns};

static TAIL_KEYWORDS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        keyword(r"\bGROUP\s+BY\b"),
        keyword(r"\bORDER\s+BY\b"),
        keyword(r"\bLIMIT\b"),
        keyword(r"\bHAVING\b"),
    ]
});

static WHERE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| keyword(r"\bWHERE\b"));

static SET_OPERATORS: LazyLock<Regex> =
    LazyLock::new(|| keyword(r"\b(UNION|INTERSECT|EXCEPT|MINUS)\b"));

static FORBIDDEN_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    keyword(r"\b(INSERT|UPDATE|DELETE|DROP|TRUNCATE|ALTER|CREATE|GRANT|REVOKE)\b")
});

// Patterns are literals.
fn keyword(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("static keyword pattern")
}

/// The top-level shape of a query.
///
/// `masked` has the same byte length as the query. Quoted text, comments and
/// everything nested inside parentheses are replaced by spaces, so byte
/// offsets found in `masked` index the original query directly.
struct TopLevel {
    masked: String,
    balanced: bool,
    has_comment: bool,
}

fn scan_top_level(query: &str) -> TopLevel {
    let mut masked = String::with_capacity(query.len());
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut balanced = true;
    let mut has_comment = false;
    let mut chars = query.chars().peekable();

    while let Some(c) = chars.next() {
        let hidden = match quote {
            Some(q) => {
                if c == '\\' && q != '`' {
                    if let Some(escaped) = chars.next() {
                        masked.extend(std::iter::repeat_n(' ', 1 + escaped.len_utf8()));
                        continue;
                    }
                } else if c == q {
                    if chars.peek() == Some(&q) {
                        chars.next();
                        masked.push_str("  ");
                        continue;
                    }
                    quote = None;
                }
                true
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    true
                }
                '(' => {
                    depth += 1;
                    true
                }
                ')' => {
                    match depth.checked_sub(1) {
                        Some(d) => depth = d,
                        None => balanced = false,
                    }
                    true
                }
                '-' if chars.peek() == Some(&'-') => {
                    has_comment = true;
                    true
                }
                '/' if chars.peek() == Some(&'*') => {
                    has_comment = true;
                    true
                }
                '#' => {
                    has_comment = true;
                    true
                }
                _ => depth > 0,
            },
        };
        if hidden {
            masked.extend(std::iter::repeat_n(' ', c.len_utf8()));
        } else {
            masked.push(c);
        }
    }

    TopLevel {
        masked,
        balanced: balanced && depth == 0 && quote.is_none(),
        has_comment,
    }
}

fn unscopable(reason: &str) -> EngineError {
    EngineError::ForbiddenQuery {
        reason: reason.to_string(),
    }
}

/// Conjoins a boolean SQL fragment into a query.
///
/// The fragment lands before the earliest top-level tail keyword. An
/// existing top-level `WHERE` condition is wrapped in parentheses; without
/// one the fragment opens a `WHERE`.
///
/// # Errors
///
/// Returns [`EngineError::ForbiddenQuery`] when the query cannot be scoped
/// as a single SELECT: unbalanced quotes or parentheses, comments, a
/// top-level set operator or a statement separator.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::scoping::conjoin_clause;
///
/// assert_eq!(
///     conjoin_clause("SELECT * FROM t WHERE x=1 OR y=2 ORDER BY z", "t.c=5").unwrap(),
///     "SELECT * FROM t WHERE (x=1 OR y=2) AND t.c=5 ORDER BY z"
/// );
/// assert_eq!(
///     conjoin_clause("SELECT * FROM t LIMIT 5", "t.c=5").unwrap(),
///     "SELECT * FROM t WHERE t.c=5 LIMIT 5"
/// );
/// assert!(conjoin_clause("SELECT * FROM t -- comment", "t.c=5").is_err());
/// ```
pub fn conjoin_clause(query: &str, clause: &str) -> EngineResult<String> {
    let query = query.trim().trim_end_matches(';').trim_end();
    let top = scan_top_level(query);

    if !top.balanced {
        return Err(unscopable("unbalanced quotes or parentheses"));
    }
    if top.has_comment {
        return Err(unscopable("comments are not allowed"));
    }
    if top.masked.contains(';') {
        return Err(unscopable("multiple statements are not allowed"));
    }
    if let Some(found) = SET_OPERATORS.find(&top.masked) {
        return Err(unscopable(&format!(
            "top-level {} cannot be scoped",
            found.as_str().to_ascii_uppercase()
        )));
    }

    let split_at = TAIL_KEYWORDS
        .iter()
        .filter_map(|re| re.find(&top.masked).map(|m| m.start()))
        .min()
        .unwrap_or(query.len());

    let head = query[..split_at].trim_end();
    let tail = query[split_at..].trim_start();

    let scoped_head = match WHERE_KEYWORD.find(&top.masked[..head.len()]) {
        Some(found) => {
            let condition = head[found.end()..].trim();
            if condition.is_empty() {
                return Err(unscopable("WHERE without a condition"));
            }
            format!("{} ({}) AND {}", &head[..found.end()], condition, clause)
        }
        None => format!("{} WHERE {}", head, clause),
    };

    if tail.is_empty() {
        Ok(scoped_head)
    } else {
        Ok(format!("{} {}", scoped_head, tail))
    }
}

/// Applies an access predicate to a query.
///
/// The always-true predicate returns the query unchanged. Any other
/// predicate requires `alias` to occur in the query, since a fragment
/// qualified by a missing alias would silently scope the wrong table. The
/// always-false predicate yields a query that returns no rows.
///
/// # Errors
///
/// Returns [`EngineError::QueryAliasMismatch`] when the alias does not occur
/// in the query, and [`EngineError::ForbiddenQuery`] when the query cannot be
/// scoped as a single SELECT.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::scoping::{AccessPredicate, ScopeClause, ScopeColumns, scope_query};
///
/// let predicate = AccessPredicate::AnyOf(vec![ScopeClause::Company { company_id: 5 }]);
/// let scoped = scope_query(
///     "SELECT p.name FROM company_employee p WHERE p.is_deleted = '0' ORDER BY p.name",
///     &predicate,
///     "p",
///     &ScopeColumns::default(),
/// )
/// .unwrap();
/// assert_eq!(
///     scoped,
///     "SELECT p.name FROM company_employee p \
///      WHERE (p.is_deleted = '0') AND p.company_id = 5 ORDER BY p.name"
/// );
/// ```
pub fn scope_query(
    query: &str,
    predicate: &AccessPredicate,
    alias: &str,
    columns: &ScopeColumns,
) -> EngineResult<String> {
    if predicate.is_unrestricted() {
        return Ok(query.to_string());
    }

    if !alias.is_empty() && !alias_occurs(query, alias) {
        return Err(EngineError::QueryAliasMismatch {
            alias: alias.to_string(),
        });
    }

    let clause = predicate.to_sql(alias, columns);
    let scoped = conjoin_clause(query, &clause)?;
    debug!(alias, clause = %clause, "Scoped query");
    Ok(scoped)
}

fn alias_occurs(query: &str, alias: &str) -> bool {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(alias));
    Regex::new(&pattern).is_ok_and(|re| re.is_match(query))
}

/// Rejects anything other than a single read-only statement.
///
/// The query must begin with `SELECT` or `WITH` and may not contain a
/// data-modifying or privilege keyword as a whole word.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::scoping::validate_read_only;
///
/// assert!(validate_read_only("select count(*) from company_attendance").is_ok());
/// assert!(validate_read_only("WITH x AS (SELECT 1) SELECT * FROM x").is_ok());
/// assert!(validate_read_only("DELETE FROM company").is_err());
/// assert!(validate_read_only("SELECT 1; DROP TABLE company").is_err());
/// ```
pub fn validate_read_only(query: &str) -> EngineResult<()> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(EngineError::ForbiddenQuery {
            reason: "query is empty".to_string(),
        });
    }

    let first_word = trimmed
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    if first_word != "SELECT" && first_word != "WITH" {
        return Err(EngineError::ForbiddenQuery {
            reason: "only SELECT or WITH statements are allowed".to_string(),
        });
    }

    if let Some(found) = FORBIDDEN_KEYWORDS.find(trimmed) {
        return Err(EngineError::ForbiddenQuery {
            reason: format!("forbidden keyword {}", found.as_str().to_ascii_uppercase()),
        });
    }

    Ok(())
}

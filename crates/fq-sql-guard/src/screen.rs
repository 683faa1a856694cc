//! Text screen validation policy.
//!
//! A syntactic last line of defense for statements whose user scoping was
//! applied upstream. Checks the SELECT prefix and a whole-word keyword
//! denylist independently, so a smuggled second statement is caught even
//! when the text starts with SELECT. Comments are refused outright since the
//! row cap is appended to the raw text.

use regex::Regex;
use std::sync::LazyLock;

use fq_protocol::{MAX_ROWS, ValidationResult};

use crate::validator::ScreenMode;

/// Statement keywords that may never appear, as whole words.
pub const DENYLIST: &[&str] = &[
    "DELETE", "UPDATE", "INSERT", "DROP", "ALTER", "TRUNCATE", "CREATE", "REPLACE", "GRANT",
    "REVOKE", "EXEC", "CALL", "MERGE", "SET", "SHOW", "DESCRIBE", "EXPLAIN",
];

static SELECT_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^SELECT\b").unwrap());

static DENIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b({})\b", DENYLIST.join("|"))).unwrap());

static STRICT_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(JOIN|UNION)\b").unwrap());

static SELECT_INTO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bINTO\b").unwrap());

/// A LIMIT only counts when it is the trailing clause of the outer statement.
static TRAILING_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|\s)(OFFSET\s+\d+\s+)?LIMIT\s+\d+(\s+OFFSET\s+\d+)?$").unwrap()
});

static LIMIT_ALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bLIMIT\s+ALL\b").unwrap());

/// Screen `sql` under the given sub-mode, collecting every violation.
pub fn validate(sql: &str, mode: ScreenMode) -> ValidationResult {
    let trimmed = sql.trim();
    let upper = trimmed.to_uppercase();
    let mut reasons = Vec::new();

    if trimmed.is_empty() {
        return ValidationResult::rejected(vec!["empty statement".into()]);
    }

    if !SELECT_PREFIX.is_match(&upper) {
        reasons.push("query must start with SELECT".to_string());
    }

    for keyword in distinct_matches(&DENIED, &upper) {
        reasons.push(format!("forbidden keyword: {keyword}"));
    }

    if trimmed.contains("--") || trimmed.contains("/*") {
        reasons.push("SQL comments are not allowed".into());
    }

    if SELECT_INTO.is_match(&upper) {
        reasons.push("SELECT INTO is not allowed".into());
    }

    // Trailing semicolons are dropped from the sanitized form.
    let body = trimmed.trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    match mode {
        ScreenMode::Strict => {
            for keyword in distinct_matches(&STRICT_ONLY, &upper) {
                reasons.push(format!("{keyword} is not allowed in strict mode"));
            }
            if trimmed.contains(';') {
                reasons.push("semicolons are not allowed (multiple statements)".into());
            }
        }
        ScreenMode::Relaxed => {
            if body.contains(';') {
                reasons.push("multiple statements are not allowed".into());
            }
        }
    }

    if LIMIT_ALL.is_match(&upper) {
        reasons.push("LIMIT ALL is not allowed".into());
    }

    ValidationResult::from_reasons(reasons, || {
        if TRAILING_LIMIT.is_match(&body.to_uppercase()) {
            body.to_string()
        } else {
            format!("{body} LIMIT {MAX_ROWS}")
        }
    })
}

fn distinct_matches<'a>(re: &Regex, text: &'a str) -> Vec<&'a str> {
    let mut found: Vec<&str> = Vec::new();
    for m in re.find_iter(text) {
        if !found.contains(&m.as_str()) {
            found.push(m.as_str());
        }
    }
    found
}

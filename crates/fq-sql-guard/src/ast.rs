//! AST validation policy.
//!
//! Parses the statement (PostgreSQL dialect) and checks:
//! - exactly one statement, and it is a plain SELECT query,
//! - no data-modifying bodies, `SELECT ... INTO`, CTEs or row locks,
//! - the serialized statement contains `<ownership column> = <user id>`,
//! - a LIMIT is present (`LIMIT 1000` is set on the tree otherwise).
//!
//! The ownership check is textual over the re-serialized tree. Reversed
//! operands (`42 = creator_id`) or aliased columns are not recognized, and
//! a matching predicate under an `OR` is not distinguished from a top-level
//! one.

use sqlparser::ast::{Expr, Query, SetExpr, Statement, Value};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use fq_protocol::{MAX_ROWS, ValidationResult};

/// Validate `sql` for `user_id`, collecting every violation.
pub fn validate(sql: &str, user_id: i64, ownership_columns: &[String]) -> ValidationResult {
    let mut statements = match Parser::parse_sql(&PostgreSqlDialect {}, sql) {
        Ok(statements) => statements,
        Err(e) => {
            return ValidationResult::rejected(vec![format!("failed to parse SQL: {e}")]);
        }
    };

    let mut reasons = Vec::new();

    if statements.is_empty() {
        reasons.push("empty statement".to_string());
    }
    if statements.len() > 1 {
        reasons.push(format!(
            "multiple statements are not allowed (found {})",
            statements.len()
        ));
    }

    for statement in &statements {
        match statement {
            Statement::Query(query) => check_query(query, &mut reasons),
            other => reasons.push(format!(
                "only SELECT statements are allowed (found {})",
                leading_keyword(other)
            )),
        }
    }

    let serialized = statements
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    if !has_ownership_filter(&serialized, user_id, ownership_columns) {
        let expected = ownership_columns
            .iter()
            .map(|c| format!("{c} = {user_id}"))
            .collect::<Vec<_>>()
            .join(", ");
        reasons.push(format!("missing ownership filter (expected one of: {expected})"));
    }

    ValidationResult::from_reasons(reasons, || {
        let mut statement = statements.remove(0);
        if let Statement::Query(query) = &mut statement {
            apply_row_cap(query);
        }
        statement.to_string()
    })
}

fn check_query(query: &Query, reasons: &mut Vec<String>) {
    if query.with.is_some() {
        reasons.push("WITH clauses are not allowed".into());
    }
    if selects_into(&query.body) {
        reasons.push("SELECT INTO is not allowed".into());
    } else if !is_read_only(&query.body) {
        reasons.push("data-modifying query bodies are not allowed".into());
    }
    if !query.locks.is_empty() {
        reasons.push("row locking clauses are not allowed".into());
    }
}

/// Whitelist of query bodies that only read.
fn is_read_only(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(select) => select.into.is_none(),
        SetExpr::Values(_) | SetExpr::Table(_) => true,
        SetExpr::Query(inner) => inner.with.is_none() && is_read_only(&inner.body),
        SetExpr::SetOperation { left, right, .. } => is_read_only(left) && is_read_only(right),
        _ => false,
    }
}

/// `SELECT ... INTO` creates a table in PostgreSQL.
fn selects_into(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(select) => select.into.is_some(),
        SetExpr::Query(inner) => selects_into(&inner.body),
        SetExpr::SetOperation { left, right, .. } => selects_into(left) || selects_into(right),
        _ => false,
    }
}

/// Set `LIMIT 1000` unless a LIMIT or FETCH is already present.
fn apply_row_cap(query: &mut Query) {
    if query.limit.is_none() && query.fetch.is_none() {
        query.limit = Some(Expr::Value(Value::Number(MAX_ROWS.to_string(), false)));
    }
}

fn leading_keyword(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

/// Look for `<column> = <user_id>` not followed by another digit.
pub fn has_ownership_filter(serialized: &str, user_id: i64, columns: &[String]) -> bool {
    let haystack = serialized.to_lowercase();
    columns.iter().any(|column| {
        let needle = format!("{} = {user_id}", column.to_lowercase());
        haystack.match_indices(&needle).any(|(pos, _)| {
            !haystack[pos + needle.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["creator_id".into(), "assignee_id".into(), "owner_id".into()]
    }

    fn check(sql: &str, user_id: i64) -> ValidationResult {
        validate(sql, user_id, &columns())
    }

    #[test]
    fn scoped_select_is_capped() {
        let result = check("select id from tasks where creator_id = 42", 42);
        assert!(result.valid, "{:?}", result.reasons);
        let sanitized = result.sanitized.unwrap();
        assert!(sanitized.ends_with("LIMIT 1000"), "{sanitized}");
        assert!(sanitized.starts_with("SELECT"));
    }

    #[test]
    fn existing_limit_kept() {
        let result = check("SELECT id FROM tasks WHERE creator_id = 42 LIMIT 5", 42);
        let sanitized = result.sanitized.unwrap();
        assert!(sanitized.ends_with("LIMIT 5"));
        assert!(!sanitized.contains("1000"));
    }

    #[test]
    fn revalidation_is_idempotent() {
        let first = check("select id from tasks where creator_id = 42", 42);
        let sanitized = first.sanitized.clone().unwrap();
        let second = check(&sanitized, 42);
        assert!(second.valid);
        assert_eq!(second.sanitized.as_deref(), Some(sanitized.as_str()));
        assert_eq!(sanitized.matches("LIMIT").count(), 1);
    }

    #[test]
    fn smuggled_second_statement() {
        let result = check("SELECT * FROM tasks; DROP TABLE tasks;", 42);
        assert!(!result.valid);
        assert!(result.sanitized.is_none());
        assert!(
            result.reasons.iter().any(|r| r.contains("multiple statements")),
            "{:?}",
            result.reasons
        );
        assert!(result.reasons.iter().any(|r| r.contains("found DROP")));
    }

    #[test]
    fn every_violation_reported() {
        let result = check("DELETE FROM tasks", 42);
        assert!(!result.valid);
        assert!(result.reasons.iter().any(|r| r.contains("found DELETE")));
        assert!(result.reasons.iter().any(|r| r.contains("missing ownership")));
    }

    #[test]
    fn missing_ownership_filter() {
        let result = check("SELECT * FROM tasks", 42);
        assert!(!result.valid);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.reasons[0].contains("creator_id = 42"));
    }

    #[test]
    fn other_users_id_rejected() {
        assert!(!check("SELECT * FROM tasks WHERE creator_id = 7", 42).valid);
        assert!(!check("SELECT * FROM tasks WHERE creator_id = 420", 42).valid);
    }

    #[test]
    fn whitespace_and_case_normalized() {
        let result = check("SELECT * FROM farms f WHERE F.OWNER_ID   =   42", 42);
        assert!(result.valid, "{:?}", result.reasons);
    }

    #[test]
    fn qualified_and_or_scoped_columns() {
        let sql = "SELECT t.id, f.location FROM tasks t JOIN farms f ON f.id = t.farm_id \
                   WHERE (t.creator_id = 9 OR t.assignee_id = 9) AND f.location ILIKE '%nyeri%'";
        assert!(check(sql, 9).valid);
    }

    #[test]
    fn reversed_operands_not_recognized() {
        // Known gap of the textual check.
        assert!(!check("SELECT * FROM tasks WHERE 42 = creator_id", 42).valid);
    }

    #[test]
    fn row_locks_rejected() {
        let result = check("SELECT * FROM tasks WHERE creator_id = 42 FOR UPDATE", 42);
        assert!(!result.valid);
        assert!(result.reasons.iter().any(|r| r.contains("locking")));
    }

    #[test]
    fn select_into_rejected() {
        let result = check(
            "SELECT * INTO stolen_tasks FROM tasks WHERE creator_id = 42",
            42,
        );
        assert!(!result.valid);
        assert!(result.sanitized.is_none());
        assert_eq!(result.reasons, vec!["SELECT INTO is not allowed".to_string()]);
    }

    #[test]
    fn subquery_limit_still_caps_outer() {
        let result = check(
            "SELECT * FROM tasks WHERE creator_id = 42 AND id IN (SELECT id FROM tasks LIMIT 5)",
            42,
        );
        assert!(result.valid, "{:?}", result.reasons);
        assert!(result.sanitized.unwrap().ends_with(") LIMIT 1000"));
    }

    #[test]
    fn comments_dropped_before_cap() {
        let result = check("SELECT * FROM tasks WHERE creator_id = 42 -- all rows", 42);
        assert!(result.valid, "{:?}", result.reasons);
        let sanitized = result.sanitized.unwrap();
        assert!(!sanitized.contains("--"), "{sanitized}");
        assert!(sanitized.ends_with("LIMIT 1000"));
    }

    #[test]
    fn union_of_selects_allowed() {
        let sql = "SELECT id FROM tasks WHERE creator_id = 3 UNION SELECT id FROM tasks WHERE assignee_id = 3";
        assert!(check(sql, 3).valid);
    }

    #[test]
    fn unparsable_rejected() {
        let result = check("SELEC id FRM tasks", 42);
        assert!(!result.valid);
        assert!(result.reasons[0].starts_with("failed to parse SQL"));
    }

    #[test]
    fn empty_rejected() {
        let result = check("   ", 42);
        assert!(!result.valid);
        assert!(result.reasons.iter().any(|r| r.contains("empty")));
    }

    #[test]
    fn ownership_digit_boundary() {
        let cols = columns();
        assert!(has_ownership_filter("where creator_id = 42 limit 1000", 42, &cols));
        assert!(has_ownership_filter("where creator_id = 42", 42, &cols));
        assert!(!has_ownership_filter("where creator_id = 421", 42, &cols));
    }
}

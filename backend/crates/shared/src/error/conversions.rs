//! Error conversions - From implementations for common error types
//!
//! Store- and library-specific error shapes are normalized into the
//! [`ErrorKind`] taxonomy here, before anything is rendered.

use super::app_error::AppError;
#[cfg(test)]
use super::kind::ErrorKind;

// ============================================================================
// Standard library conversions
// ============================================================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let app_err = match err.kind() {
            std::io::ErrorKind::NotFound => AppError::not_found("I/O operation failed"),
            std::io::ErrorKind::PermissionDenied => AppError::forbidden("I/O operation failed"),
            std::io::ErrorKind::TimedOut => {
                AppError::service_unavailable("I/O operation timed out")
            }
            _ => AppError::internal("I/O operation failed"),
        };
        app_err.with_source(err)
    }
}

// ============================================================================
// serde_json conversions
// ============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            AppError::bad_request(format!("JSON parse error: {}", err)).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// Pull `(field, value)` out of a PostgreSQL unique-violation detail such as
/// `Key (email)=(jane@example.com) already exists.`
///
/// The column name is converted to the camelCase field name clients send.
pub fn parse_unique_violation_detail(detail: &str) -> Option<(String, String)> {
    let rest = detail.strip_prefix("Key (")?;
    let (column, rest) = rest.split_once(")=(")?;
    let (value, _) = rest.rsplit_once(") already exists")?;
    Some((snake_to_camel(column), value.to_string()))
}

fn snake_to_camel(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut upper_next = false;
    for ch in column.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(feature = "sqlx")]
fn duplicate_key_error(db_err: &dyn sqlx::error::DatabaseError) -> AppError {
    let parsed = db_err
        .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
        .and_then(|pg| pg.detail())
        .and_then(parse_unique_violation_detail);

    match parsed {
        Some((field, value)) => AppError::conflict(format!(
            "Duplicate field: {field}: \"{value}\". Please use another value."
        )),
        None => AppError::conflict("Duplicate field value. Please use another value."),
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found").with_source(err),
            sqlx::Error::PoolTimedOut => {
                AppError::service_unavailable("Database connection pool exhausted").with_source(err)
            }
            sqlx::Error::Database(db_err) => {
                // PostgreSQL specific error codes
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let app_err = if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        // Class 22: Data Exception (the store's cast errors)
                        "22P02" | "22007" | "22008" => {
                            AppError::bad_request("Invalid input syntax")
                        }
                        "22003" => AppError::bad_request("Numeric value out of range"),
                        // Class 23: Integrity Constraint Violation
                        "23000" => AppError::conflict("Integrity constraint violation"),
                        "23001" => AppError::conflict("Restrict violation"),
                        "23502" => AppError::bad_request("Required field is null"),
                        "23503" => AppError::conflict("Foreign key violation"),
                        "23505" => duplicate_key_error(db_err.as_ref()),
                        "23514" => AppError::validation([format!(
                            "Check constraint violated: {}",
                            db_err.constraint().unwrap_or("unknown")
                        )]),
                        // Class 42: Syntax Error or Access Rule Violation
                        "42501" => AppError::forbidden("Insufficient privilege"),
                        // Class 53: Insufficient Resources
                        "53000" | "53100" | "53200" | "53300" => {
                            AppError::service_unavailable("Database resource exhausted")
                        }
                        // Class 57: Operator Intervention
                        "57000" | "57014" | "57P01" | "57P02" | "57P03" => {
                            AppError::service_unavailable("Database unavailable")
                        }
                        _ => AppError::internal("Database error"),
                    }
                } else {
                    AppError::internal("Database error")
                };
                app_err.with_source(err)
            }
            sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database connection error").with_source(err)
            }
            sqlx::Error::Protocol(_) => {
                AppError::internal("Database protocol error").with_source(err)
            }
            sqlx::Error::Tls(_) => AppError::internal("Database TLS error").with_source(err),
            _ => AppError::internal("Database error").with_source(err),
        }
    }
}

//! Execution boundary between statement buffers and a database.

use crate::error::SqlResult;
use crate::sql::Prepared;
use crate::value::Value;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Something that can run a [`Prepared`] statement.
///
/// Implemented for `tokio_postgres::Client` and `tokio_postgres::Transaction`.
/// Tests and alternative drivers provide their own implementation with their
/// own `Row` type; the builder helpers take the executor as an argument, so
/// nothing has to be swapped globally.
pub trait Executor: Send + Sync {
    /// One result row as produced by this executor.
    type Row: Send;

    /// Run a query and return its rows, honoring `stmt.options.row_limit()`.
    fn query(
        &self,
        stmt: &Prepared,
    ) -> impl std::future::Future<Output = SqlResult<Vec<Self::Row>>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, stmt: &Prepared) -> impl std::future::Future<Output = SqlResult<u64>> + Send;
}

/// Rewrite `?` placeholders to Postgres' `$1, $2, ...`.
///
/// Question marks inside single-quoted literals and double-quoted identifiers
/// are left alone.
pub fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut n = 0usize;

    for c in sql.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    out.push(c);
                }
                '?' => {
                    n += 1;
                    out.push('$');
                    out.push_str(&n.to_string());
                }
                _ => out.push(c),
            },
        }
    }
    out
}

fn params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

fn limit_rows(mut rows: Vec<Row>, stmt: &Prepared) -> Vec<Row> {
    if let Some(max) = stmt.options.row_limit() {
        rows.truncate(max);
    }
    rows
}

impl Executor for tokio_postgres::Client {
    type Row = Row;

    async fn query(&self, stmt: &Prepared) -> SqlResult<Vec<Row>> {
        let sql = numbered_placeholders(&stmt.sql);
        let rows = tokio_postgres::Client::query(self, sql.as_str(), &params(&stmt.args)).await?;
        Ok(limit_rows(rows, stmt))
    }

    async fn execute(&self, stmt: &Prepared) -> SqlResult<u64> {
        let sql = numbered_placeholders(&stmt.sql);
        Ok(tokio_postgres::Client::execute(self, sql.as_str(), &params(&stmt.args)).await?)
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    type Row = Row;

    async fn query(&self, stmt: &Prepared) -> SqlResult<Vec<Row>> {
        let sql = numbered_placeholders(&stmt.sql);
        let rows =
            tokio_postgres::Transaction::query(self, sql.as_str(), &params(&stmt.args)).await?;
        Ok(limit_rows(rows, stmt))
    }

    async fn execute(&self, stmt: &Prepared) -> SqlResult<u64> {
        let sql = numbered_placeholders(&stmt.sql);
        Ok(tokio_postgres::Transaction::execute(self, sql.as_str(), &params(&stmt.args)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered_in_order() {
        assert_eq!(
            numbered_placeholders("select a from t where a in (?,?,?) and b = ?"),
            "select a from t where a in ($1,$2,$3) and b = $4"
        );
    }

    #[test]
    fn quoted_question_marks_are_kept() {
        assert_eq!(
            numbered_placeholders(r#"select '?', "odd?col" from t where x = ? and y = 'it''s ?'"#),
            r#"select '?', "odd?col" from t where x = $1 and y = 'it''s ?'"#
        );
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(numbered_placeholders("select 1"), "select 1");
    }
}

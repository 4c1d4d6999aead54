//! Running a statement buffer through an [`Executor`].
//!
//! Every helper prepares the builder first (expanding collections and applying
//! bindings in place), logs the masked debug rendering and hands the
//! [`Prepared`] statement to the executor.

use super::builder::SqlBuilder;
use super::interpolate::Prepared;
use crate::client::Executor;
use crate::error::{SqlError, SqlResult};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;
use tokio_postgres::row::RowIndex;
use tokio_postgres::types::FromSql;

impl SqlBuilder {
    fn prepare_for_execution(&mut self) -> SqlResult<Prepared> {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sqlweave.sql", statement = %self, "executing");
        self.prepare()
    }

    /// Run the query and return all rows.
    pub async fn fetch_all<C: Executor>(&mut self, conn: &C) -> SqlResult<Vec<C::Row>> {
        let stmt = self.prepare_for_execution()?;
        conn.query(&stmt).await
    }

    /// Map every row; rows mapped to `None` are skipped.
    ///
    /// ```ignore
    /// let names = sql!("select name from users where id in (?)", ids)
    ///     .fetch_list(&client, |row| Ok(row.try_get::<_, Option<String>>(0)?))
    ///     .await?;
    /// ```
    pub async fn fetch_list<C, T, F>(&mut self, conn: &C, mut mapper: F) -> SqlResult<Vec<T>>
    where
        C: Executor,
        F: FnMut(&C::Row) -> SqlResult<Option<T>>,
    {
        let rows = self.fetch_all(conn).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(item) = mapper(row)? {
                out.push(item);
            }
        }
        Ok(out)
    }

    /// Map every row to a key/value pair. Rows mapped to `None` are skipped;
    /// a key produced twice is an error.
    pub async fn fetch_map<C, K, V, F>(&mut self, conn: &C, mut mapper: F) -> SqlResult<HashMap<K, V>>
    where
        C: Executor,
        K: Eq + Hash + fmt::Debug,
        F: FnMut(&C::Row) -> SqlResult<Option<(K, V)>>,
    {
        let rows = self.fetch_all(conn).await?;
        let mut out = HashMap::with_capacity(rows.len());
        for row in &rows {
            let Some((key, value)) = mapper(row)? else {
                continue;
            };
            match out.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(SqlError::DuplicateKey(format!("{:?}", entry.key())));
                }
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        Ok(out)
    }

    /// Map the first row, if any. Further rows are ignored.
    pub async fn fetch_single<C, T, F>(&mut self, conn: &C, mapper: F) -> SqlResult<Option<T>>
    where
        C: Executor,
        F: FnOnce(&C::Row) -> SqlResult<Option<T>>,
    {
        let rows = self.fetch_all(conn).await?;
        match rows.first() {
            Some(row) => mapper(row),
            None => Ok(None),
        }
    }

    /// Like [`fetch_single`](SqlBuilder::fetch_single), with a fallback for no row
    /// or a row mapped to `None`.
    pub async fn fetch_single_or<C, T, F>(&mut self, conn: &C, mapper: F, default: T) -> SqlResult<T>
    where
        C: Executor,
        F: FnOnce(&C::Row) -> SqlResult<Option<T>>,
    {
        Ok(self.fetch_single(conn, mapper).await?.unwrap_or(default))
    }

    /// Run an insert, update, delete or DDL statement and return the affected-row count.
    pub async fn execute<C: Executor>(&mut self, conn: &C) -> SqlResult<u64> {
        let stmt = self.prepare_for_execution()?;
        conn.execute(&stmt).await
    }

    /// Read one column of the first row, or return `default` when there is no row.
    ///
    /// `column` is a 0-based index or a column name.
    ///
    /// ```ignore
    /// let total: i64 = sql!("select count(*) from users where status in (?)", ["a", "b"])
    ///     .fetch_scalar(&client, 0, 0)
    ///     .await?;
    /// ```
    pub async fn fetch_scalar<C, I, T>(&mut self, conn: &C, column: I, default: T) -> SqlResult<T>
    where
        C: Executor<Row = tokio_postgres::Row>,
        I: RowIndex + fmt::Display,
        T: for<'a> FromSql<'a>,
    {
        let rows = self.fetch_all(conn).await?;
        let Some(row) = rows.first() else {
            return Ok(default);
        };
        let label = column.to_string();
        row.try_get(column)
            .map_err(|e| SqlError::decode(label, e.to_string()))
    }
}

//! Fetch helpers against an in-memory executor.

use sqlweave::{Executor, Prepared, SqlError, SqlResult, Value, mask, sql};
use std::sync::Mutex;

/// Returns canned rows and records every statement it receives.
struct FakeClient {
    rows: Vec<Vec<Value>>,
    affected: u64,
    seen: Mutex<Vec<Prepared>>,
}

impl FakeClient {
    fn new(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows,
            affected: 0,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> Prepared {
        self.seen.lock().unwrap().last().cloned().expect("no statement executed")
    }
}

impl Executor for FakeClient {
    type Row = Vec<Value>;

    async fn query(&self, stmt: &Prepared) -> SqlResult<Vec<Vec<Value>>> {
        self.seen.lock().unwrap().push(stmt.clone());
        let mut rows = self.rows.clone();
        if let Some(max) = stmt.options.row_limit() {
            rows.truncate(max);
        }
        Ok(rows)
    }

    async fn execute(&self, stmt: &Prepared) -> SqlResult<u64> {
        self.seen.lock().unwrap().push(stmt.clone());
        Ok(self.affected)
    }
}

fn int(row: &[Value], index: usize) -> SqlResult<Option<i64>> {
    match row.get(index) {
        Some(Value::Int(v)) => Ok(Some(*v)),
        Some(Value::Null) => Ok(None),
        Some(other) => Err(SqlError::decode(index.to_string(), format!("not an int: {other}"))),
        None => Err(SqlError::decode(index.to_string(), "no such column")),
    }
}

fn text(row: &[Value], index: usize) -> SqlResult<Option<String>> {
    match row.get(index) {
        Some(Value::Text(v)) => Ok(Some(v.clone())),
        Some(Value::Null) => Ok(None),
        Some(other) => Err(SqlError::decode(index.to_string(), format!("not text: {other}"))),
        None => Err(SqlError::decode(index.to_string(), "no such column")),
    }
}

fn numbers() -> FakeClient {
    FakeClient::new(vec![
        vec![Value::Int(3), Value::from("three")],
        vec![Value::Int(1), Value::from("one")],
        vec![Value::Int(4), Value::from("four")],
    ])
}

#[tokio::test]
async fn fetch_all_sends_the_prepared_statement() {
    let client = numbers();
    let mut q = sql!("select n, name from ${t} where n in (?)", vec![3, 1, 4]);
    q.bind("t", "numbers").unwrap();

    let rows = q.fetch_all(&client).await.unwrap();
    assert_eq!(rows.len(), 3);

    let stmt = client.last();
    assert_eq!(stmt.sql, "select n, name from numbers where n in (?,?,?)");
    assert_eq!(stmt.args, vec![Value::Int(3), Value::Int(1), Value::Int(4)]);
    // The builder now holds the expanded statement.
    assert_eq!(q.text(), stmt.sql);
}

#[tokio::test]
async fn fetch_list_maps_rows() {
    let client = numbers();
    let mut q = sql("select n from numbers");
    let values = q.fetch_list(&client, |row| int(row, 0)).await.unwrap();
    assert_eq!(values, vec![3, 1, 4]);
}

#[tokio::test]
async fn fetch_list_skips_none() {
    let client = FakeClient::new(vec![
        vec![Value::from("first")],
        vec![Value::Null],
        vec![Value::from("third")],
    ]);
    let values = sql("select s from t")
        .fetch_list(&client, |row| text(row, 0))
        .await
        .unwrap();
    assert_eq!(values, vec!["first".to_string(), "third".to_string()]);

    // Keeping nulls is a matter of returning `Some(None)`.
    let values = sql("select s from t")
        .fetch_list(&client, |row| text(row, 0).map(Some))
        .await
        .unwrap();
    assert_eq!(values, vec![Some("first".into()), None, Some("third".into())]);
}

#[tokio::test]
async fn fetch_list_propagates_mapper_errors() {
    let client = numbers();
    let err = sql("select name from numbers")
        .fetch_list(&client, |row| int(row, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, SqlError::Decode { .. }));
}

#[tokio::test]
async fn fetch_map_collects_pairs() {
    let client = numbers();
    let map = sql("select n, name from numbers")
        .fetch_map(&client, |row| {
            Ok(int(row, 0)?.zip(text(row, 1)?))
        })
        .await
        .unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map[&4], "four");
}

#[tokio::test]
async fn fetch_map_rejects_duplicate_keys() {
    let client = FakeClient::new(vec![
        vec![Value::Int(1), Value::from("one")],
        vec![Value::Int(1), Value::from("uno")],
    ]);
    let err = sql("select n, name from numbers")
        .fetch_map(&client, |row| Ok(int(row, 0)?.zip(text(row, 1)?)))
        .await
        .unwrap_err();
    assert!(matches!(err, SqlError::DuplicateKey(_)));
    assert_eq!(err.to_string(), "Duplicate map key '1' is unsupported");
}

#[tokio::test]
async fn fetch_single_uses_the_first_row() {
    let client = numbers();
    let first = sql("select n from numbers")
        .fetch_single(&client, |row| int(row, 0))
        .await
        .unwrap();
    assert_eq!(first, Some(3));

    let empty = FakeClient::new(Vec::new());
    let none = sql("select n from numbers")
        .fetch_single(&empty, |row| int(row, 0))
        .await
        .unwrap();
    assert_eq!(none, None);

    let fallback = sql("select s from t")
        .fetch_single_or(&empty, |row| text(row, 0), "default".to_string())
        .await
        .unwrap();
    assert_eq!(fallback, "default");

    let nulls = FakeClient::new(vec![vec![Value::Null]]);
    let fallback = sql("select s from t")
        .fetch_single_or(&nulls, |row| text(row, 0), "default".to_string())
        .await
        .unwrap();
    assert_eq!(fallback, "default");
}

#[tokio::test]
async fn execute_returns_affected_rows() {
    let client = FakeClient {
        affected: 2,
        ..FakeClient::new(Vec::new())
    };
    let mut q = sql("update ${t} set name = ? where n in (?)");
    q.bind("t", "numbers").unwrap();
    q.arg(mask("secret")).arg(vec![1, 2]);

    assert_eq!(q.execute(&client).await.unwrap(), 2);

    let stmt = client.last();
    assert_eq!(stmt.sql, "update numbers set name = ? where n in (?,?)");
    // The executor receives the masked value; drivers bind its inner value.
    assert_eq!(stmt.args[0].unmasked(), &Value::from("secret"));
    assert_eq!(q.to_string(), format!("{}; args=[{}, 1, 2]", stmt.sql, mask("secret")));
}

#[tokio::test]
async fn options_reach_the_executor() {
    let client = numbers();
    let mut q = sql("select n from numbers");
    q.with_max_rows(2).with_fetch_size(100);

    let values = q.fetch_list(&client, |row| int(row, 0)).await.unwrap();
    assert_eq!(values, vec![3, 1]);
    assert_eq!(client.last().options.fetch_size, Some(100));
}

#[tokio::test]
async fn zero_max_rows_returns_everything() {
    let client = numbers();
    let mut q = sql("select n from numbers");
    q.with_max_rows(0);

    let all = q.fetch_all(&client).await.unwrap();
    assert_eq!(all.len(), client.rows.len());
}

#[tokio::test]
async fn render_errors_stop_execution() {
    let client = numbers();
    let err = sql!("select n from numbers where n in (?)", Vec::<i64>::new())
        .fetch_all(&client)
        .await
        .unwrap_err();
    assert!(err.is_empty_collection());
    assert!(client.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn executing_twice_sends_the_same_statement() {
    let client = numbers();
    let mut q = sql("select n from numbers where n in (?) and name = ?");
    q.arg(vec![1, 3]).arg("one");

    q.fetch_all(&client).await.unwrap();
    let first = client.last();
    q.fetch_all(&client).await.unwrap();
    assert_eq!(client.last(), first);
}

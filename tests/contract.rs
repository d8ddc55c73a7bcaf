use async_trait::async_trait;

use dbinterface::drivers::{RecordingDriver, ResultBuilder};
use dbinterface::error::DbError;
use dbinterface::traits::{Connection, Cursor, Driver, Statement};
use dbinterface::types::{Batch, Params, Row, SqlValue};
use dbinterface::ConnectOptions;

// A driver that overrides nothing.
struct BareDriver;
struct BareConnection;
struct BareStatement;
struct BareCursor;

#[async_trait]
impl Driver for BareDriver {
    type Connection = BareConnection;
}

#[async_trait]
impl Connection for BareConnection {
    type Statement = BareStatement;
}

#[async_trait]
impl Statement for BareStatement {
    type Cursor = BareCursor;
}

impl Cursor for BareCursor {}

fn assert_not_implemented<T>(result: dbinterface::Result<T>, operation: &str) {
    match result {
        Err(DbError::NotImplemented { operation: op }) => assert_eq!(op, operation),
        Err(other) => panic!("Expected NotImplemented for {}, got {:?}", operation, other),
        Ok(_) => panic!("Expected NotImplemented for {}, got Ok", operation),
    }
}

fn users() -> ResultBuilder {
    ResultBuilder::new().columns(&["id", "name"])
}

#[tokio::test]
async fn test_unimplemented_operations_fail() {
    let opts = ConnectOptions::new("bare");
    assert_not_implemented(BareDriver.connect(&opts).await, "connect");

    let mut conn = BareConnection;
    assert_not_implemented(conn.prepare("SELECT 1").await, "prepare");
    assert_not_implemented(conn.execute("SELECT 1", &Params::None).await, "prepare");
    assert_not_implemented(
        conn.execute_multiple("SELECT 1", &Params::None).await,
        "prepare",
    );
    assert_not_implemented(
        conn.execute_many("SELECT 1", &Batch::default()).await,
        "prepare",
    );
    assert_not_implemented(conn.close().await, "close connection");

    let mut stmt = BareStatement;
    assert_not_implemented(stmt.execute(&Params::None).await, "execute");
    assert_not_implemented(stmt.execute_multiple(&Params::None).await, "execute");
    assert_not_implemented(
        stmt.execute_many(&Batch::positional([vec![1, 2]])).await,
        "execute",
    );
    assert_not_implemented(stmt.close().await, "close statement");

    let mut cursor = BareCursor;
    assert_not_implemented(cursor.columns(), "columns");
    assert_not_implemented(cursor.next_row(), "next_row");
    assert_not_implemented(cursor.last_row_id(), "last_row_id");
    assert_not_implemented(cursor.close(), "close cursor");
    let mut rows = cursor.rows();
    assert!(matches!(rows.next(), Some(Err(DbError::NotImplemented { .. }))));
    assert!(rows.next().is_none());
}

#[tokio::test]
async fn test_malformed_batch_fails_before_driver_calls() {
    let mismatched = Batch::positional([vec![1, 2], vec![10, 20, 30]]);

    let mut stmt = BareStatement;
    assert!(matches!(
        stmt.execute_many(&mismatched).await,
        Err(DbError::Parameter(_))
    ));
    assert!(matches!(
        BareConnection.execute_many("INSERT", &mismatched).await,
        Err(DbError::Parameter(_))
    ));
}

#[tokio::test]
async fn test_connect_records_options() {
    let driver = RecordingDriver::new();
    let opts = ConnectOptions::from_toml_str(
        "target = \"memory://test\"\n[options]\nmode = \"rw\"\n",
    )
    .unwrap();

    let conn = driver.connect(&opts).await.unwrap();
    assert!(conn.is_open());
    assert_eq!(driver.connections(), vec![opts]);
}

#[tokio::test]
async fn test_refused_connection() {
    let driver = RecordingDriver::new().refuse_connections();
    let err = driver
        .connect(&ConnectOptions::new("memory://test"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DbError::ConnectionFailed(_)));
    assert!(driver.connections().is_empty());
}

#[tokio::test]
async fn test_execute_from_query_text_prepares_then_executes() {
    let driver = RecordingDriver::new().with_response(
        users()
            .row([SqlValue::Int64(42), SqlValue::from("Bob")])
            .build(),
    );
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();

    let mut cursor = conn
        .execute(
            "SELECT id, name FROM users WHERE name = ?",
            &Params::positional(["Bob"]),
        )
        .await
        .unwrap();

    assert_eq!(
        driver.prepared_statements(),
        vec!["SELECT id, name FROM users WHERE name = ?".to_string()]
    );
    driver.assert_execution_count(1);
    driver.assert_last_execution(
        "SELECT id, name FROM users WHERE name = ?",
        &Params::positional(["Bob"]),
    );

    assert_eq!(cursor.columns().unwrap().names(), ["id", "name"]);
    let row = cursor.next_row().unwrap().unwrap();
    assert_eq!(row.get("id").unwrap(), &SqlValue::Int64(42));
    assert_eq!(row.get_index(1).unwrap().as_str(), Some("Bob"));
    assert!(cursor.next_row().unwrap().is_none());
}

#[tokio::test]
async fn test_named_params_are_recorded() {
    let driver = RecordingDriver::new();
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();
    let params = Params::named([("id", SqlValue::Int32(1)), ("name", SqlValue::from("Ann"))]);

    let mut stmt = conn.prepare("UPDATE users SET name = :name WHERE id = :id").await.unwrap();
    stmt.execute(&params).await.unwrap();

    driver.assert_last_execution("UPDATE users SET name = :name WHERE id = :id", &params);
}

#[tokio::test]
async fn test_execute_multiple_wraps_single_result() {
    let response = users()
        .row([SqlValue::Int64(1), SqlValue::from("Ann")])
        .row([SqlValue::Int64(2), SqlValue::from("Bob")])
        .build();
    let driver = RecordingDriver::new().with_default_response(response);
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();
    let mut stmt = conn.prepare("SELECT id, name FROM users").await.unwrap();
    let params = Params::positional([7]);

    let mut single = stmt.execute(&params).await.unwrap();
    let mut multiple = stmt.execute_multiple(&params).await.unwrap();

    assert_eq!(multiple.len(), 1);
    let expected: Vec<Row> = single.rows().collect::<Result<_, _>>().unwrap();
    let actual: Vec<Row> = multiple[0].rows().collect::<Result<_, _>>().unwrap();
    assert_eq!(actual, expected);
    assert_eq!(actual.len(), 2);

    let from_conn = conn
        .execute_multiple("SELECT id, name FROM users", &params)
        .await
        .unwrap();
    assert_eq!(from_conn.len(), 1);
    driver.assert_execution_count(3);
}

#[tokio::test]
async fn test_execute_many_runs_once_per_index_in_order() {
    let driver = RecordingDriver::new();
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();
    let mut stmt = conn.prepare("INSERT INTO t (a, b) VALUES (?, ?)").await.unwrap();

    stmt.execute_many(&Batch::positional([vec![1, 2, 3], vec![10, 20, 30]]))
        .await
        .unwrap();

    let params: Vec<Params> = driver.executions().into_iter().map(|e| e.params).collect();
    assert_eq!(
        params,
        vec![
            Params::positional([1, 10]),
            Params::positional([2, 20]),
            Params::positional([3, 30]),
        ]
    );
}

#[tokio::test]
async fn test_execute_many_named() {
    let driver = RecordingDriver::new();
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();

    conn.execute_many(
        "INSERT INTO t (a, b) VALUES (:a, :b)",
        &Batch::named([("a", vec![1, 2]), ("b", vec![3, 4])]).unwrap(),
    )
    .await
    .unwrap();

    driver.assert_execution_count(2);
    driver.assert_last_execution(
        "INSERT INTO t (a, b) VALUES (:a, :b)",
        &Params::named([("a", 2), ("b", 4)]),
    );
}

#[tokio::test]
async fn test_execute_many_mismatched_lengths_runs_nothing() {
    let driver = RecordingDriver::new();
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();
    let batch = Batch::positional([vec![1, 2], vec![10, 20, 30]]);

    let mut stmt = conn.prepare("INSERT INTO t (a, b) VALUES (?, ?)").await.unwrap();
    let err = stmt.execute_many(&batch).await.unwrap_err();
    assert!(matches!(err, DbError::Parameter(_)));

    let err = conn
        .execute_many("INSERT INTO t (a, b) VALUES (?, ?)", &batch)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Parameter(_)));

    driver.assert_execution_count(0);
    assert_eq!(driver.prepared_statements().len(), 1);
}

#[tokio::test]
async fn test_execute_many_named_mismatched_lengths_runs_nothing() {
    let driver = RecordingDriver::new();
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();
    let mut stmt = conn.prepare("INSERT INTO t (a, b) VALUES (:a, :b)").await.unwrap();

    let batch = Batch::named([("a", vec![1, 2]), ("b", vec![1])]).unwrap();
    let err = stmt.execute_many(&batch).await.unwrap_err();

    assert!(matches!(err, DbError::Parameter(_)));
    driver.assert_execution_count(0);
}

#[tokio::test]
async fn test_named_batch_with_repeated_name_is_rejected() {
    let err = Batch::named([("a", vec![1, 2]), ("a", vec![1, 2, 3])]).unwrap_err();
    assert!(matches!(err, DbError::Parameter(_)));
}

#[tokio::test]
async fn test_execute_many_without_collections_runs_once() {
    let driver = RecordingDriver::new();
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();

    conn.execute_many("DELETE FROM t", &Batch::default())
        .await
        .unwrap();

    driver.assert_execution_count(1);
    driver.assert_last_execution("DELETE FROM t", &Params::None);
}

#[tokio::test]
async fn test_execute_many_fails_fast() {
    let driver = RecordingDriver::new().fail_at_execution(1);
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();
    let mut stmt = conn.prepare("INSERT INTO t (a) VALUES (?)").await.unwrap();

    let err = stmt
        .execute_many(&Batch::positional([vec![1, 2, 3, 4]]))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::QueryFailed(_)));
    // The failing execution is recorded; nothing after it runs.
    driver.assert_execution_count(2);
    driver.assert_last_execution("INSERT INTO t (a) VALUES (?)", &Params::positional([2]));
}

#[tokio::test]
async fn test_last_row_id_per_execution() {
    let driver = RecordingDriver::new();
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();
    let mut stmt = conn.prepare("INSERT INTO t (a) VALUES (?)").await.unwrap();

    let first = stmt.execute(&Params::positional([1])).await.unwrap();
    let second = stmt.execute(&Params::positional([2])).await.unwrap();

    assert_eq!(first.last_row_id().unwrap(), 1);
    assert_eq!(second.last_row_id().unwrap(), 2);
}

#[tokio::test]
async fn test_statement_lifecycle() {
    let driver = RecordingDriver::new();
    let mut conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();

    let mut closed_stmt = conn.prepare("SELECT 1").await.unwrap();
    closed_stmt.close().await.unwrap();
    assert!(matches!(
        closed_stmt.execute(&Params::None).await,
        Err(DbError::Closed("statement"))
    ));
    assert!(matches!(
        closed_stmt.close().await,
        Err(DbError::Closed("statement"))
    ));

    let mut stmt = conn.prepare("SELECT 2").await.unwrap();
    conn.close().await.unwrap();
    assert!(!conn.is_open());

    assert!(matches!(
        stmt.execute(&Params::None).await,
        Err(DbError::Closed("connection"))
    ));
    assert!(matches!(
        conn.prepare("SELECT 3").await,
        Err(DbError::Closed("connection"))
    ));
    assert!(matches!(conn.close().await, Err(DbError::Closed("connection"))));
    driver.assert_execution_count(0);
}

#[tokio::test]
async fn test_cursor_close() {
    let driver = RecordingDriver::new()
        .with_response(users().row([SqlValue::Int64(1), SqlValue::Null]).build());
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();

    let mut cursor = conn.execute("SELECT id, name FROM users", &Params::None).await.unwrap();
    cursor.close().unwrap();
    assert!(matches!(cursor.next_row(), Err(DbError::Closed("cursor"))));
}

#[tokio::test]
async fn test_queued_responses_then_default() {
    let driver = RecordingDriver::new()
        .with_responses([
            users().row([SqlValue::Int64(1), SqlValue::from("Ann")]).build(),
            users().build(),
        ])
        .with_default_response(ResultBuilder::new().columns(&["n"]).build());
    let conn = driver.connect(&ConnectOptions::new("memory")).await.unwrap();
    let mut stmt = conn.prepare("SELECT id, name FROM users").await.unwrap();

    let first = stmt.execute(&Params::None).await.unwrap();
    assert_eq!(first.single_row().unwrap().get("name").unwrap().as_str(), Some("Ann"));

    let second = stmt.execute(&Params::None).await.unwrap();
    assert_eq!(second.remaining(), 0);

    let third = stmt.execute(&Params::None).await.unwrap();
    assert_eq!(third.columns().unwrap().names(), ["n"]);

    driver.clear_recorded();
    driver.assert_execution_count(0);
    assert!(driver.prepared_statements().is_empty());
}

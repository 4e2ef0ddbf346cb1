//! Running statements through an executor: cardinality, row decoding and
//! error reporting.

mod common;

use common::{bboss, jdoe, tables, text, user_row, CannedExecutor, Role, User};
use oxide_tables_core::dialect::Dialect;
use oxide_tables_core::error::Error;
use oxide_tables_core::value::SqlValue;

// =============================================================================
// Cardinality
// =============================================================================

#[tokio::test]
async fn test_fetch_one_returns_single_row() {
    let executor = CannedExecutor::returning(vec![user_row(&jdoe())]);
    let user = tables(Dialect::Postgresql)
        .select_all::<User>()
        .where_clause(User::ID.eq(String::from("jdoe")))
        .fetch_one(&executor)
        .await
        .unwrap();
    assert_eq!(user, jdoe());

    let statements = executor.statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].1, vec![text("jdoe")]);
}

#[tokio::test]
async fn test_fetch_one_without_row() {
    let executor = CannedExecutor::returning(Vec::new());
    let result = tables(Dialect::Sqlite)
        .select_all::<User>()
        .fetch_one(&executor)
        .await;
    assert!(matches!(result, Err(Error::Cardinality { rows: 0 })));
}

#[tokio::test]
async fn test_fetch_one_with_several_rows() {
    let executor = CannedExecutor::returning(vec![user_row(&jdoe()), user_row(&bboss())]);
    let result = tables(Dialect::Sqlite)
        .select_all::<User>()
        .fetch_one(&executor)
        .await;
    let err = result.unwrap_err();
    assert!(err.is_cardinality());
    assert!(matches!(err, Error::Cardinality { rows: 2 }));
}

#[tokio::test]
async fn test_fetch_first() {
    let executor = CannedExecutor::returning(vec![user_row(&bboss()), user_row(&jdoe())]);
    let first = tables(Dialect::H2)
        .select::<User>()
        .map(|row| row.get(User::ALIAS))
        .fetch_first(&executor)
        .await
        .unwrap();
    assert_eq!(first, Some(Some(String::from("TheBoss"))));

    let empty = CannedExecutor::returning(Vec::new());
    let none = tables(Dialect::H2)
        .select_all::<User>()
        .fetch_first(&empty)
        .await
        .unwrap();
    assert_eq!(none, None);
}

// =============================================================================
// Row decoding
// =============================================================================

#[tokio::test]
async fn test_fetch_all_decodes_lazily() {
    let mut broken = user_row(&bboss());
    broken[4] = text("two");
    let executor = CannedExecutor::returning(vec![user_row(&jdoe()), broken]);

    let tables = tables(Dialect::Postgresql);
    let mut rows = tables
        .select_all::<User>()
        .fetch_all(&executor)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows.next().unwrap().unwrap(), jdoe());
    match rows.next() {
        Some(Err(Error::Decode { column, .. })) => assert_eq!(column, "users.role_id"),
        other => panic!("expected a decode error, got {other:?}"),
    }
    assert!(rows.next().is_none());
}

#[tokio::test]
async fn test_missing_value_in_row_is_decode_error() {
    let executor = CannedExecutor::returning(vec![vec![text("jdoe")]]);
    let result = tables(Dialect::Postgresql)
        .select::<User>()
        .map(|row| row.get(User::ID))
        .fetch_one(&executor)
        .await;
    assert!(matches!(result, Err(Error::Decode { ref column, .. }) if column == "users.fname"));
}

#[tokio::test]
async fn test_unselected_column_is_row_access_error() {
    let executor = CannedExecutor::returning(vec![user_row(&jdoe())]);
    let result = tables(Dialect::Postgresql)
        .select::<User>()
        .map(|row| row.get(Role::LABEL))
        .fetch_one(&executor)
        .await;
    assert!(matches!(result, Err(Error::RowAccess(_))));
}

#[tokio::test]
async fn test_left_join_without_match() {
    let mut row = user_row(&jdoe());
    row.extend([SqlValue::Null, SqlValue::Null]);
    let executor = CannedExecutor::returning(vec![row]);

    let (id, label) = tables(Dialect::Postgresql)
        .select::<User>()
        .map(|row| Ok((row.get(User::ID)?, row.get_optional(Role::LABEL)?)))
        .left_join::<Role>()
        .on(User::ROLE_ID)
        .fetch_one(&executor)
        .await
        .unwrap();
    assert_eq!(id, "jdoe");
    assert_eq!(label, None);
}

#[tokio::test]
async fn test_left_join_null_in_required_read() {
    let mut row = user_row(&jdoe());
    row.extend([SqlValue::Null, SqlValue::Null]);
    let executor = CannedExecutor::returning(vec![row]);

    let result = tables(Dialect::Postgresql)
        .select::<User>()
        .map(|row| row.get(Role::LABEL))
        .left_join::<Role>()
        .on(User::ROLE_ID)
        .fetch_one(&executor)
        .await;
    assert!(matches!(result, Err(Error::Decode { ref column, .. }) if column == "roles.label"));
}

// =============================================================================
// Execution
// =============================================================================

#[tokio::test]
async fn test_backend_error_is_wrapped_with_sql() {
    let executor = CannedExecutor::failing("disk I/O error");
    let result = tables(Dialect::Sqlite)
        .delete_all_from::<User>()
        .execute(&executor)
        .await;
    match result {
        Err(Error::Execution { sql, source }) => {
            assert_eq!(sql, "DELETE FROM users");
            assert_eq!(source.to_string(), "disk I/O error");
        }
        other => panic!("expected an execution error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_build_error_reaches_no_executor() {
    let executor = CannedExecutor::returning(Vec::new());
    let tables = tables(Dialect::Sqlite);
    let result = tables
        .select_all::<Role>()
        .inner_join::<User>()
        .on(User::ID)
        .fetch_all(&executor)
        .await;
    assert!(matches!(result, Err(Error::Mapping(_))));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_insert_sums_affected_rows() {
    let executor = CannedExecutor::affecting(2);
    let inserted = tables(Dialect::Sqlite)
        .insert(&[jdoe(), bboss()])
        .execute(&executor)
        .await
        .unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(executor.statements().len(), 1);
}

#[tokio::test]
async fn test_update_reports_affected_rows() {
    let executor = CannedExecutor::affecting(1);
    let updated = tables(Dialect::Postgresql)
        .update::<User>()
        .set(User::LASTNAME, String::from("Doe-Smith"))
        .where_clause(User::ID.eq(String::from("jdoe")))
        .execute(&executor)
        .await
        .unwrap();
    assert_eq!(updated, 1);
}

#[tokio::test]
async fn test_create_all_tables_in_registration_order() {
    let executor = CannedExecutor::affecting(0);
    tables(Dialect::H2)
        .create_all_tables()
        .execute(&executor)
        .await
        .unwrap();
    let statements = executor.statements();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].0.starts_with("CREATE TABLE IF NOT EXISTS roles"));
    assert!(statements[1].0.starts_with("CREATE TABLE IF NOT EXISTS users"));
}

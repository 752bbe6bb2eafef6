//! Tests for database initialization

use mammo_common::db::init::{init_database, init_memory_database, SCHEMA_VERSION};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("mammo.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("mammo.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_studies_table_created() {
    let pool = init_memory_database().await.unwrap();

    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('studies')")
            .fetch_all(&pool)
            .await
            .unwrap();

    for expected in [
        "study_id",
        "filename",
        "file_path",
        "content_type",
        "file_size",
        "prediction",
        "confidence",
        "processing_time",
        "regions",
        "model_version",
        "image_quality",
        "processed_at",
        "created_at",
        "updated_at",
    ] {
        assert!(
            columns.iter().any(|c| c == expected),
            "studies table missing column {}",
            expected
        );
    }
}

#[tokio::test]
async fn test_schema_version_recorded_once() {
    let pool = init_memory_database().await.unwrap();
    // Applying the schema twice must not duplicate rows
    mammo_common::db::init::create_schema(&pool).await.unwrap();

    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(versions, vec![SCHEMA_VERSION]);
}

#[tokio::test]
async fn test_pragmas_apply_to_every_pooled_connection() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("mammo.db")).await.unwrap();

    // Hold several connections at once so the pool has to open new ones
    let mut connections = Vec::new();
    for _ in 0..3 {
        connections.push(pool.acquire().await.unwrap());
    }

    for conn in connections.iter_mut() {
        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);

        let busy_timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(busy_timeout, 5000);

        let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");
    }
}

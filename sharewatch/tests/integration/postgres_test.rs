//! Integration Test: PostgreSQLストア
//!
//! `SHAREWATCH_TEST_DATABASE_URL` の空DBに一時テーブルを作って検証する。
//! `cargo test -- --ignored` で実行。

use std::time::Duration;

use sharewatch::common::error::ProbeError;
use sharewatch::common::types::{ContinuityStatus, Project};
use sharewatch::db::{self, DistributorStore, EpochSource, SharesDb};
use sharewatch::probe::check_continuity;
use sqlx::PgPool;

async fn setup() -> PgPool {
    let url = std::env::var("SHAREWATCH_TEST_DATABASE_URL")
        .expect("SHAREWATCH_TEST_DATABASE_URL must be set");
    let pool = db::connect("test", &url, Duration::from_secs(10))
        .await
        .expect("Failed to connect to test database");

    for sql in [
        "DROP TABLE IF EXISTS distributor",
        "DROP TABLE IF EXISTS user_shares",
        "DROP TABLE IF EXISTS shares",
        "CREATE TABLE distributor (project TEXT NOT NULL, max_epoch BIGINT NOT NULL)",
        "CREATE TABLE user_shares (id SERIAL PRIMARY KEY, epoch_number BIGINT NOT NULL)",
        "CREATE TABLE shares (id SERIAL PRIMARY KEY, epoch_number INTEGER NOT NULL)",
    ] {
        sqlx::query(sql).execute(&pool).await.expect(sql);
    }
    pool
}

async fn insert_shares(pool: &PgPool, table: &str, epochs: &[i64]) {
    let sql = format!("INSERT INTO {table} (epoch_number) VALUES ($1)");
    for epoch in epochs {
        sqlx::query(&sql).bind(epoch).execute(pool).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (SHAREWATCH_TEST_DATABASE_URL)"]
async fn test_distributor_max_epoch_and_not_found() {
    let pool = setup().await;
    sqlx::query("INSERT INTO distributor (project, max_epoch) VALUES ('ALEO', 7), ('ALEO', 12)")
        .execute(&pool)
        .await
        .unwrap();

    let store = DistributorStore::new(pool);
    assert_eq!(store.max_epoch(Project::Aleo).await.unwrap(), 12);

    let err = store.max_epoch(Project::QuaiGarden).await.unwrap_err();
    assert!(matches!(
        err,
        ProbeError::NotFound {
            project: Project::QuaiGarden
        }
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (SHAREWATCH_TEST_DATABASE_URL)"]
async fn test_project_filter_is_bound_not_interpolated() {
    let pool = setup().await;
    sqlx::query("INSERT INTO distributor (project, max_epoch) VALUES ('ALEO'' OR ''1''=''1', 99)")
        .execute(&pool)
        .await
        .unwrap();

    let store = DistributorStore::new(pool);
    assert!(matches!(
        store.max_epoch(Project::Aleo).await,
        Err(ProbeError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (SHAREWATCH_TEST_DATABASE_URL)"]
async fn test_continuity_against_tables() {
    let pool = setup().await;
    // 重複行はDISTINCTで畳まれる
    insert_shares(&pool, "user_shares", &[9, 10, 10, 11, 12, 13]).await;
    // INTEGER列でもBIGINTとして読める
    insert_shares(&pool, "shares", &[100, 101, 103]).await;

    let store = SharesDb::new(pool);
    assert_eq!(
        check_continuity(&store, Project::Aleo, 10).await.unwrap(),
        ContinuityStatus::Continuous {
            first: 10,
            last: 13,
            count: 4
        }
    );
    assert_eq!(
        check_continuity(&store, Project::QuaiGarden, 100)
            .await
            .unwrap(),
        ContinuityStatus::Gap {
            previous: 101,
            found: 103
        }
    );
    assert_eq!(
        check_continuity(&store, Project::QuaiGarden, 500)
            .await
            .unwrap(),
        ContinuityStatus::NoData
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL (SHAREWATCH_TEST_DATABASE_URL)"]
async fn test_missing_table_is_query_error() {
    let pool = setup().await;
    sqlx::query("DROP TABLE shares").execute(&pool).await.unwrap();

    let store = SharesDb::new(pool);
    let err = check_continuity(&store, Project::QuaiGarden, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Query(_)));
}

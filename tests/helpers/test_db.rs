use oxicrm::infrastructure::persistence::Database;
use std::path::PathBuf;
use uuid::Uuid;

pub struct TestDb {
    db: Database,
    path: PathBuf,
}

impl TestDb {
    pub fn db(&self) -> &Database {
        &self.db
    }
}

/// Fresh file-backed SQLite database with every migration applied.
/// One file per test so tests can run in parallel.
pub async fn setup_test_db() -> TestDb {
    let path = std::env::temp_dir().join(format!("oxicrm_test_{}.db", Uuid::new_v4()));
    let db_url = format!("sqlite://{}?mode=rwc", path.display());

    let db = Database::connect_with(&db_url, 5, 1)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations on test database");

    TestDb { db, path }
}

pub async fn teardown_test_db(test_db: TestDb) {
    test_db.db.pool().close().await;

    let base = test_db.path.display().to_string();
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", base, suffix));
    }
}

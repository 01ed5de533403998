//! Embedded PostgreSQL plumbing shared by the Diesel repository suites.
//!
//! Each test gets a fresh temporary database on the process-wide cluster,
//! migrated with the same embedded migrations the server runs at startup.
//! Set `SKIP_TEST_CLUSTER=1` where the cluster cannot start.

use std::time::Duration;

use encore::domain::ports::{NewAccount, UserRepository};
use encore::domain::{EmailAddress, UserId, UserProfile, Username};
use encore::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig, run_migrations};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;

const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Render a `postgres` error with its SQLSTATE and detail when present.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip quietly when `SKIP_TEST_CLUSTER` is truthy, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// A migrated temporary database plus a runtime and pool to drive it.
pub struct Database {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub url: String,
    _database: TemporaryDatabase,
}

impl Database {
    /// Run a `SELECT count(*) ...` statement and return the count.
    pub fn count(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> i64 {
        let mut client = Client::connect(&self.url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)));
        client
            .query_one(sql, params)
            .unwrap_or_else(|err| panic!("count query: {}", format_postgres_error(&err)))
            .get(0)
    }

    /// Register a member (and profile) through the Diesel user adapter.
    pub fn seed_member(&self, username: &str) -> UserId {
        let users = DieselUserRepository::new(self.pool.clone());
        let account = NewAccount {
            id: UserId::random(),
            username: Username::new(username).expect("valid username"),
            email: EmailAddress::new(format!("{username}@uwaterloo.ca")).expect("valid email"),
            password_digest: "$2b$04$seeded.member.without.a.usable.password".to_owned(),
            profile: UserProfile::default(),
        };
        self.runtime
            .block_on(users.create_with_profile(&account))
            .expect("seed member");
        account.id
    }
}

fn provision() -> Result<Database, String> {
    let mut attempt = 1;
    let cluster = loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(cluster) => break cluster,
            Err(err) if attempt < CLUSTER_RETRIES => {
                eprintln!("pg-embed: attempt {attempt}/{CLUSTER_RETRIES} failed: {err:?}");
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(err) => return Err(format!("{err:?}")),
        }
    };
    let database_name = format!("encore_test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(database_name.as_str())
        .map_err(|err| format!("create database: {err:?}"))?;
    let url = database.url().to_string();
    run_migrations(&url).map_err(|err| err.to_string())?;

    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let config = PoolConfig::new(url.as_str())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(Database {
        runtime,
        pool,
        url,
        _database: database,
    })
}

/// A fresh database, or `None` when the cluster is skipped.
pub fn database() -> Option<Database> {
    match provision() {
        Ok(db) => Some(db),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

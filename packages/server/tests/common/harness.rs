//! Postgres-backed test context.
//!
//! One container per test binary, started lazily by the first test that needs
//! it. Migrations run once against it; every test then opens its own pool.

use std::sync::Arc;

use anyhow::{Context, Result};
use reviews_core::domains::reviews::{ApprovalConfig, ReviewRuleEngine};
use reviews_core::kernel::{PostgresReviewStore, ServerDeps};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Running database shared by all tests in the binary
struct TestDatabase {
    url: String,
    _container: ContainerAsync<Postgres>,
}

static TEST_DATABASE: OnceCell<TestDatabase> = OnceCell::const_new();

async fn start_database() -> Result<TestDatabase> {
    // RUST_LOG=reviews_core=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let container = Postgres::default()
        .with_tag("16-alpine")
        // Tests run in parallel, each with its own pool
        .with_cmd(["-c", "max_connections=200"])
        .start()
        .await
        .context("Failed to start Postgres container")?;
    let url = format!(
        "postgresql://postgres:postgres@{}:{}/postgres",
        container.get_host().await?,
        container.get_host_port_ipv4(5432).await?
    );

    let pool = PgPool::connect(&url)
        .await
        .context("Failed to connect to test database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate test database")?;
    pool.close().await;

    Ok(TestDatabase {
        url,
        _container: container,
    })
}

async fn database_url() -> Result<&'static str> {
    let db = TEST_DATABASE.get_or_try_init(start_database).await?;
    Ok(db.url.as_str())
}

/// Per-test context: its own pool and a rule engine wired to Postgres.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn creates_review(ctx: &TestHarness) {
///     let stored = ctx.engine.upsert(review).await.unwrap();
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
    /// Live threshold read by `engine`; tests may change it
    pub approval: Arc<ApprovalConfig>,
    pub engine: Arc<ReviewRuleEngine>,
}

impl TestHarness {
    pub const APPROVAL_MIN_COUNT: i32 = 2;

    pub async fn new() -> Result<Self> {
        let db_pool = PgPool::connect(database_url().await?)
            .await
            .context("Failed to open test pool")?;
        let approval = Arc::new(ApprovalConfig::new(Self::APPROVAL_MIN_COUNT));
        let engine = ReviewRuleEngine::new(&ServerDeps::postgres(
            db_pool.clone(),
            approval.clone(),
        ));

        Ok(Self {
            db_pool,
            approval,
            engine: Arc::new(engine),
        })
    }

    /// The Postgres store on its own, without the engine's checks
    pub fn store(&self) -> PostgresReviewStore {
        PostgresReviewStore::new(self.db_pool.clone())
    }
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

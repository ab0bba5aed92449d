//! Test helpers module
//!
//! Database setup and data builders shared by the integration tests.

#![allow(dead_code)]

pub mod database_helper;
pub mod fixtures;

pub use database_helper::*;
pub use fixtures::*;

use baropot::services::ServiceFactory;

/// Fresh database plus the service graph over it
pub struct TestContext {
    pub db: TestDatabase,
    pub services: ServiceFactory,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = TestDatabase::new().await.expect("Failed to create test database");
        let settings = test_settings(&db.database_url);
        let services = ServiceFactory::new(&settings, db.pool.clone());
        Self { db, services }
    }
}

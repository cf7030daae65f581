#![allow(dead_code)]

use actix_web::web;
use serde_json::Map;
use std::sync::Arc;
use std::time::Duration;

use aircnc::auth::TokenService;
use aircnc::db::{DocumentStore, MemoryStore};
use aircnc::notifications::{DeliveryPolicy, NotificationDispatcher};
use aircnc::payments::PaymentIntentAdapter;
use aircnc::routes;
use aircnc::testutil::{MockGateway, RecordingMailer};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const CLIENT_SECRET: &str = "pi_123_secret_456";

/// Everything an app under test is wired to, kept around for assertions.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub gateway: MockGateway,
    pub mailer: RecordingMailer,
    pub tokens: TokenService,
    notifier: NotificationDispatcher,
}

impl TestContext {
    /// Must be called inside a runtime; starts the notification worker.
    pub fn new() -> Self {
        Self::with(MockGateway::new(CLIENT_SECRET), RecordingMailer::new())
    }

    /// Same wiring around the given payment gateway and mailer.
    pub fn with(gateway: MockGateway, mailer: RecordingMailer) -> Self {
        let (notifier, _worker) = NotificationDispatcher::spawn(
            Arc::new(mailer.clone()),
            DeliveryPolicy {
                retry_delay: Duration::from_millis(1),
                ..DeliveryPolicy::default()
            },
        );
        Self {
            store: Arc::new(MemoryStore::new()),
            gateway,
            mailer,
            tokens: TokenService::new(TEST_SECRET),
            notifier,
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let store: Arc<dyn DocumentStore> = self.store.clone();
        cfg.app_data(web::Data::from(store))
            .app_data(web::Data::new(self.tokens.clone()))
            .app_data(web::Data::new(PaymentIntentAdapter::new(Arc::new(
                self.gateway.clone(),
            ))))
            .app_data(web::Data::new(self.notifier.clone()));
        routes::config(cfg);
    }

    pub fn token_for(&self, email: &str) -> String {
        self.tokens.issue(email, Map::new()).unwrap()
    }

    pub fn bearer(&self, email: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token_for(email)))
    }
}

//! "It's your turn" notification trigger
//!
//! The engine fires a trigger whenever a challenger becomes head of a
//! leader's queue. Delivery is fire-and-forget: the trigger resolves the
//! challenger's push tokens from the cache and hands them to the external
//! push gateway; the core requires no delivery guarantee.

use crate::cache::Caches;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Trait the engine calls when a challenger reaches the head of a queue
#[async_trait]
pub trait NotificationTrigger: Send + Sync {
    /// Notify a challenger that it is their turn; fire-and-forget
    async fn notify(&self, challenger_id: &str);
}

/// External push collaborator: "send this message to these tokens"
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(&self, message: &str, tokens: &[String]);
}

/// Trigger that resolves push tokens from the cache and forwards to a gateway
pub struct TokenNotifier {
    caches: Arc<Caches>,
    gateway: Arc<dyn PushGateway>,
    message: String,
}

impl TokenNotifier {
    pub fn new(caches: Arc<Caches>, gateway: Arc<dyn PushGateway>) -> Self {
        Self {
            caches,
            gateway,
            message: "It's your turn to battle! Head over to your leader now.".to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[async_trait]
impl NotificationTrigger for TokenNotifier {
    async fn notify(&self, challenger_id: &str) {
        let tokens = match self.caches.tokens_for(challenger_id) {
            Ok(tokens) => tokens,
            Err(e) => {
                debug!("Token lookup failed for {}: {}", challenger_id, e);
                return;
            }
        };
        if tokens.is_empty() {
            debug!("No push tokens registered for {}", challenger_id);
            return;
        }

        info!(
            "Sending turn notification to {} ({} tokens)",
            challenger_id,
            tokens.len()
        );
        self.gateway.send(&self.message, &tokens).await;
    }
}

/// Gateway that only logs, for local runs without a push collaborator
#[derive(Debug, Default)]
pub struct LoggingGateway;

#[async_trait]
impl PushGateway for LoggingGateway {
    async fn send(&self, message: &str, tokens: &[String]) {
        info!("Push ({} tokens): {}", tokens.len(), message);
    }
}

/// Mock trigger recording notified challengers, for tests
#[derive(Debug, Default)]
pub struct MockNotifier {
    notified: std::sync::Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Challenger ids notified so far, in order
    pub fn notified(&self) -> Vec<String> {
        self.notified
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Clear recorded notifications
    pub fn clear(&self) {
        if let Ok(mut notified) = self.notified.lock() {
            notified.clear();
        }
    }
}

#[async_trait]
impl NotificationTrigger for MockNotifier {
    async fn notify(&self, challenger_id: &str) {
        if let Ok(mut notified) = self.notified.lock() {
            notified.push(challenger_id.to_string());
        }
    }
}

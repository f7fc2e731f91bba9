use std::sync::Arc;
use std::time::Duration;

use explore_assistant::{ChatBackend, ChatSession, GeminiClient, GeminiConfig};
use explore_order::{CheckoutSession, MockPaymentGateway, PaymentOrchestrator};
use explore_store::app_config::{AdminConfig, AppConfig};
use explore_store::Store;
use tokio::task::JoinHandle;

use crate::middleware::resiliency::{BreakerBackend, CircuitBreaker};
use crate::sessions::{SessionLimits, SessionMap};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

pub type Checkouts = Arc<SessionMap<CheckoutSession>>;
pub type Chats = Arc<SessionMap<ChatSession>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub payments: Arc<PaymentOrchestrator>,
    pub assistant: Arc<dyn ChatBackend>,
    pub checkouts: Checkouts,
    pub chats: Chats,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        store: Arc<Store>,
        payments: PaymentOrchestrator,
        assistant: Arc<dyn ChatBackend>,
    ) -> Self {
        let limits = SessionLimits::from(&config.sessions);
        Self {
            store,
            payments: Arc::new(payments),
            assistant,
            checkouts: Arc::new(SessionMap::new(limits)),
            chats: Arc::new(SessionMap::new(limits)),
            auth: AuthConfig {
                secret: config.auth.jwt_secret.clone(),
                expiration: config.auth.jwt_expiration_seconds,
            },
            admin: config.admin.clone(),
        }
    }

    /// Wires the mock gateway and the Gemini client from configuration,
    /// over a freshly seeded store.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let gateway = MockPaymentGateway::new(
            Duration::from_millis(config.payment.intent_delay_ms),
            Duration::from_millis(config.payment.confirm_delay_ms),
        );
        let payments = PaymentOrchestrator::new(Arc::new(gateway), config.payment.currency.clone());

        let gemini = GeminiClient::new(GeminiConfig {
            api_key: config.assistant.api_key.clone(),
            base_url: config.assistant.base_url.clone(),
            model: config.assistant.model.clone(),
            timeout: Duration::from_secs(config.assistant.timeout_secs),
        })?;
        if config.assistant.api_key.is_none() {
            tracing::warn!("assistant API key not set; chat replies will fall back to the apology");
        }
        let breaker = Arc::new(CircuitBreaker::new("assistant", 3, Duration::from_secs(30)));
        let assistant = Arc::new(BreakerBackend::new(Arc::new(gemini), breaker));

        Ok(Self::new(config, Arc::new(Store::default()), payments, assistant))
    }

    /// Drops idle and settled checkout and chat sessions on a fixed period.
    pub fn spawn_session_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let checkouts = self.checkouts.clone();
        let chats = self.chats.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = checkouts.sweep().await + chats.sweep().await;
                if removed > 0 {
                    tracing::debug!(removed, "swept expired sessions");
                }
            }
        })
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use explore_assistant::{AssistantError, ChatBackend, ChatMessage, ReplyStream};
use futures_util::StreamExt;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing fast
    HalfOpen, // Letting one trial call through
}

pub struct CircuitBreaker {
    pub name: String,
    pub state: RwLock<CircuitState>,
    pub failure_count: AtomicUsize,
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
    pub last_failure: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            failure_threshold: threshold,
            reset_timeout: timeout,
            last_failure: RwLock::new(None),
        }
    }

    /// Whether a call may go out now. An open circuit turns half-open once
    /// the reset timeout has passed.
    pub async fn check(&self) -> bool {
        let state = *self.state.read().await;
        match state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let last_fail = *self.last_failure.read().await;
                match last_fail {
                    Some(instant) if instant.elapsed() > self.reset_timeout => {
                        *self.state.write().await = CircuitState::HalfOpen;
                        tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::HalfOpen {
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::SeqCst);
    }

    pub async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;

        if count >= self.failure_threshold || *state == CircuitState::HalfOpen {
            *state = CircuitState::Open;
            *self.last_failure.write().await = Some(Instant::now());
            tracing::error!("Circuit Breaker [{}] TRIPPED to Open. Failures: {}", self.name, count);
        }
    }
}

/// Chat backend guarded by a circuit breaker. While the circuit is open,
/// calls fail immediately instead of waiting on a struggling upstream.
pub struct BreakerBackend {
    inner: Arc<dyn ChatBackend>,
    breaker: Arc<CircuitBreaker>,
}

impl BreakerBackend {
    pub fn new(inner: Arc<dyn ChatBackend>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { inner, breaker }
    }
}

#[async_trait]
impl ChatBackend for BreakerBackend {
    async fn stream_reply(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<ReplyStream, AssistantError> {
        if !self.breaker.check().await {
            return Err(AssistantError::Api {
                status: 503,
                message: format!("Circuit Breaker [{}] is OPEN", self.breaker.name),
            });
        }

        let stream = match self.inner.stream_reply(system_instruction, history).await {
            Ok(stream) => stream,
            Err(e) => {
                // A missing key is not the upstream's fault.
                if !matches!(e, AssistantError::Config(_)) {
                    self.breaker.record_failure().await;
                }
                return Err(e);
            }
        };
        self.breaker.record_success().await;

        let breaker = self.breaker.clone();
        Ok(stream
            .then(move |item| {
                let breaker = breaker.clone();
                async move {
                    if item.is_err() {
                        breaker.record_failure().await;
                    }
                    item
                }
            })
            .boxed())
    }
}

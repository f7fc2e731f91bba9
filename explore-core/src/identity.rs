use std::future::Future;
use std::pin::Pin;
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::task::{Context, Poll};

use chrono::NaiveDate;
use explore_shared::pii::Masked;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::repository::Record;
use crate::{CoreError, CoreResult};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+|0)?\d{9,15}$").expect("valid phone pattern"));

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub name: String,
    pub role: Role,
    pub joined: NaiveDate,
}

impl User {
    /// Builds a signup record: identifiers containing `@` become the email,
    /// anything else is treated as a phone number with a placeholder email.
    pub fn register(identifier: &str, name: &str, joined: NaiveDate) -> Self {
        let is_email = identifier.contains('@');
        let email = if is_email {
            identifier.to_string()
        } else {
            format!("{}@example.com", identifier)
        };
        let phone = if is_email { String::new() } else { identifier.to_string() };

        Self {
            id: 0,
            email: Masked(email),
            phone: Masked(phone),
            name: name.to_string(),
            role: Role::User,
            joined,
        }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.email.0 == identifier || (!self.phone.0.is_empty() && self.phone.0 == identifier)
    }
}

impl Record for User {
    // Users are never edited after signup.
    type Patch = std::convert::Infallible;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, patch: Self::Patch) {
        match patch {}
    }
}

/// A sign-in identifier: either an email address or a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Email(String),
    Phone(String),
}

impl Identifier {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        if is_email(trimmed) {
            Ok(Identifier::Email(trimmed.to_string()))
        } else if is_phone(trimmed) {
            Ok(Identifier::Phone(trimmed.to_string()))
        } else {
            Err(CoreError::ValidationError(
                "Please enter a valid email or phone number".to_string(),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Email(v) | Identifier::Phone(v) => v,
        }
    }
}

pub fn is_email(candidate: &str) -> bool {
    EMAIL_RE.is_match(candidate)
}

/// Spaces and dashes are ignored, so `0300-123 4567` is accepted.
pub fn is_phone(candidate: &str) -> bool {
    let compact: String = candidate.chars().filter(|c| *c != ' ' && *c != '-').collect();
    PHONE_RE.is_match(&compact)
}

pub fn validate_password(password: &str) -> CoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError("Name is required".to_string()));
    }
    Ok(())
}

/// The signed-in visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub name: String,
    pub identifier: String,
    pub role: Role,
}

/// Login prompt coordinator.
///
/// Flows that need an authenticated visitor call [`AuthGate::require_login`]
/// and await the returned [`LoginPrompt`]. It resolves once [`AuthGate::login`]
/// runs, or fails with [`CoreError::Cancelled`] when the prompt is closed.
#[derive(Debug, Default)]
pub struct AuthGate {
    session: Mutex<Option<Session>>,
    waiting: Mutex<Vec<oneshot::Sender<Session>>>,
}

impl AuthGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_login(&self) -> LoginPrompt {
        let (tx, rx) = oneshot::channel();
        match lock(&self.session).clone() {
            Some(session) => {
                let _ = tx.send(session);
            }
            None => lock(&self.waiting).push(tx),
        }
        LoginPrompt { rx }
    }

    pub fn login(&self, session: Session) {
        tracing::info!(identifier = %Masked(session.identifier.as_str()), "visitor signed in");
        *lock(&self.session) = Some(session.clone());
        for waiter in lock(&self.waiting).drain(..) {
            let _ = waiter.send(session.clone());
        }
    }

    /// Closes the prompt; every pending [`LoginPrompt`] fails with `Cancelled`.
    pub fn close(&self) {
        lock(&self.waiting).clear();
    }

}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Future returned by [`AuthGate::require_login`].
#[derive(Debug)]
pub struct LoginPrompt {
    rx: oneshot::Receiver<Session>,
}

impl Future for LoginPrompt {
    type Output = CoreResult<Session>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| CoreError::Cancelled))
    }
}

pub mod identity;
pub mod payment;
pub mod repository;

pub use identity::{AuthGate, Identifier, Role, Session, User};
pub use payment::{CardDetails, PaymentConfirmation, PaymentError, PaymentGateway, PaymentIntent, PaymentStatus};
pub use repository::{Record, Repository};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CoreError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Identity verification failed: {0}")]
    IdentityError(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Calendar date used for `date`/`joined` stamps on new records.
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

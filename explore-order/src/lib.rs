pub mod checkout;
pub mod orchestrator;

pub use checkout::{start_checkout, CheckoutError, CheckoutResult, CheckoutSession, CheckoutState};
pub use orchestrator::{MockPaymentGateway, PaymentOrchestrator};

pub mod form;
pub mod gateway;
pub mod models;
pub mod service;

pub use form::{format_card_number, format_expiry_date};
pub use gateway::SimulatedPaymentGateway;
pub use models::{BookingConfirmation, OrderSummary, PaymentDetails};
pub use service::{CheckoutError, CheckoutService};

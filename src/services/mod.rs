pub mod auth_service;
pub mod course_service;
pub mod payment_service;

pub use payment_service::PaymentContext;

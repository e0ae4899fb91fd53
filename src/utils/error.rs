use std::fmt;

/// Failure taxonomy for the payment/enrollment flow. Every variant carries
/// the human-readable message returned in the response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Referenced course or user does not exist.
    NotFound(String),
    /// A required field is missing or empty.
    ValidationFailed(String),
    /// Benign conflict: the user already owns one of the requested courses.
    AlreadyEnrolled(String),
    /// Gateway signature did not match.
    VerificationFailed,
    /// Database, gateway or mail call failed.
    Upstream(String),
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::NotFound(msg) => write!(f, "{}", msg),
            PaymentError::ValidationFailed(msg) => write!(f, "{}", msg),
            PaymentError::AlreadyEnrolled(msg) => write!(f, "{}", msg),
            PaymentError::VerificationFailed => write!(f, "Payment Failed"),
            PaymentError::Upstream(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for PaymentError {}

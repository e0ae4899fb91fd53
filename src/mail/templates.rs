/// Enrollment confirmation body, sent once per course after a verified
/// payment.
pub fn course_enrollment_email(course_name: &str, user_name: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif;\">\
           <h2>Course Registration Confirmation</h2>\
           <p>Dear {user_name},</p>\
           <p>You have successfully enrolled in <b>{course_name}</b>. \
              Your progress tracking starts now - head to your dashboard to begin.</p>\
           <p>Happy learning!</p>\
         </div>"
    )
}

/// "Payment received" body for the post-payment notification endpoint.
/// `amount` is in minor currency units.
pub fn payment_success_email(
    user_name: &str,
    amount: i64,
    order_id: &str,
    payment_id: &str,
) -> String {
    let rupees = amount as f64 / 100.0;
    format!(
        "<div style=\"font-family: sans-serif;\">\
           <h2>Payment Received</h2>\
           <p>Dear {user_name},</p>\
           <p>We have received your payment of <b>&#8377;{rupees:.2}</b>.</p>\
           <p>Order ID: {order_id}<br>Payment ID: {payment_id}</p>\
         </div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_email_mentions_course_and_user() {
        let body = course_enrollment_email("Rust for Backend Engineers", "Priya Sharma");
        assert!(body.contains("Rust for Backend Engineers"));
        assert!(body.contains("Priya Sharma"));
    }

    #[test]
    fn test_payment_email_converts_minor_units() {
        let body = payment_success_email("Priya Sharma", 200000, "order_1", "pay_1");
        assert!(body.contains("2000.00"));
        assert!(body.contains("order_1"));
        assert!(body.contains("pay_1"));
    }
}

use crate::{
    models::{CapturePaymentRequest, PaymentSuccessEmailRequest, VerifyPaymentRequest},
    services::auth_service::Claims,
    services::payment_service::{self, PaymentContext},
    utils::error::PaymentError,
};
use actix_web::{web, HttpResponse, Responder};

// All payment endpoints sit behind AuthMiddleware; the user id comes from
// the verified JWT, never from the request body.

/// Maps the failure taxonomy onto the uniform {success, message} envelope.
/// AlreadyEnrolled is a benign conflict reported as an unsuccessful outcome,
/// not a server error.
fn failure_response(err: &PaymentError) -> HttpResponse {
    let body = serde_json::json!({
        "success": false,
        "message": err.to_string()
    });

    match err {
        PaymentError::NotFound(_) => HttpResponse::NotFound().json(body),
        PaymentError::ValidationFailed(_) => HttpResponse::BadRequest().json(body),
        PaymentError::AlreadyEnrolled(_) => HttpResponse::Ok().json(body),
        PaymentError::VerificationFailed => HttpResponse::BadRequest().json(body),
        PaymentError::Upstream(_) => HttpResponse::InternalServerError().json(body),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/payment/capture",
    tag = "Payments",
    request_body = CapturePaymentRequest,
    responses(
        (status = 200, description = "Gateway order created"),
        (status = 404, description = "Course not found"),
        (status = 400, description = "Empty course batch")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn capture_payment(
    user: web::ReqData<Claims>,
    ctx: web::Data<PaymentContext>,
    request: web::Json<CapturePaymentRequest>,
) -> impl Responder {
    log::info!(
        "💳 POST /payment/capture - user {} buying {} course(s)",
        user.sub,
        request.courses.len()
    );

    match payment_service::capture_payment(&ctx, &user.sub, &request.courses).await {
        Ok(order) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "paymentResponse": order
        })),
        Err(e) => {
            log::warn!("⚠️ Capture failed for user {}: {}", user.sub, e);
            failure_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/payment/verify",
    tag = "Payments",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified and student enrolled"),
        (status = 400, description = "Missing fields or signature mismatch")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify_payment(
    user: web::ReqData<Claims>,
    ctx: web::Data<PaymentContext>,
    request: web::Json<VerifyPaymentRequest>,
) -> impl Responder {
    log::info!("🔏 POST /payment/verify - order {} user {}", request.razorpay_order_id, user.sub);

    match payment_service::verify_payment(
        &ctx,
        &user.sub,
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
        &request.courses,
    )
    .await
    {
        Ok(()) => {
            log::info!("✅ Payment verified, user {} enrolled", user.sub);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Payment Verified"
            }))
        }
        Err(e) => {
            log::warn!("⚠️ Verification failed for user {}: {}", user.sub, e);
            failure_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/payment/sendPaymentSuccessEmail",
    tag = "Payments",
    request_body = PaymentSuccessEmailRequest,
    responses(
        (status = 200, description = "Notification sent"),
        (status = 400, description = "Missing fields")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_payment_success_email(
    user: web::ReqData<Claims>,
    ctx: web::Data<PaymentContext>,
    request: web::Json<PaymentSuccessEmailRequest>,
) -> impl Responder {
    log::info!("📧 POST /payment/sendPaymentSuccessEmail - user {}", user.sub);

    match payment_service::send_payment_success_email(
        &ctx,
        &user.sub,
        &request.order_id,
        &request.payment_id,
        request.amount,
    )
    .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            log::warn!("⚠️ Payment email failed for user {}: {}", user.sub, e);
            failure_response(&e)
        }
    }
}

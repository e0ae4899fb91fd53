use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Course Service API",
        version = "1.0.0",
        description = "Course-marketplace backend: authentication, course catalog, and Razorpay payment capture/verification with enrollment on success.\n\n**Authentication:** Payment and course-creation endpoints require a JWT Bearer token.",
        contact(
            name = "Course Service Team",
            email = "support@studynotion.dev"
        )
    ),
    paths(
        // Auth endpoints
        crate::api::auth::login,
        crate::api::auth::register,
        crate::api::auth::verify_token,
        crate::api::auth::get_me,

        // Health
        crate::api::health::health_check,

        // Courses
        crate::api::courses::create_course,
        crate::api::courses::list_courses,
        crate::api::courses::get_course,

        // Payments
        crate::api::payments::capture_payment,
        crate::api::payments::verify_payment,
        crate::api::payments::send_payment_success_email,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::auth_service::UserInfo,

            // Health
            crate::api::health::HealthResponse,

            // Courses
            crate::services::course_service::CreateCourseRequest,

            // Payments
            crate::models::CapturePaymentRequest,
            crate::models::VerifyPaymentRequest,
            crate::models::PaymentSuccessEmailRequest,
            crate::razorpay::GatewayOrder,
        )
    ),
    tags(
        (name = "Auth", description = "Authentication and profile endpoints (email/password, JWT)."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
        (name = "Courses", description = "Course catalog endpoints: create, list and inspect courses."),
        (name = "Payments", description = "Razorpay order capture, signed confirmation verification and post-payment notification."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}

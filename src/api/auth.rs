use crate::{database::MongoDB, services::auth_service};
use crate::services::auth_service::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
use actix_web::{web, HttpRequest, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    request: web::Json<auth_service::LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    match auth_service::login(&db, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "message": e
            }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid request or user already exists")
    )
)]
pub async fn register(
    db: web::Data<MongoDB>,
    request: web::Json<auth_service::RegisterRequest>,
) -> HttpResponse {
    log::info!("📝 POST /auth/register - email: {}", request.email);

    match auth_service::register(&db, &request).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {}", request.email);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", request.email, e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": e
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify_token(req: HttpRequest) -> HttpResponse {
    log::info!("✓ GET /auth/verify");

    if let Some(token) = bearer_token(&req) {
        return match auth_service::verify_token(token) {
            Ok(claims) => {
                log::info!("✅ Token valid for user: {}", claims.sub);
                HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "valid": true,
                    "user_id": claims.sub,
                    "email": claims.email,
                    "exp": claims.exp
                }))
            }
            Err(e) => {
                log::warn!("❌ Invalid token: {}", e);
                HttpResponse::Unauthorized().json(serde_json::json!({
                    "success": false,
                    "valid": false,
                    "message": e
                }))
            }
        };
    }

    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "message": "No valid Authorization header"
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "User information retrieved", body = UserInfo),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    log::info!("👤 GET /auth/me");

    let token = match bearer_token(&req) {
        Some(token) => token,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": "No valid Authorization header"
            }));
        }
    };

    let claims = match auth_service::verify_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            log::warn!("❌ Invalid token: {}", e);
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "message": e
            }));
        }
    };

    match auth_service::get_current_user(&db, &claims.sub).await {
        Ok(user) => {
            log::info!("✅ User info retrieved: {}", claims.sub);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "user": user
            }))
        }
        Err(e) => {
            log::error!("❌ Failed to get user: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "message": e
            }))
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

mod api;
mod database;
mod mail;
mod middleware;
mod models;
mod razorpay;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use services::payment_service::PaymentContext;
use std::env;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    log::info!("🚀 Starting Course Service...");
    log::info!("📊 Database: {}", database_url);

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ MongoDB connected successfully");

    // Wire the payment orchestrator against the real gateway, mailer and stores
    let gateway = razorpay::RazorpayClient::from_env().expect("Razorpay credentials must be set");
    let mailer = mail::HttpMailer::from_env().expect("Mail API credentials must be set");
    let gateway_secret = env::var("RAZORPAY_SECRET").expect("RAZORPAY_SECRET must be set");

    let payment_ctx = web::Data::new(PaymentContext {
        courses: Arc::new(db.clone()),
        users: Arc::new(db.clone()),
        progress: Arc::new(db.clone()),
        gateway: Arc::new(gateway),
        mailer: Arc::new(mailer),
        gateway_secret,
    });

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(payment_ctx.clone())
            .wrap(cors)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth endpoints
            .service(
                web::scope("/api/v1/auth")
                    .route("/login", web::post().to(api::auth::login))
                    .route("/register", web::post().to(api::auth::register))
                    .route("/verify", web::get().to(api::auth::verify_token))
                    .route("/me", web::get().to(api::auth::get_me)),
            )
            // Course catalog
            .service(
                web::scope("/api/v1/course")
                    .route("", web::get().to(api::courses::list_courses))
                    .service(
                        web::resource("/create")
                            .wrap(middleware::AuthMiddleware)
                            .route(web::post().to(api::courses::create_course)),
                    )
                    // catch-all, must stay last
                    .route("/{course_id}", web::get().to(api::courses::get_course)),
            )
            // Payments: capture -> external payment -> verify -> enrollment
            .service(
                web::scope("/api/v1/payment")
                    .wrap(middleware::AuthMiddleware)
                    .route("/capture", web::post().to(api::payments::capture_payment))
                    .route("/verify", web::post().to(api::payments::verify_payment))
                    .route(
                        "/sendPaymentSuccessEmail",
                        web::post().to(api::payments::send_payment_success_email),
                    ),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}

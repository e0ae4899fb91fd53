use crate::{
    database::MongoDB,
    services::auth_service::Claims,
    services::course_service,
};
use actix_web::{web, HttpResponse, Responder};

#[utoipa::path(
    post,
    path = "/api/v1/course/create",
    tag = "Courses",
    request_body = course_service::CreateCourseRequest,
    responses(
        (status = 201, description = "Course created"),
        (status = 400, description = "Invalid course data")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_course(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    request: web::Json<course_service::CreateCourseRequest>,
) -> impl Responder {
    log::info!("📝 POST /course/create - {} by user {}", request.course_name, user.sub);

    match course_service::create_course(&db, &user.sub, &request).await {
        Ok(course) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "course": course
        })),
        Err(e) => {
            log::warn!("❌ Failed to create course: {}", e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": e
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/course",
    tag = "Courses",
    responses(
        (status = 200, description = "Course catalog listed")
    )
)]
pub async fn list_courses(db: web::Data<MongoDB>) -> impl Responder {
    log::info!("📋 GET /course");

    match course_service::list_courses(&db).await {
        Ok(courses) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": courses.len(),
            "courses": courses
        })),
        Err(e) => {
            log::error!("❌ Error listing courses: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "message": e
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/course/{course_id}",
    tag = "Courses",
    params(
        ("course_id" = String, Path, description = "Course id")
    ),
    responses(
        (status = 200, description = "Course details"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> impl Responder {
    let course_id = path.into_inner();
    log::info!("📖 GET /course/{}", course_id);

    match course_service::get_course(&db, &course_id).await {
        Ok(Some(course)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "course": course
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "message": "Course not found"
        })),
        Err(e) => {
            log::error!("❌ Error fetching course {}: {}", course_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "message": e
            }))
        }
    }
}

// ==================== COURSE CATALOG ====================

use crate::{database::MongoDB, models::Course};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    pub course_name: String,
    pub description: Option<String>,
    /// Price in whole currency units (INR).
    pub price: i64,
}

#[derive(Debug, Serialize)]
pub struct CourseInfo {
    pub course_id: String,
    pub course_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    pub students_enrolled: usize,
}

impl From<&Course> for CourseInfo {
    fn from(course: &Course) -> Self {
        Self {
            course_id: course.course_id(),
            course_name: course.course_name.clone(),
            description: course.description.clone(),
            price: course.price,
            students_enrolled: course.student_enrolled.len(),
        }
    }
}

pub async fn create_course(
    db: &MongoDB,
    instructor_id: &str,
    request: &CreateCourseRequest,
) -> Result<CourseInfo, String> {
    if request.course_name.trim().is_empty() {
        return Err("Course name is required".to_string());
    }
    if request.price < 0 {
        return Err("Price must not be negative".to_string());
    }

    let course = Course {
        _id: Some(ObjectId::new()),
        course_name: request.course_name.clone(),
        description: request.description.clone(),
        price: request.price,
        student_enrolled: vec![],
        instructor: Some(instructor_id.to_string()),
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    db.collection::<Course>("courses")
        .insert_one(&course)
        .await
        .map_err(|e| format!("Failed to create course: {}", e))?;

    log::info!("✅ Course created: {} ({})", course.course_name, course.course_id());

    Ok(CourseInfo::from(&course))
}

pub async fn list_courses(db: &MongoDB) -> Result<Vec<CourseInfo>, String> {
    let mut cursor = db
        .collection::<Course>("courses")
        .find(doc! {})
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut courses = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(course) => courses.push(CourseInfo::from(&course)),
            Err(e) => log::warn!("⚠️ Skipping unreadable course document: {}", e),
        }
    }

    Ok(courses)
}

pub async fn get_course(db: &MongoDB, course_id: &str) -> Result<Option<Course>, String> {
    let oid = match ObjectId::parse_str(course_id) {
        Ok(oid) => oid,
        Err(_) => return Ok(None),
    };

    db.collection::<Course>("courses")
        .find_one(doc! { "_id": oid })
        .await
        .map_err(|e| format!("Database error: {}", e))
}

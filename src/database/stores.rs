// Store seams for the enrollment flow. The MongoDB implementations live here;
// tests substitute in-memory fakes behind the same traits.

use crate::{
    database::MongoDB,
    models::{Course, CourseProgress, User},
};
use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};

/// Result of the atomic enroll-if-absent update.
#[derive(Debug)]
pub enum EnrollOutcome {
    /// Student appended; carries the course for the notification email.
    Enrolled(Course),
    AlreadyEnrolled,
    NotFound,
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn find_course(&self, course_id: &str) -> Result<Option<Course>, String>;

    /// Adds the user to the course's enrolled set only if absent, in a single
    /// conditional update. Closes the check-then-append race and makes
    /// per-course enrollment idempotent under retry.
    async fn enroll_student(&self, course_id: &str, user_id: &str)
        -> Result<EnrollOutcome, String>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, String>;

    /// Appends the course id and its progress-record id to the user's
    /// parallel sets. Returns false if the user does not exist.
    async fn add_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
        progress_id: &str,
    ) -> Result<bool, String>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Creates the (course, user) progress record with an empty completed
    /// set and returns its id.
    async fn create_progress(&self, course_id: &str, user_id: &str) -> Result<String, String>;

    /// Returns the id of the existing (course, user) progress record, if any.
    async fn find_progress(&self, course_id: &str, user_id: &str)
        -> Result<Option<String>, String>;
}

// ==================== MONGODB IMPLEMENTATIONS ====================

#[async_trait]
impl CourseStore for MongoDB {
    async fn find_course(&self, course_id: &str) -> Result<Option<Course>, String> {
        let oid = match ObjectId::parse_str(course_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None), // malformed id can't match any course
        };

        self.collection::<Course>("courses")
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| format!("Database error: {}", e))
    }

    async fn enroll_student(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<EnrollOutcome, String> {
        let oid = match ObjectId::parse_str(course_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(EnrollOutcome::NotFound),
        };

        let collection = self.collection::<Course>("courses");

        // Matches only when the user is not yet in the enrolled set, so the
        // append happens at most once regardless of concurrent verifies.
        let filter = doc! { "_id": oid, "student_enrolled": { "$ne": user_id } };
        let update = doc! { "$addToSet": { "student_enrolled": user_id } };

        let result = collection
            .update_one(filter, update)
            .await
            .map_err(|e| format!("Database error: {}", e))?;

        if result.matched_count == 1 {
            let course = collection
                .find_one(doc! { "_id": oid })
                .await
                .map_err(|e| format!("Database error: {}", e))?
                .ok_or_else(|| "Course disappeared after enrollment".to_string())?;
            return Ok(EnrollOutcome::Enrolled(course));
        }

        // No match: course missing, or the user was already enrolled
        match collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| format!("Database error: {}", e))?
        {
            Some(_) => Ok(EnrollOutcome::AlreadyEnrolled),
            None => Ok(EnrollOutcome::NotFound),
        }
    }
}

#[async_trait]
impl UserStore for MongoDB {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, String> {
        self.collection::<User>("users")
            .find_one(doc! { "user_id": user_id })
            .await
            .map_err(|e| format!("Database error: {}", e))
    }

    async fn add_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
        progress_id: &str,
    ) -> Result<bool, String> {
        let update = doc! {
            "$addToSet": {
                "courses": course_id,
                "course_progress": progress_id,
            },
            "$set": { "updated_at": BsonDateTime::now() },
        };

        let result = self
            .collection::<User>("users")
            .update_one(doc! { "user_id": user_id }, update)
            .await
            .map_err(|e| format!("Database error: {}", e))?;

        Ok(result.matched_count == 1)
    }
}

#[async_trait]
impl ProgressStore for MongoDB {
    async fn create_progress(&self, course_id: &str, user_id: &str) -> Result<String, String> {
        let progress_id = ObjectId::new();

        let progress = CourseProgress {
            _id: Some(progress_id),
            course_id: course_id.to_string(),
            user_id: user_id.to_string(),
            completed_videos: vec![],
            created_at: Some(BsonDateTime::now()),
        };

        self.collection::<CourseProgress>("course_progress")
            .insert_one(&progress)
            .await
            .map_err(|e| format!("Failed to create course progress: {}", e))?;

        Ok(progress_id.to_hex())
    }

    async fn find_progress(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<Option<String>, String> {
        let progress = self
            .collection::<CourseProgress>("course_progress")
            .find_one(doc! { "course_id": course_id, "user_id": user_id })
            .await
            .map_err(|e| format!("Database error: {}", e))?;

        Ok(progress.and_then(|p| p._id).map(|id| id.to_hex()))
    }
}

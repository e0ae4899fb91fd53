use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// One record per (user, course) pair, created at enrollment time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CourseProgress {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub course_id: String,
    pub user_id: String,
    #[serde(default)]
    pub completed_videos: Vec<String>,
    pub created_at: Option<BsonDateTime>,
}

use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: String,  // PRIMARY IDENTIFIER - matches MongoDB structure
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,  // bcrypt hash
    pub first_name: String,
    pub last_name: String,
    /// Enrolled course ids. Index-aligned with `course_progress`: each
    /// enrolled course has exactly one progress record.
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub course_progress: Vec<String>,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
    pub last_login: Option<BsonDateTime>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

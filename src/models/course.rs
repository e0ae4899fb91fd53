use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Course {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub course_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price in whole currency units (INR). Order amounts are `price * 100`
    /// minor units.
    pub price: i64,
    /// user_ids of enrolled students. Must never contain duplicates.
    #[serde(default)]
    pub student_enrolled: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,  // user_id of the creating instructor
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
}

impl Course {
    pub fn course_id(&self) -> String {
        self._id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

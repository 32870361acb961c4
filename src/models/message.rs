use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A chat line on a project. Also the shape of the JSON published by the
/// `messages_inserted` notification trigger.
#[derive(sqlx::FromRow, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: i32,
    pub project_id: i32,
    pub sender: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_from(&self, sender: &str) -> bool {
        self.sender == sender
    }
}

use chrono::{DateTime, Utc};

/// Statuses a project cycles through from the projects screen.
pub const PROJECT_STATUSES: &[&str] = &["active", "completed", "pending"];

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub message: Option<String>,
    pub invoice_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Blank project for the creation form. An id of 0 means "not saved yet".
    pub fn draft() -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: None,
            status: PROJECT_STATUSES[0].to_string(),
            message: None,
            invoice_url: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

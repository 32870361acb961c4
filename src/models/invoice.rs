use chrono::{DateTime, NaiveDate, Utc};

pub const INVOICE_STATUSES: &[&str] = &["draft", "pending", "paid"];

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: i32,
    pub project_id: i32,
    pub invoice_number: String,
    pub amount: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn draft(project_id: i32) -> Self {
        Self {
            id: 0,
            project_id,
            invoice_number: String::new(),
            amount: None,
            due_date: None,
            status: INVOICE_STATUSES[0].to_string(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }

    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }

    pub fn is_draft(&self) -> bool {
        self.status == "draft"
    }

    /// Billed but not settled: anything that is neither paid nor a draft.
    pub fn is_outstanding(&self) -> bool {
        !self.is_paid() && !self.is_draft()
    }

    /// Amount with a missing value counted as zero.
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }
}

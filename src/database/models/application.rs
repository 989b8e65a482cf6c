use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    pub enum ApplicationStatus ("application status") {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CounselorApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub credentials: String,
    pub years_experience: i32,
    pub specializations: Vec<String>,
    pub motivation: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CounselorApplication {
    /// Only pending applications can be approved or rejected
    pub fn is_reviewable(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }
}

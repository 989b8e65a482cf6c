use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    pub enum SessionType ("session type") {
        OneOnOne => "one_on_one",
        Group => "group",
    }
}

text_enum! {
    pub enum SessionStatus ("session status") {
        Scheduled => "scheduled",
        Ongoing => "ongoing",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }

    /// Terminal states are final; everything else may move forward or stay put.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            SessionStatus::Scheduled => next != SessionStatus::Scheduled,
            SessionStatus::Ongoing => next.is_terminal(),
            SessionStatus::Completed | SessionStatus::Cancelled => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CounselingSession {
    pub id: Uuid,
    pub counselor_id: Uuid,
    pub patient_id: Uuid,
    pub title: Option<String>,
    #[sqlx(try_from = "String")]
    pub session_type: SessionType,
    #[sqlx(try_from = "String")]
    pub status: SessionStatus,
    pub scheduled_for: DateTime<Utc>,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CounselingSession {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.counselor_id == user_id || self.patient_id == user_id
    }

    /// The participant on the other side of a conversation with `user_id`
    pub fn counterpart_of(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.counselor_id {
            Some(self.patient_id)
        } else if user_id == self.patient_id {
            Some(self.counselor_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(counselor_id: Uuid, patient_id: Uuid) -> CounselingSession {
        let now = Utc::now();
        CounselingSession {
            id: Uuid::new_v4(),
            counselor_id,
            patient_id,
            title: None,
            session_type: SessionType::OneOnOne,
            status: SessionStatus::Scheduled,
            scheduled_for: now,
            duration_minutes: 50,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn session_type_accepts_only_known_values() {
        assert_eq!("one_on_one".parse::<SessionType>().unwrap(), SessionType::OneOnOne);
        assert_eq!("group".parse::<SessionType>().unwrap(), SessionType::Group);
        assert!("one-on-one".parse::<SessionType>().is_err());
        assert!("workshop".parse::<SessionType>().is_err());
        assert!(serde_json::from_str::<SessionType>("\"workshop\"").is_err());
    }

    #[test]
    fn terminal_statuses_are_final() {
        use SessionStatus::*;
        assert!(Scheduled.can_transition_to(Ongoing));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Completed));
        assert!(Ongoing.can_transition_to(Completed));
        assert!(!Ongoing.can_transition_to(Scheduled));
        assert!(!Completed.can_transition_to(Scheduled));
        assert!(!Cancelled.can_transition_to(Ongoing));
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn counterpart_is_the_other_participant() {
        let counselor = Uuid::new_v4();
        let patient = Uuid::new_v4();
        let s = session(counselor, patient);
        assert_eq!(s.counterpart_of(counselor), Some(patient));
        assert_eq!(s.counterpart_of(patient), Some(counselor));
        assert_eq!(s.counterpart_of(Uuid::new_v4()), None);
        assert!(s.is_participant(patient));
        assert!(!s.is_participant(Uuid::new_v4()));
    }
}

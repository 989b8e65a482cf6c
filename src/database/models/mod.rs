use thiserror::Error;

/// A text column held a value outside its enumerated set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}'; expected one of: {expected}")]
pub struct InvalidValue {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Declares an enum stored as a lowercase text column.
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr` and `TryFrom<String>`; the
/// latter lets `FromRow` decode the column with `#[sqlx(try_from = "String")]`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::database::models::InvalidValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::database::models::InvalidValue {
                        kind: $kind,
                        value: other.to_string(),
                        expected: [$($text),+].join(", "),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::database::models::InvalidValue;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

// Declared after the macro so the submodules can expand it
pub mod application;
pub mod checkin;
pub mod counseling;
pub mod forum;
pub mod message;
pub mod user;

pub use application::{ApplicationStatus, CounselorApplication};
pub use checkin::{CheckinSummary, MentalHealthCheckin};
pub use counseling::{CounselingSession, SessionStatus, SessionType};
pub use forum::{DiscussionComment, DiscussionPost};
pub use message::SessionMessage;
pub use user::{AuthSession, PublicProfile, Role, UserAccount, UserProfile};


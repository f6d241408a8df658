//! Backend repositories
//!
//! Repository pattern over the hosted database. Each repository handles
//! table queries and remote procedures for one entity. Every call takes the
//! caller's `AuthToken` so row-level security sees the real user.

pub mod booking;
pub mod comment;
pub mod mentor;
pub mod post;
pub mod profile;
pub mod registration;
pub mod skill;
pub mod stats;
pub mod tag;

pub use booking::{BookingRepository, RestBookingRepository};
pub use comment::{CommentRepository, RestCommentRepository};
pub use mentor::{MentorRepository, RestMentorRepository};
pub use post::{PostRepository, RestPostRepository};
pub use profile::{ProfileRepository, RestProfileRepository};
pub use registration::{RegistrationRepository, RestRegistrationRepository};
pub use skill::{RestSkillRepository, SkillRepository};
pub use stats::{RestStatsRepository, StatsRepository};
pub use tag::{RestTagRepository, TagRepository};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::{BackendClient, BackendError};

/// Every repository behind its trait object
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub mentors: Arc<dyn MentorRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub skills: Arc<dyn SkillRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

impl Repositories {
    /// REST-backed repositories sharing one client
    pub fn rest(client: &BackendClient) -> Self {
        Self {
            posts: RestPostRepository::boxed(client.clone()),
            comments: RestCommentRepository::boxed(client.clone()),
            mentors: RestMentorRepository::boxed(client.clone()),
            bookings: RestBookingRepository::boxed(client.clone()),
            registrations: RestRegistrationRepository::boxed(client.clone()),
            skills: RestSkillRepository::boxed(client.clone()),
            tags: RestTagRepository::boxed(client.clone()),
            profiles: RestProfileRepository::boxed(client.clone()),
            stats: RestStatsRepository::boxed(client.clone()),
        }
    }
}

/// Procedures may answer with a bare object or a one-row set
pub(crate) fn single_row<T: DeserializeOwned>(value: Value) -> Result<T, BackendError> {
    let row = match value {
        Value::Array(rows) => rows.into_iter().next().ok_or(BackendError::NotFound)?,
        Value::Null => return Err(BackendError::NotFound),
        other => other,
    };
    serde_json::from_value(row).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Merge extra columns into a serialized input
pub(crate) fn with_columns<B: serde::Serialize>(
    body: &B,
    extra: &[(&str, Value)],
) -> Result<Value, BackendError> {
    let mut value = serde_json::to_value(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    if let Value::Object(map) = &mut value {
        for (key, v) in extra {
            map.insert((*key).to_string(), v.clone());
        }
    }
    Ok(value)
}

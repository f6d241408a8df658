//! Booking service
//!
//! Mentees request sessions from the account area; admins move bookings
//! through their statuses. Status transition rules are enforced remotely.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceError;
use super::validation::normalize_optional;
use crate::backend::repositories::{BookingRepository, MentorRepository};
use crate::backend::AuthToken;
use crate::models::{BookingFilter, BookingStatus, CreateBookingInput, ListParams, MentorBooking, PagedResult, Profile};

pub const MAX_NOTE_LEN: usize = 1000;

/// Booking service
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    mentors: Arc<dyn MentorRepository>,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>, mentors: Arc<dyn MentorRepository>) -> Self {
        Self { repo, mentors }
    }

    pub async fn admin_list(
        &self,
        auth: &AuthToken,
        filter: &BookingFilter,
        params: &ListParams,
    ) -> Result<PagedResult<MentorBooking>, ServiceError> {
        Ok(self.repo.admin_list(auth, filter, params).await?)
    }

    pub async fn list_mine(&self, auth: &AuthToken, mentee: &Profile) -> Result<Vec<MentorBooking>, ServiceError> {
        Ok(self.repo.list_for_mentee(auth, mentee.id).await?)
    }

    pub async fn create(
        &self,
        auth: &AuthToken,
        mentee: &Profile,
        mut input: CreateBookingInput,
    ) -> Result<MentorBooking, ServiceError> {
        let mentor = self
            .mentors
            .get(auth, input.mentor_id)
            .await?
            .filter(|m| m.published)
            .ok_or_else(|| ServiceError::not_found("Mentor"))?;

        if mentor.user_id == Some(mentee.id) {
            return Err(ServiceError::ValidationError(
                "Bạn không thể đặt lịch với chính mình".to_string(),
            ));
        }
        if let Some(at) = input.scheduled_at {
            if at <= Utc::now() {
                return Err(ServiceError::ValidationError(
                    "Thời gian hẹn phải ở trong tương lai".to_string(),
                ));
            }
        }
        input.note = normalize_optional(input.note);
        if input.note.as_deref().map(|n| n.chars().count()).unwrap_or(0) > MAX_NOTE_LEN {
            return Err(ServiceError::ValidationError(format!(
                "Ghi chú không được vượt quá {} ký tự",
                MAX_NOTE_LEN
            )));
        }

        let booking = self.repo.create(auth, mentee.id, &input).await?;
        tracing::info!("Booking {} created by {} with mentor {}", booking.id, mentee.id, mentor.id);
        Ok(booking)
    }

    pub async fn update_status(
        &self,
        auth: &AuthToken,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<MentorBooking, ServiceError> {
        let booking = self
            .repo
            .update_status(auth, id, status)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lịch hẹn"))?;
        tracing::info!("Booking {} moved to {}", id, status);
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionType, UserRole};
    use crate::testing::InMemoryStore;
    use chrono::Duration;

    fn booking_for(mentor_id: Uuid) -> CreateBookingInput {
        CreateBookingInput {
            mentor_id,
            session_type: SessionType::Online,
            scheduled_at: Some(Utc::now() + Duration::days(2)),
            note: Some("  Muốn hỏi về CV  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_mine() {
        let store = InMemoryStore::new();
        let mentee = store.add_user("mentee@hr.vn", "secret1", UserRole::User);
        let mentor = store.add_mentor("Hoàng Yến", true);
        let repos = store.repositories();
        let service = BookingService::new(repos.bookings, repos.mentors);
        let auth = AuthToken::anonymous();

        let booking = service.create(&auth, &mentee, booking_for(mentor.id)).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.note.as_deref(), Some("Muốn hỏi về CV"));

        let mine = service.list_mine(&auth, &mentee).await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_past_time_rejected() {
        let store = InMemoryStore::new();
        let mentee = store.add_user("mentee@hr.vn", "secret1", UserRole::User);
        let mentor = store.add_mentor("Hoàng Yến", true);
        let repos = store.repositories();
        let service = BookingService::new(repos.bookings, repos.mentors);

        let mut input = booking_for(mentor.id);
        input.scheduled_at = Some(Utc::now() - Duration::hours(1));
        assert!(matches!(
            service.create(&AuthToken::anonymous(), &mentee, input).await,
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_unpublished_mentor_not_bookable() {
        let store = InMemoryStore::new();
        let mentee = store.add_user("mentee@hr.vn", "secret1", UserRole::User);
        let mentor = store.add_mentor("Ẩn danh", false);
        let repos = store.repositories();
        let service = BookingService::new(repos.bookings, repos.mentors);
        assert!(matches!(
            service.create(&AuthToken::anonymous(), &mentee, booking_for(mentor.id)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = InMemoryStore::new();
        let mentee = store.add_user("mentee@hr.vn", "secret1", UserRole::User);
        let mentor = store.add_mentor("Hoàng Yến", true);
        let repos = store.repositories();
        let service = BookingService::new(repos.bookings, repos.mentors);
        let auth = AuthToken::anonymous();

        let booking = service.create(&auth, &mentee, booking_for(mentor.id)).await.unwrap();
        let updated = service
            .update_status(&auth, booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);

        let page = service
            .admin_list(
                &auth,
                &BookingFilter { status: Some(BookingStatus::Confirmed), search: None },
                &ListParams::new(1, 20),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        assert!(service
            .update_status(&auth, Uuid::new_v4(), BookingStatus::Cancelled)
            .await
            .is_err());
    }
}

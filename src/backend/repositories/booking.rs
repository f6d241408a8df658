//! Booking repository
//!
//! The admin listing goes through `admin_list_mentor_bookings`, which joins
//! mentor and mentee names and reports the full match count on every row.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::with_columns;
use crate::backend::{AuthToken, BackendClient, BackendError, TableQuery};
use crate::models::{BookingFilter, BookingStatus, CreateBookingInput, ListParams, MentorBooking, PagedResult};

const MENTEE_SELECT: &str = "*,...mentors(mentor_name:full_name)";

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn admin_list(
        &self,
        auth: &AuthToken,
        filter: &BookingFilter,
        params: &ListParams,
    ) -> Result<PagedResult<MentorBooking>, BackendError>;

    /// Bookings made by one mentee, newest first
    async fn list_for_mentee(&self, auth: &AuthToken, mentee_id: Uuid) -> Result<Vec<MentorBooking>, BackendError>;

    async fn create(&self, auth: &AuthToken, mentee_id: Uuid, input: &CreateBookingInput) -> Result<MentorBooking, BackendError>;

    async fn update_status(
        &self,
        auth: &AuthToken,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<MentorBooking>, BackendError>;
}

pub struct RestBookingRepository {
    client: BackendClient,
}

impl RestBookingRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn boxed(client: BackendClient) -> Arc<dyn BookingRepository> {
        Arc::new(Self::new(client))
    }
}

fn rpc_params(filter: &BookingFilter, params: &ListParams) -> Value {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    json!({
        "p_status": filter.status.map(|s| s.to_string()),
        "p_search": search,
        "p_limit": params.limit(),
        "p_offset": params.offset(),
    })
}

/// Split procedure rows into bookings and the reported total
fn paged_from_rows(rows: Vec<Value>, params: &ListParams) -> Result<PagedResult<MentorBooking>, BackendError> {
    let total = rows
        .first()
        .and_then(|row| row.get("total_count"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let items = rows
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<MentorBooking>, _>>()
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(PagedResult::new(items, total, params))
}

#[async_trait]
impl BookingRepository for RestBookingRepository {
    async fn admin_list(
        &self,
        auth: &AuthToken,
        filter: &BookingFilter,
        params: &ListParams,
    ) -> Result<PagedResult<MentorBooking>, BackendError> {
        let rows: Vec<Value> = self
            .client
            .rpc(auth, "admin_list_mentor_bookings", &rpc_params(filter, params))
            .await?;
        paged_from_rows(rows, params)
    }

    async fn list_for_mentee(&self, auth: &AuthToken, mentee_id: Uuid) -> Result<Vec<MentorBooking>, BackendError> {
        let query = TableQuery::new("mentor_bookings")
            .select(MENTEE_SELECT)
            .eq("mentee_id", mentee_id)
            .order("created_at", false);
        self.client.select(auth, &query).await
    }

    async fn create(&self, auth: &AuthToken, mentee_id: Uuid, input: &CreateBookingInput) -> Result<MentorBooking, BackendError> {
        let body = with_columns(
            input,
            &[("mentee_id", json!(mentee_id)), ("status", json!(BookingStatus::Pending))],
        )?;
        self.client.insert(auth, "mentor_bookings", &body).await
    }

    async fn update_status(
        &self,
        auth: &AuthToken,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<MentorBooking>, BackendError> {
        let rows: Vec<MentorBooking> = self
            .client
            .update(
                auth,
                &TableQuery::new("mentor_bookings").eq("id", id),
                &json!({ "status": status, "updated_at": Utc::now() }),
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

//! Mentor booking model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A scheduled mentoring session between a mentor and a mentee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorBooking {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub session_type: SessionType,
    /// Requested session start
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
    /// Denormalized names returned by the admin procedure
    #[serde(default)]
    pub mentor_name: Option<String>,
    #[serde(default)]
    pub mentee_name: Option<String>,
    #[serde(default)]
    pub mentee_email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Booking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Chờ xác nhận",
            BookingStatus::Confirmed => "Đã xác nhận",
            BookingStatus::Completed => "Đã hoàn thành",
            BookingStatus::Cancelled => "Đã hủy",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// How the session takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Online,
    Offline,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Online => write!(f, "online"),
            SessionType::Offline => write!(f, "offline"),
        }
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(SessionType::Online),
            "offline" => Ok(SessionType::Offline),
            _ => Err(format!("Invalid session type: {}", s)),
        }
    }
}

/// Input for a mentee requesting a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingInput {
    pub mentor_id: Uuid,
    #[serde(default)]
    pub session_type: SessionType,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Filter for the admin booking table
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub search: Option<String>,
}

//! Services layer - Business logic
//!
//! This module contains the services of HR Companion. Services are
//! responsible for:
//! - Validating input before it reaches the backend
//! - Coordinating repositories and storage
//! - Turning backend failures into user-facing errors
//!
//! It also holds the in-process UI plumbing: the notification centre, the
//! search debouncer and the block content renderer.

pub mod auth;
pub mod booking;
pub mod comment;
pub mod content;
pub mod debounce;
pub mod error;
pub mod mentor;
pub mod messages;
pub mod notification;
pub mod post;
pub mod profile;
pub mod registration;
pub mod skill;
pub mod stats;
pub mod tag;
pub mod upload;
pub mod validation;

pub use auth::AuthService;
pub use booking::BookingService;
pub use comment::{build_comment_tree, CommentService, MAX_REPLY_DEPTH};
pub use content::render_document;
pub use debounce::{Debounced, Debouncer};
pub use error::ServiceError;
pub use mentor::MentorService;
pub use messages::{friendly_backend_error, friendly_message};
pub use notification::{Notification, NotificationCenter, NotificationKind};
pub use post::PostService;
pub use profile::ProfileService;
pub use registration::RegistrationService;
pub use skill::SkillService;
pub use stats::StatsService;
pub use tag::TagService;
pub use upload::UploadService;
pub use validation::FieldError;

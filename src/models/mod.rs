//! Data models
//!
//! This module contains the data structures used throughout HR Companion.
//! The authoritative shapes live in the hosted backend schema; these types
//! mirror the rows and procedure results the application reads and writes.

mod booking;
mod comment;
mod mentor;
mod pagination;
mod post;
mod registration;
mod skill;
mod stats;
mod tag;
mod user;

pub use booking::{BookingFilter, BookingStatus, CreateBookingInput, MentorBooking, SessionType};
pub use comment::{Comment, CommentNode, CreateCommentInput, DELETED_COMMENT_TEXT};
pub use mentor::{
    CreateMentorInput, Education, Mentor, MentorActivity, MentorDetail, MentorFilter, MentorStats,
    UpdateMentorInput, WorkExperience,
};
pub use pagination::{page_window, paginate_slice, ListParams, PageItem, PagedResult, MAX_PER_PAGE};
pub use post::{AuthorInfo, Block, BlockDocument, CreatePostInput, Post, PostFilter, PostType, UpdatePostInput};
pub use registration::{CreateRegistrationInput, MentorRegistration, RegistrationStatus};
pub use skill::{MentorSkill, SkillInput};
pub use stats::{DashboardStats, MonthlyCount};
pub use tag::{CreateTagInput, Tag, TagFilter, UpdateTagInput};
pub use user::{Profile, ProfileFilter, UpdateProfileInput, UserRole};

//! In-memory stand-ins for the hosted backend, used by service and handler tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::backend::repositories::{
    BookingRepository, CommentRepository, MentorRepository, PostRepository, ProfileRepository,
    RegistrationRepository, Repositories, SkillRepository, StatsRepository, TagRepository,
};
use crate::backend::{
    AuthProvider, AuthSession, AuthToken, AuthUser, BackendError, ObjectStorage, OtpType, SignUpOutcome,
    SignUpRequest,
};
use crate::models::*;

/// Code accepted by the fake auth provider
pub const VALID_OTP: &str = "123456";

#[derive(Default)]
struct StoreData {
    passwords: HashMap<String, (Uuid, String)>,
    sessions: HashMap<String, Uuid>,
    refresh_tokens: HashMap<String, Uuid>,
    profiles: Vec<Profile>,
    posts: Vec<Post>,
    post_tags: Vec<(Uuid, Uuid)>,
    comments: Vec<Comment>,
    mentors: Vec<Mentor>,
    mentor_skills: Vec<(Uuid, Uuid)>,
    bookings: Vec<MentorBooking>,
    registrations: Vec<MentorRegistration>,
    skills: Vec<MentorSkill>,
    tags: Vec<Tag>,
}

/// Shared in-memory database implementing every repository trait
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<Mutex<StoreData>>,
}

fn duplicate() -> BackendError {
    BackendError::Api {
        status: 409,
        code: Some("23505".to_string()),
        message: "duplicate key value violates unique constraint".to_string(),
    }
}

fn api_error(status: u16, message: &str) -> BackendError {
    BackendError::Api {
        status,
        code: None,
        message: message.to_string(),
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

fn search_term(search: Option<&String>) -> Option<String> {
    search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Newest first, like the `created_at.desc` ordering of the real listings
fn newest_first<T: Clone>(items: Vec<T>, params: &ListParams) -> PagedResult<T> {
    let reversed: Vec<T> = items.into_iter().rev().collect();
    paginate_slice(&reversed, params)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().unwrap()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            posts: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
            mentors: Arc::new(self.clone()),
            bookings: Arc::new(self.clone()),
            registrations: Arc::new(self.clone()),
            skills: Arc::new(self.clone()),
            tags: Arc::new(self.clone()),
            profiles: Arc::new(self.clone()),
            stats: Arc::new(self.clone()),
        }
    }

    pub fn add_user(&self, email: &str, password: &str, role: UserRole) -> Profile {
        let id = Uuid::new_v4();
        let profile = Profile {
            id,
            email: email.to_string(),
            role,
            full_name: email.split('@').next().map(str::to_string),
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            bio: None,
            avatar_url: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        let mut data = self.lock();
        data.passwords
            .insert(email.to_lowercase(), (id, password.to_string()));
        data.profiles.push(profile.clone());
        profile
    }

    /// Issue an access token for an existing user
    pub fn session_for(&self, profile: &Profile) -> String {
        let token = format!("token-{}", Uuid::new_v4());
        self.lock().sessions.insert(token.clone(), profile.id);
        token
    }

    /// Issue a refresh token that outlives any access token
    pub fn refresh_token_for(&self, profile: &Profile) -> String {
        let token = format!("refresh-{}", Uuid::new_v4());
        self.lock().refresh_tokens.insert(token.clone(), profile.id);
        token
    }

    /// Revoke an access token as if it had expired
    pub fn expire_session(&self, token: &str) {
        self.lock().sessions.remove(token);
    }

    pub fn profile(&self, id: Uuid) -> Option<Profile> {
        self.lock().profiles.iter().find(|p| p.id == id).cloned()
    }

    pub fn add_tag(&self, name: &str, published: bool) -> Tag {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            published,
            created_at: Some(Utc::now()),
        };
        self.lock().tags.push(tag.clone());
        tag
    }

    pub fn add_skill(&self, name: &str, published: bool) -> MentorSkill {
        let skill = MentorSkill {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            published,
            mentor_count: Some(0),
            created_at: Some(Utc::now()),
        };
        self.lock().skills.push(skill.clone());
        skill
    }

    pub fn add_mentor(&self, name: &str, published: bool) -> Mentor {
        let mentor = Mentor {
            id: Uuid::new_v4(),
            user_id: None,
            full_name: name.to_string(),
            headline: None,
            avatar_url: None,
            bio: None,
            email: None,
            skills: Vec::new(),
            published,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.lock().mentors.push(mentor.clone());
        mentor
    }

    pub fn add_post(&self, title: &str, post_type: PostType, published: bool) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            thumbnail: None,
            content: BlockDocument::default(),
            author_id: None,
            author: None,
            post_type,
            published,
            published_at: if published { Some(Utc::now()) } else { None },
            tags: Vec::new(),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.lock().posts.push(post.clone());
        post
    }

    pub fn add_comment(&self, post_id: Uuid, author: &Profile, parent: Option<Uuid>, content: &str) -> Comment {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id: author.id,
            parent_comment_id: parent,
            content: content.to_string(),
            is_deleted: false,
            author: Some(AuthorInfo {
                id: author.id,
                full_name: author.full_name.clone(),
                avatar_url: author.avatar_url.clone(),
            }),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.lock().comments.push(comment.clone());
        comment
    }

    pub fn comment(&self, id: Uuid) -> Option<Comment> {
        self.lock().comments.iter().find(|c| c.id == id).cloned()
    }
}

impl StoreData {
    fn post_with_tags(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.tags = self
            .post_tags
            .iter()
            .filter(|(p, _)| *p == post.id)
            .filter_map(|(_, t)| self.tags.iter().find(|tag| tag.id == *t).cloned())
            .collect();
        post
    }

    fn mentor_with_skills(&self, mentor: &Mentor) -> Mentor {
        let mut mentor = mentor.clone();
        mentor.skills = self
            .mentor_skills
            .iter()
            .filter(|(m, _)| *m == mentor.id)
            .filter_map(|(_, s)| self.skills.iter().find(|skill| skill.id == *s).cloned())
            .collect();
        mentor
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list(&self, _auth: &AuthToken, filter: &PostFilter, params: &ListParams) -> Result<PagedResult<Post>, BackendError> {
        let data = self.lock();
        let search = search_term(filter.search.as_ref());
        let items: Vec<Post> = data
            .posts
            .iter()
            .filter(|p| filter.post_type.map_or(true, |t| p.post_type == t))
            .filter(|p| filter.published.map_or(true, |v| p.published == v))
            .filter(|p| {
                filter
                    .tag_id
                    .map_or(true, |t| data.post_tags.contains(&(p.id, t)))
            })
            .filter(|p| {
                search.as_deref().map_or(true, |s| {
                    contains_ci(Some(p.title.as_str()), s) || contains_ci(p.description.as_deref(), s)
                })
            })
            .map(|p| data.post_with_tags(p))
            .collect();
        Ok(newest_first(items, params))
    }

    async fn get(&self, _auth: &AuthToken, id: Uuid) -> Result<Option<Post>, BackendError> {
        let data = self.lock();
        Ok(data.posts.iter().find(|p| p.id == id).map(|p| data.post_with_tags(p)))
    }

    async fn create(&self, _auth: &AuthToken, author_id: Uuid, input: &CreatePostInput) -> Result<Post, BackendError> {
        let post = Post {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            description: input.description.clone(),
            thumbnail: input.thumbnail.clone(),
            content: input.content.clone(),
            author_id: Some(author_id),
            author: None,
            post_type: input.post_type,
            published: input.published,
            published_at: if input.published { Some(Utc::now()) } else { None },
            tags: Vec::new(),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.lock().posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, _auth: &AuthToken, id: Uuid, input: &UpdatePostInput) -> Result<Option<Post>, BackendError> {
        let mut data = self.lock();
        let Some(post) = data.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            post.title = title.clone();
        }
        if let Some(description) = &input.description {
            post.description = Some(description.clone());
        }
        if let Some(thumbnail) = &input.thumbnail {
            post.thumbnail = Some(thumbnail.clone());
        }
        if let Some(content) = &input.content {
            post.content = content.clone();
        }
        if let Some(post_type) = input.post_type {
            post.post_type = post_type;
        }
        post.updated_at = Some(Utc::now());
        Ok(Some(post.clone()))
    }

    async fn set_published(&self, _auth: &AuthToken, id: Uuid, published: bool) -> Result<Option<Post>, BackendError> {
        let mut data = self.lock();
        let Some(post) = data.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.published = published;
        if published {
            post.published_at = Some(Utc::now());
        }
        Ok(Some(post.clone()))
    }

    async fn delete(&self, _auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        let mut data = self.lock();
        data.posts.retain(|p| p.id != id);
        data.post_tags.retain(|(p, _)| *p != id);
        data.comments.retain(|c| c.post_id != id);
        Ok(())
    }

    async fn set_tags(&self, _auth: &AuthToken, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), BackendError> {
        let mut data = self.lock();
        data.post_tags.retain(|(p, _)| *p != post_id);
        data.post_tags
            .extend(tag_ids.iter().map(|t| (post_id, *t)));
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, _auth: &AuthToken, post_id: Uuid) -> Result<Vec<Comment>, BackendError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn get(&self, _auth: &AuthToken, id: Uuid) -> Result<Option<Comment>, BackendError> {
        Ok(self.comment(id))
    }

    async fn create(&self, _auth: &AuthToken, author_id: Uuid, input: &CreateCommentInput) -> Result<Comment, BackendError> {
        let mut data = self.lock();
        let author = data.profiles.iter().find(|p| p.id == author_id).map(|p| AuthorInfo {
            id: p.id,
            full_name: p.full_name.clone(),
            avatar_url: p.avatar_url.clone(),
        });
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: input.post_id,
            author_id,
            parent_comment_id: input.parent_comment_id,
            content: input.content.clone(),
            is_deleted: false,
            author,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        data.comments.push(comment.clone());
        Ok(comment)
    }

    async fn soft_delete(&self, _auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        if let Some(comment) = self.lock().comments.iter_mut().find(|c| c.id == id) {
            comment.is_deleted = true;
        }
        Ok(())
    }
}

#[async_trait]
impl MentorRepository for InMemoryStore {
    async fn list(&self, _auth: &AuthToken, filter: &MentorFilter, params: &ListParams) -> Result<PagedResult<Mentor>, BackendError> {
        let data = self.lock();
        let search = search_term(filter.search.as_ref());
        let items: Vec<Mentor> = data
            .mentors
            .iter()
            .filter(|m| filter.published.map_or(true, |v| m.published == v))
            .filter(|m| {
                filter
                    .skill_id
                    .map_or(true, |s| data.mentor_skills.contains(&(m.id, s)))
            })
            .filter(|m| {
                search.as_deref().map_or(true, |s| {
                    contains_ci(Some(m.full_name.as_str()), s) || contains_ci(m.headline.as_deref(), s)
                })
            })
            .map(|m| data.mentor_with_skills(m))
            .collect();
        Ok(newest_first(items, params))
    }

    async fn get(&self, _auth: &AuthToken, id: Uuid) -> Result<Option<Mentor>, BackendError> {
        let data = self.lock();
        Ok(data.mentors.iter().find(|m| m.id == id).map(|m| data.mentor_with_skills(m)))
    }

    async fn work_experiences(&self, _auth: &AuthToken, _mentor_id: Uuid) -> Result<Vec<WorkExperience>, BackendError> {
        Ok(Vec::new())
    }

    async fn educations(&self, _auth: &AuthToken, _mentor_id: Uuid) -> Result<Vec<Education>, BackendError> {
        Ok(Vec::new())
    }

    async fn activities(&self, _auth: &AuthToken, _mentor_id: Uuid) -> Result<Vec<MentorActivity>, BackendError> {
        Ok(Vec::new())
    }

    async fn stats(&self, _auth: &AuthToken, _mentor_id: Uuid) -> Result<MentorStats, BackendError> {
        Ok(MentorStats::default())
    }

    async fn create(&self, _auth: &AuthToken, input: &CreateMentorInput) -> Result<Mentor, BackendError> {
        let mentor = Mentor {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            full_name: input.full_name.clone(),
            headline: input.headline.clone(),
            avatar_url: input.avatar_url.clone(),
            bio: input.bio.clone(),
            email: input.email.clone(),
            skills: Vec::new(),
            published: input.published,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.lock().mentors.push(mentor.clone());
        Ok(mentor)
    }

    async fn update(&self, _auth: &AuthToken, id: Uuid, input: &UpdateMentorInput) -> Result<Option<Mentor>, BackendError> {
        let mut data = self.lock();
        let Some(mentor) = data.mentors.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &input.full_name {
            mentor.full_name = name.clone();
        }
        if let Some(headline) = &input.headline {
            mentor.headline = Some(headline.clone());
        }
        if let Some(avatar) = &input.avatar_url {
            mentor.avatar_url = Some(avatar.clone());
        }
        if let Some(bio) = &input.bio {
            mentor.bio = Some(bio.clone());
        }
        if let Some(email) = &input.email {
            mentor.email = Some(email.clone());
        }
        mentor.updated_at = Some(Utc::now());
        Ok(Some(mentor.clone()))
    }

    async fn set_published(&self, _auth: &AuthToken, id: Uuid, published: bool) -> Result<Option<Mentor>, BackendError> {
        let mut data = self.lock();
        let Some(mentor) = data.mentors.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        mentor.published = published;
        Ok(Some(mentor.clone()))
    }

    async fn delete(&self, _auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        let mut data = self.lock();
        data.mentors.retain(|m| m.id != id);
        data.mentor_skills.retain(|(m, _)| *m != id);
        Ok(())
    }

    async fn set_skills(&self, _auth: &AuthToken, mentor_id: Uuid, skill_ids: &[Uuid]) -> Result<(), BackendError> {
        let mut data = self.lock();
        data.mentor_skills.retain(|(m, _)| *m != mentor_id);
        data.mentor_skills
            .extend(skill_ids.iter().map(|s| (mentor_id, *s)));
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn admin_list(&self, _auth: &AuthToken, filter: &BookingFilter, params: &ListParams) -> Result<PagedResult<MentorBooking>, BackendError> {
        let data = self.lock();
        let search = search_term(filter.search.as_ref());
        let items: Vec<MentorBooking> = data
            .bookings
            .iter()
            .filter(|b| filter.status.map_or(true, |s| b.status == s))
            .filter(|b| {
                search.as_deref().map_or(true, |s| {
                    contains_ci(b.mentor_name.as_deref(), s)
                        || contains_ci(b.mentee_name.as_deref(), s)
                        || contains_ci(b.mentee_email.as_deref(), s)
                })
            })
            .cloned()
            .collect();
        Ok(newest_first(items, params))
    }

    async fn list_for_mentee(&self, _auth: &AuthToken, mentee_id: Uuid) -> Result<Vec<MentorBooking>, BackendError> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .rev()
            .filter(|b| b.mentee_id == mentee_id)
            .cloned()
            .collect())
    }

    async fn create(&self, _auth: &AuthToken, mentee_id: Uuid, input: &CreateBookingInput) -> Result<MentorBooking, BackendError> {
        let mut data = self.lock();
        let mentor_name = data
            .mentors
            .iter()
            .find(|m| m.id == input.mentor_id)
            .map(|m| m.full_name.clone());
        let mentee = data.profiles.iter().find(|p| p.id == mentee_id).cloned();
        let booking = MentorBooking {
            id: Uuid::new_v4(),
            mentor_id: input.mentor_id,
            mentee_id,
            status: BookingStatus::Pending,
            session_type: input.session_type,
            scheduled_at: input.scheduled_at,
            note: input.note.clone(),
            mentor_name,
            mentee_name: mentee.as_ref().and_then(|p| p.full_name.clone()),
            mentee_email: mentee.map(|p| p.email),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        data.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update_status(&self, _auth: &AuthToken, id: Uuid, status: BookingStatus) -> Result<Option<MentorBooking>, BackendError> {
        let mut data = self.lock();
        let Some(booking) = data.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        booking.status = status;
        booking.updated_at = Some(Utc::now());
        Ok(Some(booking.clone()))
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryStore {
    async fn list(
        &self,
        _auth: &AuthToken,
        status: Option<RegistrationStatus>,
        params: &ListParams,
    ) -> Result<PagedResult<MentorRegistration>, BackendError> {
        let items: Vec<MentorRegistration> = self
            .lock()
            .registrations
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(newest_first(items, params))
    }

    async fn get(&self, _auth: &AuthToken, id: Uuid) -> Result<Option<MentorRegistration>, BackendError> {
        Ok(self.lock().registrations.iter().find(|r| r.id == id).cloned())
    }

    async fn list_for_user(&self, _auth: &AuthToken, user_id: Uuid) -> Result<Vec<MentorRegistration>, BackendError> {
        Ok(self
            .lock()
            .registrations
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, _auth: &AuthToken, user_id: Uuid, input: &CreateRegistrationInput) -> Result<MentorRegistration, BackendError> {
        let registration = MentorRegistration {
            id: Uuid::new_v4(),
            user_id,
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            notes: input.notes.clone(),
            status: RegistrationStatus::Pending,
            admin_notes: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.lock().registrations.push(registration.clone());
        Ok(registration)
    }

    async fn approve(&self, _auth: &AuthToken, id: Uuid, admin_notes: Option<&str>) -> Result<(), BackendError> {
        let mut data = self.lock();
        let Some(registration) = data.registrations.iter_mut().find(|r| r.id == id) else {
            return Err(api_error(400, "Registration not found"));
        };
        registration.status = RegistrationStatus::Approved;
        registration.admin_notes = admin_notes.map(str::to_string);
        let (user_id, full_name, email) = (
            registration.user_id,
            registration.full_name.clone(),
            registration.email.clone(),
        );

        if let Some(profile) = data.profiles.iter_mut().find(|p| p.id == user_id) {
            if !profile.role.is_admin() {
                profile.role = UserRole::Mentor;
            }
        }
        data.mentors.push(Mentor {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            full_name,
            headline: None,
            avatar_url: None,
            bio: None,
            email: Some(email),
            skills: Vec::new(),
            published: false,
            created_at: Some(Utc::now()),
            updated_at: None,
        });
        Ok(())
    }

    async fn reject(&self, _auth: &AuthToken, id: Uuid, admin_notes: Option<&str>) -> Result<Option<MentorRegistration>, BackendError> {
        let mut data = self.lock();
        let Some(registration) = data.registrations.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        registration.status = RegistrationStatus::Rejected;
        registration.admin_notes = admin_notes.map(str::to_string);
        Ok(Some(registration.clone()))
    }
}

#[async_trait]
impl SkillRepository for InMemoryStore {
    async fn admin_list(&self, _auth: &AuthToken) -> Result<Vec<MentorSkill>, BackendError> {
        let data = self.lock();
        Ok(data
            .skills
            .iter()
            .map(|s| {
                let mut skill = s.clone();
                skill.mentor_count = Some(data.mentor_skills.iter().filter(|(_, id)| *id == s.id).count() as i64);
                skill
            })
            .collect())
    }

    async fn list_published(&self, _auth: &AuthToken) -> Result<Vec<MentorSkill>, BackendError> {
        let mut skills: Vec<MentorSkill> = self.lock().skills.iter().filter(|s| s.published).cloned().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    async fn create(&self, _auth: &AuthToken, input: &SkillInput) -> Result<MentorSkill, BackendError> {
        let mut data = self.lock();
        if data.skills.iter().any(|s| s.name.eq_ignore_ascii_case(input.name.trim())) {
            return Err(duplicate());
        }
        let skill = MentorSkill {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            description: input.description.clone(),
            published: input.published,
            mentor_count: Some(0),
            created_at: Some(Utc::now()),
        };
        data.skills.push(skill.clone());
        Ok(skill)
    }

    async fn update(&self, _auth: &AuthToken, id: Uuid, input: &SkillInput) -> Result<MentorSkill, BackendError> {
        let mut data = self.lock();
        if data
            .skills
            .iter()
            .any(|s| s.id != id && s.name.eq_ignore_ascii_case(input.name.trim()))
        {
            return Err(duplicate());
        }
        let skill = data
            .skills
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(BackendError::NotFound)?;
        skill.name = input.name.clone();
        skill.description = input.description.clone();
        skill.published = input.published;
        Ok(skill.clone())
    }

    async fn delete(&self, _auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        let mut data = self.lock();
        data.skills.retain(|s| s.id != id);
        data.mentor_skills.retain(|(_, s)| *s != id);
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn list(&self, _auth: &AuthToken, filter: &TagFilter, params: &ListParams) -> Result<PagedResult<Tag>, BackendError> {
        let search = search_term(filter.search.as_ref());
        let items: Vec<Tag> = self
            .lock()
            .tags
            .iter()
            .filter(|t| filter.published.map_or(true, |v| t.published == v))
            .filter(|t| search.as_deref().map_or(true, |s| contains_ci(Some(t.name.as_str()), s)))
            .cloned()
            .collect();
        Ok(newest_first(items, params))
    }

    async fn list_published(&self, _auth: &AuthToken) -> Result<Vec<Tag>, BackendError> {
        let mut tags: Vec<Tag> = self.lock().tags.iter().filter(|t| t.published).cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn get(&self, _auth: &AuthToken, id: Uuid) -> Result<Option<Tag>, BackendError> {
        Ok(self.lock().tags.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, _auth: &AuthToken, input: &CreateTagInput) -> Result<Tag, BackendError> {
        let mut data = self.lock();
        if data.tags.iter().any(|t| t.name == input.name) {
            return Err(duplicate());
        }
        let tag = Tag {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            description: input.description.clone(),
            published: input.published,
            created_at: Some(Utc::now()),
        };
        data.tags.push(tag.clone());
        Ok(tag)
    }

    async fn update(&self, _auth: &AuthToken, id: Uuid, input: &UpdateTagInput) -> Result<Option<Tag>, BackendError> {
        let mut data = self.lock();
        if let Some(name) = &input.name {
            if data.tags.iter().any(|t| t.id != id && &t.name == name) {
                return Err(duplicate());
            }
        }
        let Some(tag) = data.tags.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            tag.name = name.clone();
        }
        if let Some(description) = &input.description {
            tag.description = Some(description.clone());
        }
        if let Some(published) = input.published {
            tag.published = published;
        }
        Ok(Some(tag.clone()))
    }

    async fn delete(&self, _auth: &AuthToken, id: Uuid) -> Result<(), BackendError> {
        let mut data = self.lock();
        data.tags.retain(|t| t.id != id);
        data.post_tags.retain(|(_, t)| *t != id);
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn get(&self, _auth: &AuthToken, id: Uuid) -> Result<Option<Profile>, BackendError> {
        Ok(self.profile(id))
    }

    async fn update(&self, _auth: &AuthToken, id: Uuid, input: &UpdateProfileInput) -> Result<Option<Profile>, BackendError> {
        let mut data = self.lock();
        let Some(profile) = data.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &input.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(v) = &input.phone {
            profile.phone = Some(v.clone());
        }
        if let Some(v) = input.date_of_birth {
            profile.date_of_birth = Some(v);
        }
        if let Some(v) = &input.gender {
            profile.gender = Some(v.clone());
        }
        if let Some(v) = &input.address {
            profile.address = Some(v.clone());
        }
        if let Some(v) = &input.bio {
            profile.bio = Some(v.clone());
        }
        if let Some(v) = &input.avatar_url {
            profile.avatar_url = Some(v.clone());
        }
        profile.updated_at = Some(Utc::now());
        Ok(Some(profile.clone()))
    }

    async fn list(&self, _auth: &AuthToken, filter: &ProfileFilter, params: &ListParams) -> Result<PagedResult<Profile>, BackendError> {
        let search = search_term(filter.search.as_ref());
        let items: Vec<Profile> = self
            .lock()
            .profiles
            .iter()
            .filter(|p| filter.role.map_or(true, |r| p.role == r))
            .filter(|p| {
                search.as_deref().map_or(true, |s| {
                    contains_ci(p.full_name.as_deref(), s) || contains_ci(Some(p.email.as_str()), s)
                })
            })
            .cloned()
            .collect();
        Ok(newest_first(items, params))
    }

    async fn set_role(&self, _auth: &AuthToken, id: Uuid, role: UserRole) -> Result<Option<Profile>, BackendError> {
        let mut data = self.lock();
        let Some(profile) = data.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        profile.role = role;
        Ok(Some(profile.clone()))
    }
}

#[async_trait]
impl StatsRepository for InMemoryStore {
    async fn dashboard(&self, _auth: &AuthToken) -> Result<DashboardStats, BackendError> {
        let data = self.lock();
        let count = |n: usize| n as i64;
        Ok(DashboardStats {
            total_users: count(data.profiles.len()),
            total_mentors: count(data.mentors.len()),
            published_mentors: count(data.mentors.iter().filter(|m| m.published).count()),
            total_bookings: count(data.bookings.len()),
            pending_bookings: count(data.bookings.iter().filter(|b| b.status == BookingStatus::Pending).count()),
            completed_bookings: count(data.bookings.iter().filter(|b| b.status == BookingStatus::Completed).count()),
            pending_registrations: count(
                data.registrations
                    .iter()
                    .filter(|r| r.status == RegistrationStatus::Pending)
                    .count(),
            ),
            total_posts: count(data.posts.len()),
            published_posts: count(data.posts.iter().filter(|p| p.published).count()),
            bookings_by_month: Vec::new(),
        })
    }
}

/// Auth provider backed by the store's users
pub struct FakeAuthProvider {
    store: InMemoryStore,
    calls: AtomicUsize,
}

impl FakeAuthProvider {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls that reached the provider
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn session_for_id(&self, id: Uuid) -> Result<AuthSession, BackendError> {
        let profile = self.store.profile(id).ok_or(BackendError::NotFound)?;
        Ok(AuthSession {
            refresh_token: self.store.refresh_token_for(&profile),
            access_token: self.store.session_for(&profile),
            expires_in: 3600,
            token_type: "bearer".to_string(),
            user: auth_user(&profile),
        })
    }

    fn user_for_token(&self, auth: &AuthToken) -> Result<Uuid, BackendError> {
        auth.access_token()
            .and_then(|t| self.store.lock().sessions.get(t).copied())
            .ok_or_else(|| api_error(401, "invalid JWT: unable to parse or verify signature"))
    }
}

fn auth_user(profile: &Profile) -> AuthUser {
    AuthUser {
        id: profile.id,
        email: Some(profile.email.clone()),
        email_confirmed_at: Some(Utc::now()),
        user_metadata: serde_json::json!({ "full_name": profile.full_name }),
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        self.hit();
        let found = self.store.lock().passwords.get(&email.to_lowercase()).cloned();
        match found {
            Some((id, stored)) if stored == password => self.session_for_id(id),
            _ => Err(api_error(400, "Invalid login credentials")),
        }
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, BackendError> {
        self.hit();
        if self.store.lock().passwords.contains_key(&request.email.to_lowercase()) {
            return Err(api_error(422, "User already registered"));
        }
        let mut profile = self.store.add_user(&request.email, &request.password, UserRole::User);
        profile.full_name = Some(request.full_name.clone());
        if let Some(stored) = self.store.lock().profiles.iter_mut().find(|p| p.id == profile.id) {
            stored.full_name = profile.full_name.clone();
        }
        let mut user = auth_user(&profile);
        user.email_confirmed_at = None;
        Ok(SignUpOutcome::ConfirmationRequired(user))
    }

    async fn verify_otp(&self, email: &str, token: &str, _kind: OtpType) -> Result<AuthSession, BackendError> {
        self.hit();
        let found = self.store.lock().passwords.get(&email.to_lowercase()).cloned();
        match found {
            Some((id, _)) if token == VALID_OTP => self.session_for_id(id),
            _ => Err(api_error(403, "Token has expired or is invalid")),
        }
    }

    async fn resend_otp(&self, _email: &str, _kind: OtpType) -> Result<(), BackendError> {
        self.hit();
        Ok(())
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), BackendError> {
        self.hit();
        Ok(())
    }

    async fn update_password(&self, auth: &AuthToken, password: &str) -> Result<AuthUser, BackendError> {
        self.hit();
        let id = self.user_for_token(auth)?;
        let profile = self.store.profile(id).ok_or(BackendError::NotFound)?;
        self.store
            .lock()
            .passwords
            .insert(profile.email.to_lowercase(), (id, password.to_string()));
        Ok(auth_user(&profile))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        self.hit();
        // Refresh tokens are single use
        let id = self
            .store
            .lock()
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| api_error(400, "Invalid Refresh Token: Refresh Token Not Found"))?;
        self.session_for_id(id)
    }

    async fn sign_out(&self, auth: &AuthToken) -> Result<(), BackendError> {
        self.hit();
        let id = self.user_for_token(auth)?;
        let mut data = self.store.lock();
        if let Some(token) = auth.access_token() {
            data.sessions.remove(token);
        }
        data.refresh_tokens.retain(|_, user| *user != id);
        Ok(())
    }

    async fn get_user(&self, auth: &AuthToken) -> Result<AuthUser, BackendError> {
        self.hit();
        let id = self.user_for_token(auth)?;
        let profile = self.store.profile(id).ok_or(BackendError::NotFound)?;
        Ok(auth_user(&profile))
    }
}

/// Object storage that only records paths
#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(
        &self,
        _auth: &AuthToken,
        bucket: &str,
        path: &str,
        _content_type: &str,
        _data: Vec<u8>,
    ) -> Result<(), BackendError> {
        self.objects.lock().unwrap().push(format!("{}/{}", bucket, path));
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        crate::backend::storage::public_object_url("https://storage.test", bucket, path)
    }
}

//! Helpers shared by the test modules.
//!
//! [`MemoryStore`] implements every repository trait over plain collections
//! so the HTTP layer can be exercised without a database. [`pg_state`] gives
//! the diesel repositories a real PostgreSQL connection from
//! `TEST_DATABASE_URL` (environment or `.env`); everything it writes is rolled
//! back. Tests using it are `#[ignore]`d and run with `cargo test -- --ignored`.

use std::collections::HashMap;
use std::sync::{Mutex, Once};

use axum::async_trait;
use chrono::Utc;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{Connection, PgConnection};
use eyre::{bail, Result};
use uuid::Uuid;

use crate::comment_repo::CommentRepository;
use crate::models::{
    Comment, CommentSummary, CommentView, NewNotification, Notification, NotificationView, Post, PostSummary, Skill,
    User, UserSkill, UserSummary,
};
use crate::notification_repo::NotificationRepository;
use crate::post_repo::PostRepository;
use crate::service::{run_migrations, ServiceState};
use crate::skill_repo::SkillRepository;
use crate::skills::SkillName;
use crate::user_repo::UserRepository;

static MIGRATE: Once = Once::new();

/// A single-connection [`ServiceState`] inside a test transaction.
pub fn pg_state() -> ServiceState {
    // a missing .env is fine as long as the variable is exported
    let _ = dotenvy::dotenv();
    let url = dotenvy::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must point at a scratch database");
    MIGRATE.call_once(|| {
        let mut db = PgConnection::establish(&url).expect("connect to TEST_DATABASE_URL");
        run_migrations(&mut db).expect("migrate test database");
    });

    let db_pool = Pool::builder()
        .max_size(1)
        .build(ConnectionManager::<PgConnection>::new(url))
        .expect("build test pool");
    db_pool
        .get()
        .expect("check out test connection")
        .begin_test_transaction()
        .expect("begin test transaction");
    ServiceState { db_pool }
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
    skills: Vec<Skill>,
    user_skills: Vec<UserSkill>,
    next_seq: i64,
}

impl Tables {
    fn insert_notification(&mut self, new: NewNotification) -> Notification {
        self.next_seq += 1;
        let notification = Notification {
            id: new.id,
            seq: self.next_seq,
            recipient_id: new.recipient_id,
            actor_id: new.actor_id,
            post_id: new.post_id,
            comment_id: new.comment_id,
            created_at: new.created_at,
            is_read: false,
        };
        self.notifications.push(notification.clone());
        notification
    }

    fn view(&self, n: &Notification) -> NotificationView {
        let actor = n.actor_id.and_then(|id| self.users.get(&id)).map(|u| UserSummary {
            id: u.id,
            username: u.username.clone(),
        });
        let post = n.post_id.and_then(|id| self.posts.get(&id)).map(|p| PostSummary {
            id: p.id,
            content: p.content.clone(),
        });
        let comment = n
            .comment_id
            .and_then(|id| self.comments.iter().find(|c| c.id == id))
            .map(|c| CommentSummary {
                id: c.id,
                content: c.content.clone(),
            });
        NotificationView::from((n.clone(), actor, post, comment))
    }
}

/// In-memory stand-in for [`ServiceState`].
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_storage: Mutex<bool>,
}

impl MemoryStore {
    /// Makes every later notification call fail like a lost database.
    pub fn break_storage(&self) {
        *self.fail_storage.lock().unwrap() = true;
    }

    fn check(&self, operation: &str) -> Result<()> {
        if *self.fail_storage.lock().unwrap() {
            bail!("{operation}: connection refused");
        }
        Ok(())
    }

    pub fn notification(&self, id: Uuid) -> Option<Notification> {
        self.tables.lock().unwrap().notifications.iter().find(|n| n.id == id).cloned()
    }

    pub fn deactivate(&self, id: Uuid) {
        if let Some(user) = self.tables.lock().unwrap().users.get_mut(&id) {
            user.is_active = false;
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_active_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.lock().unwrap().users.get(&id).filter(|u| u.is_active).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<User> {
        self.tables.lock().unwrap().users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, author: Uuid, content: String) -> Result<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            user_id: author,
            content,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().posts.insert(post.id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn list_for_recipient(&self, recipient: Uuid) -> Result<Vec<NotificationView>> {
        self.check("list notifications for recipient")?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<&Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.seq.cmp(&b.seq)));
        Ok(rows.into_iter().map(|n| tables.view(n)).collect())
    }

    async fn mark_as_read(&self, notification: Uuid, caller: Uuid) -> Result<bool> {
        self.check("mark notification as read")?;
        let mut tables = self.tables.lock().unwrap();
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == notification && n.recipient_id == caller)
        {
            Some(n) => {
                n.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        self.check("create notification")?;
        Ok(self.tables.lock().unwrap().insert_notification(notification))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, author: Uuid, post: Uuid, content: String) -> Result<Option<Comment>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(post_author) = tables.posts.get(&post).map(|p| p.user_id) else {
            return Ok(None);
        };
        let comment = Comment {
            id: Uuid::new_v4(),
            user_id: author,
            post_id: post,
            content,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        if post_author != author {
            tables.insert_notification(NewNotification::for_comment(post_author, &comment));
        }
        Ok(Some(comment))
    }

    async fn comments_for_post(&self, post: Uuid) -> Result<Vec<CommentView>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.post_id == post)
            .filter_map(|c| {
                let author = tables.users.get(&c.user_id)?;
                Some(CommentView {
                    comment: c.clone(),
                    author: UserSummary {
                        id: author.id,
                        username: author.username.clone(),
                    },
                })
            })
            .collect())
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.tables.lock().unwrap().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_comment(&self, id: Uuid, author: Uuid, content: String) -> Result<Option<Comment>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.user_id == author)
            .map(|c| {
                c.content = content;
                c.clone()
            }))
    }

    async fn delete_comment(&self, id: Uuid, author: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.comments.len();
        tables.comments.retain(|c| !(c.id == id && c.user_id == author));
        let deleted = tables.comments.len() < before;
        if deleted {
            for n in tables.notifications.iter_mut().filter(|n| n.comment_id == Some(id)) {
                n.comment_id = None;
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl SkillRepository for MemoryStore {
    async fn list_skills(&self) -> Result<Vec<Skill>> {
        let mut skills = self.tables.lock().unwrap().skills.clone();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    async fn skills_for_user(&self, user: Uuid) -> Result<Vec<Skill>> {
        let tables = self.tables.lock().unwrap();
        let mut skills: Vec<Skill> = tables
            .skills
            .iter()
            .filter(|s| tables.user_skills.contains(&UserSkill { user_id: user, skill_id: s.id }))
            .cloned()
            .collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    async fn add_skill_to_user(&self, user: Uuid, name: SkillName) -> Result<Skill> {
        let mut tables = self.tables.lock().unwrap();
        let skill = match tables.skills.iter().find(|s| s.name == name.as_str()) {
            Some(existing) => existing.clone(),
            None => {
                let skill = Skill {
                    id: tables.skills.len() as i32 + 1,
                    name: name.to_string(),
                };
                tables.skills.push(skill.clone());
                skill
            }
        };
        let link = UserSkill { user_id: user, skill_id: skill.id };
        if !tables.user_skills.contains(&link) {
            tables.user_skills.push(link);
        }
        Ok(skill)
    }

    async fn remove_skill_from_user(&self, user: Uuid, skill: i32) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.user_skills.len();
        tables.user_skills.retain(|l| !(l.user_id == user && l.skill_id == skill));
        Ok(tables.user_skills.len() < before)
    }
}

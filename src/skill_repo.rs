use axum::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use eyre::Result;
use uuid::Uuid;

use crate::models::{Skill, UserSkill};
use crate::schema::{skills, user_skills};
use crate::service::ServiceState;
use crate::skills::SkillName;

#[async_trait]
pub trait SkillRepository {
    async fn list_skills(&self) -> Result<Vec<Skill>>;
    async fn skills_for_user(&self, user: Uuid) -> Result<Vec<Skill>>;
    /// Tags `user` with the skill, creating the skill on first use. Tagging a
    /// user twice with the same skill is a no-op.
    async fn add_skill_to_user(&self, user: Uuid, name: SkillName) -> Result<Skill>;
    async fn remove_skill_from_user(&self, user: Uuid, skill: i32) -> Result<bool>;
}

#[async_trait]
impl SkillRepository for ServiceState {
    async fn list_skills(&self) -> Result<Vec<Skill>> {
        self.with_conn("list skills", |db| {
            skills::table
                .order(skills::name.asc())
                .select(Skill::as_select())
                .load(db)
        })
        .await
    }

    async fn skills_for_user(&self, user: Uuid) -> Result<Vec<Skill>> {
        self.with_conn("list skills for user", move |db| {
            user_skills::table
                .inner_join(skills::table)
                .filter(user_skills::user_id.eq(user))
                .order(skills::name.asc())
                .select(Skill::as_select())
                .load(db)
        })
        .await
    }

    async fn add_skill_to_user(&self, user: Uuid, name: SkillName) -> Result<Skill> {
        self.with_conn("add skill to user", move |db| {
            db.transaction::<_, diesel::result::Error, _>(|db| {
                // the no-op update makes RETURNING yield the existing row on conflict
                let skill = diesel::insert_into(skills::table)
                    .values(skills::name.eq(name.as_str()))
                    .on_conflict(skills::name)
                    .do_update()
                    .set(skills::name.eq(excluded(skills::name)))
                    .returning(Skill::as_returning())
                    .get_result(db)?;

                diesel::insert_into(user_skills::table)
                    .values(UserSkill { user_id: user, skill_id: skill.id })
                    .on_conflict_do_nothing()
                    .execute(db)?;
                Ok(skill)
            })
        })
        .await
    }

    async fn remove_skill_from_user(&self, user: Uuid, skill: i32) -> Result<bool> {
        self.with_conn("remove skill from user", move |db| {
            let deleted = diesel::delete(
                user_skills::table
                    .filter(user_skills::user_id.eq(user))
                    .filter(user_skills::skill_id.eq(skill)),
            )
            .execute(db)?;
            Ok(deleted > 0)
        })
        .await
    }
}

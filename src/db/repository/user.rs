//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{User, UserCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        let user = User {
            id: None,
            name: data.name,
            email: data.email,
            role: data.role,
        };
        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let Some(record_id) = parse_record_id(USER_TABLE, id) else {
            return Ok(None);
        };
        let user: Option<User> = self.base.db().select(record_id).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }
}

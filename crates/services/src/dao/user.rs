use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use workhive_db::models::{User, UserRole};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    /// `password_hash` is `None` for accounts created via Google sign-in.
    pub async fn create(
        &self,
        name: String,
        email: String,
        password_hash: Option<String>,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            name,
            email,
            password_hash,
            role: UserRole::User,
            avatar: None,
            otp: None,
            otp_expires: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn set_otp(
        &self,
        user_id: ObjectId,
        otp: &str,
        expires: DateTime,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! { "$set": { "otp": otp, "otp_expires": expires } },
            )
            .await
    }

    /// Replaces the password hash and clears OTP state in one write.
    pub async fn set_password(&self, user_id: ObjectId, password_hash: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! {
                    "$set": { "password_hash": password_hash },
                    "$unset": { "otp": "", "otp_expires": "" },
                },
            )
            .await
    }

    pub async fn update_profile(
        &self,
        user_id: ObjectId,
        name: Option<String>,
        avatar: Option<String>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = name {
            update.insert("name", name);
        }
        if let Some(avatar) = avatar {
            update.insert("avatar", avatar);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(user_id, doc! { "$set": update })
            .await
    }
}

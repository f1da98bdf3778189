use mongodb::bson::{doc, oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

use common::{
    access_rules::{AccessRules, Edit, Read},
    context::Context,
    entities::{
        role::Role,
        user::{PublicUser, User},
    },
    error::{self, AddCode},
};

use super::auth::{generate_salt, hash_password};

pub struct UserService {
    context: Context,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserChange {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
    is_active: Option<bool>,
}

impl UserService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<Option<PublicUser>> {
        let auth = self.context.auth();

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users.find("id", &Bson::ObjectId(id)).await? else {
            return Ok(None);
        };

        if !Read.get_access(&auth, &user) {
            return Err(anyhow::anyhow!("Not available to read this user").code(403));
        }

        Ok(Some(user.into()))
    }

    pub async fn my_user(&self) -> error::Result<Option<PublicUser>> {
        let auth = self.context.auth();

        let Some(id) = auth.id() else {
            return Err(anyhow::anyhow!("Authentication required").code(401));
        };

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users.find("id", &Bson::ObjectId(*id)).await? else {
            return Ok(None);
        };

        Ok(Some(user.into()))
    }

    pub async fn list(&self, page: u32, limit: u32) -> error::Result<Vec<PublicUser>> {
        let auth = self.context.auth();

        if auth.id().is_none() && !auth.full_access() {
            return Err(anyhow::anyhow!("Authentication required").code(401));
        }

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let limit = limit.min(100);
        let users = users.find_all(page.saturating_sub(1) * limit, limit).await?;

        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn change(&self, id: ObjectId, change: UserChange) -> error::Result<PublicUser> {
        let auth = self.context.auth();

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(mut user) = users.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("No user found").code(404));
        };

        if !Edit.get_access(&auth, &user) {
            return Err(anyhow::anyhow!("Not available to change this user").code(403));
        }

        if (change.role.is_some() || change.is_active.is_some()) && !auth.full_access() {
            return Err(anyhow::anyhow!("Only an admin can change roles or deactivate").code(403));
        }

        if let Some(email) = change.email {
            if email != user.email
                && users
                    .find("email", &Bson::String(email.clone()))
                    .await?
                    .is_some()
            {
                return Err(anyhow::anyhow!("Email is already registered").code(409));
            }
            user.email = email;
        }

        if let Some(password) = change.password {
            let salt = generate_salt();
            user.password = hash_password(password, &salt);
            user.salt = salt;
        }

        if let Some(name) = change.name {
            user.name = name;
        }

        if let Some(role) = change.role {
            user.role = Role::parse(&role)?;
        }

        if let Some(is_active) = change.is_active {
            user.is_active = is_active;
        }

        users.update_one(doc! {"id": id}, &user).await?;

        Ok(user.into())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<PublicUser> {
        let auth = self.context.auth();

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users.delete("id", &id).await? else {
            return Err(anyhow::anyhow!("No user found").code(404));
        };

        if !Edit.get_access(&auth, &user) {
            users.insert(&user).await?;
            return Err(anyhow::anyhow!("Not available to delete this user").code(403));
        }

        Ok(user.into())
    }
}

use chrono::Utc;
use lazy_static::lazy_static;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use common::{
    auth::Auth,
    context::Context,
    default_timestamp,
    entities::{
        role::Role,
        user::{PublicUser, User},
    },
    error::{self, AddCode},
};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

const MAX_FAILED_LOGINS: u32 = 5;
const LOCK_DURATION_SECONDS: i64 = 15 * 60;
const MIN_PASSWORD_LENGTH: usize = 8;

pub struct AuthService {
    context: Context,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

pub fn hash_password(mut password: String, salt: &str) -> String {
    password.push_str(salt);
    sha256::digest(password)
}

pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

impl AuthService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    fn request_access(auth_password: &str, user: &User<ObjectId>) -> bool {
        hash_password(auth_password.to_string(), &user.salt) == user.password
    }

    pub async fn register(&self, user: CreateUser) -> error::Result<PublicUser> {
        let auth = self.context.auth();
        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        if !EMAIL.is_match(&user.email) {
            return Err(anyhow::anyhow!("Invalid email address").code(400));
        }

        if user.password.len() < MIN_PASSWORD_LENGTH {
            return Err(anyhow::anyhow!("Password must be at least 8 characters").code(400));
        }

        let role = Role::parse(&user.role)?;
        if role == Role::Admin && !auth.full_access() {
            return Err(anyhow::anyhow!("Only an admin can create admin accounts").code(403));
        }

        if users
            .find("email", &Bson::String(user.email.clone()))
            .await?
            .is_some()
        {
            return Err(anyhow::anyhow!("Email is already registered").code(409));
        }

        let salt = generate_salt();
        let password = hash_password(user.password, &salt);

        let user = User {
            id: ObjectId::new(),
            name: user.name,
            email: user.email,
            password,
            salt,
            role,
            is_active: true,
            failed_attempts: 0,
            locked_until: None,
            created_at: Utc::now().timestamp(),
            last_modified: default_timestamp(),
        };

        users.insert(&user).await?;

        Ok(user.into())
    }

    pub async fn login(&self, login: &Login) -> error::Result<Token> {
        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(mut user) = users
            .find("email", &Bson::String(login.email.clone()))
            .await?
        else {
            return Err(anyhow::anyhow!("Invalid credentials").code(401));
        };

        let now = Utc::now().timestamp();

        if user.locked_until.map_or(false, |until| until > now) {
            return Err(anyhow::anyhow!("Account is temporarily locked").code(423));
        }

        if !Self::request_access(&login.password, &user) {
            user.failed_attempts += 1;
            if user.failed_attempts >= MAX_FAILED_LOGINS {
                user.locked_until = Some(now + LOCK_DURATION_SECONDS);
                user.failed_attempts = 0;
            }
            users.update_one(doc! {"id": user.id}, &user).await?;
            return Err(anyhow::anyhow!("Invalid credentials").code(401));
        }

        if !user.is_active {
            return Err(anyhow::anyhow!("Account is deactivated").code(401));
        }

        if user.failed_attempts > 0 || user.locked_until.is_some() {
            user.failed_attempts = 0;
            user.locked_until = None;
            users.update_one(doc! {"id": user.id}, &user).await?;
        }

        let auth = match user.role {
            Role::Admin => Auth::Admin(user.id),
            role => Auth::User(user.id, role),
        };

        Ok(Token {
            token: auth.to_token()?,
            user: user.into(),
        })
    }
}

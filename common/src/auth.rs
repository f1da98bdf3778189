use chrono::Utc;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    entities::role::Role,
    error::{self, AddCode},
};

pub static ENCODING_KEY: Lazy<EncodingKey> = Lazy::new(|| {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    EncodingKey::from_secret(secret.as_bytes())
});

pub static DECODING_KEY: Lazy<DecodingKey> = Lazy::new(|| {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    DecodingKey::from_secret(secret.as_bytes())
});

static DURATION: Lazy<chrono::Duration> = Lazy::new(|| chrono::Duration::days(1));

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Service {
    Users,
    Issues,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Users => "users",
            Service::Issues => "issues",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Auth {
    Service(Service),
    Admin(ObjectId),
    User(ObjectId, Role),
    None,
}

impl Auth {
    pub fn id(&self) -> Option<&ObjectId> {
        match self {
            Auth::Admin(id) => Some(id),
            Auth::User(id, _) => Some(id),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Auth::Admin(_) => Some(Role::Admin),
            Auth::User(_, role) => Some(*role),
            _ => None,
        }
    }

    pub fn full_access(&self) -> bool {
        matches!(self, Auth::Service(_) | Auth::Admin(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TokenRole {
    Admin,
    User,
    Service,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    role: TokenRole,
    user_id: Option<String>,
    user_role: Option<Role>,
    service: Option<Service>,
    exp: i64,
}

impl Auth {
    /// Ok(None) means the token was well-formed but expired.
    pub fn from_token(token: &str) -> error::Result<Option<Self>> {
        let claims = match decode::<Claims>(token, &DECODING_KEY, &Validation::new(Algorithm::HS512))
        {
            Ok(data) => data.claims,
            Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => return Ok(None),
            Err(err) => return Err(anyhow::anyhow!("Invalid token: {}", err).code(401)),
        };

        let auth = match claims.role {
            TokenRole::Admin => {
                let id = claims
                    .user_id
                    .ok_or_else(|| anyhow::anyhow!("Token has no user id").code(401))?
                    .parse()?;
                Auth::Admin(id)
            }
            TokenRole::User => {
                let id = claims
                    .user_id
                    .ok_or_else(|| anyhow::anyhow!("Token has no user id").code(401))?
                    .parse()?;
                let role = claims
                    .user_role
                    .ok_or_else(|| anyhow::anyhow!("Token has no role").code(401))?;
                Auth::User(id, role)
            }
            TokenRole::Service => {
                let service = claims
                    .service
                    .ok_or_else(|| anyhow::anyhow!("Token has no service name").code(401))?;
                Auth::Service(service)
            }
        };

        Ok(Some(auth))
    }

    pub fn to_token(&self) -> error::Result<String> {
        let header = Header {
            alg: Algorithm::HS512,
            ..Default::default()
        };
        let exp = Utc::now().timestamp() + DURATION.num_seconds();
        let claims = match self {
            Auth::Service(service) => Claims {
                role: TokenRole::Service,
                user_id: None,
                user_role: None,
                service: Some(*service),
                exp,
            },
            Auth::Admin(id) => Claims {
                role: TokenRole::Admin,
                user_id: Some(id.to_hex()),
                user_role: None,
                service: None,
                exp,
            },
            Auth::User(id, role) => Claims {
                role: TokenRole::User,
                user_id: Some(id.to_hex()),
                user_role: Some(*role),
                service: None,
                exp,
            },
            Auth::None => {
                return Err(anyhow::anyhow!("Cannot create token for Auth::None").code(500))
            }
        };

        match jsonwebtoken::encode(&header, &claims, &ENCODING_KEY) {
            Ok(token) => Ok(token),
            Err(_) => Err(anyhow::anyhow!("Failed to encode token").code(500)),
        }
    }
}

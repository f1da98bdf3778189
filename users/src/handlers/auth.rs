use actix_web::{
    post,
    web::{self, Json},
};
use common::{context::Context, entities::user::PublicUser, error};

use crate::service::auth::{AuthService, CreateUser, Login, Token};

#[post("/api/auth/login")]
pub async fn login(context: Context, login: Json<Login>) -> error::Result<Json<Token>> {
    Ok(Json(AuthService::new(context).login(&login).await?))
}

#[post("/api/user")]
pub async fn post_user(
    context: Context,
    Json(user): web::Json<CreateUser>,
) -> error::Result<Json<PublicUser>> {
    Ok(Json(AuthService::new(context).register(user).await?))
}

use actix_web::{
    delete, get, patch,
    web::{self, Json},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use common::{context::Context, entities::user::PublicUser, error};

use crate::service::user::{UserChange, UserService};

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUsersResponse {
    pub data: Vec<PublicUser>,
    pub page: u32,
    pub limit: u32,
}

#[get("/api/my_user")]
pub async fn my_user(context: Context) -> error::Result<HttpResponse> {
    let res = UserService::new(context).my_user().await?;
    if let Some(res) = res {
        Ok(HttpResponse::Ok().json(res))
    } else {
        Ok(HttpResponse::Ok().json(json! {{}}))
    }
}

#[get("/api/user/{id}")]
pub async fn get_user(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let res = UserService::new(context).find(id.parse()?).await?;
    if let Some(res) = res {
        Ok(HttpResponse::Ok().json(res))
    } else {
        Ok(HttpResponse::Ok().json(json! {{}}))
    }
}

#[get("/api/users")]
pub async fn get_users(
    context: Context,
    pagination: web::Query<Pagination>,
) -> error::Result<Json<GetUsersResponse>> {
    let data = UserService::new(context)
        .list(pagination.page, pagination.limit)
        .await?;

    Ok(Json(GetUsersResponse {
        data,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

#[patch("/api/user/{id}")]
pub async fn patch_user(
    context: Context,
    id: web::Path<String>,
    Json(change): Json<UserChange>,
) -> error::Result<Json<PublicUser>> {
    Ok(Json(
        UserService::new(context).change(id.parse()?, change).await?,
    ))
}

#[delete("/api/user/{id}")]
pub async fn delete_user(
    context: Context,
    id: web::Path<String>,
) -> error::Result<Json<PublicUser>> {
    Ok(Json(UserService::new(context).delete(id.parse()?).await?))
}

#[cfg(test)]
mod test {
    use actix_web::test::{self, init_service};

    use crate::{
        create_test_app,
        service::auth::{CreateUser, Login, Token},
    };

    fn setup() {
        std::env::set_var("JWT_SECRET", "test-secret");
    }

    #[actix_web::test]
    async fn test_post_user() {
        setup();
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/user")
            .set_json(&CreateUser {
                name: "test".to_string(),
                email: "test@example.com".to_string(),
                password: "secretpassword".to_string(),
                role: "developer".to_string(),
            })
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_post_user_with_existing_email() {
        setup();
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/user")
            .set_json(&CreateUser {
                name: "test".to_string(),
                email: "test@example.com".to_string(),
                password: "secretpassword".to_string(),
                role: "developer".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri("/api/user")
            .set_json(&CreateUser {
                name: "other".to_string(),
                email: "test@example.com".to_string(),
                password: "secretpassword".to_string(),
                role: "developer".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 409);
    }

    #[actix_web::test]
    async fn test_developer_cannot_register_as_admin() {
        setup();
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/user")
            .set_json(&CreateUser {
                name: "sneaky".to_string(),
                email: "sneaky@example.com".to_string(),
                password: "secretpassword".to_string(),
                role: "admin".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 403);
    }

    #[actix_web::test]
    async fn test_login_and_delete_user() {
        setup();
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/user")
            .set_json(&CreateUser {
                name: "test".to_string(),
                email: "test@example.com".to_string(),
                password: "secretpassword".to_string(),
                role: "developer".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&Login {
                email: "test@example.com".to_string(),
                password: "secretpassword".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let token: Token = serde_json::from_slice(&body).unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/user/{}", token.user.id))
            .insert_header(("Authorization", format!("Bearer {}", token.token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_login_with_wrong_password() {
        setup();
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/user")
            .set_json(&CreateUser {
                name: "test".to_string(),
                email: "test@example.com".to_string(),
                password: "secretpassword".to_string(),
                role: "developer".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&Login {
                email: "test@example.com".to_string(),
                password: "wrongpassword".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 401);
    }

    #[actix_web::test]
    async fn test_account_locks_after_repeated_failures() {
        setup();
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/user")
            .set_json(&CreateUser {
                name: "test".to_string(),
                email: "test@example.com".to_string(),
                password: "secretpassword".to_string(),
                role: "developer".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        for _ in 0..5 {
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(&Login {
                    email: "test@example.com".to_string(),
                    password: "wrongpassword".to_string(),
                })
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status().as_u16(), 401);
        }

        // The right password no longer helps while the lock holds.
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&Login {
                email: "test@example.com".to_string(),
                password: "secretpassword".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 423);
    }
}

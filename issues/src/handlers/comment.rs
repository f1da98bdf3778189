use actix_web::{
    get, patch, post,
    web::{self, Json},
};

use common::{context::Context, entities::comment::PublicComment, error};

use crate::service::comment::{CommentChange, CommentService, CreateCommentRequest};

#[post("/api/issue/{id}/comment")]
pub async fn post_comment(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<CreateCommentRequest>,
) -> error::Result<Json<PublicComment>> {
    Ok(Json(
        CommentService::new(context).create(id.parse()?, data).await?,
    ))
}

#[get("/api/issue/{id}/comments")]
pub async fn get_issue_comments(
    context: Context,
    id: web::Path<String>,
) -> error::Result<Json<Vec<PublicComment>>> {
    Ok(Json(CommentService::new(context).list(id.parse()?).await?))
}

#[patch("/api/comment/{id}")]
pub async fn patch_comment(
    context: Context,
    id: web::Path<String>,
    Json(data): Json<CommentChange>,
) -> error::Result<Json<PublicComment>> {
    Ok(Json(
        CommentService::new(context).change(id.parse()?, data).await?,
    ))
}

#[cfg(test)]
mod test {
    use actix_web::test::{self, init_service};
    use mongodb::bson::oid::ObjectId;

    use common::{
        auth::Auth,
        entities::{
            comment::PublicComment,
            issue::{Priority, PublicIssue},
            role::Role,
        },
    };

    use crate::{
        create_test_app,
        service::{
            comment::{CommentChange, CreateCommentRequest},
            issue::CreateIssueRequest,
            project::CreateProjectRequest,
        },
    };

    fn setup() -> (String, String) {
        std::env::set_var("JWT_SECRET", "test-secret");
        let manager = Auth::User(ObjectId::new(), Role::Manager).to_token().unwrap();
        let developer = Auth::User(ObjectId::new(), Role::Developer)
            .to_token()
            .unwrap();
        (manager, developer)
    }

    macro_rules! create_issue {
        ($app:expr, $manager:expr, $developer:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/project")
                .insert_header(("Authorization", format!("Bearer {}", $manager)))
                .set_json(&CreateProjectRequest {
                    name: "backend".to_string(),
                    description: String::new(),
                })
                .to_request();
            let resp = test::call_service($app, req).await;
            let body = test::read_body(resp).await;
            let project: serde_json::Value = serde_json::from_slice(&body).unwrap();
            let project_id = project["id"].as_str().unwrap().to_string();

            let req = test::TestRequest::post()
                .uri(&format!("/api/project/{}/issue", project_id))
                .insert_header(("Authorization", format!("Bearer {}", $developer)))
                .set_json(&CreateIssueRequest {
                    title: "broken login".to_string(),
                    description: String::new(),
                    priority: Priority::Medium,
                    assignee: None,
                    due_date: None,
                })
                .to_request();
            let resp = test::call_service($app, req).await;
            let body = test::read_body(resp).await;
            let issue: PublicIssue = serde_json::from_slice(&body).unwrap();
            issue
        }};
    }

    #[actix_web::test]
    async fn test_comment_round_trip() {
        let (manager, developer) = setup();
        let app = init_service(create_test_app()).await;
        let issue = create_issue!(&app, &manager, &developer);

        let req = test::TestRequest::post()
            .uri(&format!("/api/issue/{}/comment", issue.id))
            .insert_header(("Authorization", format!("Bearer {}", developer)))
            .set_json(&CreateCommentRequest {
                content: "reproduced on staging".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get()
            .uri(&format!("/api/issue/{}/comments", issue.id))
            .insert_header(("Authorization", format!("Bearer {}", developer)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        let comments: Vec<PublicComment> = serde_json::from_slice(&body).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "reproduced on staging");
    }

    #[actix_web::test]
    async fn test_only_the_author_can_edit_a_comment() {
        let (manager, developer) = setup();
        let other = Auth::User(ObjectId::new(), Role::Developer)
            .to_token()
            .unwrap();
        let app = init_service(create_test_app()).await;
        let issue = create_issue!(&app, &manager, &developer);

        let req = test::TestRequest::post()
            .uri(&format!("/api/issue/{}/comment", issue.id))
            .insert_header(("Authorization", format!("Bearer {}", developer)))
            .set_json(&CreateCommentRequest {
                content: "initial note".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = test::read_body(resp).await;
        let comment: PublicComment = serde_json::from_slice(&body).unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/comment/{}", comment.id))
            .insert_header(("Authorization", format!("Bearer {}", other)))
            .set_json(&CommentChange {
                content: "hijacked".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 403);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/comment/{}", comment.id))
            .insert_header(("Authorization", format!("Bearer {}", developer)))
            .set_json(&CommentChange {
                content: "updated note".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_oversized_comment_is_rejected() {
        let (manager, developer) = setup();
        let app = init_service(create_test_app()).await;
        let issue = create_issue!(&app, &manager, &developer);

        let req = test::TestRequest::post()
            .uri(&format!("/api/issue/{}/comment", issue.id))
            .insert_header(("Authorization", format!("Bearer {}", developer)))
            .set_json(&CreateCommentRequest {
                content: "x".repeat(2001),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }
}

use actix_web::{
    get, patch, post,
    web::{self, Json},
    HttpResponse,
};
use serde_json::json;

use common::{context::Context, entities::issue::PublicIssue, error};

use crate::service::issue::{
    CreateIssueRequest, GetIssuesQuery, GetIssuesResponse, IssueChange, IssueService,
};

#[post("/api/project/{id}/issue")]
pub async fn post_issue(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<CreateIssueRequest>,
) -> error::Result<Json<PublicIssue>> {
    Ok(Json(
        IssueService::new(context).create(id.parse()?, data).await?,
    ))
}

#[get("/api/issue/{id}")]
pub async fn get_issue(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let res = IssueService::new(context).find(id.parse()?).await?;
    if let Some(res) = res {
        Ok(HttpResponse::Ok().json(res))
    } else {
        Ok(HttpResponse::Ok().json(json! {{}}))
    }
}

#[get("/api/project/{id}/issues")]
pub async fn get_project_issues(
    context: Context,
    id: web::Path<String>,
    query: web::Query<GetIssuesQuery>,
) -> error::Result<Json<GetIssuesResponse>> {
    Ok(Json(
        IssueService::new(context)
            .list(id.parse()?, query.into_inner())
            .await?,
    ))
}

#[patch("/api/issue/{id}")]
pub async fn patch_issue(
    context: Context,
    id: web::Path<String>,
    Json(data): Json<IssueChange>,
) -> error::Result<Json<PublicIssue>> {
    Ok(Json(
        IssueService::new(context).change(id.parse()?, data).await?,
    ))
}

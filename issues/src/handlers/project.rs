use actix_web::{
    delete, get, patch, post,
    web::{self, Json},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use common::{context::Context, entities::project::PublicProject, error};

use crate::service::project::{CreateProjectRequest, ProjectChange, ProjectService};

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProjectsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetProjectsResponse {
    pub data: Vec<PublicProject>,
    pub page: u32,
    pub limit: u32,
}

#[post("/api/project")]
pub async fn post_project(
    context: Context,
    Json(data): web::Json<CreateProjectRequest>,
) -> error::Result<Json<PublicProject>> {
    Ok(Json(ProjectService::new(context).create(data).await?))
}

#[get("/api/project/{id}")]
pub async fn get_project(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let res = ProjectService::new(context).find(id.parse()?).await?;
    if let Some(res) = res {
        Ok(HttpResponse::Ok().json(res))
    } else {
        Ok(HttpResponse::Ok().json(json! {{}}))
    }
}

#[get("/api/projects")]
pub async fn get_projects(
    context: Context,
    query: web::Query<GetProjectsQuery>,
) -> error::Result<Json<GetProjectsResponse>> {
    let data = ProjectService::new(context)
        .list(query.page, query.limit, query.include_archived)
        .await?;

    Ok(Json(GetProjectsResponse {
        data,
        page: query.page,
        limit: query.limit,
    }))
}

#[patch("/api/project/{id}")]
pub async fn patch_project(
    context: Context,
    id: web::Path<String>,
    Json(data): Json<ProjectChange>,
) -> error::Result<Json<PublicProject>> {
    Ok(Json(
        ProjectService::new(context).change(id.parse()?, data).await?,
    ))
}

#[delete("/api/project/{id}")]
pub async fn delete_project(
    context: Context,
    id: web::Path<String>,
) -> error::Result<Json<PublicProject>> {
    Ok(Json(ProjectService::new(context).archive(id.parse()?).await?))
}

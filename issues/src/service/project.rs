use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

use common::{
    access_rules::{AccessRules, Archive, CreateProject, Edit, Read},
    context::Context,
    default_timestamp,
    entities::project::{Project, PublicProject},
    error::{self, AddCode},
};

const MAX_NAME_LENGTH: usize = 100;

pub struct ProjectService {
    context: Context,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ProjectChange {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_archived: Option<bool>,
}

impl ProjectService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn create(&self, request: CreateProjectRequest) -> error::Result<PublicProject> {
        let auth = self.context.auth();
        let projects = self.context.try_get_repository::<Project<ObjectId>>()?;

        if !CreateProject.get_access(&auth, ()) {
            return Err(anyhow::anyhow!("Not available to create projects").code(403));
        }

        if request.name.is_empty() || request.name.len() > MAX_NAME_LENGTH {
            return Err(anyhow::anyhow!("Project name must be 1 to 100 characters").code(400));
        }

        if projects
            .find("name", &Bson::String(request.name.clone()))
            .await?
            .is_some()
        {
            return Err(anyhow::anyhow!("Project name is already taken").code(409));
        }

        let Some(created_by) = auth.id() else {
            return Err(anyhow::anyhow!("Authentication required").code(401));
        };

        let project = Project {
            id: ObjectId::new(),
            name: request.name,
            description: request.description,
            created_by: *created_by,
            is_archived: false,
            created_at: Utc::now().timestamp(),
            last_modified: default_timestamp(),
        };

        projects.insert(&project).await?;

        Ok(project.into())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<Option<PublicProject>> {
        let auth = self.context.auth();
        let projects = self.context.try_get_repository::<Project<ObjectId>>()?;

        let Some(project) = projects.find("id", &Bson::ObjectId(id)).await? else {
            return Ok(None);
        };

        if !Read.get_access(&auth, &project) {
            return Err(anyhow::anyhow!("Not available to read this project").code(403));
        }

        Ok(Some(project.into()))
    }

    pub async fn list(
        &self,
        page: u32,
        limit: u32,
        include_archived: bool,
    ) -> error::Result<Vec<PublicProject>> {
        let auth = self.context.auth();

        if auth.id().is_none() && !auth.full_access() {
            return Err(anyhow::anyhow!("Authentication required").code(401));
        }

        let projects = self.context.try_get_repository::<Project<ObjectId>>()?;

        let limit = limit.min(100);
        let skip = page.saturating_sub(1) * limit;

        let projects = if include_archived {
            projects.find_all(skip, limit).await?
        } else {
            projects
                .find_many_limit("is_archived", &Bson::Boolean(false), skip, limit)
                .await?
                .0
        };

        Ok(projects.into_iter().map(PublicProject::from).collect())
    }

    pub async fn change(&self, id: ObjectId, change: ProjectChange) -> error::Result<PublicProject> {
        let auth = self.context.auth();
        let projects = self.context.try_get_repository::<Project<ObjectId>>()?;

        let Some(mut project) = projects.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("No project found").code(404));
        };

        if !Edit.get_access(&auth, &project) {
            return Err(anyhow::anyhow!("Not available to change this project").code(403));
        }

        if change.is_archived.is_some() && !Archive.get_access(&auth, &project) {
            return Err(anyhow::anyhow!("Not available to archive this project").code(403));
        }

        if let Some(name) = change.name {
            if name.is_empty() || name.len() > MAX_NAME_LENGTH {
                return Err(anyhow::anyhow!("Project name must be 1 to 100 characters").code(400));
            }
            if name != project.name
                && projects
                    .find("name", &Bson::String(name.clone()))
                    .await?
                    .is_some()
            {
                return Err(anyhow::anyhow!("Project name is already taken").code(409));
            }
            project.name = name;
        }

        if let Some(description) = change.description {
            project.description = description;
        }

        if let Some(is_archived) = change.is_archived {
            project.is_archived = is_archived;
        }

        projects.update_one(doc! {"id": id}, &project).await?;

        Ok(project.into())
    }

    pub async fn archive(&self, id: ObjectId) -> error::Result<PublicProject> {
        let auth = self.context.auth();
        let projects = self.context.try_get_repository::<Project<ObjectId>>()?;

        let Some(mut project) = projects.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("No project found").code(404));
        };

        if !Archive.get_access(&auth, &project) {
            return Err(anyhow::anyhow!("Not available to archive this project").code(403));
        }

        project.is_archived = true;
        projects.update_one(doc! {"id": id}, &project).await?;

        Ok(project.into())
    }
}

use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

use common::{
    access_rules::{AccessRules, ChangeAssignee, CreateIssue, Edit, Read},
    context::Context,
    default_timestamp,
    entities::{
        comment::Comment,
        issue::{Issue, IssueStatus, Priority, PublicIssue},
        project::Project,
    },
    error::{self, AddCode},
    services::{PROTOCOL, USERS_SERVICE},
};

const MAX_TITLE_LENGTH: usize = 200;

pub struct IssueService {
    context: Context,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct IssueChange {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<IssueStatus>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetIssuesQuery {
    pub status: Option<IssueStatus>,
    pub priority: Option<Priority>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetIssuesResponse {
    pub data: Vec<PublicIssue>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl IssueService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// Users live in their own service; resolving an assignee goes over
    /// the wire with the service token.
    async fn assert_user_exists(&self, id: ObjectId) -> error::Result<()> {
        let response = self
            .context
            .make_request::<()>()
            .get(format!(
                "{}://{}/api/user/{}",
                PROTOCOL.as_str(),
                USERS_SERVICE.as_str(),
                id.to_hex()
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to resolve assignee").code(502));
        }

        let user: serde_json::Value = response.json().await?;
        if user.get("id").is_none() {
            return Err(anyhow::anyhow!("Assignee does not exist").code(404));
        }

        Ok(())
    }

    pub async fn create(
        &self,
        project_id: ObjectId,
        request: CreateIssueRequest,
    ) -> error::Result<PublicIssue> {
        let auth = self.context.auth();
        let projects = self.context.try_get_repository::<Project<ObjectId>>()?;
        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;

        let project = projects.find("id", &Bson::ObjectId(project_id)).await?;
        let Some(project) = project.filter(|project| !project.is_archived) else {
            return Err(anyhow::anyhow!("No project found").code(404));
        };

        if !CreateIssue.get_access(&auth, &project) {
            return Err(anyhow::anyhow!("Not available to create issues").code(403));
        }

        if request.title.is_empty() || request.title.len() > MAX_TITLE_LENGTH {
            return Err(anyhow::anyhow!("Issue title must be 1 to 200 characters").code(400));
        }

        let Some(reporter) = auth.id() else {
            return Err(anyhow::anyhow!("Authentication required").code(401));
        };

        let assignee = match request.assignee {
            Some(id) => {
                let id: ObjectId = id.parse()?;
                self.assert_user_exists(id).await?;
                Some(id)
            }
            None => None,
        };

        let issue = Issue {
            id: ObjectId::new(),
            project_id: project.id,
            title: request.title,
            description: request.description,
            status: IssueStatus::Open,
            priority: request.priority,
            reporter: *reporter,
            assignee,
            due_date: request.due_date,
            created_at: Utc::now().timestamp(),
            last_modified: default_timestamp(),
        };

        issues.insert(&issue).await?;

        Ok(issue.into())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<Option<PublicIssue>> {
        let auth = self.context.auth();
        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;

        let Some(issue) = issues.find("id", &Bson::ObjectId(id)).await? else {
            return Ok(None);
        };

        if !Read.get_access(&auth, &issue) {
            return Err(anyhow::anyhow!("Not available to read this issue").code(403));
        }

        Ok(Some(issue.into()))
    }

    pub async fn list(
        &self,
        project_id: ObjectId,
        query: GetIssuesQuery,
    ) -> error::Result<GetIssuesResponse> {
        let auth = self.context.auth();

        if auth.id().is_none() && !auth.full_access() {
            return Err(anyhow::anyhow!("Authentication required").code(401));
        }

        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;

        let matching: Vec<Issue<ObjectId>> = issues
            .find_many("project_id", &Bson::ObjectId(project_id))
            .await?
            .into_iter()
            .filter(|issue| query.status.map_or(true, |status| issue.status == status))
            .filter(|issue| {
                query
                    .priority
                    .map_or(true, |priority| issue.priority == priority)
            })
            .collect();

        let total = matching.len() as u64;
        let limit = query.limit.min(100);
        let skip = query.page.saturating_sub(1) * limit;

        let data = matching
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(PublicIssue::from)
            .collect();

        Ok(GetIssuesResponse {
            data,
            total,
            page: query.page,
            limit,
        })
    }

    pub async fn change(&self, id: ObjectId, change: IssueChange) -> error::Result<PublicIssue> {
        let auth = self.context.auth();
        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;
        let comments = self.context.try_get_repository::<Comment<ObjectId>>()?;

        let Some(mut issue) = issues.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("No issue found").code(404));
        };

        if !Edit.get_access(&auth, &issue) {
            return Err(anyhow::anyhow!("Not available to change this issue").code(403));
        }

        // The transition is validated against the snapshot before any
        // field is applied; the priority used is the stored one.
        if let Some(requested) = change.status {
            let has_comment = !comments
                .find_many("issue_id", &Bson::ObjectId(issue.id))
                .await?
                .is_empty();

            issue.status = issue
                .status
                .transition(requested, issue.priority, has_comment)
                .map_err(|err| anyhow::anyhow!(err).code(400))?;
        }

        if let Some(title) = change.title {
            if title.is_empty() || title.len() > MAX_TITLE_LENGTH {
                return Err(anyhow::anyhow!("Issue title must be 1 to 200 characters").code(400));
            }
            issue.title = title;
        }

        if let Some(description) = change.description {
            issue.description = description;
        }

        if let Some(priority) = change.priority {
            issue.priority = priority;
        }

        if let Some(due_date) = change.due_date {
            issue.due_date = Some(due_date);
        }

        if let Some(assignee) = change.assignee {
            let assignee: ObjectId = assignee.parse()?;
            if issue.assignee != Some(assignee) {
                if !ChangeAssignee.get_access(&auth, &issue) {
                    return Err(anyhow::anyhow!("Not available to change the assignee").code(403));
                }
                self.assert_user_exists(assignee).await?;
                issue.assignee = Some(assignee);
            }
        }

        issues.update_one(doc! {"id": id}, &issue).await?;

        Ok(issue.into())
    }
}

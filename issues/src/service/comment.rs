use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

use common::{
    access_rules::{AccessRules, CreateComment, Edit},
    context::Context,
    default_timestamp,
    entities::{
        comment::{Comment, PublicComment},
        issue::Issue,
    },
    error::{self, AddCode},
};

const MAX_CONTENT_LENGTH: usize = 2000;

pub struct CommentService {
    context: Context,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentChange {
    pub content: String,
}

impl CommentService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    fn validate_content(content: &str) -> error::Result<()> {
        if content.is_empty() || content.len() > MAX_CONTENT_LENGTH {
            return Err(anyhow::anyhow!("Comment content must be 1 to 2000 characters").code(400));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        issue_id: ObjectId,
        request: CreateCommentRequest,
    ) -> error::Result<PublicComment> {
        let auth = self.context.auth();
        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;
        let comments = self.context.try_get_repository::<Comment<ObjectId>>()?;

        let Some(issue) = issues.find("id", &Bson::ObjectId(issue_id)).await? else {
            return Err(anyhow::anyhow!("No issue found").code(404));
        };

        if !CreateComment.get_access(&auth, &issue) {
            return Err(anyhow::anyhow!("Not available to comment on this issue").code(403));
        }

        Self::validate_content(&request.content)?;

        let Some(author) = auth.id() else {
            return Err(anyhow::anyhow!("Authentication required").code(401));
        };

        let comment = Comment {
            id: ObjectId::new(),
            issue_id: issue.id,
            author: *author,
            content: request.content,
            created_at: Utc::now().timestamp(),
            last_modified: default_timestamp(),
        };

        comments.insert(&comment).await?;

        Ok(comment.into())
    }

    pub async fn list(&self, issue_id: ObjectId) -> error::Result<Vec<PublicComment>> {
        let auth = self.context.auth();

        if auth.id().is_none() && !auth.full_access() {
            return Err(anyhow::anyhow!("Authentication required").code(401));
        }

        let comments = self.context.try_get_repository::<Comment<ObjectId>>()?;

        let mut comments = comments
            .find_many("issue_id", &Bson::ObjectId(issue_id))
            .await?;

        comments.sort_by_key(|comment| comment.created_at);

        Ok(comments.into_iter().map(PublicComment::from).collect())
    }

    pub async fn change(&self, id: ObjectId, change: CommentChange) -> error::Result<PublicComment> {
        let auth = self.context.auth();
        let comments = self.context.try_get_repository::<Comment<ObjectId>>()?;

        let Some(mut comment) = comments.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("No comment found").code(404));
        };

        if !Edit.get_access(&auth, &comment) {
            return Err(anyhow::anyhow!("Not available to change this comment").code(403));
        }

        Self::validate_content(&change.content)?;
        comment.content = change.content;

        comments.update_one(doc! {"id": id}, &comment).await?;

        Ok(comment.into())
    }
}

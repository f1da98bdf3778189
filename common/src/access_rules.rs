use mongodb::bson::oid::ObjectId;

use crate::{
    auth::Auth,
    entities::{comment::Comment, issue::Issue, project::Project, role::Role, user::User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Owner,
    Reporter,
    Assignee,
    Author,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewProject,
    CreateProject,
    EditProject,
    ArchiveProject,
    ViewIssue,
    CreateIssue,
    EditIssue,
    ChangeAssignee,
    AddComment,
    EditComment,
}

/// The permission matrix. One rule chain, first match wins:
/// unauthenticated callers get nothing, admins and managers get
/// everything, developers get the authentication-only actions plus
/// whatever their relationship to the resource grants.
pub fn can(role: Option<Role>, relations: &[Relation], action: Action) -> bool {
    let Some(role) = role else {
        return false;
    };

    match role {
        Role::Admin | Role::Manager => return true,
        Role::Developer => {}
    }

    match action {
        Action::ViewProject | Action::ViewIssue | Action::CreateIssue | Action::AddComment => true,
        Action::CreateProject
        | Action::EditProject
        | Action::ArchiveProject
        | Action::ChangeAssignee => false,
        Action::EditIssue => {
            relations.contains(&Relation::Reporter) || relations.contains(&Relation::Assignee)
        }
        Action::EditComment => relations.contains(&Relation::Author),
    }
}

pub trait AccessRules<Object, Subject> {
    fn get_access(&self, object: Object, subject: Subject) -> bool;
}

pub struct Read;

pub struct Edit;

pub struct Archive;

pub struct ChangeAssignee;

pub struct CreateProject;

pub struct CreateIssue;

pub struct CreateComment;

impl<'a, 'b> AccessRules<&'a Auth, &'b User<ObjectId>> for Read {
    fn get_access(&self, auth: &'a Auth, _user: &'b User<ObjectId>) -> bool {
        !matches!(auth, Auth::None)
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b User<ObjectId>> for Edit {
    fn get_access(&self, auth: &'a Auth, user: &'b User<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) | Auth::Admin(_) => true,
            Auth::User(id, _) => id == &user.id,
            Auth::None => false,
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Project<ObjectId>> for Read {
    fn get_access(&self, auth: &'a Auth, project: &'b Project<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &project.relations(auth), Action::ViewProject),
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Project<ObjectId>> for Edit {
    fn get_access(&self, auth: &'a Auth, project: &'b Project<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &project.relations(auth), Action::EditProject),
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Project<ObjectId>> for Archive {
    fn get_access(&self, auth: &'a Auth, project: &'b Project<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &project.relations(auth), Action::ArchiveProject),
        }
    }
}

impl<'a> AccessRules<&'a Auth, ()> for CreateProject {
    fn get_access(&self, auth: &'a Auth, _: ()) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &[], Action::CreateProject),
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Project<ObjectId>> for CreateIssue {
    fn get_access(&self, auth: &'a Auth, project: &'b Project<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &project.relations(auth), Action::CreateIssue),
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Issue<ObjectId>> for Read {
    fn get_access(&self, auth: &'a Auth, issue: &'b Issue<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &issue.relations(auth), Action::ViewIssue),
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Issue<ObjectId>> for Edit {
    fn get_access(&self, auth: &'a Auth, issue: &'b Issue<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &issue.relations(auth), Action::EditIssue),
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Issue<ObjectId>> for ChangeAssignee {
    fn get_access(&self, auth: &'a Auth, issue: &'b Issue<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &issue.relations(auth), Action::ChangeAssignee),
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Issue<ObjectId>> for CreateComment {
    fn get_access(&self, auth: &'a Auth, issue: &'b Issue<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &issue.relations(auth), Action::AddComment),
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Comment<ObjectId>> for Read {
    fn get_access(&self, auth: &'a Auth, _comment: &'b Comment<ObjectId>) -> bool {
        !matches!(auth, Auth::None)
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Comment<ObjectId>> for Edit {
    fn get_access(&self, auth: &'a Auth, comment: &'b Comment<ObjectId>) -> bool {
        match auth {
            Auth::Service(_) => true,
            _ => can(auth.role(), &comment.relations(auth), Action::EditComment),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ACTIONS: [Action; 10] = [
        Action::ViewProject,
        Action::CreateProject,
        Action::EditProject,
        Action::ArchiveProject,
        Action::ViewIssue,
        Action::CreateIssue,
        Action::EditIssue,
        Action::ChangeAssignee,
        Action::AddComment,
        Action::EditComment,
    ];

    const RELATION_SETS: [&[Relation]; 5] = [
        &[],
        &[Relation::Owner],
        &[Relation::Reporter],
        &[Relation::Assignee],
        &[Relation::Author],
    ];

    #[test]
    fn admin_is_allowed_everything() {
        for action in ACTIONS {
            for relations in RELATION_SETS {
                assert!(can(Some(Role::Admin), relations, action));
            }
        }
    }

    #[test]
    fn manager_is_allowed_everything_in_the_matrix() {
        for action in ACTIONS {
            assert!(can(Some(Role::Manager), &[], action));
        }
    }

    #[test]
    fn unauthenticated_caller_is_denied_everything() {
        for action in ACTIONS {
            for relations in RELATION_SETS {
                assert!(!can(None, relations, action));
            }
        }
    }

    #[test]
    fn developer_has_the_authentication_only_actions() {
        for action in [
            Action::ViewProject,
            Action::ViewIssue,
            Action::CreateIssue,
            Action::AddComment,
        ] {
            assert!(can(Some(Role::Developer), &[], action));
        }
    }

    #[test]
    fn project_management_is_denied_to_developers_regardless_of_relationship() {
        for action in [
            Action::CreateProject,
            Action::EditProject,
            Action::ArchiveProject,
            Action::ChangeAssignee,
        ] {
            for relations in RELATION_SETS {
                assert!(!can(Some(Role::Developer), relations, action));
            }
        }
    }

    #[test]
    fn issue_edit_needs_reporter_or_assignee() {
        assert!(can(
            Some(Role::Developer),
            &[Relation::Reporter],
            Action::EditIssue
        ));
        assert!(can(
            Some(Role::Developer),
            &[Relation::Assignee],
            Action::EditIssue
        ));
        assert!(!can(Some(Role::Developer), &[], Action::EditIssue));
        assert!(!can(
            Some(Role::Developer),
            &[Relation::Owner],
            Action::EditIssue
        ));
    }

    #[test]
    fn comment_edit_needs_authorship() {
        assert!(can(
            Some(Role::Developer),
            &[Relation::Author],
            Action::EditComment
        ));
        assert!(!can(Some(Role::Developer), &[], Action::EditComment));
        assert!(!can(
            Some(Role::Developer),
            &[Relation::Reporter],
            Action::EditComment
        ));
    }

    #[test]
    fn evaluation_is_idempotent() {
        for _ in 0..3 {
            assert!(can(Some(Role::Manager), &[], Action::CreateProject));
            assert!(!can(Some(Role::Developer), &[], Action::CreateProject));
        }
    }
}

pub mod handlers;
pub mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware, web, App,
};
use mongodb::bson::oid::ObjectId;

use common::{
    auth::Service,
    context::ServiceState,
    entities::{comment::Comment, issue::Issue, project::Project},
    repository::test_repository::TestRepository,
};

pub use handlers::comment::*;
pub use handlers::issue::*;
pub use handlers::project::*;

pub fn create_app(
    state: Arc<ServiceState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let cors = Cors::permissive();
    App::new()
        .wrap(cors)
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .service(post_project)
        .service(get_project)
        .service(get_projects)
        .service(patch_project)
        .service(delete_project)
        .service(post_issue)
        .service(get_issue)
        .service(get_project_issues)
        .service(patch_issue)
        .service(post_comment)
        .service(get_issue_comments)
        .service(patch_comment)
}

pub fn create_test_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let mut state = ServiceState::new(Service::Issues);
    state.insert::<Project<ObjectId>>(Arc::new(TestRepository::new()));
    state.insert::<Issue<ObjectId>>(Arc::new(TestRepository::new()));
    state.insert::<Comment<ObjectId>>(Arc::new(TestRepository::new()));
    create_app(Arc::new(state))
}

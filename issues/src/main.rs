use std::{env, sync::Arc};

use actix_web::HttpServer;
use mongodb::bson::oid::ObjectId;

use common::{
    auth::Service,
    context::ServiceState,
    entities::{comment::Comment, issue::Issue, project::Project},
    repository::mongo_repository::MongoRepository,
};
use issues::create_app;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let mongo_uri = env::var("MONGOURI").unwrap();

    let project_repo: MongoRepository<Project<ObjectId>> =
        MongoRepository::new(&mongo_uri, "issues", "projects").await;
    let issue_repo: MongoRepository<Issue<ObjectId>> =
        MongoRepository::new(&mongo_uri, "issues", "issues").await;
    let comment_repo: MongoRepository<Comment<ObjectId>> =
        MongoRepository::new(&mongo_uri, "issues", "comments").await;

    let mut state = ServiceState::new(Service::Issues);
    state.insert::<Project<ObjectId>>(Arc::new(project_repo));
    state.insert::<Issue<ObjectId>>(Arc::new(issue_repo));
    state.insert::<Comment<ObjectId>>(Arc::new(comment_repo));
    let state = Arc::new(state);

    HttpServer::new(move || create_app(state.clone()))
        .bind(("0.0.0.0", 3002))?
        .run()
        .await
}

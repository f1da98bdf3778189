use std::{env, sync::Arc};

use actix_web::HttpServer;
use mongodb::bson::oid::ObjectId;

use common::{
    auth::Service, context::ServiceState, entities::user::User,
    repository::mongo_repository::MongoRepository,
};
use users::create_app;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let mongo_uri = env::var("MONGOURI").unwrap();

    let user_repo: MongoRepository<User<ObjectId>> =
        MongoRepository::new(&mongo_uri, "users", "users").await;

    let mut state = ServiceState::new(Service::Users);
    state.insert::<User<ObjectId>>(Arc::new(user_repo));
    let state = Arc::new(state);

    HttpServer::new(move || create_app(state.clone()))
        .bind(("0.0.0.0", 3001))?
        .run()
        .await
}

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
    auth::Service, context::ServiceState, entities::user::User,
    repository::test_repository::TestRepository,
};

pub use handlers::auth::*;
pub use handlers::user::*;

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
        .service(login)
        .service(post_user)
        .service(my_user)
        .service(get_user)
        .service(get_users)
        .service(patch_user)
        .service(delete_user)
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
    let mut state = ServiceState::new(Service::Users);
    state.insert::<User<ObjectId>>(Arc::new(TestRepository::new()));
    create_app(Arc::new(state))
}

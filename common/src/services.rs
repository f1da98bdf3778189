use std::env::var;

use lazy_static::lazy_static;

lazy_static! {
    pub static ref PROTOCOL: String = var("PROTOCOL").unwrap();
    pub static ref USERS_SERVICE: String = var("USERS_SERVICE_URL").unwrap();
    pub static ref ISSUES_SERVICE: String = var("ISSUES_SERVICE_URL").unwrap();
}

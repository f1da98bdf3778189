use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

#[derive(Debug)]
pub struct ServiceError {
    code: u16,
    err: anyhow::Error,
}

impl ServiceError {
    pub fn code(&self) -> u16 {
        self.code
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ServiceError({}): {}", self.code, self.err)
    }
}

pub trait AddCode {
    fn code(self, code: u16) -> ServiceError;
}

impl AddCode for anyhow::Error {
    fn code(self, code: u16) -> ServiceError {
        ServiceError { code, err: self }
    }
}

impl<E: Into<anyhow::Error>> From<E> for ServiceError {
    fn from(err: E) -> ServiceError {
        ServiceError {
            code: 500,
            err: err.into(),
        }
    }
}

impl actix_web::error::ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();

        // Detailed cause stays in the server log, keyed by the request id
        // the client receives.
        log::error!("request {}: {} ({})", request_id, self.err, self.code);

        let message = if self.code < 500 {
            self.err.to_string()
        } else {
            "Internal server error".to_string()
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": {
                "code": self.code,
                "message": message,
                "request_id": request_id,
            }
        }))
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

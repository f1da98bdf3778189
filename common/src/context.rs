use std::sync::Arc;

use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use serde::Serialize;
use type_map::concurrent::TypeMap;

use crate::{
    auth::{Auth, Service},
    error::{self, AddCode, ServiceError},
    repository::RepositoryObject,
};

pub struct ServiceState {
    repositories: TypeMap,
    pub client: reqwest::Client,
    pub service_auth: Auth,
}

impl ServiceState {
    pub fn new(service: Service) -> Self {
        Self {
            repositories: TypeMap::new(),
            client: reqwest::Client::new(),
            service_auth: Auth::Service(service),
        }
    }

    pub fn insert<T: 'static>(&mut self, repository: RepositoryObject<T>) {
        self.repositories.insert(repository);
    }
}

#[derive(Clone)]
pub struct Context(Arc<ServiceState>, Auth);

impl Context {
    pub fn new(state: Arc<ServiceState>, user_auth: Auth) -> Self {
        Self(state, user_auth)
    }

    pub fn auth(&self) -> Auth {
        self.1
    }

    pub fn server_auth(&self) -> Auth {
        self.0.service_auth
    }

    pub fn try_get_repository<T: 'static>(&self) -> error::Result<RepositoryObject<T>> {
        self.0
            .repositories
            .get::<RepositoryObject<T>>()
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Repository for type {} not found",
                    std::any::type_name::<T>()
                )
                .code(500)
            })
    }

    pub fn make_request<T: Serialize>(&self) -> ServiceRequest<T> {
        ServiceRequest::<T>::new(&self.0.client, self.0.service_auth)
    }
}

impl FromRequest for Context {
    type Error = ServiceError;

    type Future = futures_util::future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        fn from_request_inner(req: &HttpRequest, _payload: &mut Payload) -> error::Result<Context> {
            let auth = req
                .headers()
                .get("Authorization")
                .and_then(|x| x.to_str().ok())
                .and_then(|x| x.strip_prefix("Bearer "))
                .map(Auth::from_token);

            let user_auth = match auth {
                Some(Ok(Some(auth))) => auth,
                Some(Ok(None)) => {
                    log::info!("Token expired");
                    Auth::None
                }
                Some(Err(err)) => {
                    log::error!("Error parsing token: {}", err);
                    Auth::None
                }
                None => Auth::None,
            };

            let Some(state) = req.app_data::<Data<Arc<ServiceState>>>() else {
                return Err(anyhow::anyhow!("No state provided").code(500));
            };

            Ok(Context(Arc::clone(state), user_auth))
        }
        let result = from_request_inner(req, payload);

        Box::pin(async move { result })
    }
}

pub struct ServiceRequest<'a, 'b, T = ()> {
    client: &'a reqwest::Client,
    method: reqwest::Method,
    url: Option<String>,
    body: Option<&'b T>,
    auth: Auth,
}

impl<'a, 'b, T: Serialize> ServiceRequest<'a, 'b, T> {
    pub fn new(client: &'a reqwest::Client, auth: Auth) -> Self {
        Self {
            client,
            auth,
            method: reqwest::Method::GET,
            url: None,
            body: None,
        }
    }

    pub fn get(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    pub fn post(mut self, url: String) -> Self {
        self.url = Some(url);
        self.method = reqwest::Method::POST;
        self
    }

    pub fn json(mut self, body: &'b T) -> Self {
        self.body = Some(body);
        self
    }

    pub async fn send(self) -> error::Result<reqwest::Response> {
        let url = self
            .url
            .ok_or_else(|| anyhow::anyhow!("Request URL is not set").code(500))?;
        let mut request = self
            .client
            .request(self.method, url)
            .header("Authorization", format!("Bearer {}", self.auth.to_token()?));
        if let Some(body) = self.body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Ok(response)
    }
}

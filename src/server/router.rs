//! Request dispatch
//!
//! Maps method + path onto registry operations and turns their outcome into
//! a response:
//!
//! | Route                   | Success              | Failure                      |
//! |-------------------------|----------------------|------------------------------|
//! | `POST /user`            | 202                  | 400 bad JSON or empty name   |
//! | `GET`/`HEAD /user/{id}` | 200 `{"name": ...}`  | 400 bad id, 404 unknown id   |
//! | `DELETE /user/{id}`     | 204                  | 400 bad id, 404 unknown id   |
//! | anything else           | 200 "Hello Client!"  |                              |

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;

use crate::registry::{RegistryError, User, UserId, UserRegistry};
use crate::server::config::DEFAULT_MAX_BODY_SIZE;

/// Body of every response that doesn't hit a user route
pub const GREETING: &str = "Hello Client!";

pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Why a request could not be served
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Body or path segment could not be decoded
    Malformed(String),
    /// Body exceeded the configured limit (in bytes)
    BodyTooLarge(usize),
    /// Registry rejected the operation
    Registry(RegistryError),
    /// Valid result could not be encoded
    Encode(String),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Malformed(_) => StatusCode::BAD_REQUEST,
            DispatchError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            DispatchError::Registry(RegistryError::Validation(_)) => StatusCode::BAD_REQUEST,
            DispatchError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            DispatchError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text error response: the message plus a trailing newline
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut resp = respond(self.status(), CONTENT_TYPE_TEXT, format!("{}\n", self));
        resp.headers_mut()
            .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        resp
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Malformed(msg) => write!(f, "{}", msg),
            DispatchError::BodyTooLarge(limit) => {
                write!(f, "Request body too large (limit {} bytes)", limit)
            }
            DispatchError::Registry(e) => write!(f, "{}", e),
            DispatchError::Encode(_) => write!(f, "Error encoding response"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<RegistryError> for DispatchError {
    fn from(e: RegistryError) -> Self {
        DispatchError::Registry(e)
    }
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(body.into()));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    resp
}

fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Users,
    User(&'a str),
    /// Everything else falls through to the greeting
    Fallback,
}

impl<'a> Route<'a> {
    fn parse(path: &'a str) -> Self {
        if path == "/user" {
            return Route::Users;
        }

        path.strip_prefix("/user/")
            .filter(|id| !id.is_empty() && !id.contains('/'))
            .map_or(Route::Fallback, Route::User)
    }
}

fn parse_id(segment: &str) -> Result<UserId, DispatchError> {
    let invalid = || DispatchError::Malformed("Invalid user ID".to_string());

    percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| invalid())?
        .parse()
        .map_err(|_| invalid())
}

/// Dispatches requests to a shared registry
pub struct Router {
    registry: Arc<UserRegistry>,
    max_body_size: usize,
}

impl Router {
    pub fn new(registry: Arc<UserRegistry>) -> Self {
        Self {
            registry,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Set the largest request body `POST /user` will read
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// The registry requests are dispatched to
    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.registry
    }

    /// Produce the response for `req`; every failure becomes an error response
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        match self.dispatch(req).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    status = e.status().as_u16(),
                    error = %e,
                    "Request failed"
                );
                e.into_response()
            }
        }
    }

    async fn dispatch<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, DispatchError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        match (Route::parse(parts.uri.path()), &parts.method) {
            (Route::Users, &Method::POST) => self.create_user(body).await,
            (Route::User(segment), &Method::GET | &Method::HEAD) => {
                self.get_user(parse_id(segment)?).await
            }
            (Route::User(segment), &Method::DELETE) => self.delete_user(parse_id(segment)?).await,
            _ => Ok(respond(StatusCode::OK, CONTENT_TYPE_TEXT, GREETING)),
        }
    }

    async fn create_user<B>(&self, body: B) -> Result<Response<Full<Bytes>>, DispatchError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let body = Limited::new(body, self.max_body_size)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    DispatchError::BodyTooLarge(self.max_body_size)
                } else {
                    DispatchError::Malformed(e.to_string())
                }
            })?
            .to_bytes();

        let user = User::from_json(&body).map_err(|e| DispatchError::Malformed(e.to_string()))?;

        let id = self.registry.create(user.name).await?;
        tracing::info!(user_id = id, "User created");

        Ok(empty(StatusCode::ACCEPTED))
    }

    async fn get_user(&self, id: UserId) -> Result<Response<Full<Bytes>>, DispatchError> {
        let user = self.registry.get(id).await?;
        let body =
            serde_json::to_vec(&user).map_err(|e| DispatchError::Encode(e.to_string()))?;

        Ok(respond(StatusCode::OK, CONTENT_TYPE_JSON, body))
    }

    async fn delete_user(&self, id: UserId) -> Result<Response<Full<Bytes>>, DispatchError> {
        self.registry.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");

        Ok(empty(StatusCode::NO_CONTENT))
    }
}

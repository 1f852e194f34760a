//! HTTP surface
//!
//! - `POST /{route}`: one field save, form-encoded or JSON
//! - `GET /health`: liveness

use crate::authz::AuthorizationService;
use crate::columns::ColumnRenderer;
use crate::config::ServerConfig;
use crate::error::{SaveRejection, ServerError};
use crate::pipeline::{SaveConfirmation, SaveInput, ValidationPipeline};
use crate::session::{SessionResolver, SESSION_COOKIE};
use crate::store::AttachmentStore;
use crate::token::CsrfIssuer;
use ml_inline_model::{messages, ErrorClass, SaveResponse};
use serde::{Deserialize, Deserializer};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{Filter, Rejection, Reply};

/// Shared request state
pub struct AppState {
    pub config: ServerConfig,
    store: Arc<dyn AttachmentStore>,
    authz: Arc<dyn AuthorizationService>,
    sessions: Arc<dyn SessionResolver>,
    pipeline: ValidationPipeline,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn AttachmentStore>,
        authz: Arc<dyn AuthorizationService>,
        sessions: Arc<dyn SessionResolver>,
        issuer: Arc<CsrfIssuer>,
    ) -> Self {
        let pipeline = ValidationPipeline::new(store.clone(), authz.clone(), issuer);
        Self {
            config,
            store,
            authz,
            sessions,
            pipeline,
        }
    }

    #[must_use]
    pub fn pipeline(&self) -> &ValidationPipeline {
        &self.pipeline
    }

    /// Renderer sharing this state's store, grants and token key
    #[must_use]
    pub fn renderer(&self) -> ColumnRenderer {
        ColumnRenderer::new(
            self.store.clone(),
            self.authz.clone(),
            self.pipeline.issuer().clone(),
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Request body; every parameter is optional on the wire
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SaveForm {
    action: String,
    #[serde(rename = "attachmentId", deserialize_with = "lenient_string")]
    attachment_id: String,
    token: String,
    field: String,
    value: String,
}

impl SaveForm {
    fn into_input(self) -> SaveInput {
        SaveInput {
            attachment_id: self.attachment_id,
            token: self.token,
            field: self.field,
            value: self.value,
        }
    }
}

/// Accept the identifier as a string or a JSON number
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// All routes
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    // Path before method, so an unknown path stays a 404
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "status": "healthy" })));

    let route = state.config.route.clone();
    let limit = state.config.max_body_bytes;
    let with_state = warp::any().map(move || state.clone());

    let save = warp::path(route)
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::cookie::optional::<String>(SESSION_COOKIE))
        .and(warp::body::content_length_limit(limit))
        .and(warp::body::bytes())
        .and(with_state)
        .and_then(handle_save);

    health
        .or(save)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

/// Bind the routes; the returned future runs until `shutdown` resolves
pub fn bind(
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = ()>), ServerError> {
    let addr = state.config.bind;
    warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| ServerError::Bind {
            addr,
            message: e.to_string(),
        })
}

async fn handle_save(
    content_type: Option<String>,
    cookie: Option<String>,
    body: Bytes,
    state: Arc<AppState>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Rejection> {
    let reply = match save(&state, content_type.as_deref(), cookie.as_deref(), &body).await {
        Ok(done) => json_reply(200, &SaveResponse::ok(done.message)),
        Err(rejection) => json_reply(rejection.status(), &rejection.to_response()),
    };
    Ok(reply)
}

async fn save(
    state: &AppState,
    content_type: Option<&str>,
    cookie: Option<&str>,
    body: &[u8],
) -> Result<SaveConfirmation, SaveRejection> {
    let form = parse_form(content_type, body)?;

    if form.action != state.config.action {
        tracing::warn!(action = %form.action, "unknown action");
        return Err(SaveRejection::invalid_request());
    }

    let session = cookie
        .and_then(|c| state.sessions.resolve(c))
        .ok_or_else(|| {
            tracing::warn!("save without a resolvable session");
            SaveRejection::invalid_request()
        })?;

    state.pipeline.run(&session, &form.into_input()).await
}

fn parse_form(content_type: Option<&str>, body: &[u8]) -> Result<SaveForm, SaveRejection> {
    let is_json = content_type
        .map(|ct| ct.trim_start().starts_with("application/json"))
        .unwrap_or(false);

    let parsed = if is_json {
        serde_json::from_slice(body).map_err(|e| e.to_string())
    } else {
        serde_urlencoded::from_bytes(body).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| {
        tracing::warn!("unreadable save body: {}", e);
        SaveRejection::invalid_request()
    })
}

async fn handle_rejection(
    rejection: Rejection,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Infallible> {
    if rejection.is_not_found() {
        return Ok(json_reply(404, &SaveResponse::error(ErrorClass::Validation, "Not found.")));
    }
    tracing::warn!("request rejected: {:?}", rejection);
    Ok(json_reply(
        400,
        &SaveResponse::error(ErrorClass::Validation, messages::INVALID_REQUEST),
    ))
}

fn json_reply(status: u16, body: &SaveResponse) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
    warp::reply::with_status(warp::reply::json(body), status)
}

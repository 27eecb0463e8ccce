use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, warn};

use super::error::ApiError;
use super::payloads::{HealthResponse, LoginForm, Token, UserPublic, UserRegister};
use super::state::AppState;
use crate::password::hash_password;
use crate::users::NewUser;

pub fn router(state: AppState) -> Router {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(20)
            .burst_size(50)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .expect("default governor config is valid"),
    );

    let cors = cors_layer(&state.settings.extra_cors_origins);

    let routes = Router::new()
        .route("/health", get(health))
        .route("/users/login/", post(login))
        .route("/users/signup", post(signup));

    let routes = match state.settings.api_prefix.as_str() {
        "" | "/" => routes,
        prefix => Router::new().nest(prefix, routes),
    };

    routes
        .layer(GovernorLayer::new(governor_conf))
        .layer(tower_http::request_id::SetRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
            tower_http::request_id::MakeRequestUuid::default(),
        ))
        .layer(tower_http::request_id::PropagateRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Browser origins permitted in addition to same-origin callers. Origins
/// that do not form a valid header value are skipped with a warning rather
/// than aborting startup.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "skipping malformed CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// OAuth2 compatible token login: exchange username/password for a bearer
/// access token.
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    let user = state
        .users
        .authenticate(&form.username, &form.password)
        .await?
        .ok_or(ApiError::IncorrectCredentials)?;

    if !user.is_active {
        return Err(ApiError::InactiveUser);
    }

    let access_token = state.tokens.issue(user.id).map_err(|err| {
        error!(error = %err, "token issuance failed");
        ApiError::Internal
    })?;

    debug!(username = %user.username, "login succeeded");
    Ok(Json(Token::bearer(access_token)))
}

/// Create a new user without being logged in. The email check runs before
/// the username check, so a payload conflicting on both reports the email
/// conflict; the unique indexes behind `create` close the remaining race.
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<UserRegister>,
) -> Result<Json<UserPublic>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    if state
        .users
        .find_by_email(&payload.email_address)
        .await?
        .is_some()
    {
        return Err(ApiError::EmailTaken);
    }
    if state
        .users
        .find_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::UsernameTaken);
    }

    let password_hash = hash_password(&payload.password).map_err(|err| {
        error!(error = %err, "password hashing failed");
        ApiError::Internal
    })?;

    let user = state
        .users
        .create(NewUser {
            username: payload.username,
            email_address: payload.email_address,
            name: payload.name,
            password_hash,
        })
        .await?;

    debug!(username = %user.username, "user registered");
    Ok(Json(UserPublic::from(user)))
}

use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{SignInRequest, SignInResponse, SignUpRequest, SignUpResponse},
        extractors::BearerToken,
        jwt::JwtKeys,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-up/", post(sign_up))
        .route("/sign-in-user", post(sign_in))
        .route("/sign-in-user/", post(sign_in))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<SignUpResponse>, AppError> {
    let user = payload.into_user();

    let user = state.users.insert(user).await.map_err(|e| {
        warn!(error = %e, "sign-up rejected");
        AppError::from(e)
    })?;

    let keys = JwtKeys::from_ref(&state);
    let jwt_token = keys.sign(&user)?;

    info!(user_id = %user.user_id, "user signed up");
    Ok(Json(SignUpResponse { jwt_token }))
}

/// Sign in with a previously issued token, or with username/email and password.
#[instrument(skip(state, bearer, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    BearerToken(bearer): BearerToken,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    if let Some(token) = bearer {
        let keys = JwtKeys::from_ref(&state);
        let user_id = keys.verify(&token)?;
        info!(user_id = %user_id, "user signed in with token");
        return Ok(Json(SignInResponse { user_id }));
    }

    if payload.user_name.is_none() && payload.email.is_none() {
        warn!("sign-in without username or email");
        return Err(AppError::MissingSelectors);
    }

    let user = state
        .users
        .find_by_credentials(
            payload.user_name.as_deref(),
            payload.email.as_deref(),
            &payload.password,
        )
        .await?;

    match user {
        Some(user) => {
            info!(user_id = %user.user_id, "user signed in");
            Ok(Json(SignInResponse {
                user_id: user.user_id,
            }))
        }
        None => {
            warn!("sign-in credentials did not match");
            Err(AppError::UserNotFound)
        }
    }
}

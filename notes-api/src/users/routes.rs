use axum::{http::StatusCode, middleware};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    auth,
    ctx::{self, BaseParams},
    openapi::{
        aide::{
            axum::{
                routing::{get, post, post_with},
                ApiRouter, IntoApiResponse,
            },
            NoApi,
        },
        Json,
    },
    state::AppState,
    Result,
};

use super::auth::{login, register, LoginUserParameters, RegisterUserParameters, Session};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SessionResponse {
    pub user: ctx::User,
    pub token: String,
    pub success: bool,
}

impl From<Session> for SessionResponse {
    fn from(Session { user, token }: Session) -> Self {
        Self {
            user: user.into(),
            token,
            success: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MeResponse {
    pub user: ctx::User,
    pub success: bool,
}

pub fn router(state: AppState) -> ApiRouter {
    let public = ApiRouter::new()
        .api_route(
            "/api/users/register",
            post_with(register_user, |t| t.response::<201, Json<SessionResponse>>()),
        )
        .api_route("/api/users/login", post(login_user));

    let protected = ApiRouter::new()
        .api_route("/api/users/me", get(me))
        .route_layer(middleware::from_fn(auth::middleware::require_user));

    ApiRouter::new().merge(public).merge(protected).with_state(state)
}

async fn register_user(
    NoApi(BaseParams { db, .. }): NoApi<BaseParams>,
    Json(Credentials { email, password }): Json<Credentials>,
) -> impl IntoApiResponse {
    register(db, RegisterUserParameters { email, password })
        .await
        .map(|session| (StatusCode::CREATED, Json(SessionResponse::from(session))))
}

async fn login_user(
    NoApi(BaseParams { db, .. }): NoApi<BaseParams>,
    Json(Credentials { email, password }): Json<Credentials>,
) -> impl IntoApiResponse {
    login(db, LoginUserParameters { email, password })
        .await
        .map(|session| Json(SessionResponse::from(session)))
}

async fn me(NoApi(BaseParams { ctx, .. }): NoApi<BaseParams>) -> impl IntoApiResponse {
    let user = ctx.require_user().cloned();
    user.map(|user| Json(MeResponse { user, success: true }))
}

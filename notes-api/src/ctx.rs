use axum::{
    extract::{Extension, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    auth,
    users::{self, UserId, UserRole},
    Error, Result, DB,
};

#[derive(Clone, Debug, FromRequestParts)]
pub struct BaseParams {
    pub ctx: Ctx,
    #[from_request(via(Extension))]
    pub db: DB,
}

impl BaseParams {
    pub fn new(db: DB, ctx: Ctx) -> Self {
        Self { db, ctx }
    }
}

/// The authenticated caller, as seen by handlers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins pass every ownership check.
    pub fn can_access(&self, owner: UserId) -> bool {
        self.is_admin() || self.id == owner
    }
}

impl From<users::auth::User> for User {
    fn from(user: users::auth::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ctx {
    pub user: Option<User>,
}

impl Ctx {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    pub fn require_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(Error::MissingUser)
    }

    pub fn require_admin(&self) -> Result<&User> {
        let user = self.require_user()?;
        if !user.is_admin() {
            return Err(Error::Unauthorized);
        }
        Ok(user)
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        if let Some(ctx) = parts.extensions.get::<Ctx>() {
            return Ok(ctx.clone());
        }

        let Some(token) = auth::bearer_token(&parts.headers) else {
            return Ok(Self::new(None));
        };

        let db = parts
            .extensions
            .get::<DB>()
            .cloned()
            .ok_or_else(|| Error::Unexpected("Database is not attached to the request".into()))?;

        let user = users::auth::find_one_by_token(db, token.to_owned()).await?;

        Ok(Self::new(user.map(User::from)))
    }
}

/// Resolves the caller once per request and caches it in the extensions.
pub async fn with_ctx(ctx: Ctx, mut request: Request, next: Next) -> Response {
    if let Some(user) = &ctx.user {
        tracing::debug!(user_id = %user.id, "request authenticated");
    }
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

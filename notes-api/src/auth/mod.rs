use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use rand::{distributions::Alphanumeric, Rng};

use crate::{Error, Result};

const TOKEN_LENGTH: usize = 48;

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Argon2id PHC string. Hashing runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Unexpected(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| Error::Unexpected(e.to_string()))?
}

pub async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || -> Result<bool> {
        let hash = PasswordHash::new(&hash).map_err(|e| Error::Unexpected(format!("stored hash is invalid: {e}")))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &hash).is_ok())
    })
    .await
    .map_err(|e| Error::Unexpected(e.to_string()))?
}

pub mod middleware {
    use axum::{extract::Request, middleware::Next, response::Response};

    use super::*;
    use crate::ctx::Ctx;

    pub async fn require_user(ctx: Ctx, request: Request, next: Next) -> Result<Response> {
        ctx.require_user()?;
        Ok(next.run(request).await)
    }

    pub async fn require_admin(ctx: Ctx, request: Request, next: Next) -> Result<Response> {
        ctx.require_admin()?;
        Ok(next.run(request).await)
    }
}

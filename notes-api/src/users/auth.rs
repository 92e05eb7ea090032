use rusqlite::{named_params, params, OptionalExtension, Row};

use crate::{auth, config::config, db::DB, Error, Result};

use super::*;

const USER_COLUMNS: &str = "id, email, role, password, access_token, created_at, updated_at";

#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    pub password: Option<String>,
    pub access_token: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("password", &"[redacted]")
            .field("access_token", &"[redacted]")
            .finish()
    }
}

impl<'a> TryFrom<&Row<'a>> for User {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            role: row.get(2)?,
            password: row.get(3)?,
            access_token: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RegisterUserParameters {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginUserParameters {
    pub email: String,
    pub password: String,
}

/// A user together with the access token just issued to them.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub async fn register(db: DB, args: RegisterUserParameters) -> Result<Session> {
    let RegisterUserParameters { email, password } = args;
    let email = email.trim().to_lowercase();

    let role = if config().is_admin_email(&email) {
        UserRole::Admin
    } else {
        UserRole::Member
    };
    let password = auth::hash_password(password).await?;
    let token = auth::generate_token();

    let session = db
        .call(move |conn| {
            let tx = conn.transaction()?;

            let exists = tx
                .query_row("SELECT 1 FROM users WHERE email = ?", [&email], |_| Ok(()))
                .optional()?
                .is_some();
            if exists {
                return Err(Error::UserExists(format!("User '{email}' already exists")).into());
            }

            let user = tx.query_row(
                &format!(
                    r#"INSERT INTO users (email, role, password, access_token) VALUES (?, ?, ?, ?)
                    RETURNING {USER_COLUMNS}"#
                ),
                params![email, role, password, token],
                |r| User::try_from(r),
            )?;
            tx.commit()?;

            Ok(Session { user, token })
        })
        .await
        .map_err(Error::from)?;

    tracing::info!(user_id = %session.user.id, role = %session.user.role, "user registered");

    Ok(session)
}

pub async fn login(db: DB, args: LoginUserParameters) -> Result<Session> {
    let LoginUserParameters { email, password } = args;
    let email = email.trim().to_lowercase();

    let user = find_one_by_email(db.clone(), email)
        .await?
        .ok_or(Error::InvalidCredentials)?;
    let hash = user.password.clone().ok_or(Error::InvalidCredentials)?;

    if !auth::verify_password(password, hash).await? {
        return Err(Error::InvalidCredentials);
    }

    let token = auth::generate_token();
    let user_id = user.id;
    let session = db
        .call(move |conn| {
            let user = conn.query_row(
                &format!(
                    r#"UPDATE users SET access_token = :access_token, updated_at = :updated_at WHERE id = :id
                    RETURNING {USER_COLUMNS}"#
                ),
                named_params! {
                    ":access_token": token,
                    ":updated_at": chrono::Utc::now(),
                    ":id": user_id,
                },
                |r| User::try_from(r),
            )?;
            Ok(Session { user, token })
        })
        .await
        .map_err(Error::from)?;

    tracing::info!(user_id = %session.user.id, "user logged in");

    Ok(session)
}

pub async fn find_one_by_token(db: DB, token: String) -> Result<Option<User>> {
    db.call(move |conn| {
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE access_token = ?"),
            [token],
            |r| User::try_from(r),
        )
        .optional()
        .map_err(|e| e.into())
    })
    .await
    .map_err(Error::from)
}

pub async fn find_one_by_email(db: DB, email: String) -> Result<Option<User>> {
    db.call(move |conn| {
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
            [email],
            |r| User::try_from(r),
        )
        .optional()
        .map_err(|e| e.into())
    })
    .await
    .map_err(Error::from)
}

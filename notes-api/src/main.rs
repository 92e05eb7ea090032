mod config;

mod app;
mod auth;
mod ctx;
mod db;
mod errors;
mod notes;
mod openapi;
mod shared;
mod state;
mod users;

use std::net::SocketAddr;

use aide::axum::ApiRouter;
use app::AppParams;
pub use config::config;
pub use db::{init_db, DB};
pub use errors::{Error, Result};
use shared::tracing::{add_tracing_layer, setup_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config();

    setup_tracing(config);

    let conn = init_db().await?;

    let (app, _api) = app::create(AppParams {
        db: conn,
        router: |state| {
            ApiRouter::new()
                .merge(users::router(state.clone()))
                .merge(notes::router(state))
        },
    })
    .await?;

    let app = add_tracing_layer(app);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

#[cfg(test)]
pub mod tests {
    use crate::{
        app::{create, AppParams},
        auth,
        config::config_override,
        errors::{Error, Result},
        state::AppState,
        users::{UserId, UserRole},
        DB,
    };
    use aide::axum::ApiRouter;
    use axum_test::{TestServer, TestServerConfig, Transport};
    use rusqlite::params;

    pub async fn test_server<R>(db: DB, router: R) -> Result<TestServer>
    where
        R: FnOnce(AppState) -> ApiRouter,
    {
        config_override(|mut config| {
            config.database_url = ":memory:".into();
            config
        });

        let (app, _) = create(AppParams { db, router }).await?;

        let config = TestServerConfig {
            save_cookies: true,
            expect_success_by_default: true,
            transport: Some(Transport::MockHttp),
            ..Default::default()
        };

        TestServer::new_with_config(app, config).map_err(|e| Error::Unexpected(e.to_string()))
    }

    /// Inserts a user with a fresh access token, skipping password hashing.
    pub async fn seed_user(db: &DB, email: &str, role: UserRole) -> Result<(UserId, String)> {
        let email = email.to_owned();
        let token = auth::generate_token();

        let user_id = db
            .call({
                let token = token.clone();
                move |conn| {
                    let id = conn.query_row(
                        "INSERT INTO users (email, role, access_token) VALUES (?, ?, ?) RETURNING id",
                        params![email, role, token],
                        |r| r.get::<_, UserId>(0),
                    )?;
                    Ok(id)
                }
            })
            .await?;

        Ok((user_id, token))
    }
}

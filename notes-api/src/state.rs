use axum::extract::FromRef;

use crate::db::DB;

/// Router state. Handlers reach the database through `BaseParams`; the
/// connection is kept here so routers can be built with it.
#[derive(FromRef, Clone)]
pub struct AppState {
    pub conn: DB,
}

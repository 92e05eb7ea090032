use aide::scalar::Scalar;
use axum::{middleware, response::IntoResponse, routing::get, Extension, Json, Router};
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::{
    config,
    ctx::with_ctx,
    db::DB,
    errors::{self, on_error, ErrorResponseDocs},
    openapi::{
        self,
        aide::axum::ApiRouter,
        OpenApi,
    },
    state::AppState,
};

pub struct AppParams<Router>
where
    Router: FnOnce(AppState) -> ApiRouter,
{
    pub db: DB,
    pub router: Router,
}

pub async fn create<R>(AppParams { db, router }: AppParams<R>) -> errors::Result<(Router, OpenApi)>
where
    R: FnOnce(AppState) -> ApiRouter,
{
    let mut api = OpenApi::default();

    let state = AppState { conn: db.clone() };

    let docs_router = axum::Router::new().route(
        "/__docs__",
        get(Scalar::new("/__docs__/spec.json").with_title("Notes API").axum_handler()),
    );

    #[cfg(not(test))]
    let docs_router = docs_router.route("/__docs__/spec.json", get(serve_docs));

    let app = ApiRouter::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .merge(docs_router)
        .merge(router(state))
        .finish_api_with(&mut api, |t| {
            t.title("Notes API")
                .description("Notes with checklist items and labels")
                .default_response::<openapi::Json<ErrorResponseDocs>>()
        })
        // outermost first: `on_error` also sees rejections produced by `with_ctx`
        .layer(
            ServiceBuilder::new()
                .layer(Extension(db))
                .layer(Extension(Arc::new(api.clone())))
                .layer(middleware::from_fn(on_error))
                .layer(middleware::from_fn(with_ctx)),
        );

    Ok((app, api))
}

async fn version() -> impl IntoResponse {
    let config = config();
    Json(json!({
        "source" : config.source,
        "version": config.app_version.as_deref().unwrap_or(&config.version),
        "commit" : config.git_commit,
        "build"  : config.pipeline_id
    }))
}

async fn heartbeat() -> impl IntoResponse {
    let mut rng = rand::thread_rng();
    let random: u32 = rng.gen_range(0..=10000);

    Json(json!({
        "status" : "ok",
        "random": random,
    }))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}

#[cfg(not(test))]
async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl aide::axum::IntoApiResponse {
    Json(api).into_response()
}

use aide::operation::OperationIo;
use aide::OperationOutput;
use axum::response::IntoResponse;
use axum_macros::FromRequest;
use serde::Serialize;

pub use aide;
pub use aide::openapi::OpenApi;

/// JSON body whose rejections render as `ValidationError`.
#[derive(FromRequest, OperationIo)]
#[from_request(via(axum::Json), rejection(crate::Error))]
#[aide(input_with = "axum::Json<T>", output_with = "axum::Json<T>", json_schema)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

// Error responses are documented once, as the API-wide default response.
impl OperationOutput for crate::Error {
    type Inner = ();
}

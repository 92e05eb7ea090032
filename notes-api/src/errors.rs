use std::sync::{Arc, OnceLock};

use crate::error_responses;
use axum::{
    extract::{rejection::JsonRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use schemars::{
    schema::{Schema, SchemaObject, SubschemaValidation},
    schema_for, JsonSchema,
};
use serde::Serialize;
use serde_json::Value;

use crate::db;

pub use response::{ErrorResponse, ErrorResponseDocs};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // auth
    #[error("MissingUserError")]
    MissingUser,
    #[error("UnauthorizedError")]
    Unauthorized,
    #[error("ForbiddenError: {0}")]
    Forbidden(String),
    #[error("InvalidCredentialsError")]
    InvalidCredentials,
    #[error("UserExistsError: {0}")]
    UserExists(String),

    // notes
    #[error("NoNotesError: {0}")]
    NoNotes(String),
    #[error("NoteCreationError: {0}")]
    NoteCreation(String),
    #[error("NoteEditError: {0}")]
    NoteEdit(String),
    #[error("NoteDeleteError: {0}")]
    NoteDelete(String),
    #[error("NoteArchiveError: {0}")]
    NoteArchive(String),
    #[error("NoteUnarchiveError: {0}")]
    NoteUnarchive(String),

    // items
    #[error("NoItemsError: {0}")]
    NoItems(String),
    #[error("ItemCreationError: {0}")]
    ItemCreation(String),
    #[error("ItemEditError: {0}")]
    ItemEdit(String),
    #[error("ItemDeleteError: {0}")]
    ItemDelete(String),

    // labels
    #[error("NoLabelsError: {0}")]
    NoLabels(String),
    #[error("LabelCreationError: {0}")]
    LabelCreation(String),
    #[error("LabelAddError: {0}")]
    LabelAdd(String),
    #[error("LabelRemoveError: {0}")]
    LabelRemove(String),
    #[error("LabelEditError: {0}")]
    LabelEdit(String),
    #[error("LabelDeleteError: {0}")]
    LabelDelete(String),

    // validation
    #[error("ValidationError")]
    JsonValidation(#[from] JsonRejection),

    #[error(transparent)]
    DB(db::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("UnexpectedError: {0}")]
    Unexpected(String),
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        Self::DB(error)
    }
}

/// crate::Error <--> tokio_rusqlite::Error
///
/// Domain errors raised inside `Connection::call` closures travel as
/// `tokio_rusqlite::Error::Other` and are recovered here.
pub mod db_mappers {
    use super::*;
    use crate::db::{rusqlite, tokio_rusqlite};

    impl From<tokio_rusqlite::Error> for Error {
        fn from(error: tokio_rusqlite::Error) -> Self {
            match error {
                tokio_rusqlite::Error::Other(err) => match err.downcast::<Error>() {
                    Ok(err) => *err,
                    Err(err) => Error::DB(tokio_rusqlite::Error::Other(err).into()),
                },
                error => Error::DB(error.into()),
            }
        }
    }

    impl From<rusqlite::Error> for Error {
        fn from(error: rusqlite::Error) -> Self {
            Error::DB(error.into())
        }
    }

    impl From<Error> for tokio_rusqlite::Error {
        fn from(error: Error) -> Self {
            tokio_rusqlite::Error::Other(error.into())
        }
    }
}

// Response

error_responses! {
    MissingUserError: 401,
    UnauthorizedError: 403,
    ForbiddenError: 403,
    InvalidCredentialsError: 401,
    UserExistsError: 409,
    NoNotesError: 404,
    NoteCreationError: 400,
    NoteEditError: 404,
    NoteDeleteError: 404,
    NoteArchiveError: 404,
    NoteUnarchiveError: 404,
    NoItemsError: 404,
    ItemCreationError: 400,
    ItemEditError: 404,
    ItemDeleteError: 404,
    NoLabelsError: 404,
    LabelCreationError: 400,
    LabelAddError: 404,
    LabelRemoveError: 404,
    LabelEditError: 404,
    LabelDeleteError: 404,
    ValidationError: 400,
    UnexpectedError: 500,
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::MissingUser => errors
                .MissingUserError
                .with_message("You must be logged in to perform this action"),
            Error::Unauthorized => errors
                .UnauthorizedError
                .with_message("You must be an administrator to perform this action"),
            Error::Forbidden(message) => errors.ForbiddenError.with_message(message),
            Error::InvalidCredentials => errors
                .InvalidCredentialsError
                .with_message("Email or password is incorrect"),
            Error::UserExists(message) => errors.UserExistsError.with_message(message),

            Error::NoNotes(message) => errors.NoNotesError.with_message(message),
            Error::NoteCreation(message) => errors.NoteCreationError.with_message(message),
            Error::NoteEdit(message) => errors.NoteEditError.with_message(message),
            Error::NoteDelete(message) => errors.NoteDeleteError.with_message(message),
            Error::NoteArchive(message) => errors.NoteArchiveError.with_message(message),
            Error::NoteUnarchive(message) => errors.NoteUnarchiveError.with_message(message),

            Error::NoItems(message) => errors.NoItemsError.with_message(message),
            Error::ItemCreation(message) => errors.ItemCreationError.with_message(message),
            Error::ItemEdit(message) => errors.ItemEditError.with_message(message),
            Error::ItemDelete(message) => errors.ItemDeleteError.with_message(message),

            Error::NoLabels(message) => errors.NoLabelsError.with_message(message),
            Error::LabelCreation(message) => errors.LabelCreationError.with_message(message),
            Error::LabelAdd(message) => errors.LabelAddError.with_message(message),
            Error::LabelRemove(message) => errors.LabelRemoveError.with_message(message),
            Error::LabelEdit(message) => errors.LabelEditError.with_message(message),
            Error::LabelDelete(message) => errors.LabelDeleteError.with_message(message),

            Error::JsonValidation(rejection) => errors.ValidationError.with_message(rejection.body_text()),
            Error::Unexpected(message) => errors.UnexpectedError.with_message(message),
            Error::DB(_) | Error::Io(_) => errors.UnexpectedError.with_message("Unexpected"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.as_ref());
        let status = error_res.status;

        let mut res = axum::Json(error_res).into_response();
        res.extensions_mut().insert(error);

        *res.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if let Some(error) = response.extensions().get::<Arc<Error>>().map(Arc::as_ref) {
        match error {
            Error::DB(_) | Error::Io(_) | Error::Unexpected(_) => tracing::error!("{:?}", error),
            error => tracing::warn!("{}", error),
        }
    }

    response
}

mod response {
    use super::*;

    #[derive(Debug, Serialize, Clone, Default, JsonSchema)]
    #[cfg_attr(test, derive(serde::Deserialize))]
    pub struct ErrorResponse {
        pub success: bool,
        pub name: String,
        pub message: Option<String>,
        pub status: u16,
    }

    impl ErrorResponse {
        pub fn new(name: impl Into<String>, status: u16) -> Self {
            Self {
                name: name.into(),
                status,
                ..Default::default()
            }
        }

        pub fn with_message(&self, message: impl Into<String>) -> Self {
            let mut res = self.clone();
            res.message = Some(message.into());
            res
        }
    }

    /// `oneOf` over every registered error, each pinned to its name and status.
    pub struct ErrorResponseDocs;

    impl JsonSchema for ErrorResponseDocs {
        fn schema_name() -> String {
            String::from("ErrorResponse")
        }

        fn json_schema(_gen: &mut schemars::gen::SchemaGenerator) -> Schema {
            let error_schemas = errors()
                .iter()
                .map(|error| {
                    let mut schema = schema_for!(ErrorResponse).schema;
                    let obj = schema.object();
                    if let Some(Schema::Object(status)) = obj.properties.get_mut("status") {
                        status.enum_values = Some(vec![Value::from(error.status)]);
                    }
                    if let Some(Schema::Object(name)) = obj.properties.get_mut("name") {
                        name.enum_values = Some(vec![Value::from(error.name.clone())]);
                    }
                    Schema::from(schema)
                })
                .collect::<Vec<_>>();

            SchemaObject {
                subschemas: Some(Box::new(SubschemaValidation {
                    one_of: Some(error_schemas),
                    ..Default::default()
                })),
                ..Default::default()
            }
            .into()
        }
    }

    /// Registry of typed error responses
    /// ```rust
    /// error_responses! {
    ///     NoteEditError: 404,
    ///     UnexpectedError: 500
    /// }
    ///
    /// impl From<&Error> for ErrorResponse {
    ///     fn from(error: &Error) -> Self {
    ///     let errors = errors(); // <- from macro
    ///     match error {
    ///         Error::NoteEdit(message) => errors.NoteEditError.with_message(message),
    ///         Error::Unexpected(message) => errors.UnexpectedError.with_message(message),
    ///     }
    /// }
    /// ```
    #[macro_export]
    macro_rules! error_responses {
        (
            $($name:ident: $code:expr),* $(,)?
        ) => {
            #[allow(non_snake_case)]
            #[derive(Debug, Clone, Serialize)]
            struct Responses {
                $(
                    $name: ErrorResponse,
                )*
            }

            impl Responses {
                fn iter(&self) -> impl Iterator<Item = &ErrorResponse> {
                    [$(&self.$name),*].into_iter()
                }
            }

            static ERRORS: OnceLock<Responses> = OnceLock::new();

            fn errors() -> &'static Responses {
                ERRORS.get_or_init(|| Responses {
                    $(
                        $name: ErrorResponse::new(stringify!($name), $code),
                    )*
                })
            }
        };
    }
}

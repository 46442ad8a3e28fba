use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rejected write, shaped the way the client receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub name: String,
    pub message: String,
    pub errors: BTreeMap<String, FieldError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    fn single(field: FieldError) -> Self {
        let message = format!("todos validation failed: {}: {}", field.path, field.message);
        let mut errors = BTreeMap::new();
        errors.insert(field.path.clone(), field);
        Self {
            name: "ValidationError".to_string(),
            message,
            errors,
        }
    }

    pub fn text_required() -> Self {
        Self::single(FieldError {
            kind: "required".to_string(),
            path: "text".to_string(),
            message: "Path `text` is required.".to_string(),
            value: None,
        })
    }

    pub fn text_too_short(value: &str) -> Self {
        Self::single(FieldError {
            kind: "minlength".to_string(),
            path: "text".to_string(),
            message: "Path `text` is shorter than the minimum allowed length (1).".to_string(),
            value: Some(value.to_string()),
        })
    }
}

/// Errors raised by the document store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

#[derive(Serialize)]
struct DatabaseErrorBody {
    name: &'static str,
    message: String,
}

/// Errors returned by the todo handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("todo not found")]
    NotFound,
    /// The id is not a valid ObjectId. The status differs per route.
    #[error("malformed todo id")]
    MalformedId(StatusCode),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Store(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MalformedId(status) => *status,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            ApiError::Store(StoreError::Validation(err)) => response.json(err),
            ApiError::Store(StoreError::Database(err)) => response.json(DatabaseErrorBody {
                name: "MongoError",
                message: err.to_string(),
            }),
            ApiError::NotFound | ApiError::MalformedId(_) => response.finish(),
        }
    }
}

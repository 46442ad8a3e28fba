use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::db::{parse_id, TodoStore};
use crate::dto::{CreateTodo, TodoDto, TodoEnvelope, TodosEnvelope, UpdateTodo};
use crate::error::{ApiError, StoreError};
use crate::Response;

fn rejected(err: StoreError) -> ApiError {
    match &err {
        StoreError::Validation(_) => tracing::info!(error = %err, "todo write rejected"),
        StoreError::Database(_) => tracing::error!(error = %err, "todo store failed"),
    }
    ApiError::Store(err)
}

#[post("/todos")]
pub async fn create_todo(
    db: web::Data<dyn TodoStore>,
    new_todo: web::Json<CreateTodo>,
) -> Result<HttpResponse, ApiError> {
    let todo = db.create(new_todo.into_inner().text).await.map_err(rejected)?;
    Ok(HttpResponse::Ok().json(TodoDto::from(&todo)))
}

#[get("/todos")]
pub async fn get_todos(db: web::Data<dyn TodoStore>) -> Result<HttpResponse, ApiError> {
    let todos = db.find_all().await.map_err(rejected)?;
    Ok(HttpResponse::Ok().json(TodosEnvelope {
        todos: todos.iter().map(TodoDto::from).collect(),
    }))
}

#[get("/todos/{id}")]
pub async fn get_todo_by_id(
    db: web::Data<dyn TodoStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id).ok_or(ApiError::MalformedId(StatusCode::NOT_FOUND))?;
    let todo = db
        .find_by_id(id)
        .await
        .map_err(rejected)?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(TodoEnvelope {
        todo: TodoDto::from(&todo),
    }))
}

#[delete("/todos/{id}")]
pub async fn delete_todo_by_id(
    db: web::Data<dyn TodoStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id).ok_or(ApiError::MalformedId(StatusCode::BAD_REQUEST))?;
    let todo = db
        .find_one_and_delete(id)
        .await
        .map_err(rejected)?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(TodoDto::from(&todo)))
}

#[patch("/todos/{id}")]
pub async fn update_todo_by_id(
    db: web::Data<dyn TodoStore>,
    id: web::Path<String>,
    updated_todo: Result<web::Json<UpdateTodo>, actix_web::Error>,
) -> actix_web::Result<HttpResponse> {
    // A malformed id answers 404 even when the body is unreadable too.
    let id = parse_id(&id).ok_or(ApiError::MalformedId(StatusCode::NOT_FOUND))?;
    let update = updated_todo?
        .into_inner()
        .into_update(Utc::now().timestamp_millis());
    let todo = db
        .update(id, update)
        .await
        .map_err(rejected)?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(TodoEnvelope {
        todo: TodoDto::from(&todo),
    }))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(Response {
        message: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(create_todo)
        .service(get_todos)
        .service(get_todo_by_id)
        .service(delete_todo_by_id)
        .service(update_todo_by_id);
}

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::{debug, info};
use todo_shared::{MessageResponse, TodoPayload};
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::{StoreError, TodoStore};

pub const WELCOME: &str = "Welcome to the Todo app";
pub const DELETED_MESSAGE: &str = "Todo deleted successfully";

type Store = web::Data<dyn TodoStore>;

/// Mounts `/` and the `/api/todos` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(welcome).service(
        web::scope("/api/todos")
            .app_data(json_config())
            .app_data(path_config())
            .service(create_todo)
            .service(list_todos)
            .service(get_todo)
            .service(edit_todo)
            .service(update_todo)
            .service(delete_todo),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| ApiError::UnknownId(err.to_string()).into())
}

#[get("/")]
async fn welcome() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body(WELCOME)
}

#[post("")]
async fn create_todo(
    store: Store,
    payload: web::Json<TodoPayload>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let task = web::block(move || store.create(&payload)).await??;
    info!("created todo {}", task.id);

    Ok(HttpResponse::Created().json(task))
}

#[get("")]
async fn list_todos(store: Store) -> Result<HttpResponse, ApiError> {
    let tasks = web::block(move || store.list_all()).await??;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/{id}")]
async fn get_todo(store: Store, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let task = fetch(store, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Same record as `GET /{id}`; clients use it to prefill an edit form.
#[get("/{id}/edit")]
async fn edit_todo(store: Store, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let task = fetch(store, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

#[put("/{id}")]
async fn update_todo(
    store: Store,
    id: web::Path<Uuid>,
    payload: web::Json<TodoPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let payload = payload.into_inner();
    let task = web::block(move || store.update(id, &payload))
        .await?
        .map_err(log_not_found)?;
    info!("updated todo {id}");

    Ok(HttpResponse::Ok().json(task))
}

#[delete("/{id}")]
async fn delete_todo(store: Store, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    web::block(move || store.delete_by_id(id))
        .await?
        .map_err(log_not_found)?;
    info!("deleted todo {id}");

    Ok(HttpResponse::Ok().json(MessageResponse::new(DELETED_MESSAGE)))
}

async fn fetch(store: Store, id: Uuid) -> Result<todo_shared::Task, ApiError> {
    let task = web::block(move || store.get_by_id(id))
        .await?
        .map_err(log_not_found)?;
    Ok(task)
}

fn log_not_found(err: StoreError) -> StoreError {
    if let StoreError::NotFound(id) = &err {
        debug!("no todo with id {id}");
    }
    err
}

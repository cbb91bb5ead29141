use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;
use todo_server::{routes, SqliteStore, StoreError, StoreResult, TodoStore};
use todo_shared::{MessageResponse, Priority, Task, TodoPayload};
use uuid::Uuid;

fn store_data() -> web::Data<dyn TodoStore> {
    let store: Arc<dyn TodoStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    web::Data::from(store)
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(store_data())
                .configure(routes::configure),
        )
        .await
    };
}

macro_rules! create {
    ($app:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/todos")
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let task: Task = test::read_body_json(resp).await;
        task
    }};
}

macro_rules! list {
    ($app:expr) => {{
        let req = test::TestRequest::get().uri("/api/todos").to_request();
        let tasks: Vec<Task> = test::call_and_read_body_json(&$app, req).await;
        tasks
    }};
}

#[actix_web::test]
async fn root_serves_welcome_text() {
    let app = app!();
    let req = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "Welcome to the Todo app");
}

#[actix_web::test]
async fn created_todo_heads_the_list() {
    let app = app!();
    let created = create!(
        app,
        json!({"title": "Buy milk", "description": "2%", "priority": "High"})
    );
    assert_eq!(created.priority, Priority::High);
    assert_eq!(created.title, "Buy milk");
    assert_ne!(created.id, Uuid::nil());

    let tasks = list!(app);
    assert_eq!(tasks, vec![created]);
}

#[actix_web::test]
async fn list_is_newest_first() {
    let app = app!();
    for title in ["one", "two", "three"] {
        create!(app, json!({"title": title, "description": "d", "priority": "Low"}));
    }

    let titles: Vec<String> = list!(app).into_iter().map(|task| task.title).collect();
    assert_eq!(titles, vec!["three", "two", "one"]);
}

#[actix_web::test]
async fn omitted_priority_defaults_to_moderate() {
    let app = app!();
    let created = create!(app, json!({"title": "Walk", "description": "the dog"}));
    assert_eq!(created.priority, Priority::Moderate);
}

#[actix_web::test]
async fn invalid_bodies_are_bad_requests() {
    let app = app!();
    let bodies = [
        json!({"description": "no title", "priority": "Low"}),
        json!({"title": "", "description": "empty title"}),
        json!({"title": "no description", "description": "  "}),
        json!({"title": "t", "description": "d", "priority": "Urgent"}),
        json!({"title": 42, "description": "d"}),
    ];

    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/api/todos")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: MessageResponse = test::read_body_json(resp).await;
        assert!(!error.message.is_empty());
    }

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(list!(app).is_empty());
}

#[actix_web::test]
async fn missing_title_reports_field() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/todos")
        .set_json(json!({"description": "d"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let error: MessageResponse = test::read_body_json(resp).await;
    assert_eq!(error.message, "title is required");
}

#[actix_web::test]
async fn get_and_edit_return_the_record() {
    let app = app!();
    let created = create!(app, json!({"title": "t", "description": "d", "priority": "Low"}));

    for uri in [
        format!("/api/todos/{}", created.id),
        format!("/api/todos/{}/edit", created.id),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let task: Task = test::call_and_read_body_json(&app, req).await;
        assert_eq!(task, created);
    }
}

#[actix_web::test]
async fn unknown_ids_are_not_found() {
    let app = app!();
    for uri in [
        format!("/api/todos/{}", Uuid::new_v4()),
        format!("/api/todos/{}/edit", Uuid::new_v4()),
        "/api/todos/not-a-uuid".to_string(),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let error: MessageResponse = test::read_body_json(resp).await;
        assert_eq!(error.message, "Todo not found");
    }
}

#[actix_web::test]
async fn put_on_missing_id_changes_nothing() {
    let app = app!();
    let existing = create!(app, json!({"title": "t", "description": "d"}));

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", Uuid::new_v4()))
        .set_json(json!({"title": "x", "description": "y", "priority": "High"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(list!(app), vec![existing]);
}

#[actix_web::test]
async fn put_replaces_editable_fields() {
    let app = app!();
    let created = create!(app, json!({"title": "draft", "description": "d", "priority": "Low"}));

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", created.id))
        .set_json(json!({"title": "final", "description": "done", "priority": "High"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = test::read_body_json(resp).await;

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.title, "final");
    assert_eq!(updated.description, "done");
    assert_eq!(updated.priority, Priority::High);

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", created.id))
        .set_json(json!({"title": "final", "description": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(list!(app), vec![updated]);
}

#[actix_web::test]
async fn delete_confirms_then_reports_not_found() {
    let app = app!();
    let created = create!(app, json!({"title": "t", "description": "d"}));
    let uri = format!("/api/todos/{}", created.id);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let confirmation: MessageResponse = test::read_body_json(resp).await;
    assert_eq!(confirmation.message, "Todo deleted successfully");

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

struct UnreachableStore;

impl UnreachableStore {
    fn fail<T>() -> StoreResult<T> {
        Err(StoreError::Infrastructure(
            "unable to open database file: /var/lib/todos.db".to_string(),
        ))
    }
}

impl TodoStore for UnreachableStore {
    fn create(&self, _payload: &TodoPayload) -> StoreResult<Task> {
        Self::fail()
    }

    fn list_all(&self) -> StoreResult<Vec<Task>> {
        Self::fail()
    }

    fn get_by_id(&self, _id: Uuid) -> StoreResult<Task> {
        Self::fail()
    }

    fn update(&self, _id: Uuid, _payload: &TodoPayload) -> StoreResult<Task> {
        Self::fail()
    }

    fn delete_by_id(&self, _id: Uuid) -> StoreResult<()> {
        Self::fail()
    }
}

#[actix_web::test]
async fn store_failures_are_opaque_500s() {
    let store: Arc<dyn TodoStore> = Arc::new(UnreachableStore);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store))
            .configure(routes::configure),
    )
    .await;

    let id = Uuid::new_v4();
    let requests = [
        test::TestRequest::get().uri("/api/todos").to_request(),
        test::TestRequest::get()
            .uri(&format!("/api/todos/{id}"))
            .to_request(),
        test::TestRequest::post()
            .uri("/api/todos")
            .set_json(json!({"title": "t", "description": "d"}))
            .to_request(),
        test::TestRequest::put()
            .uri(&format!("/api/todos/{id}"))
            .set_json(json!({"title": "t", "description": "d"}))
            .to_request(),
        test::TestRequest::delete()
            .uri(&format!("/api/todos/{id}"))
            .to_request(),
    ];

    for req in requests {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        let error: MessageResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.message, "Error processing todo");
        assert!(!String::from_utf8_lossy(&body).contains("todos.db"));
    }
}

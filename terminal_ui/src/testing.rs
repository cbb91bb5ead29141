//! In-memory `TodoApi` used by the controller and app tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use time::{Duration, OffsetDateTime};
use todo_shared::{Priority, Task, TodoPayload};
use uuid::Uuid;

use crate::api::{ClientError, TodoApi};

#[derive(Default)]
struct FakeState {
    tasks: RefCell<Vec<Task>>,
    next_id: Cell<u128>,
    calls: RefCell<Vec<&'static str>>,
    offline: Cell<bool>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeApi(Rc<FakeState>);

impl FakeApi {
    pub(crate) fn seed(&self, title: &str, description: &str, priority: Priority) -> Task {
        let n = self.0.next_id.get() + 1;
        self.0.next_id.set(n);
        let stamp = OffsetDateTime::UNIX_EPOCH + Duration::seconds(n as i64);
        let task = Task {
            id: Uuid::from_u128(n),
            title: title.to_string(),
            description: description.to_string(),
            priority,
            created_at: stamp,
            updated_at: stamp,
        };
        self.0.tasks.borrow_mut().insert(0, task.clone());
        task
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.0.calls.borrow().clone()
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.0.offline.set(offline);
    }

    fn check(&self, call: &'static str) -> Result<(), ClientError> {
        self.0.calls.borrow_mut().push(call);
        if self.0.offline.get() {
            return Err(ClientError::Server {
                status: 503,
                message: "offline".to_string(),
            });
        }
        Ok(())
    }
}

impl TodoApi for FakeApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        self.check("list")?;
        Ok(self.0.tasks.borrow().clone())
    }

    async fn create(&self, payload: &TodoPayload) -> Result<Task, ClientError> {
        self.check("create")?;
        let draft = payload.validate()?;
        Ok(self.seed(&draft.title, &draft.description, draft.priority))
    }

    async fn update(&self, id: Uuid, payload: &TodoPayload) -> Result<Task, ClientError> {
        self.check("update")?;
        let draft = payload.validate()?;
        let mut tasks = self.0.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(ClientError::NotFound)?;
        task.title = draft.title;
        task.description = draft.description;
        task.priority = draft.priority;
        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.check("delete")?;
        let mut tasks = self.0.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(ClientError::NotFound);
        }
        Ok(())
    }
}


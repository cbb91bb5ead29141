//! Client-side state: a cache of the server's todo list plus the form and
//! edit buffers the user types into.
//!
//! The server owns the data. Every successful mutation is followed by a
//! refetch, and nothing here invents ids or records. Sorting and manual
//! moves only reorder the cache; the next reload throws them away.

use std::cmp::Ordering;

use log::{info, warn};
use todo_shared::{Priority, Task, TodoPayload, ValidationError};
use uuid::Uuid;

use crate::api::{ClientError, TodoApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Priority,
    Title,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Stable sort; a `None` key leaves the slice untouched.
    pub fn apply(&self, tasks: &mut [Task]) {
        let compare: fn(&Task, &Task) -> Ordering = match self.key {
            SortKey::None => return,
            SortKey::Priority => |a, b| a.priority.rank().cmp(&b.priority.rank()),
            SortKey::Title => |a, b| compare_text(&a.title, &b.title),
            SortKey::Description => |a, b| compare_text(&a.description, &b.description),
        };

        match self.direction {
            SortDirection::Ascending => tasks.sort_by(compare),
            SortDirection::Descending => tasks.sort_by(|a, b| compare(b, a)),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
        }
    }

    pub fn to_payload(&self) -> Result<TodoPayload, ValidationError> {
        let payload = TodoPayload::new(&self.title, &self.description, self.priority);
        payload.validate()?;
        Ok(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub id: Uuid,
    pub form: TaskForm,
}

pub struct TodoController<A> {
    api: A,
    tasks: Vec<Task>,
    list_state: ListState,
    sort: SortOrder,
    form: TaskForm,
    edit: Option<EditBuffer>,
    notice: Option<String>,
}

impl<A: TodoApi> TodoController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            list_state: ListState::Loading,
            sort: SortOrder::default(),
            form: TaskForm::default(),
            edit: None,
            notice: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn list_state(&self) -> &ListState {
        &self.list_state
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TaskForm {
        &mut self.form
    }

    pub fn reset_form(&mut self) {
        self.form = TaskForm::default();
    }

    pub fn editing(&self) -> Option<&EditBuffer> {
        self.edit.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut TaskForm> {
        self.edit.as_mut().map(|edit| &mut edit.form)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Replaces the cache with the server's list. On failure the previous
    /// list stays visible and the state records the error.
    pub async fn load_all(&mut self) -> Result<(), ClientError> {
        self.list_state = ListState::Loading;
        match self.api.list().await {
            Ok(mut tasks) => {
                self.sort.apply(&mut tasks);
                self.tasks = tasks;
                self.list_state = ListState::Loaded;
                Ok(())
            }
            Err(err) => {
                self.list_state = ListState::Failed(err.to_string());
                Err(self.report("fetching", err))
            }
        }
    }

    pub async fn create(&mut self) -> Result<Task, ClientError> {
        let payload = self
            .form
            .to_payload()
            .map_err(|err| self.report("creating", err.into()))?;
        let task = match self.api.create(&payload).await {
            Ok(task) => task,
            Err(err) => return Err(self.report("creating", err)),
        };
        info!("created todo {}", task.id);

        self.reset_form();
        self.notice = Some("Todo created".to_string());
        self.refetch().await;
        Ok(task)
    }

    pub async fn remove(&mut self, id: Uuid) -> Result<(), ClientError> {
        if let Err(err) = self.api.delete(id).await {
            return Err(self.report("deleting", err));
        }
        info!("deleted todo {id}");

        if self.edit.as_ref().is_some_and(|edit| edit.id == id) {
            self.edit = None;
        }
        self.notice = Some("Todo deleted".to_string());
        self.refetch().await;
        Ok(())
    }

    pub fn begin_edit(&mut self, id: Uuid) -> Result<(), ClientError> {
        let task = self
            .tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or(ClientError::NotFound)?;

        self.edit = Some(EditBuffer {
            id,
            form: TaskForm::from_task(task),
        });
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Sends the edit buffer. The buffer is kept when anything fails so the
    /// user can fix it and submit again.
    pub async fn commit_edit(&mut self) -> Result<Task, ClientError> {
        let (id, payload) = match &self.edit {
            Some(edit) => (edit.id, edit.form.to_payload()),
            None => return Err(ClientError::NotEditing),
        };
        let payload = payload.map_err(|err| self.report("updating", err.into()))?;

        let task = match self.api.update(id, &payload).await {
            Ok(task) => task,
            Err(err) => return Err(self.report("updating", err)),
        };
        info!("updated todo {id}");

        self.edit = None;
        self.notice = Some("Todo updated".to_string());
        self.refetch().await;
        Ok(task)
    }

    /// `SortKey::None` reloads from the server, dropping any local order.
    pub async fn sort_by(&mut self, key: SortKey) -> Result<(), ClientError> {
        self.sort.key = key;
        if key == SortKey::None {
            return self.load_all().await;
        }
        self.sort.apply(&mut self.tasks);
        Ok(())
    }

    pub fn toggle_direction(&mut self) {
        self.sort.direction = self.sort.direction.toggled();
        self.sort.apply(&mut self.tasks);
    }

    /// Moves one cached task to a new position. Returns false when either
    /// index is out of range.
    pub fn move_task(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tasks.len() || to >= self.tasks.len() {
            return false;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        true
    }

    async fn refetch(&mut self) {
        // load_all already recorded the failure in list_state and notice.
        let _ = self.load_all().await;
    }

    fn report(&mut self, action: &str, err: ClientError) -> ClientError {
        warn!("error {action} todo: {err}");
        self.notice = Some(format!("Error {action} todo: {err}"));
        err
    }
}

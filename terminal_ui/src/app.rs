use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use todo_shared::Priority;
use uuid::Uuid;

use crate::api::TodoApi;
use crate::controller::{SortKey, TaskForm, TodoController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Compose,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Priority,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Title => Field::Description,
            Field::Description => Field::Priority,
            Field::Priority => Field::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            Field::Title => Field::Priority,
            Field::Description => Field::Title,
            Field::Priority => Field::Description,
        }
    }
}

pub struct App<A> {
    controller: TodoController<A>,
    mode: Mode,
    field: Field,
    selected: usize,
    quit: bool,
}

impl<A: TodoApi> App<A> {
    pub fn new(controller: TodoController<A>) -> Self {
        Self {
            controller,
            mode: Mode::Browse,
            field: Field::Title,
            selected: 0,
            quit: false,
        }
    }

    pub fn controller(&self) -> &TodoController<A> {
        &self.controller
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Form shown in the input pane, if any.
    pub fn active_form(&self) -> Option<&TaskForm> {
        match self.mode {
            Mode::Browse => None,
            Mode::Compose => Some(self.controller.form()),
            Mode::Edit => self.controller.editing().map(|edit| &edit.form),
        }
    }

    pub async fn start(&mut self) {
        // Failures end up in the controller's notice.
        let _ = self.controller.load_all().await;
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.controller.clear_notice();
        match self.mode {
            Mode::Browse => self.browse_key(key.code).await,
            Mode::Compose | Mode::Edit => self.form_key(key.code).await,
        }
        self.clamp_selection();
    }

    async fn browse_key(&mut self, code: KeyCode) {
        let selected_id = self.selected_id();

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.selected = self.selected.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Char('a') => {
                self.mode = Mode::Compose;
                self.field = Field::Title;
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = selected_id {
                    if self.controller.begin_edit(id).is_ok() {
                        self.mode = Mode::Edit;
                        self.field = Field::Title;
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = selected_id {
                    let _ = self.controller.remove(id).await;
                }
            }
            KeyCode::Char('p') => self.sort(SortKey::Priority).await,
            KeyCode::Char('t') => self.sort(SortKey::Title).await,
            KeyCode::Char('s') => self.sort(SortKey::Description).await,
            KeyCode::Char('n') => self.sort(SortKey::None).await,
            KeyCode::Char('o') => {
                self.controller.toggle_direction();
                self.reselect(selected_id);
            }
            KeyCode::Char('r') => {
                let _ = self.controller.load_all().await;
                self.reselect(selected_id);
            }
            KeyCode::Char('J') => {
                if self.controller.move_task(self.selected, self.selected + 1) {
                    self.selected += 1;
                }
            }
            KeyCode::Char('K') => {
                if self.selected > 0 && self.controller.move_task(self.selected, self.selected - 1)
                {
                    self.selected -= 1;
                }
            }
            _ => {}
        }
    }

    async fn form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.close_form(),
            KeyCode::Tab | KeyCode::Down => self.field = self.field.next(),
            KeyCode::BackTab | KeyCode::Up => self.field = self.field.previous(),
            KeyCode::Enter => self.submit().await,
            code => {
                let field = self.field;
                if let Some(form) = self.form_mut() {
                    edit_field(form, field, code);
                }
            }
        }
    }

    async fn submit(&mut self) {
        let selected_id = self.selected_id();
        let submitted = match self.mode {
            Mode::Compose => self.controller.create().await.is_ok(),
            Mode::Edit => self.controller.commit_edit().await.is_ok(),
            Mode::Browse => false,
        };
        if submitted {
            self.mode = Mode::Browse;
            self.reselect(selected_id);
        }
    }

    fn close_form(&mut self) {
        match self.mode {
            Mode::Compose => self.controller.reset_form(),
            Mode::Edit => self.controller.cancel_edit(),
            Mode::Browse => {}
        }
        self.mode = Mode::Browse;
    }

    fn form_mut(&mut self) -> Option<&mut TaskForm> {
        match self.mode {
            Mode::Browse => None,
            Mode::Compose => Some(self.controller.form_mut()),
            Mode::Edit => self.controller.edit_form_mut(),
        }
    }

    async fn sort(&mut self, key: SortKey) {
        let selected_id = self.selected_id();
        let _ = self.controller.sort_by(key).await;
        self.reselect(selected_id);
    }

    fn selected_id(&self) -> Option<Uuid> {
        self.controller
            .tasks()
            .get(self.selected)
            .map(|task| task.id)
    }

    /// Keeps the highlight on the same task after the list is reordered.
    fn reselect(&mut self, id: Option<Uuid>) {
        let position = id.and_then(|id| {
            self.controller
                .tasks()
                .iter()
                .position(|task| task.id == id)
        });
        if let Some(position) = position {
            self.selected = position;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

fn edit_field(form: &mut TaskForm, field: Field, code: KeyCode) {
    match (field, code) {
        (Field::Priority, KeyCode::Left) => form.priority = cycle(form.priority, false),
        (Field::Priority, KeyCode::Right | KeyCode::Char(' ')) => {
            form.priority = cycle(form.priority, true)
        }
        (Field::Title, KeyCode::Char(c)) => form.title.push(c),
        (Field::Description, KeyCode::Char(c)) => form.description.push(c),
        (Field::Title, KeyCode::Backspace) => {
            form.title.pop();
        }
        (Field::Description, KeyCode::Backspace) => {
            form.description.pop();
        }
        _ => {}
    }
}

fn cycle(priority: Priority, forward: bool) -> Priority {
    let len = Priority::ALL.len();
    let index = Priority::ALL
        .iter()
        .position(|p| *p == priority)
        .unwrap_or(1);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    Priority::ALL[next]
}

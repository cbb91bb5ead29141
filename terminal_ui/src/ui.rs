use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState as Selection, Paragraph},
    Frame,
};
use todo_shared::Priority;

use crate::api::TodoApi;
use crate::app::{App, Field, Mode};
use crate::controller::{ListState, SortDirection, SortKey, TaskForm};

const HELP: &str =
    "a add  e edit  d delete  p/t/s sort  n no sort  o direction  J/K move  r reload  q quit";

pub fn draw<B: Backend, A: TodoApi>(f: &mut Frame<B>, app: &App<A>) {
    let form = app.active_form();
    let mut constraints = vec![Constraint::Min(3)];
    if form.is_some() {
        constraints.push(Constraint::Length(5));
    }
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.size());

    draw_list(f, app, chunks[0]);
    if let Some(form) = form {
        draw_form(f, app, form, chunks[1]);
    }
    draw_status(f, app, chunks[chunks.len() - 1]);
}

fn draw_list<B: Backend, A: TodoApi>(f: &mut Frame<B>, app: &App<A>, area: tui::layout::Rect) {
    let items = app
        .controller()
        .tasks()
        .iter()
        .map(|task| {
            ListItem::new(vec![
                Spans::from(vec![
                    Span::styled(task.title.clone(), Style::default().fg(Color::Yellow)),
                    Span::raw(": "),
                    Span::styled(
                        task.description.clone(),
                        Style::default().fg(Color::LightBlue),
                    ),
                ]),
                Spans::from(vec![
                    Span::styled(
                        format!("[{}]", task.priority),
                        Style::default().fg(priority_color(task.priority)),
                    ),
                    Span::raw(format!(" {}", task.created_at.date())),
                ]),
            ])
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Todo List"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut selection = Selection::default();
    if app.mode() == Mode::Browse && !app.controller().tasks().is_empty() {
        selection.select(Some(app.selected()));
    }
    f.render_stateful_widget(list, area, &mut selection);
}

fn draw_form<B: Backend, A: TodoApi>(
    f: &mut Frame<B>,
    app: &App<A>,
    form: &TaskForm,
    area: tui::layout::Rect,
) {
    let line = |field: Field, label: &str, value: String| {
        let style = if app.field() == field {
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Green)
        } else {
            Style::default()
        };
        Spans::from(vec![Span::styled(format!("{label}: "), style), Span::raw(value)])
    };

    let title = match app.mode() {
        Mode::Edit => "Edit todo",
        _ => "New todo",
    };
    let paragraph = Paragraph::new(vec![
        line(Field::Title, "Title", form.title.clone()),
        line(Field::Description, "Description", form.description.clone()),
        line(Field::Priority, "Priority", format!("< {} >", form.priority)),
    ])
    .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(paragraph, area);
}

fn draw_status<B: Backend, A: TodoApi>(f: &mut Frame<B>, app: &App<A>, area: tui::layout::Rect) {
    let controller = app.controller();
    let state = match controller.list_state() {
        ListState::Loading => "loading".to_string(),
        ListState::Loaded => format!("{} todos", controller.tasks().len()),
        ListState::Failed(_) => "offline".to_string(),
    };
    let sort = controller.sort();
    let sort = match sort.key {
        SortKey::None => "unsorted".to_string(),
        key => {
            let arrow = match sort.direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            format!("by {key:?} {arrow}").to_lowercase()
        }
    };
    let message = controller.notice().unwrap_or(HELP);

    let paragraph = Paragraph::new(Spans::from(vec![
        Span::styled(format!("{state} | {sort} | "), Style::default().fg(Color::DarkGray)),
        Span::raw(message.to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(paragraph, area);
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Moderate => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

use crossterm::event::KeyCode;
use tracing::error;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::error::{optional, required, FormError};
use crate::models::Project;
use crate::store::Store;
use crate::ui::components::text_input::TextInput;
use crate::ui::components::toast::Notifier;

#[derive(Debug, PartialEq)]
pub enum ProjectWizardAction {
    Cancel,
    Save,
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProjectField {
    Name,
    Description,
    Message,
    InvoiceUrl,
}

const FIELDS: [ProjectField; 4] = [
    ProjectField::Name,
    ProjectField::Description,
    ProjectField::Message,
    ProjectField::InvoiceUrl,
];

impl ProjectField {
    fn label(self) -> &'static str {
        match self {
            ProjectField::Name => "Project Name",
            ProjectField::Description => "Project Description",
            ProjectField::Message => "Message",
            ProjectField::InvoiceUrl => "Invoice URL",
        }
    }
}

pub struct ProjectWizardState {
    project: Project,
    name: TextInput,
    description: TextInput,
    message: TextInput,
    invoice_url: TextInput,
    pub current_field: ProjectField,
    pub editing: bool,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        Self::from_existing(Project::draft())
    }

    pub fn from_existing(project: Project) -> Self {
        let text = |value: &Option<String>| TextInput::new(value.clone().unwrap_or_default());
        Self {
            name: TextInput::new(project.name.clone()),
            description: text(&project.description),
            message: text(&project.message),
            invoice_url: text(&project.invoice_url),
            project,
            current_field: ProjectField::Name,
            editing: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.project.id == 0
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    fn field_index(&self) -> usize {
        FIELDS.iter().position(|f| *f == self.current_field).unwrap_or(0)
    }

    pub fn next_field(&mut self) {
        self.current_field = FIELDS[(self.field_index() + 1) % FIELDS.len()];
    }

    pub fn previous_field(&mut self) {
        self.current_field = FIELDS[(self.field_index() + FIELDS.len() - 1) % FIELDS.len()];
    }

    fn input(&self, field: ProjectField) -> &TextInput {
        match field {
            ProjectField::Name => &self.name,
            ProjectField::Description => &self.description,
            ProjectField::Message => &self.message,
            ProjectField::InvoiceUrl => &self.invoice_url,
        }
    }

    fn input_mut(&mut self, field: ProjectField) -> &mut TextInput {
        match field {
            ProjectField::Name => &mut self.name,
            ProjectField::Description => &mut self.description,
            ProjectField::Message => &mut self.message,
            ProjectField::InvoiceUrl => &mut self.invoice_url,
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if self.editing {
            self.input_mut(self.current_field).handle_key(key);
        }
    }

    /// The row to write, or why it can't be written yet.
    pub fn build(&self) -> Result<Project, FormError> {
        Ok(Project {
            name: required("project name", self.name.value())?,
            description: optional(self.description.value()),
            message: optional(self.message.value()),
            invoice_url: optional(self.invoice_url.value()),
            ..self.project.clone()
        })
    }
}

impl Default for ProjectWizardState {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate and write the form. Returns true once the row is stored.
pub async fn save_project<S: Store>(store: &S, state: &ProjectWizardState, notifier: &mut Notifier) -> bool {
    let project = match state.build() {
        Ok(project) => project,
        Err(err) => {
            notifier.warning("Missing information", err.to_string());
            return false;
        }
    };

    match store.save_project(&project).await {
        Ok(_) => {
            notifier.success("Project saved", format!("{} saved successfully", project.name));
            true
        }
        Err(err) => {
            error!(project_id = project.id, error = %err, "failed to save project");
            notifier.error(format!("Error saving project: {err}"));
            false
        }
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, area: Rect, state: &ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6)].as_ref())
        .split(area);

    // Title with appropriate text based on whether we're editing or creating
    let title_text = if state.is_new() { "New Project" } else { "Edit Project" };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|field| {
            let input = state.input(*field);
            let focused = *field == state.current_field;
            let value = if focused && state.editing {
                input.display_with_cursor()
            } else {
                input.value().to_string()
            };
            let label_style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value_style = if focused && state.editing {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label()), label_style),
                Span::styled(value, value_style),
            ]))
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Project Details"));
    f.render_widget(form, chunks[1]);
}

pub fn help_text(state: &ProjectWizardState) -> &'static str {
    if state.editing {
        "Enter - Save field | Esc - Stop editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel"
    }
}

pub fn handle_input(state: &mut ProjectWizardState, key: KeyCode) -> Option<ProjectWizardAction> {
    if state.editing {
        match key {
            KeyCode::Enter | KeyCode::Esc => state.toggle_editing(),
            _ => state.edit_current_field(key),
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(ProjectWizardAction::Cancel),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up => state.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Char('s') => return Some(ProjectWizardAction::Save),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::ui::components::toast::ToastKind;

    fn type_text(state: &mut ProjectWizardState, text: &str) {
        handle_input(state, KeyCode::Enter);
        for c in text.chars() {
            handle_input(state, KeyCode::Char(c));
        }
        handle_input(state, KeyCode::Enter);
    }

    #[tokio::test]
    async fn created_project_appears_in_the_list() {
        let store = MemoryStore::new();
        let mut notifier = Notifier::new();
        let mut state = ProjectWizardState::new();
        type_text(&mut state, "Brand Identity Package");
        handle_input(&mut state, KeyCode::Down);
        type_text(&mut state, "Logo and guidelines");

        assert_eq!(handle_input(&mut state, KeyCode::Char('s')), Some(ProjectWizardAction::Save));
        assert!(save_project(&store, &state, &mut notifier).await);

        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Brand Identity Package");
        assert_eq!(projects[0].description.as_deref(), Some("Logo and guidelines"));
        assert_eq!(projects[0].status, "active");
        assert_eq!(projects[0].message, None);
    }

    #[tokio::test]
    async fn blank_name_is_not_written() {
        let store = MemoryStore::new();
        let mut notifier = Notifier::new();
        let mut state = ProjectWizardState::new();
        type_text(&mut state, "   ");

        assert!(!save_project(&store, &state, &mut notifier).await);

        assert_eq!(store.writes(), 0);
        assert_eq!(notifier.latest().unwrap().kind, ToastKind::Warning);
        assert_eq!(notifier.latest().unwrap().description, "Please enter a project name");
    }

    #[tokio::test]
    async fn editing_updates_in_place() {
        let store = MemoryStore::new();
        let mut notifier = Notifier::new();
        let existing = store.project("Mobile App", "completed");
        let mut state = ProjectWizardState::from_existing(existing.clone());
        type_text(&mut state, " v2");

        assert!(save_project(&store, &state, &mut notifier).await);

        let saved = store.get_project(existing.id).await.unwrap();
        assert_eq!(saved.name, "Mobile App v2");
        assert_eq!(saved.status, "completed");
        assert_eq!(store.list_projects().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_save_reports_once() {
        let store = MemoryStore::new();
        let mut notifier = Notifier::new();
        let mut state = ProjectWizardState::new();
        type_text(&mut state, "SEO");
        store.set_failing(true);

        assert!(!save_project(&store, &state, &mut notifier).await);

        assert_eq!(notifier.len(), 1);
        assert_eq!(notifier.latest().unwrap().kind, ToastKind::Error);
    }

    #[test]
    fn escape_leaves_editing_before_cancelling() {
        let mut state = ProjectWizardState::new();
        handle_input(&mut state, KeyCode::Enter);
        assert_eq!(handle_input(&mut state, KeyCode::Esc), None);
        assert!(!state.editing);
        assert_eq!(handle_input(&mut state, KeyCode::Esc), Some(ProjectWizardAction::Cancel));
    }

    #[test]
    fn fields_wrap_around() {
        let mut state = ProjectWizardState::new();
        state.previous_field();
        assert_eq!(state.current_field, ProjectField::InvoiceUrl);
        state.next_field();
        assert_eq!(state.current_field, ProjectField::Name);
    }
}

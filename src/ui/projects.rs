use crossterm::event::KeyCode;
use tracing::{error, info};
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{next_status, Project, PROJECT_STATUSES};
use crate::store::Store;
use crate::ui::components::confirm::render_confirmation;
use crate::ui::components::status_badge::badge;
use crate::ui::components::toast::Notifier;
use crate::ui::components::{clamp_index, next_index, previous_index};

// Represents the state of the project manager screen
pub struct ProjectsState {
    projects: Vec<Project>,
    list_state: ListState,
    show_delete_confirmation: bool,
    loaded: bool,
}

impl Default for ProjectsState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectsState {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
            list_state: ListState::default(),
            show_delete_confirmation: false,
            loaded: false,
        }
    }

    #[cfg(test)]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn replace(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        self.loaded = true;
        self.list_state
            .select(clamp_index(self.list_state.selected(), self.projects.len()));
    }

    /// Re-request every project. On failure the current list is kept.
    pub async fn refresh<S: Store>(&mut self, store: &S, notifier: &mut Notifier) -> bool {
        match store.list_projects().await {
            Ok(projects) => {
                self.replace(projects);
                true
            }
            Err(err) => {
                error!(error = %err, "failed to load projects");
                notifier.error("Failed to load projects");
                // Show the empty list rather than a spinner that never ends.
                self.loaded = true;
                false
            }
        }
    }

    pub fn next(&mut self) {
        self.list_state
            .select(next_index(self.list_state.selected(), self.projects.len()));
    }

    pub fn previous(&mut self) {
        self.list_state
            .select(previous_index(self.list_state.selected(), self.projects.len()));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.list_state.selected().and_then(|i| self.projects.get(i))
    }

    pub fn selected_project_id(&self) -> Option<i32> {
        self.selected_project().map(|p| p.id)
    }

    /// A popup is open and owns the keyboard.
    pub fn is_modal(&self) -> bool {
        self.show_delete_confirmation
    }
}

#[derive(Debug, PartialEq)]
pub enum ProjectAction {
    NewProject,
    EditProject(i32),   // Contains project_id
    CycleStatus(i32),   // Contains project_id
    DeleteProject(i32), // Contains project_id
    OpenProject(i32),   // Contains project_id
}

// DB operations for projects

pub async fn delete_project<S: Store>(store: &S, state: &mut ProjectsState, notifier: &mut Notifier, id: i32) {
    match store.delete_project(id).await {
        Ok(()) => {
            info!(project_id = id, "project deleted from manager");
            notifier.success("Project deleted", "The project and its records were removed");
            state.refresh(store, notifier).await;
        }
        Err(err) => {
            error!(project_id = id, error = %err, "failed to delete project");
            notifier.error("Failed to delete project");
        }
    }
}

pub async fn cycle_status<S: Store>(store: &S, state: &mut ProjectsState, notifier: &mut Notifier, id: i32) {
    let Some(project) = state.projects.iter().find(|p| p.id == id) else {
        return;
    };
    let status = next_status(PROJECT_STATUSES, &project.status);

    match store.update_project_status(id, &status).await {
        Ok(()) => {
            info!(project_id = id, status = %status, "project status changed");
            state.refresh(store, notifier).await;
        }
        Err(err) => {
            error!(project_id = id, error = %err, "failed to update project status");
            notifier.error("Failed to update project status");
        }
    }
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut ProjectsState) {
    let block = Block::default().title("Existing Projects").borders(Borders::ALL);

    if state.projects.is_empty() {
        let text = if state.loaded { "No projects yet." } else { "Loading..." };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state.projects.iter().map(project_item).collect();

    let projects_list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(projects_list, area, &mut state.list_state);

    // Render delete confirmation popup if needed
    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            area,
            "Confirm Delete",
            &[
                "Are you sure you want to delete this project?",
                "Its invoices and messages will also be deleted.",
            ],
        );
    }
}

fn project_item(project: &Project) -> ListItem<'static> {
    let mut lines = vec![Spans::from(vec![
        Span::styled(project.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        badge(&project.status),
    ])];

    if let Some(description) = &project.description {
        lines.push(Spans::from(format!("  {description}")));
    }
    if let Some(message) = &project.message {
        lines.push(Spans::from(Span::styled(
            format!("  Note: {message}"),
            Style::default().fg(Color::Gray),
        )));
    }
    if let Some(url) = &project.invoice_url {
        lines.push(Spans::from(Span::styled(
            format!("  Invoice: {url}"),
            Style::default().fg(Color::Cyan),
        )));
    }
    lines.push(Spans::from(Span::styled(
        format!("  Created {}", project.created_at.format("%b %-d, %Y")),
        Style::default().fg(Color::DarkGray),
    )));

    ListItem::new(lines)
}

pub fn help_text(state: &ProjectsState) -> &'static str {
    if state.selected_project().is_some() {
        "<N> New | <E> Edit | <S> Cycle Status | <D> Delete | <Enter> Details | <1-4> Navigate | <Q> Quit"
    } else {
        "<N> New Project | <1-4> Navigate | <Q> Quit"
    }
}

pub fn handle_input(state: &mut ProjectsState, key: KeyCode) -> Option<ProjectAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                state.toggle_delete_confirmation();
                return state.selected_project_id().map(ProjectAction::DeleteProject);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.toggle_delete_confirmation();
            }
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('n') => return Some(ProjectAction::NewProject),
        KeyCode::Char('e') => return state.selected_project_id().map(ProjectAction::EditProject),
        KeyCode::Char('s') => return state.selected_project_id().map(ProjectAction::CycleStatus),
        KeyCode::Char('d') => {
            if state.selected_project().is_some() {
                state.toggle_delete_confirmation();
            }
        }
        KeyCode::Enter => return state.selected_project_id().map(ProjectAction::OpenProject),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::ui::components::toast::ToastKind;
    use crate::ui::test_support::buffer_text;
    use tui::{backend::TestBackend, Terminal};

    async fn loaded(store: &MemoryStore) -> (ProjectsState, Notifier) {
        let mut state = ProjectsState::new();
        let mut notifier = Notifier::new();
        assert!(state.refresh(store, &mut notifier).await);
        (state, notifier)
    }

    #[tokio::test]
    async fn refresh_lists_newest_first() {
        let store = MemoryStore::new();
        store.project("SEO Optimization", "completed");
        store.project("Mobile App", "active");

        let (state, notifier) = loaded(&store).await;

        let names: Vec<&str> = state.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Mobile App", "SEO Optimization"]);
        assert_eq!(state.selected_project().unwrap().name, "Mobile App");
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = MemoryStore::new();
        let keep = store.project("Brand Identity", "pending");
        let doomed = store.project("E-commerce Redesign", "active");
        store.invoice(doomed.id, "INV-001", Some(10.0), "paid");
        let (mut state, mut notifier) = loaded(&store).await;

        delete_project(&store, &mut state, &mut notifier, doomed.id).await;

        assert!(state.projects().iter().all(|p| p.id != doomed.id));
        assert!(state.projects().iter().any(|p| p.id == keep.id));
        assert!(store.list_invoices().await.unwrap().is_empty());
        assert_eq!(notifier.latest().unwrap().kind, ToastKind::Success);
    }

    #[tokio::test]
    async fn failed_delete_keeps_state_and_notifies_once() {
        let store = MemoryStore::new();
        let project = store.project("Mobile App", "active");
        let (mut state, mut notifier) = loaded(&store).await;
        let before = state.projects().to_vec();

        store.set_failing(true);
        delete_project(&store, &mut state, &mut notifier, project.id).await;

        assert_eq!(state.projects(), before.as_slice());
        assert_eq!(notifier.len(), 1);
        assert_eq!(notifier.of_kind(ToastKind::Error).len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let store = MemoryStore::new();
        store.project("Mobile App", "active");
        let (mut state, mut notifier) = loaded(&store).await;

        store.set_failing(true);
        assert!(!state.refresh(&store, &mut notifier).await);

        assert_eq!(state.projects().len(), 1);
        assert_eq!(notifier.latest().unwrap().description, "Failed to load projects");
    }

    #[tokio::test]
    async fn status_cycles_through_the_store() {
        let store = MemoryStore::new();
        let project = store.project("Mobile App", "active");
        let (mut state, mut notifier) = loaded(&store).await;

        cycle_status(&store, &mut state, &mut notifier, project.id).await;

        assert_eq!(state.selected_project().unwrap().status, "completed");
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let store = MemoryStore::new();
        let project = store.project("Mobile App", "active");
        let (mut state, _) = loaded(&store).await;

        assert_eq!(handle_input(&mut state, KeyCode::Char('d')), None);
        assert!(state.is_modal());
        assert_eq!(handle_input(&mut state, KeyCode::Char('e')), None);
        assert_eq!(
            handle_input(&mut state, KeyCode::Char('y')),
            Some(ProjectAction::DeleteProject(project.id))
        );
        assert!(!state.is_modal());
    }

    #[tokio::test]
    async fn renders_project_details() {
        let store = MemoryStore::new();
        store.project("Mobile App", "progress");
        let (mut state, _) = loaded(&store).await;
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();

        terminal.draw(|f| render_projects(f, f.size(), &mut state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Mobile App"));
        assert!(text.contains("[In Progress]"));
        assert!(text.contains("Mobile App description"));
    }

    #[tokio::test]
    async fn failed_first_load_shows_the_empty_list() {
        let store = MemoryStore::new();
        store.project("Mobile App", "active");
        store.set_failing(true);
        let mut state = ProjectsState::new();
        let mut notifier = Notifier::new();

        assert!(!state.refresh(&store, &mut notifier).await);
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal.draw(|f| render_projects(f, f.size(), &mut state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(!text.contains("Loading..."));
        assert!(text.contains("No projects yet."));
        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn empty_list_before_loading_says_so() {
        let mut state = ProjectsState::new();
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();

        terminal.draw(|f| render_projects(f, f.size(), &mut state)).unwrap();

        assert!(buffer_text(&terminal).contains("Loading..."));
    }
}

use crossterm::event::KeyCode;
use tracing::error;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::{Invoice, Project};
use crate::stats::{InvoiceTotals, ProjectStats};
use crate::store::Store;
use crate::ui::components::project_card::render_project_card;
use crate::ui::components::stat_card::{render_stat_card, Trend};
use crate::ui::components::toast::Notifier;
use crate::ui::components::{clamp_index, next_index, previous_index};

const CARD_HEIGHT: u16 = 6;

pub struct DashboardState {
    projects: Vec<Project>,
    invoices: Vec<Invoice>,
    selected: Option<usize>,
    loaded: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
            invoices: Vec::new(),
            selected: None,
            loaded: false,
        }
    }

    pub async fn refresh<S: Store>(&mut self, store: &S, notifier: &mut Notifier) -> bool {
        let loaded = async { Ok::<_, anyhow::Error>((store.list_projects().await?, store.list_invoices().await?)) };

        match loaded.await {
            Ok((projects, invoices)) => {
                self.projects = projects;
                self.invoices = invoices;
                self.loaded = true;
                self.selected = clamp_index(self.selected, self.open_projects().len());
                true
            }
            Err(err) => {
                error!(error = %err, "failed to load dashboard");
                notifier.error("Failed to load projects");
                self.loaded = true;
                false
            }
        }
    }

    pub fn stats(&self) -> ProjectStats {
        ProjectStats::from_projects(&self.projects)
    }

    /// Projects shown as cards: everything not yet completed.
    pub fn open_projects(&self) -> Vec<&Project> {
        self.projects.iter().filter(|p| !p.is_completed()).collect()
    }

    /// Paid share of what has been billed for one project.
    pub fn progress(&self, project: &Project) -> u16 {
        if project.is_completed() {
            return 100;
        }
        let invoices: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|i| i.project_id == project.id)
            .cloned()
            .collect();
        InvoiceTotals::from_invoices(&invoices).paid_percent()
    }

    pub fn selected_project_id(&self) -> Option<i32> {
        self.selected
            .and_then(|i| self.open_projects().get(i).map(|p| p.id))
    }
}

#[derive(Debug, PartialEq)]
pub enum DashboardAction {
    OpenProject(i32), // Contains project_id
    ViewAllProjects,
}

pub fn render_dashboard<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &DashboardState,
    user: &str,
    support_phone: Option<&str>,
) {
    let banner_height = if support_phone.is_some() { 4 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(banner_height),
        ].as_ref())
        .split(area);

    let greeting = Paragraph::new(vec![
        Spans::from(Span::styled(
            format!("Welcome back, {user}"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::styled(
            "Here's what's happening with your projects.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(greeting, chunks[0]);

    render_stats(frame, chunks[1], &state.stats());
    render_cards(frame, chunks[2], state);

    if let Some(phone) = support_phone {
        let banner = Paragraph::new(vec![
            Spans::from(Span::styled(
                "Need help with your project?",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Spans::from(format!("Call us: {phone}")),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
        frame.render_widget(banner, chunks[3]);
    }
}

fn render_stats<B: Backend>(frame: &mut Frame<B>, area: Rect, stats: &ProjectStats) {
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ].as_ref())
        .split(area);

    let pending = format!("{} pending", stats.pending);
    render_stat_card(frame, tiles[0], "Total Projects", &stats.total.to_string(), None);
    render_stat_card(frame, tiles[1], "Completed", &stats.completed.to_string(), None);
    render_stat_card(
        frame,
        tiles[2],
        "In Progress",
        &stats.in_progress.to_string(),
        (stats.pending > 0).then(|| Trend { text: &pending, up: false }),
    );
    render_stat_card(frame, tiles[3], "Success Rate", &format!("{}%", stats.success_rate()), None);
}

fn render_cards<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState) {
    let block = Block::default().title("Active Projects").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let projects = state.open_projects();
    if projects.is_empty() {
        let text = if state.loaded { "No active projects." } else { "Loading..." };
        frame.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Gray)), inner);
        return;
    }

    // Two cards per row, scrolled so the selected one stays visible.
    let rows_visible = (inner.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = state.selected.unwrap_or(0) / 2;
    let first_row = selected_row.saturating_sub(rows_visible - 1);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); rows_visible])
        .split(inner);

    for (row, row_area) in row_areas.iter().enumerate() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)].as_ref())
            .split(*row_area);

        for (column, card_area) in columns.iter().enumerate() {
            let index = (first_row + row) * 2 + column;
            if let Some(project) = projects.get(index) {
                let selected = state.selected == Some(index);
                render_project_card(frame, *card_area, project, state.progress(project), selected);
            }
        }
    }
}

pub fn help_text() -> &'static str {
    "<Arrows> Select | <Enter> Open Project | <A> All Projects | <1-4> Navigate | <Q> Quit"
}

pub fn handle_input(state: &mut DashboardState, key: KeyCode) -> Option<DashboardAction> {
    let len = state.open_projects().len();
    match key {
        KeyCode::Right | KeyCode::Down | KeyCode::Tab => state.selected = next_index(state.selected, len),
        KeyCode::Left | KeyCode::Up | KeyCode::BackTab => state.selected = previous_index(state.selected, len),
        KeyCode::Enter => return state.selected_project_id().map(DashboardAction::OpenProject),
        KeyCode::Char('a') => return Some(DashboardAction::ViewAllProjects),
        _ => {}
    }
    None
}

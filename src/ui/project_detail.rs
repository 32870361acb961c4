use chrono::NaiveDate;
use crossterm::event::KeyCode;
use tracing::error;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::models::{Invoice, Project};
use crate::stats::{format_amount, InvoiceTotals};
use crate::store::Store;
use crate::ui::components::stat_card::render_stat_card;
use crate::ui::components::status_badge::badge;
use crate::ui::components::toast::Notifier;

pub struct ProjectDetailState {
    project: Project,
    invoices: Vec<Invoice>,
    message_count: usize,
}

impl ProjectDetailState {
    /// Fetch a project with its invoices and message count.
    pub async fn open<S: Store>(store: &S, project_id: i32, notifier: &mut Notifier) -> Option<Self> {
        match fetch(store, project_id).await {
            Ok((project, invoices, message_count)) => Some(Self { project, invoices, message_count }),
            Err(err) => {
                error!(project_id, error = %err, "failed to load project");
                notifier.error("Failed to load project");
                None
            }
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    #[cfg(test)]
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    #[cfg(test)]
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_invoices(&self.invoices)
    }

    /// Earliest due date among invoices not yet paid, with its number.
    pub fn next_due(&self) -> Option<(NaiveDate, &str)> {
        self.invoices
            .iter()
            .filter(|i| !i.is_paid())
            .filter_map(|i| i.due_date.map(|due| (due, i.invoice_number.as_str())))
            .min_by_key(|(due, _)| *due)
    }
}

async fn fetch<S: Store>(store: &S, project_id: i32) -> anyhow::Result<(Project, Vec<Invoice>, usize)> {
    let project = store.get_project(project_id).await?;
    let invoices = store.list_invoices_by_project(project_id).await?;
    let messages = store.list_messages(project_id).await?;
    Ok((project, invoices, messages.len()))
}

#[derive(Debug, PartialEq)]
pub enum ProjectDetailAction {
    Back,
    OpenMessages(i32), // Contains project_id
    NewInvoice(i32),   // Contains project_id
    EditProject(i32),  // Contains project_id
}

pub fn render_project_detail<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &ProjectDetailState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
        ].as_ref())
        .split(area);

    let project = &state.project;
    let mut header = vec![Spans::from(vec![
        Span::styled(project.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        badge(&project.status),
    ])];
    if let Some(description) = &project.description {
        header.push(Spans::from(Span::styled(description.clone(), Style::default().fg(Color::Gray))));
    }
    let header = Paragraph::new(header)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let totals = state.totals();
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ].as_ref())
        .split(chunks[1]);

    let next_due = match state.next_due() {
        Some((due, number)) => format!("{} ({})", due.format("%b %-d"), number),
        None => "Nothing due".to_string(),
    };
    render_stat_card(frame, tiles[0], "Invoices", &totals.count.to_string(), None);
    render_stat_card(frame, tiles[1], "Next Due", &next_due, None);
    render_stat_card(frame, tiles[2], "Messages", &state.message_count.to_string(), None);

    let gauge = Gauge::default()
        .block(Block::default().title("Payment Progress").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(totals.paid_percent())
        .label(format!(
            "{}% of {} paid",
            totals.paid_percent(),
            format_amount(totals.total_billed)
        ));
    frame.render_widget(gauge, chunks[2]);

    let items: Vec<ListItem> = if state.invoices.is_empty() {
        vec![ListItem::new("No invoices yet.")]
    } else {
        state
            .invoices
            .iter()
            .map(|invoice| {
                let due = invoice
                    .due_date
                    .map(|d| format!(" due {}", d.format("%b %-d, %Y")))
                    .unwrap_or_default();
                ListItem::new(Spans::from(vec![
                    Span::styled(invoice.invoice_number.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!(
                        "  {}{}  ",
                        invoice.amount.map(format_amount).unwrap_or_else(|| "-".to_string()),
                        due
                    )),
                    badge(&invoice.status),
                ]))
            })
            .collect()
    };

    let list = List::new(items).block(Block::default().title("Invoices").borders(Borders::ALL));
    frame.render_widget(list, chunks[3]);
}

pub fn help_text() -> &'static str {
    "<M> Messages | <I> New Invoice | <E> Edit Project | <Esc> Back | <1-4> Navigate | <Q> Quit"
}

pub fn handle_input(state: &ProjectDetailState, key: KeyCode) -> Option<ProjectDetailAction> {
    let id = state.project.id;
    match key {
        KeyCode::Esc | KeyCode::Backspace => Some(ProjectDetailAction::Back),
        KeyCode::Char('m') => Some(ProjectDetailAction::OpenMessages(id)),
        KeyCode::Char('i') => Some(ProjectDetailAction::NewInvoice(id)),
        KeyCode::Char('e') => Some(ProjectDetailAction::EditProject(id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::ui::test_support::buffer_text;
    use tui::{backend::TestBackend, Terminal};

    #[tokio::test]
    async fn loads_only_this_projects_rows() {
        let store = MemoryStore::new();
        let shop = store.project("E-commerce Redesign", "progress");
        let other = store.project("SEO Optimization", "completed");
        store.invoice(shop.id, "INV-001", Some(250.0), "paid");
        store.invoice(shop.id, "INV-003", Some(250.0), "pending");
        store.invoice(other.id, "INV-004", Some(90.0), "paid");
        store.message(shop.id, "Sarah", "Design phase done");
        store.message(other.id, "You", "Thanks");

        let state = ProjectDetailState::open(&store, shop.id, &mut Notifier::new()).await.unwrap();

        assert_eq!(state.project().name, "E-commerce Redesign");
        assert_eq!(state.invoices().len(), 2);
        assert_eq!(state.message_count(), 1);
        assert_eq!(state.totals().paid_percent(), 50);
    }

    #[tokio::test]
    async fn next_due_includes_drafts_but_not_paid() {
        let store = MemoryStore::new();
        let shop = store.project("E-commerce Redesign", "progress");
        let due = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        let mut paid = store.invoice(shop.id, "INV-001", Some(10.0), "paid");
        paid.due_date = due(2025, 11, 5);
        store.save_invoice(&paid).await.unwrap();
        let mut draft = store.invoice(shop.id, "INV-002", Some(10.0), "draft");
        draft.due_date = due(2025, 11, 20);
        store.save_invoice(&draft).await.unwrap();
        let mut pending = store.invoice(shop.id, "INV-003", Some(10.0), "pending");
        pending.due_date = due(2025, 12, 1);
        store.save_invoice(&pending).await.unwrap();

        let state = ProjectDetailState::open(&store, shop.id, &mut Notifier::new()).await.unwrap();

        assert_eq!(state.next_due(), Some((due(2025, 11, 20).unwrap(), "INV-002")));
    }

    #[tokio::test]
    async fn missing_project_notifies_once() {
        let store = MemoryStore::new();
        let mut notifier = Notifier::new();

        assert!(ProjectDetailState::open(&store, 42, &mut notifier).await.is_none());
        assert_eq!(notifier.len(), 1);
    }

    #[tokio::test]
    async fn renders_header_and_invoices() {
        let store = MemoryStore::new();
        let shop = store.project("E-commerce Redesign", "progress");
        store.invoice(shop.id, "INV-001", Some(250_400.0), "paid");
        let state = ProjectDetailState::open(&store, shop.id, &mut Notifier::new()).await.unwrap();
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();

        terminal.draw(|f| render_project_detail(f, f.size(), &state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("E-commerce Redesign [In Progress]"));
        assert!(text.contains("INV-001"));
        assert!(text.contains("250,400.00"));
        assert!(text.contains("[Paid]"));
    }

    #[tokio::test]
    async fn keys_map_to_actions() {
        let store = MemoryStore::new();
        let shop = store.project("Mobile App", "active");
        let state = ProjectDetailState::open(&store, shop.id, &mut Notifier::new()).await.unwrap();

        assert_eq!(handle_input(&state, KeyCode::Char('m')), Some(ProjectDetailAction::OpenMessages(shop.id)));
        assert_eq!(handle_input(&state, KeyCode::Esc), Some(ProjectDetailAction::Back));
        assert_eq!(handle_input(&state, KeyCode::Char('x')), None);
    }
}

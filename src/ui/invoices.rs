use std::collections::HashMap;

use crossterm::event::KeyCode;
use tracing::{error, info};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::{next_status, Invoice, Project, INVOICE_STATUSES};
use crate::stats::{format_amount, InvoiceTotals};
use crate::store::Store;
use crate::ui::components::confirm::render_confirmation;
use crate::ui::components::stat_card::render_stat_card;
use crate::ui::components::status_badge::badge;
use crate::ui::components::toast::Notifier;
use crate::ui::components::{clamp_index, next_index, previous_index};

// Represents the state of the invoice ledger screen
pub struct InvoicesState {
    invoices: Vec<Invoice>,
    project_names: HashMap<i32, String>,
    projects: Vec<Project>,
    table_state: TableState,
    show_delete_confirmation: bool,
    loaded: bool,
}

impl Default for InvoicesState {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoicesState {
    pub fn new() -> Self {
        Self {
            invoices: Vec::new(),
            project_names: HashMap::new(),
            projects: Vec::new(),
            table_state: TableState::default(),
            show_delete_confirmation: false,
            loaded: false,
        }
    }

    #[cfg(test)]
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    /// Projects loaded alongside the ledger, for the invoice form.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_invoices(&self.invoices)
    }

    pub fn project_name(&self, project_id: i32) -> &str {
        self.project_names
            .get(&project_id)
            .map(String::as_str)
            .unwrap_or("Unknown project")
    }

    /// Re-request invoices and project names. Nothing changes unless both
    /// requests succeed.
    pub async fn refresh<S: Store>(&mut self, store: &S, notifier: &mut Notifier) -> bool {
        let loaded = async { Ok::<_, anyhow::Error>((store.list_invoices().await?, store.list_projects().await?)) };

        match loaded.await {
            Ok((invoices, projects)) => {
                self.project_names = projects.iter().map(|p| (p.id, p.name.clone())).collect();
                self.projects = projects;
                self.invoices = invoices;
                self.loaded = true;
                self.table_state
                    .select(clamp_index(self.table_state.selected(), self.invoices.len()));
                true
            }
            Err(err) => {
                error!(error = %err, "failed to load invoices");
                notifier.error("Failed to load invoices");
                self.loaded = true;
                false
            }
        }
    }

    pub fn next(&mut self) {
        self.table_state
            .select(next_index(self.table_state.selected(), self.invoices.len()));
    }

    pub fn previous(&mut self) {
        self.table_state
            .select(previous_index(self.table_state.selected(), self.invoices.len()));
    }

    pub fn selected_invoice(&self) -> Option<&Invoice> {
        self.table_state.selected().and_then(|i| self.invoices.get(i))
    }

    pub fn selected_invoice_id(&self) -> Option<i32> {
        self.selected_invoice().map(|i| i.id)
    }

    pub fn is_modal(&self) -> bool {
        self.show_delete_confirmation
    }
}

#[derive(Debug, PartialEq)]
pub enum InvoiceAction {
    NewInvoice,
    EditInvoice(i32),   // Contains invoice_id
    CycleStatus(i32),   // Contains invoice_id
    DeleteInvoice(i32), // Contains invoice_id
}

// DB operations for invoices

pub async fn cycle_status<S: Store>(store: &S, state: &mut InvoicesState, notifier: &mut Notifier, id: i32) {
    let Some(invoice) = state.invoices.iter().find(|i| i.id == id) else {
        return;
    };
    let status = next_status(INVOICE_STATUSES, &invoice.status);

    match store.update_invoice_status(id, &status).await {
        Ok(()) => {
            info!(invoice_id = id, status = %status, "invoice status changed");
            state.refresh(store, notifier).await;
        }
        Err(err) => {
            error!(invoice_id = id, error = %err, "failed to update invoice status");
            notifier.error("Failed to update invoice status");
        }
    }
}

pub async fn delete_invoice<S: Store>(store: &S, state: &mut InvoicesState, notifier: &mut Notifier, id: i32) {
    match store.delete_invoice(id).await {
        Ok(()) => {
            notifier.success("Invoice deleted", "The invoice was removed");
            state.refresh(store, notifier).await;
        }
        Err(err) => {
            error!(invoice_id = id, error = %err, "failed to delete invoice");
            notifier.error("Failed to delete invoice");
        }
    }
}

pub fn render_invoices<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut InvoicesState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)].as_ref())
        .split(area);

    render_summary(frame, chunks[0], &state.totals());

    if !state.loaded {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().title("Invoice History").borders(Borders::ALL));
        frame.render_widget(loading, chunks[1]);
        return;
    }

    // Define the header cells
    let header_cells = ["Number", "Project", "Amount", "Due Date", "Status"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = state
        .invoices
        .iter()
        .map(|invoice| {
            let amount = invoice.amount.map(format_amount).unwrap_or_else(|| "-".to_string());
            let due_date = invoice
                .due_date
                .map(|d| d.format("%b %-d, %Y").to_string())
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(invoice.invoice_number.clone()),
                Cell::from(state.project_name(invoice.project_id).to_string()),
                Cell::from(amount),
                Cell::from(due_date),
                Cell::from(Spans::from(badge(&invoice.status))),
            ])
        })
        .collect();

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Invoice History").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Percentage(15),
            Constraint::Percentage(35),
            Constraint::Percentage(18),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
        ]);

    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            area,
            "Confirm Delete",
            &["Are you sure you want to delete this invoice?"],
        );
    }
}

fn render_summary<B: Backend>(frame: &mut Frame<B>, area: Rect, totals: &InvoiceTotals) {
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ].as_ref())
        .split(area);

    render_stat_card(frame, tiles[0], "Total Paid", &format_amount(totals.total_paid), None);
    render_stat_card(frame, tiles[1], "Pending", &format_amount(totals.total_pending), None);

    let next = match &totals.next_payment {
        Some((due, number)) => format!("{} ({})", due.format("%b %-d, %Y"), number),
        None => "Nothing due".to_string(),
    };
    render_stat_card(frame, tiles[2], "Next Payment", &next, None);
}

pub fn help_text(state: &InvoicesState) -> &'static str {
    if state.selected_invoice().is_some() {
        "<N> New | <E> Edit | <S> Cycle Status | <D> Delete | <1-4> Navigate | <Q> Quit"
    } else {
        "<N> New Invoice | <1-4> Navigate | <Q> Quit"
    }
}

pub fn handle_input(state: &mut InvoicesState, key: KeyCode) -> Option<InvoiceAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                state.show_delete_confirmation = false;
                return state.selected_invoice_id().map(InvoiceAction::DeleteInvoice);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.show_delete_confirmation = false;
            }
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('n') => return Some(InvoiceAction::NewInvoice),
        KeyCode::Char('e') => return state.selected_invoice_id().map(InvoiceAction::EditInvoice),
        KeyCode::Char('s') => return state.selected_invoice_id().map(InvoiceAction::CycleStatus),
        KeyCode::Char('d') => {
            if state.selected_invoice().is_some() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        _ => {}
    }
    None
}

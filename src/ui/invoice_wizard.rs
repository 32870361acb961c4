use chrono::NaiveDate;
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
use crate::models::{next_status, Invoice, Project, INVOICE_STATUSES};
use crate::store::Store;
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::status_badge::badge;
use crate::ui::components::text_input::TextInput;
use crate::ui::components::toast::Notifier;

#[derive(Debug, PartialEq)]
pub enum InvoiceWizardAction {
    Cancel,
    Save,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InvoiceField {
    Project,
    Number,
    Amount,
    DueDate,
    Status,
    Notes,
}

const FIELDS: [InvoiceField; 6] = [
    InvoiceField::Project,
    InvoiceField::Number,
    InvoiceField::Amount,
    InvoiceField::DueDate,
    InvoiceField::Status,
    InvoiceField::Notes,
];

impl InvoiceField {
    fn label(self) -> &'static str {
        match self {
            InvoiceField::Project => "Project",
            InvoiceField::Number => "Invoice Number",
            InvoiceField::Amount => "Amount",
            InvoiceField::DueDate => "Due Date",
            InvoiceField::Status => "Status",
            InvoiceField::Notes => "Notes",
        }
    }

    /// Fields changed with Left/Right instead of typed into.
    fn is_picker(self) -> bool {
        matches!(self, InvoiceField::Project | InvoiceField::Status)
    }
}

pub struct InvoiceWizardState {
    invoice: Invoice,
    projects: Vec<Project>,
    project_index: Option<usize>,
    number: TextInput,
    amount: TextInput,
    due_date: DateInputState,
    status: String,
    notes: TextInput,
    pub current_field: InvoiceField,
    pub editing: bool,
}

impl InvoiceWizardState {
    /// Blank invoice. `project_id` preselects a project, otherwise the first
    /// listed one is picked.
    pub fn new(projects: Vec<Project>, project_id: Option<i32>, today: NaiveDate) -> Self {
        let project_id = project_id.or_else(|| projects.first().map(|p| p.id)).unwrap_or(0);
        Self::from_existing(Invoice::draft(project_id), projects, today)
    }

    /// Edit form for a stored invoice. If its project is not among `projects`
    /// nothing is selected, so saving fails instead of moving the invoice.
    pub fn from_existing(invoice: Invoice, projects: Vec<Project>, today: NaiveDate) -> Self {
        let project_index = projects.iter().position(|p| p.id == invoice.project_id);

        Self {
            number: TextInput::new(invoice.invoice_number.clone()),
            amount: TextInput::new(invoice.amount.map(|a| a.to_string()).unwrap_or_default()),
            due_date: DateInputState::new(invoice.due_date, today),
            status: invoice.status.clone(),
            notes: TextInput::new(invoice.notes.clone().unwrap_or_default()),
            invoice,
            projects,
            project_index,
            current_field: InvoiceField::Project,
            editing: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.invoice.id == 0
    }

    fn selected_project(&self) -> Option<&Project> {
        self.project_index.and_then(|i| self.projects.get(i))
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.due_date
            .set_editing(self.editing && self.current_field == InvoiceField::DueDate);
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

    fn pick(&mut self, forward: bool) {
        match self.current_field {
            InvoiceField::Project if !self.projects.is_empty() => {
                let len = self.projects.len();
                let i = self.project_index.unwrap_or(0);
                self.project_index = Some(if forward { (i + 1) % len } else { (i + len - 1) % len });
            }
            InvoiceField::Status => {
                self.status = if forward {
                    next_status(INVOICE_STATUSES, &self.status)
                } else {
                    // Two steps forward in a cycle of three is one step back.
                    let once = next_status(INVOICE_STATUSES, &self.status);
                    next_status(INVOICE_STATUSES, &once)
                };
            }
            _ => {}
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        match self.current_field {
            InvoiceField::Number => self.number.handle_key(key),
            InvoiceField::Amount => self.amount.handle_key(key),
            InvoiceField::Notes => self.notes.handle_key(key),
            InvoiceField::DueDate => self.due_date.handle_input(key),
            InvoiceField::Project | InvoiceField::Status => {}
        }
    }

    pub fn build(&self) -> Result<Invoice, FormError> {
        let project = self.selected_project().ok_or(FormError::NoProject)?;
        let invoice_number = required("invoice number", self.number.value())?;

        let amount = match optional(self.amount.value()) {
            None => None,
            // `parse` accepts NaN and infinities; neither is an amount.
            Some(raw) => match raw.replace(',', "").parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => return Err(FormError::InvalidNumber { field: "Amount", value: raw }),
            },
        };

        Ok(Invoice {
            project_id: project.id,
            invoice_number,
            amount,
            due_date: self.due_date.date(),
            status: self.status.clone(),
            notes: optional(self.notes.value()),
            ..self.invoice.clone()
        })
    }

    fn display_value(&self, field: InvoiceField) -> String {
        let focused = field == self.current_field && self.editing;
        let text = |input: &TextInput| {
            if focused { input.display_with_cursor() } else { input.value().to_string() }
        };
        match field {
            InvoiceField::Project => self
                .selected_project()
                .map(|p| format!("< {} >", p.name))
                .unwrap_or_else(|| "No projects yet".to_string()),
            InvoiceField::Number => text(&self.number),
            InvoiceField::Amount => text(&self.amount),
            InvoiceField::DueDate => self.due_date.get_display_string(),
            InvoiceField::Status => String::new(),
            InvoiceField::Notes => text(&self.notes),
        }
    }
}

/// Validate and write the form. Returns true once the row is stored.
pub async fn save_invoice<S: Store>(store: &S, state: &InvoiceWizardState, notifier: &mut Notifier) -> bool {
    let invoice = match state.build() {
        Ok(invoice) => invoice,
        Err(err) => {
            notifier.warning("Check the form", err.to_string());
            return false;
        }
    };

    match store.save_invoice(&invoice).await {
        Ok(_) => {
            notifier.success("Invoice saved", format!("{} saved", invoice.invoice_number));
            true
        }
        Err(err) => {
            error!(invoice_id = invoice.id, project_id = invoice.project_id, error = %err, "failed to save invoice");
            notifier.error("Failed to save invoice");
            false
        }
    }
}

pub fn render_invoice_wizard<B: Backend>(f: &mut Frame<B>, area: Rect, state: &InvoiceWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)].as_ref())
        .split(area);

    let title_text = if state.is_new() { "New Invoice" } else { "Edit Invoice" };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|field| {
            let focused = *field == state.current_field;
            let label_style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value = if *field == InvoiceField::Status {
                badge(&state.status)
            } else {
                let style = if focused && state.editing {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Span::styled(state.display_value(*field), style)
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label()), label_style),
                value,
            ]))
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Invoice Details"));
    f.render_widget(form, chunks[1]);
}

pub fn help_text(state: &InvoiceWizardState) -> &'static str {
    if state.editing {
        match state.current_field {
            InvoiceField::DueDate => {
                "Digits - Type | Left/Right - Date part | Up/Down - Step | Del - Clear | Enter - Done"
            }
            _ => "Enter - Save field | Esc - Stop editing",
        }
    } else if state.current_field.is_picker() {
        "Left/Right - Change | Up/Down - Navigate fields | S - Save invoice | Esc - Cancel"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save invoice | Esc - Cancel"
    }
}

pub fn handle_input(state: &mut InvoiceWizardState, key: KeyCode) -> Option<InvoiceWizardAction> {
    if state.editing {
        match key {
            KeyCode::Enter | KeyCode::Esc => state.toggle_editing(),
            _ => state.edit_current_field(key),
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(InvoiceWizardAction::Cancel),
        KeyCode::Enter if !state.current_field.is_picker() => state.toggle_editing(),
        KeyCode::Left => state.pick(false),
        KeyCode::Right => state.pick(true),
        KeyCode::Up => state.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Char('s') => return Some(InvoiceWizardAction::Save),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::ui::components::toast::ToastKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
    }

    fn go_to(state: &mut InvoiceWizardState, field: InvoiceField) {
        while state.current_field != field {
            handle_input(state, KeyCode::Down);
        }
    }

    fn type_into(state: &mut InvoiceWizardState, field: InvoiceField, text: &str) {
        go_to(state, field);
        handle_input(state, KeyCode::Enter);
        for c in text.chars() {
            handle_input(state, KeyCode::Char(c));
        }
        handle_input(state, KeyCode::Enter);
    }

    #[tokio::test]
    async fn saves_a_complete_invoice() {
        let store = MemoryStore::new();
        let mut notifier = Notifier::new();
        let first = store.project("SEO Optimization", "completed");
        let second = store.project("Mobile App", "active");
        let projects = store.list_projects().await.unwrap();
        let mut state = InvoiceWizardState::new(projects, Some(second.id), today());

        handle_input(&mut state, KeyCode::Right);
        type_into(&mut state, InvoiceField::Number, "INV-004");
        type_into(&mut state, InvoiceField::Amount, "91,800");
        type_into(&mut state, InvoiceField::DueDate, "20251214");
        go_to(&mut state, InvoiceField::Status);
        handle_input(&mut state, KeyCode::Right);

        assert!(save_invoice(&store, &state, &mut notifier).await);

        let invoices = store.list_invoices().await.unwrap();
        assert_eq!(invoices.len(), 1);
        let invoice = &invoices[0];
        assert_eq!(invoice.project_id, first.id);
        assert_eq!(invoice.invoice_number, "INV-004");
        assert_eq!(invoice.amount, Some(91_800.0));
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2025, 12, 14));
        assert_eq!(invoice.status, "pending");
    }

    #[tokio::test]
    async fn amount_and_due_date_are_optional() {
        let store = MemoryStore::new();
        let mut notifier = Notifier::new();
        let project = store.project("Mobile App", "active");
        let mut state = InvoiceWizardState::new(vec![project], None, today());
        type_into(&mut state, InvoiceField::Number, "INV-010");

        let invoice = state.build().unwrap();

        assert_eq!(invoice.amount, None);
        assert_eq!(invoice.due_date, None);
        assert_eq!(invoice.status, "draft");
        assert!(save_invoice(&store, &state, &mut notifier).await);
    }

    #[test]
    fn rejects_bad_amounts() {
        let mut state = InvoiceWizardState::new(vec![Project { id: 3, ..Project::draft() }], None, today());
        type_into(&mut state, InvoiceField::Number, "INV-1");
        type_into(&mut state, InvoiceField::Amount, "lots");

        assert_eq!(
            state.build(),
            Err(FormError::InvalidNumber { field: "Amount", value: "lots".to_string() })
        );
    }

    #[test]
    fn rejects_non_finite_amounts() {
        for raw in ["NaN", "inf", "-infinity"] {
            let mut state = InvoiceWizardState::new(vec![Project { id: 3, ..Project::draft() }], None, today());
            type_into(&mut state, InvoiceField::Number, "INV-1");
            type_into(&mut state, InvoiceField::Amount, raw);

            assert_eq!(
                state.build(),
                Err(FormError::InvalidNumber { field: "Amount", value: raw.to_string() })
            );
        }
    }

    #[tokio::test]
    async fn needs_a_project_and_number() {
        let store = MemoryStore::new();
        let mut notifier = Notifier::new();
        let state = InvoiceWizardState::new(Vec::new(), None, today());

        assert_eq!(state.build(), Err(FormError::NoProject));
        assert!(!save_invoice(&store, &state, &mut notifier).await);
        assert_eq!(store.writes(), 0);
        assert_eq!(notifier.latest().unwrap().kind, ToastKind::Warning);

        let state = InvoiceWizardState::new(vec![Project { id: 3, ..Project::draft() }], None, today());
        assert_eq!(state.build(), Err(FormError::MissingField("invoice number")));
    }

    #[tokio::test]
    async fn editing_keeps_an_unlisted_project_unselected() {
        let store = MemoryStore::new();
        let listed = store.project("Mobile App", "active");
        let mut invoice = Invoice::draft(99);
        invoice.id = 7;
        invoice.invoice_number = "INV-007".to_string();

        let state = InvoiceWizardState::from_existing(invoice, vec![listed], today());

        assert_eq!(state.build(), Err(FormError::NoProject));
        assert!(!save_invoice(&store, &state, &mut Notifier::new()).await);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn blank_form_picks_the_first_project() {
        let projects = vec![Project { id: 5, ..Project::draft() }, Project { id: 6, ..Project::draft() }];
        let mut state = InvoiceWizardState::new(projects, None, today());
        type_into(&mut state, InvoiceField::Number, "INV-1");

        assert_eq!(state.build().unwrap().project_id, 5);
    }

    #[test]
    fn status_picker_steps_both_ways() {
        let mut state = InvoiceWizardState::new(Vec::new(), None, today());
        go_to(&mut state, InvoiceField::Status);
        handle_input(&mut state, KeyCode::Left);
        assert_eq!(state.status, "paid");
        handle_input(&mut state, KeyCode::Right);
        assert_eq!(state.status, "draft");
    }
}

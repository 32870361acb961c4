//! Aggregates derived from whatever rows a screen currently holds.

use chrono::NaiveDate;

use crate::models::{Invoice, Project};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProjectStats {
    pub total: usize,
    pub completed: usize,
    /// Projects that are not completed and not pending.
    pub in_progress: usize,
    pub pending: usize,
}

impl ProjectStats {
    pub fn from_projects(projects: &[Project]) -> Self {
        let count = |status: &str| projects.iter().filter(|p| p.status == status).count();
        let completed = count("completed");
        let pending = count("pending");

        Self {
            total: projects.len(),
            completed,
            in_progress: projects.len() - completed - pending,
            pending,
        }
    }

    /// Completed share of all projects as a whole percent.
    pub fn success_rate(&self) -> u16 {
        percent(self.completed as f64, self.total as f64)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvoiceTotals {
    pub count: usize,
    pub total_paid: f64,
    /// Everything neither paid nor draft.
    pub total_pending: f64,
    /// Everything billed except drafts.
    pub total_billed: f64,
    /// Earliest due date among pending invoices, with its number.
    pub next_payment: Option<(NaiveDate, String)>,
}

impl InvoiceTotals {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let sum = |pred: fn(&Invoice) -> bool| {
            invoices
                .iter()
                .filter(|i| pred(i))
                .map(Invoice::amount_or_zero)
                .sum::<f64>()
        };

        let next_payment = invoices
            .iter()
            .filter(|i| i.is_pending())
            .filter_map(|i| i.due_date.map(|due| (due, i.invoice_number.clone())))
            .min_by_key(|(due, _)| *due);

        Self {
            count: invoices.len(),
            total_paid: sum(Invoice::is_paid),
            total_pending: sum(Invoice::is_outstanding),
            total_billed: sum(|i| !i.is_draft()),
            next_payment,
        }
    }

    /// Paid share of the billed amount as a whole percent.
    pub fn paid_percent(&self) -> u16 {
        percent(self.total_paid, self.total_billed)
    }
}

fn percent(part: f64, whole: f64) -> u16 {
    if whole <= 0.0 {
        return 0;
    }
    ((part / whole) * 100.0).round().clamp(0.0, 100.0) as u16
}

/// Format an amount with thousands separators and two decimals.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped}.{:02}", cents % 100)
}

mod project;
mod invoice;
mod message;

pub use project::{Project, PROJECT_STATUSES};
pub use invoice::{Invoice, INVOICE_STATUSES};
pub use message::Message;

/// Next value in a closed status cycle. Unknown statuses restart the cycle.
pub fn next_status(statuses: &[&str], current: &str) -> String {
    let next = statuses
        .iter()
        .position(|s| *s == current)
        .map(|i| (i + 1) % statuses.len())
        .unwrap_or(0);
    statuses.get(next).copied().unwrap_or(current).to_string()
}

use anyhow::Result;

use crate::models::{Invoice, Message, Project};

#[cfg(test)]
pub mod memory;

/// Table operations the screens are written against.
///
/// `Database` is the real implementation. Rows are always returned in the
/// order the screens display them: projects and invoices newest first,
/// messages oldest first.
#[allow(async_fn_in_trait)]
pub trait Store {
    // Project operations
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn get_project(&self, id: i32) -> Result<Project>;
    /// Inserts when `project.id == 0`, otherwise updates. Returns the row id.
    async fn save_project(&self, project: &Project) -> Result<i32>;
    async fn update_project_status(&self, id: i32, status: &str) -> Result<()>;
    /// Removes the project together with its invoices and messages.
    async fn delete_project(&self, id: i32) -> Result<()>;

    // Invoice operations
    async fn list_invoices(&self) -> Result<Vec<Invoice>>;
    async fn list_invoices_by_project(&self, project_id: i32) -> Result<Vec<Invoice>>;
    async fn save_invoice(&self, invoice: &Invoice) -> Result<i32>;
    async fn update_invoice_status(&self, id: i32, status: &str) -> Result<()>;
    async fn delete_invoice(&self, id: i32) -> Result<()>;

    // Message operations
    async fn list_messages(&self, project_id: i32) -> Result<Vec<Message>>;
    async fn send_message(&self, project_id: i32, sender: &str, content: &str) -> Result<Message>;
}

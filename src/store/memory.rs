//! In-memory `Store` used by screen tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Duration, TimeZone, Utc};

use super::Store;
use crate::models::{Invoice, Message, Project};

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    invoices: Vec<Invoice>,
    messages: Vec<Message>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

/// Creation times advance one minute per row so ordering is deterministic.
fn stamp(id: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 1, 9, 0, 0).unwrap() + Duration::minutes(id as i64)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every request fails as if the server were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of write requests that reached the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn project(&self, name: &str, status: &str) -> Project {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        let project = Project {
            id,
            name: name.to_string(),
            description: Some(format!("{name} description")),
            status: status.to_string(),
            message: None,
            invoice_url: None,
            created_at: stamp(id),
        };
        tables.projects.push(project.clone());
        project
    }

    pub fn invoice(&self, project_id: i32, number: &str, amount: Option<f64>, status: &str) -> Invoice {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        let invoice = Invoice {
            id,
            project_id,
            invoice_number: number.to_string(),
            amount,
            due_date: None,
            status: status.to_string(),
            notes: None,
            created_at: stamp(id),
        };
        tables.invoices.push(invoice.clone());
        invoice
    }

    pub fn message(&self, project_id: i32, sender: &str, content: &str) -> Message {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        let message = Message {
            id,
            project_id,
            sender: sender.to_string(),
            content: content.to_string(),
            created_at: stamp(id),
        };
        tables.messages.push(message.clone());
        message
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        Ok(())
    }

    fn write(&self) -> Result<()> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn newest_first<T: Clone>(rows: &[T], key: impl Fn(&T) -> (DateTime<Utc>, i32)) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|r| std::cmp::Reverse(key(r)));
    rows
}

impl Store for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(newest_first(&tables.projects, |p| (p.created_at, p.id)))
    }

    async fn get_project(&self, id: i32) -> Result<Project> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        tables
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("no project with id {id}"))
    }

    async fn save_project(&self, project: &Project) -> Result<i32> {
        self.write()?;
        let mut tables = self.tables.lock().unwrap();
        if project.id == 0 {
            let id = tables.next_id();
            let mut row = project.clone();
            row.id = id;
            row.created_at = stamp(id);
            tables.projects.push(row);
            Ok(id)
        } else {
            let row = tables
                .projects
                .iter_mut()
                .find(|p| p.id == project.id)
                .ok_or_else(|| anyhow!("no project with id {}", project.id))?;
            let created_at = row.created_at;
            *row = project.clone();
            row.created_at = created_at;
            Ok(project.id)
        }
    }

    async fn update_project_status(&self, id: i32, status: &str) -> Result<()> {
        self.write()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(row) = tables.projects.iter_mut().find(|p| p.id == id) {
            row.status = status.to_string();
        }
        Ok(())
    }

    async fn delete_project(&self, id: i32) -> Result<()> {
        self.write()?;
        let mut tables = self.tables.lock().unwrap();
        tables.invoices.retain(|i| i.project_id != id);
        tables.messages.retain(|m| m.project_id != id);
        tables.projects.retain(|p| p.id != id);
        Ok(())
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(newest_first(&tables.invoices, |i| (i.created_at, i.id)))
    }

    async fn list_invoices_by_project(&self, project_id: i32) -> Result<Vec<Invoice>> {
        Ok(self
            .list_invoices()
            .await?
            .into_iter()
            .filter(|i| i.project_id == project_id)
            .collect())
    }

    async fn save_invoice(&self, invoice: &Invoice) -> Result<i32> {
        self.write()?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.projects.iter().any(|p| p.id == invoice.project_id) {
            bail!("insert or update on table \"invoices\" violates foreign key constraint");
        }
        if invoice.id == 0 {
            let id = tables.next_id();
            let mut row = invoice.clone();
            row.id = id;
            row.created_at = stamp(id);
            tables.invoices.push(row);
            Ok(id)
        } else {
            let row = tables
                .invoices
                .iter_mut()
                .find(|i| i.id == invoice.id)
                .ok_or_else(|| anyhow!("no invoice with id {}", invoice.id))?;
            *row = invoice.clone();
            Ok(invoice.id)
        }
    }

    async fn update_invoice_status(&self, id: i32, status: &str) -> Result<()> {
        self.write()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(row) = tables.invoices.iter_mut().find(|i| i.id == id) {
            row.status = status.to_string();
        }
        Ok(())
    }

    async fn delete_invoice(&self, id: i32) -> Result<()> {
        self.write()?;
        self.tables.lock().unwrap().invoices.retain(|i| i.id != id);
        Ok(())
    }

    async fn list_messages(&self, project_id: i32) -> Result<Vec<Message>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| (m.created_at, m.id));
        Ok(rows)
    }

    async fn send_message(&self, project_id: i32, sender: &str, content: &str) -> Result<Message> {
        self.write()?;
        Ok(self.message(project_id, sender, content))
    }
}

mod realtime;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::models::{Invoice, Message, Project};
use crate::store::Store;

pub use realtime::{MessageFilter, MessageSubscription};

const PROJECT_COLUMNS: &str =
    "id, name, description, status, message, invoice_url, created_at";

const INVOICE_COLUMNS: &str = r#"
    id,
    project_id,
    invoice_number,
    amount::float8 AS amount,
    due_date,
    status,
    notes,
    created_at
"#;

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open a live feed of messages inserted for one project.
    pub async fn subscribe_messages(&self, project_id: i32) -> Result<MessageSubscription> {
        MessageSubscription::open(self.get_pool(), MessageFilter::project(project_id)).await
    }
}

impl Store for Database {
    // Project operations
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(self.get_pool())
        .await?;

        Ok(projects)
    }

    async fn get_project(&self, id: i32) -> Result<Project> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(self.get_pool())
        .await?;

        Ok(project)
    }

    async fn save_project(&self, project: &Project) -> Result<i32> {
        if project.id == 0 {
            let id = sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO projects (name, description, status, message, invoice_url)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(&project.name)
            .bind(&project.description)
            .bind(&project.status)
            .bind(&project.message)
            .bind(&project.invoice_url)
            .fetch_one(self.get_pool())
            .await?;

            info!(project_id = id, "project created");
            Ok(id)
        } else {
            sqlx::query(
                r#"
                UPDATE projects
                SET name = $1, description = $2, status = $3, message = $4, invoice_url = $5
                WHERE id = $6
                "#,
            )
            .bind(&project.name)
            .bind(&project.description)
            .bind(&project.status)
            .bind(&project.message)
            .bind(&project.invoice_url)
            .bind(project.id)
            .execute(self.get_pool())
            .await?;

            info!(project_id = project.id, "project updated");
            Ok(project.id)
        }
    }

    async fn update_project_status(&self, id: i32, status: &str) -> Result<()> {
        sqlx::query("UPDATE projects SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn delete_project(&self, id: i32) -> Result<()> {
        // Start a transaction
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM messages WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM invoices WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Finally delete the project
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(project_id = id, "project deleted");
        Ok(())
    }

    // Invoice operations
    async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC"
        ))
        .fetch_all(self.get_pool())
        .await?;

        Ok(invoices)
    }

    async fn list_invoices_by_project(&self, project_id: i32) -> Result<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE project_id = $1 ORDER BY created_at DESC"
        ))
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(invoices)
    }

    async fn save_invoice(&self, invoice: &Invoice) -> Result<i32> {
        if invoice.id == 0 {
            let id = sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO invoices (project_id, invoice_number, amount, due_date, status, notes)
                VALUES ($1, $2, $3::float8, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(invoice.project_id)
            .bind(&invoice.invoice_number)
            .bind(invoice.amount)
            .bind(invoice.due_date)
            .bind(&invoice.status)
            .bind(&invoice.notes)
            .fetch_one(self.get_pool())
            .await?;

            info!(invoice_id = id, project_id = invoice.project_id, "invoice created");
            Ok(id)
        } else {
            sqlx::query(
                r#"
                UPDATE invoices
                SET project_id = $1, invoice_number = $2, amount = $3::float8,
                    due_date = $4, status = $5, notes = $6
                WHERE id = $7
                "#,
            )
            .bind(invoice.project_id)
            .bind(&invoice.invoice_number)
            .bind(invoice.amount)
            .bind(invoice.due_date)
            .bind(&invoice.status)
            .bind(&invoice.notes)
            .bind(invoice.id)
            .execute(self.get_pool())
            .await?;

            info!(invoice_id = invoice.id, "invoice updated");
            Ok(invoice.id)
        }
    }

    async fn update_invoice_status(&self, id: i32, status: &str) -> Result<()> {
        sqlx::query("UPDATE invoices SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn delete_invoice(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        info!(invoice_id = id, "invoice deleted");
        Ok(())
    }

    // Message operations
    async fn list_messages(&self, project_id: i32) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, project_id, sender, content, created_at
            FROM messages
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(messages)
    }

    async fn send_message(&self, project_id: i32, sender: &str, content: &str) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (project_id, sender, content)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, sender, content, created_at
            "#,
        )
        .bind(project_id)
        .bind(sender)
        .bind(content)
        .fetch_one(self.get_pool())
        .await?;

        Ok(message)
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;

    if config.run_migrations {
        sqlx::migrate!().run(db.get_pool()).await?;
        info!("migrations applied");
    }

    Ok(db)
}

mod config;
mod db;
mod error;
mod models;
mod stats;
mod store;
mod telemetry;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};
use tui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};

use crate::config::{Args, Config};
use crate::db::{Database, MessageSubscription};
use crate::store::Store;
use crate::ui::{
    components::toast::Notifier,
    dashboard::{self, DashboardAction, DashboardState},
    invoice_wizard::{self, InvoiceWizardAction, InvoiceWizardState},
    invoices::{self, InvoiceAction, InvoicesState},
    layout::{render_shell, Shell},
    messages::{self, MessageAction, MessagesState},
    project_detail::{self, ProjectDetailAction, ProjectDetailState},
    project_wizard::{self, ProjectWizardAction, ProjectWizardState},
    projects::{self, ProjectAction, ProjectsState},
    Route,
};

/// How long to wait for a key before checking the live message feed.
const INPUT_POLL: Duration = Duration::from_millis(200);

// Represents the current screen in the app
#[derive(Clone, Copy, PartialEq)]
enum AppScreen {
    Dashboard,
    Projects,
    ProjectWizard(Option<i32>), // Contains the project_id to return to
    ProjectDetail,
    Invoices,
    InvoiceWizard(Option<i32>), // Contains the project_id to return to
    Messages,
}

// Main application state
struct AppState {
    db: Database,
    config: Config,
    screen: AppScreen,
    notifier: Notifier,
    /// Where Esc on the project detail screen leads.
    detail_back: Route,
    dashboard_state: Option<DashboardState>,
    projects_state: Option<ProjectsState>,
    project_wizard_state: Option<ProjectWizardState>,
    project_detail_state: Option<ProjectDetailState>,
    invoices_state: Option<InvoicesState>,
    invoice_wizard_state: Option<InvoiceWizardState>,
    messages_state: Option<MessagesState>,
    subscription: Option<MessageSubscription>,
}

impl AppState {
    fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config,
            screen: AppScreen::Dashboard,
            notifier: Notifier::new(),
            detail_back: Route::Dashboard,
            dashboard_state: None,
            projects_state: None,
            project_wizard_state: None,
            project_detail_state: None,
            invoices_state: None,
            invoice_wizard_state: None,
            messages_state: None,
            subscription: None,
        }
    }

    /// Sidebar entry highlighted for the current screen.
    fn route(&self) -> Route {
        match self.screen {
            AppScreen::Dashboard => Route::Dashboard,
            AppScreen::Projects | AppScreen::ProjectWizard(_) | AppScreen::ProjectDetail => Route::Projects,
            AppScreen::Invoices | AppScreen::InvoiceWizard(_) => Route::Invoices,
            AppScreen::Messages => Route::Messages,
        }
    }

    /// Whether the current screen is capturing text or a popup, so global
    /// shortcuts must not fire.
    fn is_modal(&self) -> bool {
        match self.screen {
            AppScreen::ProjectWizard(_) | AppScreen::InvoiceWizard(_) => true,
            AppScreen::Projects => self.projects_state.as_ref().is_some_and(|s| s.is_modal()),
            AppScreen::Invoices => self.invoices_state.as_ref().is_some_and(|s| s.is_modal()),
            AppScreen::Messages => self.messages_state.as_ref().is_some_and(|s| s.is_modal()),
            AppScreen::Dashboard | AppScreen::ProjectDetail => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = config::init(&args)?;
    telemetry::init(&config.log_file)?;
    println!("Initializing client hub...");

    // Initialize database connection
    let db = db::init(&config).await?;
    info!("database connection established");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and open the dashboard
    let mut app_state = AppState::new(db, config);
    navigate(&mut app_state, Route::Dashboard).await;

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "client hub stopped");
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        drain_live_messages(app_state);

        terminal.draw(|f| render(f, app_state))?;

        if !event::poll(INPUT_POLL)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app_state, key.code).await {
                break;
            }
        }
    }

    info!("client hub closed");
    Ok(())
}

fn drain_live_messages(app_state: &mut AppState) {
    if let (Some(subscription), Some(state)) = (&mut app_state.subscription, &mut app_state.messages_state) {
        let incoming = subscription.drain();
        if !incoming.is_empty() {
            state.receive(subscription.project_id(), incoming);
        }
    }
}

fn render<B: Backend>(f: &mut Frame<B>, app_state: &mut AppState) {
    let (title, help) = match app_state.screen {
        AppScreen::Dashboard => ("Dashboard", dashboard::help_text()),
        AppScreen::Projects => (
            "Project Manager",
            app_state.projects_state.as_ref().map(projects::help_text).unwrap_or(""),
        ),
        AppScreen::ProjectWizard(_) => (
            "Project Manager",
            app_state.project_wizard_state.as_ref().map(project_wizard::help_text).unwrap_or(""),
        ),
        AppScreen::ProjectDetail => ("Project Details", project_detail::help_text()),
        AppScreen::Invoices => (
            "Invoices & Payments",
            app_state.invoices_state.as_ref().map(invoices::help_text).unwrap_or(""),
        ),
        AppScreen::InvoiceWizard(_) => (
            "Invoices & Payments",
            app_state.invoice_wizard_state.as_ref().map(invoice_wizard::help_text).unwrap_or(""),
        ),
        AppScreen::Messages => (
            "Messages",
            app_state.messages_state.as_ref().map(messages::help_text).unwrap_or(""),
        ),
    };

    let shell = Shell {
        active: app_state.route(),
        title,
        user: &app_state.config.local_sender,
        help,
    };
    let area = render_shell(f, &shell, &app_state.notifier);

    match app_state.screen {
        AppScreen::Dashboard => {
            if let Some(state) = &app_state.dashboard_state {
                dashboard::render_dashboard(
                    f,
                    area,
                    state,
                    &app_state.config.local_sender,
                    app_state.config.support_phone.as_deref(),
                );
            }
        }
        AppScreen::Projects => {
            if let Some(state) = &mut app_state.projects_state {
                projects::render_projects(f, area, state);
            }
        }
        AppScreen::ProjectWizard(_) => {
            if let Some(state) = &app_state.project_wizard_state {
                project_wizard::render_project_wizard(f, area, state);
            }
        }
        AppScreen::ProjectDetail => {
            if let Some(state) = &app_state.project_detail_state {
                project_detail::render_project_detail(f, area, state);
            }
        }
        AppScreen::Invoices => {
            if let Some(state) = &mut app_state.invoices_state {
                invoices::render_invoices(f, area, state);
            }
        }
        AppScreen::InvoiceWizard(_) => {
            if let Some(state) = &app_state.invoice_wizard_state {
                invoice_wizard::render_invoice_wizard(f, area, state);
            }
        }
        AppScreen::Messages => {
            if let Some(state) = &mut app_state.messages_state {
                messages::render_messages(f, area, state);
            }
        }
    }
}

/// Handle one key press. Returns true when the app should quit.
async fn handle_key(app_state: &mut AppState, key: KeyCode) -> bool {
    if !app_state.is_modal() {
        if let KeyCode::Char(c) = key {
            if c == 'q' {
                return true;
            }
            if let Some(route) = Route::from_key(c) {
                navigate(app_state, route).await;
                return false;
            }
        }
    }

    match app_state.screen {
        AppScreen::Dashboard => handle_dashboard_screen(app_state, key).await,
        AppScreen::Projects => handle_projects_screen(app_state, key).await,
        AppScreen::ProjectWizard(back_to) => handle_project_wizard_screen(app_state, key, back_to).await,
        AppScreen::ProjectDetail => handle_project_detail_screen(app_state, key).await,
        AppScreen::Invoices => handle_invoices_screen(app_state, key).await,
        AppScreen::InvoiceWizard(back_to) => handle_invoice_wizard_screen(app_state, key, back_to).await,
        AppScreen::Messages => handle_messages_screen(app_state, key).await,
    }

    false
}

/// Switch to a sidebar destination with freshly loaded rows.
async fn navigate(app_state: &mut AppState, route: Route) {
    // Leaving or re-entering the chat closes its live feed.
    app_state.subscription = None;
    let db = &app_state.db;
    let notifier = &mut app_state.notifier;

    match route {
        Route::Dashboard => {
            let mut state = DashboardState::new();
            state.refresh(db, notifier).await;
            app_state.dashboard_state = Some(state);
            app_state.screen = AppScreen::Dashboard;
        }
        Route::Projects => {
            let mut state = ProjectsState::new();
            state.refresh(db, notifier).await;
            app_state.projects_state = Some(state);
            app_state.screen = AppScreen::Projects;
        }
        Route::Messages => {
            let mut state = MessagesState::new(app_state.config.local_sender.clone());
            state.refresh(db, notifier).await;
            app_state.messages_state = Some(state);
            app_state.screen = AppScreen::Messages;
        }
        Route::Invoices => {
            let mut state = InvoicesState::new();
            state.refresh(db, notifier).await;
            app_state.invoices_state = Some(state);
            app_state.screen = AppScreen::Invoices;
        }
    }
}

async fn open_project_detail(app_state: &mut AppState, project_id: i32) {
    if let Some(state) = ProjectDetailState::open(&app_state.db, project_id, &mut app_state.notifier).await {
        app_state.project_detail_state = Some(state);
        app_state.screen = AppScreen::ProjectDetail;
    }
}

async fn open_conversation(app_state: &mut AppState, project_id: i32) {
    let Some(state) = &mut app_state.messages_state else {
        return;
    };
    if !state.projects().iter().any(|p| p.id == project_id) {
        return;
    }

    // Listen before reading history so no insert falls between the two.
    app_state.subscription = None;
    let subscription = match app_state.db.subscribe_messages(project_id).await {
        Ok(subscription) => Some(subscription),
        Err(err) => {
            error!(project_id, error = %err, "failed to subscribe to messages");
            app_state.notifier.error("Live message updates are unavailable");
            None
        }
    };

    if messages::open_conversation(&app_state.db, state, &mut app_state.notifier, project_id).await {
        app_state.subscription = subscription;
    }
}

async fn handle_dashboard_screen(app_state: &mut AppState, key: KeyCode) {
    let Some(state) = &mut app_state.dashboard_state else {
        return;
    };
    match dashboard::handle_input(state, key) {
        Some(DashboardAction::OpenProject(project_id)) => {
            app_state.detail_back = Route::Dashboard;
            open_project_detail(app_state, project_id).await;
        }
        Some(DashboardAction::ViewAllProjects) => navigate(app_state, Route::Projects).await,
        None => {}
    }
}

async fn handle_projects_screen(app_state: &mut AppState, key: KeyCode) {
    let Some(state) = &mut app_state.projects_state else {
        return;
    };
    match projects::handle_input(state, key) {
        Some(ProjectAction::NewProject) => {
            app_state.project_wizard_state = Some(ProjectWizardState::new());
            app_state.screen = AppScreen::ProjectWizard(None);
        }
        Some(ProjectAction::EditProject(project_id)) => {
            if let Some(project) = state.selected_project().cloned() {
                app_state.project_wizard_state = Some(ProjectWizardState::from_existing(project));
                app_state.screen = AppScreen::ProjectWizard(None);
            } else {
                error!(project_id, "edit requested for a project that is not loaded");
            }
        }
        Some(ProjectAction::CycleStatus(project_id)) => {
            projects::cycle_status(&app_state.db, state, &mut app_state.notifier, project_id).await;
        }
        Some(ProjectAction::DeleteProject(project_id)) => {
            projects::delete_project(&app_state.db, state, &mut app_state.notifier, project_id).await;
        }
        Some(ProjectAction::OpenProject(project_id)) => {
            app_state.detail_back = Route::Projects;
            open_project_detail(app_state, project_id).await;
        }
        None => {}
    }
}

async fn handle_project_wizard_screen(app_state: &mut AppState, key: KeyCode, back_to: Option<i32>) {
    let Some(state) = &mut app_state.project_wizard_state else {
        return;
    };
    let done = match project_wizard::handle_input(state, key) {
        Some(ProjectWizardAction::Cancel) => true,
        Some(ProjectWizardAction::Save) => {
            project_wizard::save_project(&app_state.db, state, &mut app_state.notifier).await
        }
        None => false,
    };

    if done {
        app_state.project_wizard_state = None;
        match back_to {
            Some(project_id) => open_project_detail(app_state, project_id).await,
            None => navigate(app_state, Route::Projects).await,
        }
    }
}

async fn handle_project_detail_screen(app_state: &mut AppState, key: KeyCode) {
    let Some(state) = &app_state.project_detail_state else {
        return;
    };
    match project_detail::handle_input(state, key) {
        Some(ProjectDetailAction::Back) => {
            let back = app_state.detail_back;
            navigate(app_state, back).await;
        }
        Some(ProjectDetailAction::OpenMessages(project_id)) => {
            navigate(app_state, Route::Messages).await;
            open_conversation(app_state, project_id).await;
        }
        Some(ProjectDetailAction::NewInvoice(project_id)) => {
            match app_state.db.list_projects().await {
                Ok(projects) => {
                    let today = chrono::Local::now().date_naive();
                    app_state.invoice_wizard_state =
                        Some(InvoiceWizardState::new(projects, Some(project_id), today));
                    app_state.screen = AppScreen::InvoiceWizard(Some(project_id));
                }
                Err(err) => {
                    error!(error = %err, "failed to load projects for invoice form");
                    app_state.notifier.error("Failed to load projects");
                }
            }
        }
        Some(ProjectDetailAction::EditProject(project_id)) => {
            let project = state.project().clone();
            app_state.project_wizard_state = Some(ProjectWizardState::from_existing(project));
            app_state.screen = AppScreen::ProjectWizard(Some(project_id));
        }
        None => {}
    }
}

async fn handle_invoices_screen(app_state: &mut AppState, key: KeyCode) {
    let Some(state) = &mut app_state.invoices_state else {
        return;
    };
    let today = chrono::Local::now().date_naive();
    match invoices::handle_input(state, key) {
        Some(InvoiceAction::NewInvoice) => {
            let projects = state.projects().to_vec();
            app_state.invoice_wizard_state = Some(InvoiceWizardState::new(projects, None, today));
            app_state.screen = AppScreen::InvoiceWizard(None);
        }
        Some(InvoiceAction::EditInvoice(_)) => {
            if let Some(invoice) = state.selected_invoice().cloned() {
                let projects = state.projects().to_vec();
                app_state.invoice_wizard_state =
                    Some(InvoiceWizardState::from_existing(invoice, projects, today));
                app_state.screen = AppScreen::InvoiceWizard(None);
            }
        }
        Some(InvoiceAction::CycleStatus(invoice_id)) => {
            invoices::cycle_status(&app_state.db, state, &mut app_state.notifier, invoice_id).await;
        }
        Some(InvoiceAction::DeleteInvoice(invoice_id)) => {
            invoices::delete_invoice(&app_state.db, state, &mut app_state.notifier, invoice_id).await;
        }
        None => {}
    }
}

async fn handle_invoice_wizard_screen(app_state: &mut AppState, key: KeyCode, back_to: Option<i32>) {
    let Some(state) = &mut app_state.invoice_wizard_state else {
        return;
    };
    let done = match invoice_wizard::handle_input(state, key) {
        Some(InvoiceWizardAction::Cancel) => true,
        Some(InvoiceWizardAction::Save) => {
            invoice_wizard::save_invoice(&app_state.db, state, &mut app_state.notifier).await
        }
        None => false,
    };

    if done {
        app_state.invoice_wizard_state = None;
        match back_to {
            Some(project_id) => open_project_detail(app_state, project_id).await,
            None => navigate(app_state, Route::Invoices).await,
        }
    }
}

async fn handle_messages_screen(app_state: &mut AppState, key: KeyCode) {
    let Some(state) = &mut app_state.messages_state else {
        return;
    };
    match messages::handle_input(state, key) {
        Some(MessageAction::OpenConversation(project_id)) => open_conversation(app_state, project_id).await,
        Some(MessageAction::Send) => {
            messages::send_message(&app_state.db, state, &mut app_state.notifier).await;
        }
        None => {}
    }
}

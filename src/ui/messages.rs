use crossterm::event::KeyCode;
use tracing::{debug, error, info};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{Message, Project};
use crate::store::Store;
use crate::ui::components::text_input::TextInput;
use crate::ui::components::toast::Notifier;
use crate::ui::components::{clamp_index, next_index, previous_index};

pub struct MessagesState {
    projects: Vec<Project>,
    list_state: ListState,
    /// Project whose conversation is open.
    current: Option<Project>,
    messages: Vec<Message>,
    /// How many of `messages` came from the history fetch.
    history_len: usize,
    compose: TextInput,
    composing: bool,
    loaded: bool,
    local_sender: String,
}

impl MessagesState {
    pub fn new(local_sender: impl Into<String>) -> Self {
        Self {
            projects: Vec::new(),
            list_state: ListState::default(),
            current: None,
            messages: Vec::new(),
            history_len: 0,
            compose: TextInput::default(),
            composing: false,
            loaded: false,
            local_sender: local_sender.into(),
        }
    }

    pub async fn refresh<S: Store>(&mut self, store: &S, notifier: &mut Notifier) -> bool {
        match store.list_projects().await {
            Ok(projects) => {
                self.projects = projects;
                self.loaded = true;
                self.list_state
                    .select(clamp_index(self.list_state.selected(), self.projects.len()));
                true
            }
            Err(err) => {
                error!(error = %err, "failed to load projects for messages");
                notifier.error("Failed to load projects");
                self.loaded = true;
                false
            }
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[cfg(test)]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn current_project_id(&self) -> Option<i32> {
        self.current.as_ref().map(|p| p.id)
    }

    #[cfg(test)]
    pub fn compose_text(&self) -> &str {
        self.compose.value()
    }

    pub fn next(&mut self) {
        self.list_state
            .select(next_index(self.list_state.selected(), self.projects.len()));
    }

    pub fn previous(&mut self) {
        self.list_state
            .select(previous_index(self.list_state.selected(), self.projects.len()));
    }

    /// Highlight a project in the list without opening it.
    pub fn highlight(&mut self, project_id: i32) {
        if let Some(i) = self.projects.iter().position(|p| p.id == project_id) {
            self.list_state.select(Some(i));
        }
    }

    pub fn highlighted_project_id(&self) -> Option<i32> {
        self.list_state
            .selected()
            .and_then(|i| self.projects.get(i))
            .map(|p| p.id)
    }

    /// Rows delivered by the live feed. Appended in arrival order; rows for
    /// a conversation that is no longer open are dropped.
    ///
    /// The feed opens before history is read, so a row may already be in the
    /// fetched history. Those are skipped; live rows are never compared with
    /// each other.
    pub fn receive(&mut self, project_id: i32, incoming: Vec<Message>) {
        if self.current_project_id() != Some(project_id) {
            return;
        }
        let history = &self.messages[..self.history_len];
        let fresh: Vec<Message> = incoming
            .into_iter()
            .filter(|message| !history.iter().any(|h| h.id == message.id))
            .collect();
        debug!(project_id, count = fresh.len(), "live messages received");
        self.messages.extend(fresh);
    }

    /// The compose line owns the keyboard.
    pub fn is_modal(&self) -> bool {
        self.composing
    }
}

#[derive(Debug, PartialEq)]
pub enum MessageAction {
    OpenConversation(i32), // Contains project_id
    Send,
}

// DB operations for messages

/// Open a project's conversation, fetching its history oldest first.
pub async fn open_conversation<S: Store>(
    store: &S,
    state: &mut MessagesState,
    notifier: &mut Notifier,
    project_id: i32,
) -> bool {
    let Some(project) = state.projects.iter().find(|p| p.id == project_id).cloned() else {
        return false;
    };

    match store.list_messages(project_id).await {
        Ok(messages) => {
            state.highlight(project_id);
            state.current = Some(project);
            state.history_len = messages.len();
            state.messages = messages;
            true
        }
        Err(err) => {
            error!(project_id, error = %err, "failed to load messages");
            notifier.error("Failed to load messages");
            false
        }
    }
}

/// Send the compose line to the open conversation. Blank text is ignored.
///
/// The sent row is not appended here; it comes back through the live feed
/// like every other insert.
pub async fn send_message<S: Store>(store: &S, state: &mut MessagesState, notifier: &mut Notifier) {
    let Some(project_id) = state.current_project_id() else {
        return;
    };
    if state.compose.is_blank() {
        return;
    }

    let content = state.compose.value().to_string();
    match store.send_message(project_id, &state.local_sender, &content).await {
        Ok(message) => {
            info!(project_id, message_id = message.id, "message sent");
            state.compose.clear();
            notifier.success("Message sent", "Your message has been sent successfully");
        }
        Err(err) => {
            error!(project_id, error = %err, "failed to send message");
            notifier.error("Failed to send message");
        }
    }
}

pub fn render_messages<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut MessagesState) {
    if !state.loaded {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(loading, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)].as_ref())
        .split(area);

    render_project_list(frame, columns[0], state);

    match &state.current {
        Some(project) => render_conversation(frame, columns[1], state, project),
        None => {
            let hint = Paragraph::new("Select a project to view messages")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(hint, columns[1]);
        }
    }
}

fn render_project_list<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut MessagesState) {
    let current = state.current_project_id();
    let items: Vec<ListItem> = state
        .projects
        .iter()
        .map(|project| {
            let marker = if Some(project.id) == current { "> " } else { "  " };
            let mut lines = vec![Spans::from(Span::styled(
                format!("{marker}{}", project.name),
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            if let Some(description) = &project.description {
                lines.push(Spans::from(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(Color::Gray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, area, &mut state.list_state);
}

fn initials(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}

fn render_conversation<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &MessagesState, project: &Project) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ].as_ref())
        .split(area);

    let header = Paragraph::new(Spans::from(vec![
        Span::styled(
            format!("[{}] ", initials(&project.name)),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(project.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("  Project Discussion", Style::default().fg(Color::Gray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, rows[0]);

    // Lines are wrapped here so the scroll offset counts terminal rows.
    let width = rows[1].width.saturating_sub(2) as usize;
    let lines: Vec<Spans> = if state.messages.is_empty() {
        vec![Spans::from(Span::styled(
            "No messages yet. Start the conversation!",
            Style::default().fg(Color::Gray),
        ))]
    } else {
        state
            .messages
            .iter()
            .flat_map(|message| wrap_line(message_line(message, message.is_from(&state.local_sender)), width))
            .collect()
    };

    // Keep the newest lines in view.
    let visible = rows[1].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible).min(u16::MAX as usize) as u16;
    let history = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .scroll((scroll, 0));
    frame.render_widget(history, rows[1]);

    let (compose_text, border) = if state.composing {
        (state.compose.display_with_cursor(), Style::default().fg(Color::Yellow))
    } else if state.compose.value().is_empty() {
        ("Type your message...".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (state.compose.value().to_string(), Style::default())
    };
    let compose = Paragraph::new(compose_text)
        .block(Block::default().title("Message").borders(Borders::ALL).border_style(border));
    frame.render_widget(compose, rows[2]);
}

fn message_line(message: &Message, own: bool) -> Spans<'static> {
    let sender_style = if own {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    let indent = if own { "    " } else { "" };

    Spans::from(vec![
        Span::raw(indent),
        Span::styled(
            format!("{} ", message.created_at.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{}: ", message.sender), sender_style),
        Span::raw(message.content.clone()),
    ])
}

/// Break a styled line into rows of at most `width` characters.
fn wrap_line(line: Spans<'static>, width: usize) -> Vec<Spans<'static>> {
    if width == 0 {
        return vec![line];
    }

    let mut rows = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    for span in line.0 {
        let mut chunk = String::new();
        for c in span.content.chars() {
            if used == width {
                if !chunk.is_empty() {
                    row.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                rows.push(Spans::from(std::mem::take(&mut row)));
                used = 0;
            }
            chunk.push(c);
            used += 1;
        }
        if !chunk.is_empty() {
            row.push(Span::styled(chunk, span.style));
        }
    }
    rows.push(Spans::from(row));
    rows
}

pub fn help_text(state: &MessagesState) -> &'static str {
    if state.composing {
        "Enter - Send | Esc - Stop typing"
    } else if state.current.is_some() {
        "<Enter> Open | <C> Compose | <Up/Down> Projects | <1-4> Navigate | <Q> Quit"
    } else {
        "<Enter> Open Conversation | <Up/Down> Projects | <1-4> Navigate | <Q> Quit"
    }
}

pub fn handle_input(state: &mut MessagesState, key: KeyCode) -> Option<MessageAction> {
    if state.composing {
        match key {
            KeyCode::Esc => state.composing = false,
            KeyCode::Enter => return Some(MessageAction::Send),
            _ => state.compose.handle_key(key),
        }
        return None;
    }

    match key {
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        KeyCode::Enter => return state.highlighted_project_id().map(MessageAction::OpenConversation),
        KeyCode::Char('c') | KeyCode::Tab if state.current.is_some() => state.composing = true,
        _ => {}
    }
    None
}

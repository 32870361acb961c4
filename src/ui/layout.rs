use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::Route;
use crate::ui::components::toast::{Notifier, render_toast};

const SIDEBAR_WIDTH: u16 = 24;

/// What the shell around a screen shows.
pub struct Shell<'a> {
    pub active: Route,
    pub title: &'a str,
    pub user: &'a str,
    pub help: &'a str,
}

/// Draw sidebar, header and footer, returning the area left for the screen.
pub fn render_shell<B: Backend>(frame: &mut Frame<B>, shell: &Shell, notifier: &Notifier) -> Rect {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)].as_ref())
        .split(frame.size());

    render_sidebar(frame, columns[0], shell);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(columns[1]);

    let header = Paragraph::new(Spans::from(Span::styled(
        shell.title.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, rows[0]);

    match notifier.visible() {
        Some(toast) => render_toast(frame, rows[2], toast),
        None => {
            let help = Paragraph::new(shell.help.to_string())
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(help, rows[2]);
        }
    }

    rows[1]
}

fn render_sidebar<B: Backend>(frame: &mut Frame<B>, area: Rect, shell: &Shell) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(area);

    let brand = Paragraph::new(vec![
        Spans::from(Span::styled(
            "Client Hub",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::styled("Projects & billing", Style::default().fg(Color::Gray))),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(brand, chunks[0]);

    let items: Vec<ListItem> = Route::ALL
        .iter()
        .enumerate()
        .map(|(i, route)| {
            let style = if *route == shell.active {
                Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Spans::from(Span::styled(format!(" {} {}", i + 1, route.title()), style)))
        })
        .collect();

    let nav = List::new(items).block(Block::default().borders(Borders::ALL));
    frame.render_widget(nav, chunks[1]);

    let user = Paragraph::new(format!("Signed in as {}", shell.user))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(user, chunks[2]);
}

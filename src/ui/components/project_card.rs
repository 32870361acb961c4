use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::models::Project;
use crate::ui::components::status_badge::badge;

pub fn render_project_card<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    project: &Project,
    progress: u16,
    selected: bool,
) {
    let border = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(Spans::from(vec![
            Span::styled(project.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            badge(&project.status),
        ]))
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(inner);

    let description = Paragraph::new(project.description.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(description, chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Blue))
        .percent(progress.min(100))
        .label(format!("Progress {}%", progress.min(100)));
    frame.render_widget(gauge, chunks[1]);

    let started = Paragraph::new(format!("Started {}", project.created_at.format("%b %-d, %Y")))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(started, chunks[2]);
}

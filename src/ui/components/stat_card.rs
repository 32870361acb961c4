use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Optional line under the value, e.g. "+2 this month".
pub struct Trend<'a> {
    pub text: &'a str,
    pub up: bool,
}

pub fn render_stat_card<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    title: &str,
    value: &str,
    trend: Option<Trend>,
) {
    let mut lines = vec![Spans::from(Span::styled(
        value.to_string(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))];

    if let Some(trend) = trend {
        let color = if trend.up { Color::Green } else { Color::Red };
        lines.push(Spans::from(Span::styled(
            trend.text.to_string(),
            Style::default().fg(color),
        )));
    }

    let card = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(title.to_string(), Style::default().fg(Color::Gray)))
            .borders(Borders::ALL),
    );
    frame.render_widget(card, area);
}

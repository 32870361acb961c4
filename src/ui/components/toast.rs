use std::time::{Duration, Instant};

use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const VISIBLE_FOR: Duration = Duration::from_secs(4);
const HISTORY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
}

/// Queue of user-facing notifications. The newest one is shown until it
/// expires or another replaces it.
pub struct Notifier {
    toasts: Vec<(Toast, Instant)>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self { toasts: Vec::new() }
    }

    fn push(&mut self, kind: ToastKind, title: &str, description: impl Into<String>) {
        if self.toasts.len() == HISTORY {
            self.toasts.remove(0);
        }
        self.toasts.push((
            Toast {
                kind,
                title: title.to_string(),
                description: description.into(),
            },
            Instant::now(),
        ));
    }

    pub fn success(&mut self, title: &str, description: impl Into<String>) {
        self.push(ToastKind::Success, title, description);
    }

    pub fn warning(&mut self, title: &str, description: impl Into<String>) {
        self.push(ToastKind::Warning, title, description);
    }

    pub fn error(&mut self, description: impl Into<String>) {
        self.push(ToastKind::Error, "Error", description);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last().map(|(toast, _)| toast)
    }

    /// Toasts of one kind, oldest first.
    #[cfg(test)]
    pub fn of_kind(&self, kind: ToastKind) -> Vec<&Toast> {
        self.toasts
            .iter()
            .map(|(toast, _)| toast)
            .filter(|toast| toast.kind == kind)
            .collect()
    }

    /// The toast to draw right now, if one is still fresh.
    pub fn visible(&self) -> Option<&Toast> {
        self.toasts
            .last()
            .filter(|(_, shown)| shown.elapsed() < VISIBLE_FOR)
            .map(|(toast, _)| toast)
    }
}

pub fn render_toast<B: Backend>(frame: &mut Frame<B>, area: Rect, toast: &Toast) {
    let color = match toast.kind {
        ToastKind::Success => Color::Green,
        ToastKind::Warning => Color::Yellow,
        ToastKind::Error => Color::Red,
    };

    let line = Spans::from(vec![
        Span::styled(
            format!("{}: ", toast.title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(toast.description.as_str()),
    ]);

    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_toast_is_visible() {
        let mut notifier = Notifier::new();
        notifier.success("Project saved", "Website Redesign");
        notifier.error("Failed to load projects");

        let toast = notifier.visible().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, "Error");
        assert_eq!(notifier.of_kind(ToastKind::Success).len(), 1);
    }

    #[test]
    fn history_is_bounded() {
        let mut notifier = Notifier::new();
        for i in 0..(HISTORY + 5) {
            notifier.warning("Check", format!("#{i}"));
        }
        assert_eq!(notifier.len(), HISTORY);
        assert_eq!(notifier.latest().unwrap().description, format!("#{}", HISTORY + 4));
    }
}

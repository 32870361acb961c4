use tui::{
    style::{Color, Modifier, Style},
    text::Span,
};

/// Label and colour for a project or invoice status.
///
/// Matching is exact; anything unrecognised is shown as-is in the default
/// style.
pub fn badge_parts(status: &str) -> (String, Color) {
    let (label, color) = match status {
        "active" | "progress" => ("In Progress", Color::Blue),
        "completed" => ("Completed", Color::Green),
        "pending" => ("Pending", Color::Yellow),
        "paid" => ("Paid", Color::Green),
        "draft" => ("Draft", Color::Gray),
        other => return (other.to_string(), Color::White),
    };
    (label.to_string(), color)
}

pub fn badge(status: &str) -> Span<'static> {
    let (label, color) = badge_parts(status);
    Span::styled(
        format!("[{label}]"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_get_labels() {
        assert_eq!(badge_parts("progress"), ("In Progress".to_string(), Color::Blue));
        assert_eq!(badge_parts("paid"), ("Paid".to_string(), Color::Green));
        assert_eq!(badge_parts("pending").0, "Pending");
    }

    #[test]
    fn unknown_statuses_fall_through_unchanged() {
        assert_eq!(badge_parts("Paid"), ("Paid".to_string(), Color::White));
        assert_eq!(badge_parts("on hold"), ("on hold".to_string(), Color::White));
    }
}

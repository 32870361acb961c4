pub mod confirm;
pub mod date_input;
pub mod project_card;
pub mod stat_card;
pub mod status_badge;
pub mod text_input;
pub mod toast;

/// Selection after moving down a list, wrapping to the top.
pub fn next_index(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    })
}

/// Selection after moving up a list, wrapping to the bottom.
pub fn previous_index(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(0) | None => len - 1,
        Some(i) => i - 1,
    })
}

/// Keep a selection valid after the list it points into was reloaded.
pub fn clamp_index(selected: Option<usize>, len: usize) -> Option<usize> {
    match (selected, len) {
        (_, 0) => None,
        (Some(i), len) => Some(i.min(len - 1)),
        (None, _) => Some(0),
    }
}

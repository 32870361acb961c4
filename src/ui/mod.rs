pub mod components;
pub mod dashboard;
pub mod invoice_wizard;
pub mod invoices;
pub mod layout;
pub mod messages;
pub mod project_detail;
pub mod project_wizard;
pub mod projects;

/// Top level destinations reachable from the sidebar.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Route {
    Dashboard,
    Projects,
    Messages,
    Invoices,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Dashboard, Route::Projects, Route::Messages, Route::Invoices];

    pub fn title(self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Projects => "Projects",
            Route::Messages => "Messages",
            Route::Invoices => "Invoices",
        }
    }

    /// Sidebar shortcut: `1` to `4`.
    pub fn from_key(c: char) -> Option<Route> {
        let index = c.to_digit(10)?.checked_sub(1)? as usize;
        Route::ALL.get(index).copied()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_pick_routes() {
        assert_eq!(Route::from_key('1'), Some(Route::Dashboard));
        assert_eq!(Route::from_key('4'), Some(Route::Invoices));
        assert_eq!(Route::from_key('0'), None);
        assert_eq!(Route::from_key('5'), None);
        assert_eq!(Route::from_key('x'), None);
    }
}

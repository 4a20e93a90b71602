//! Navigation-related state types.

/// Specifying the top-level views.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum View {
    Login,
    Dashboard,
}

/// Specifying the different foci.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Focus {
    Sidebar,
    Table,
}

/// Specifying where typed characters go.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InputMode {
    Normal,
    Search,
}

/// Severity of a transient notification.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus() {
        assert_ne!(Focus::Sidebar, Focus::Table);
    }

    #[test]
    fn test_input_mode() {
        assert_ne!(InputMode::Normal, InputMode::Search);
    }
}

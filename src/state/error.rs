//! State management-specific error types.

/// Errors that can occur during state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// No list screen is mounted
    #[error("No list is open")]
    NoScreen,

    /// Action needs a selected row
    #[error("No row selected")]
    NoSelection,

    /// Selected record carries no id
    #[error("Selected record has no id")]
    MissingId,

    /// Resource cannot be created or edited from the dashboard
    #[error("{0} are read-only")]
    ReadOnly(&'static str),
}

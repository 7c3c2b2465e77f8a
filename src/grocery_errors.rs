//! # Grocery List Error Types Module
//!
//! Errors raised while turning a grocery list request into a stored list.
//! The consolidator itself never fails; these cover the checks that run
//! before it and the persistence that runs after it.

/// Custom error types for grocery list generation
#[derive(Debug, Clone, PartialEq)]
pub enum GroceryListError {
    /// Bad request input: recipe ids, multiplier, recipe count, quantities
    Validation(String),
    /// The requesting user may not use a recipe
    Permission(String),
    /// Storage failures; the client may retry
    Persistence(String),
}

impl GroceryListError {
    /// Whether the failure was caused by the request itself
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GroceryListError::Validation(_) | GroceryListError::Permission(_)
        )
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, GroceryListError::Persistence(_))
    }
}

impl std::fmt::Display for GroceryListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroceryListError::Validation(msg) => write!(f, "Validation error: {msg}"),
            GroceryListError::Permission(msg) => write!(f, "Permission error: {msg}"),
            GroceryListError::Persistence(msg) => write!(f, "Persistence error: {msg}"),
        }
    }
}

impl std::error::Error for GroceryListError {}

impl From<anyhow::Error> for GroceryListError {
    fn from(err: anyhow::Error) -> Self {
        GroceryListError::Persistence(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_classes() {
        let validation = GroceryListError::Validation("no recipes".to_string());
        assert!(validation.is_client_error());
        assert!(!validation.is_retryable());

        let permission = GroceryListError::Permission("recipe 3".to_string());
        assert!(permission.is_client_error());

        let persistence = GroceryListError::Persistence("connection reset".to_string());
        assert!(!persistence.is_client_error());
        assert!(persistence.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = GroceryListError::Validation("no recipes".to_string());
        assert_eq!(err.to_string(), "Validation error: no recipes");
    }

    #[test]
    fn test_from_anyhow_keeps_context() {
        let source: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));
        let err: GroceryListError = source.context("Failed to write list").unwrap_err().into();

        assert_eq!(
            err,
            GroceryListError::Persistence("Failed to write list: disk full".to_string())
        );
    }
}

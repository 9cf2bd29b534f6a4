//! Form configuration.

use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// When field edits trigger a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
    /// Every edit re-validates the whole form and replaces the errors.
    #[default]
    OnChange,
    /// Errors are only published by `submit` (or an explicit `validate`).
    OnSubmit,
}

/// Behaviour switches for a form.
///
/// `revalidate_mode` applies once the form has been submitted at least
/// once; it only matters when `mode` is `onSubmit`.
///
/// ```rust
/// use userform::{FormConfig, ValidationMode};
///
/// let config = FormConfig::from_json(r#"{"mode": "onSubmit"}"#).unwrap();
/// assert_eq!(config.mode, ValidationMode::OnSubmit);
/// assert_eq!(config.revalidate_mode, ValidationMode::OnChange);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FormConfig {
    pub mode: ValidationMode,
    pub revalidate_mode: ValidationMode,
}

impl FormConfig {
    pub fn on_change() -> Self {
        Self::default()
    }

    pub fn on_submit() -> Self {
        Self {
            mode: ValidationMode::OnSubmit,
            ..Self::default()
        }
    }

    pub fn with_revalidate_mode(mut self, mode: ValidationMode) -> Self {
        self.revalidate_mode = mode;
        self
    }

    /// Parses a JSON configuration such as `{"mode": "onChange"}`.
    pub fn from_json(text: &str) -> Result<Self, FormError> {
        serde_json::from_str(text).map_err(FormError::Config)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::OnChange,
            revalidate_mode: ValidationMode::OnChange,
        }
    }
}

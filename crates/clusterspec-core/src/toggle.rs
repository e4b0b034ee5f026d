//! Three-valued feature switch
//!
//! Documents distinguish an absent flag from an explicit `false`. A few
//! checks care about that difference (an explicit `enableRbac: false` is
//! rejected on recent versions, an absent one is not), so optional booleans
//! decode into [`Toggle`] instead of `bool`.

use serde::{Deserialize, Serialize};

/// An optional boolean with an explicit unset state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Toggle {
    /// Not present in the document
    #[default]
    Unset,
    /// Explicitly `true`
    Enabled,
    /// Explicitly `false`
    Disabled,
}

impl Toggle {
    /// Whether the flag is on; unset counts as off
    pub fn is_enabled(self) -> bool {
        matches!(self, Toggle::Enabled)
    }

    /// Whether the flag was given at all
    pub fn is_set(self) -> bool {
        !self.is_unset()
    }

    /// Whether the flag is absent
    pub fn is_unset(&self) -> bool {
        matches!(self, Toggle::Unset)
    }

    /// Resolve the flag, using `default` when it is unset
    pub fn resolve(self, default: bool) -> bool {
        match self {
            Toggle::Unset => default,
            Toggle::Enabled => true,
            Toggle::Disabled => false,
        }
    }
}

impl From<Option<bool>> for Toggle {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Toggle::Unset,
            Some(true) => Toggle::Enabled,
            Some(false) => Toggle::Disabled,
        }
    }
}

impl From<Toggle> for Option<bool> {
    fn from(value: Toggle) -> Self {
        match value {
            Toggle::Unset => None,
            Toggle::Enabled => Some(true),
            Toggle::Disabled => Some(false),
        }
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value {
            Toggle::Enabled
        } else {
            Toggle::Disabled
        }
    }
}

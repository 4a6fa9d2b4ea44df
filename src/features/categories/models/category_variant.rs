use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Presentation variant chosen by category name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CategoryVariant {
    American,
    #[default]
    Brazilian,
}

impl CategoryVariant {
    /// Exact, case-sensitive match. Anything that is not `"American"` falls back to
    /// `Brazilian`, the empty string included.
    pub fn from_category_name(name: &str) -> Self {
        match name {
            "American" => Self::American,
            _ => Self::Brazilian,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::American => "American",
            Self::Brazilian => "Brazilian",
        }
    }
}

impl fmt::Display for CategoryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_category_name_exact_match() {
        assert_eq!(
            CategoryVariant::from_category_name("American"),
            CategoryVariant::American
        );
        assert_eq!(
            CategoryVariant::from_category_name("Brazilian"),
            CategoryVariant::Brazilian
        );
    }

    #[test]
    fn test_from_category_name_falls_back_to_brazilian() {
        for name in ["", "american", "AMERICAN", "German", " American"] {
            assert_eq!(
                CategoryVariant::from_category_name(name),
                CategoryVariant::Brazilian,
                "unexpected variant for {:?}",
                name
            );
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(CategoryVariant::American.display_name(), "American");
        assert_eq!(CategoryVariant::Brazilian.to_string(), "Brazilian");
        assert_eq!(CategoryVariant::default(), CategoryVariant::Brazilian);
    }
}

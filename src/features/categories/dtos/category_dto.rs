use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::categories::models::CategoryVariant;

/// Strategy selected for a category name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryStrategyDto {
    pub strategy_name: String,
}

impl From<CategoryVariant> for CategoryStrategyDto {
    fn from(variant: CategoryVariant) -> Self {
        Self {
            strategy_name: variant.display_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serializes_snake_case_key() {
        let value = serde_json::to_value(CategoryStrategyDto::from(CategoryVariant::American)).unwrap();
        assert_eq!(value, serde_json::json!({ "strategy_name": "American" }));
    }
}

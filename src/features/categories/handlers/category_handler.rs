use axum::Json;

use crate::core::error::Result;
use crate::core::extractor::AppPath;
use crate::features::categories::dtos::CategoryStrategyDto;
use crate::features::categories::models::CategoryVariant;
use crate::shared::types::ApiResponse;

/// Get the presentation strategy for a category name
///
/// Unknown names resolve to the `Brazilian` strategy.
#[utoipa::path(
    get,
    path = "/api/categories/{name}/strategy",
    params(
        ("name" = String, Path, description = "Category name, e.g. American")
    ),
    responses(
        (status = 200, description = "Strategy for the category", body = ApiResponse<CategoryStrategyDto>),
    ),
    tag = "categories"
)]
pub async fn get_category_strategy(
    AppPath(name): AppPath<String>,
) -> Result<Json<ApiResponse<CategoryStrategyDto>>> {
    let strategy = CategoryStrategyDto::from(CategoryVariant::from_category_name(&name));
    Ok(Json(ApiResponse::success(Some(strategy), None, None)))
}

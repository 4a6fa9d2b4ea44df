use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::report_handler::create_report,
        reports_handlers::report_handler::list_reports,
        reports_handlers::report_handler::get_report,
        reports_handlers::report_handler::update_report,
        reports_handlers::report_handler::delete_report,
        reports_handlers::report_handler::list_event_tags,
        // Categories
        categories_handlers::category_handler::get_category_strategy,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Reports
            reports_models::EventRecord,
            reports_dtos::CreateReportDto,
            reports_dtos::UpdateReportDto,
            reports_dtos::UpdateReportTextsDto,
            reports_dtos::ReportIdDto,
            reports_dtos::CategoryInfoDto,
            reports_dtos::AuthorInfoDto,
            reports_dtos::ReportTextsDto,
            reports_dtos::ReportItemDetailsDto,
            reports_dtos::DeleteOutcome,
            reports_dtos::EventVocabularyDto,
            ApiResponse<reports_dtos::ReportIdDto>,
            ApiResponse<reports_dtos::ReportItemDetailsDto>,
            ApiResponse<Vec<reports_dtos::ReportItemDetailsDto>>,
            ApiResponse<reports_dtos::DeleteOutcome>,
            ApiResponse<reports_dtos::EventVocabularyDto>,
            // Categories
            categories_dtos::CategoryStrategyDto,
            ApiResponse<categories_dtos::CategoryStrategyDto>,
        )
    ),
    tags(
        (name = "reports", description = "Near-death experience reports"),
        (name = "categories", description = "Category presentation strategies"),
    ),
    info(
        title = "NDE Reports API",
        version = "0.1.0",
        description = "API documentation for the NDE reports service",
    )
)]
pub struct ApiDoc;

/// Overrides the OpenAPI info block with values from configuration
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_report_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/reports",
            "/api/reports/{id}",
            "/api/reports/events",
            "/api/categories/{name}/strategy",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }

    #[test]
    fn test_swagger_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "Custom docs".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("Custom docs"));
    }
}

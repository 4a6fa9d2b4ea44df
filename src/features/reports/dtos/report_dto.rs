use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::reports::models::{EventRecord, ReportDetailsRow};
use crate::shared::validation::validate_event_tags;

// =============================================================================
// REQUESTS
// =============================================================================

/// Request DTO for submitting a report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(length(min = 10, max = 255, message = "Title must be 10-255 characters"))]
    pub title: String,

    #[validate(range(min = 1, message = "author_id must be a positive id"))]
    pub author_id: i32,

    #[validate(range(min = 1, message = "category_id must be a positive id"))]
    pub category_id: i32,

    /// Date of the experience (`YYYY-MM-DD`)
    pub date: NaiveDate,

    #[validate(length(min = 50, message = "full_text must have at least 50 characters"))]
    pub full_text: String,

    #[validate(length(min = 7, message = "final_things must have at least 7 characters"))]
    pub final_things: Option<String>,

    /// Event tags, e.g. `["tunnel_vision", "need_finish_mission"]`
    #[validate(custom(function = "validate_event_tags"))]
    pub events: Vec<String>,
}

/// Request DTO for a partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateReportDto {
    #[validate(length(min = 7, max = 255, message = "Title must be 7-255 characters"))]
    pub title: Option<String>,

    #[validate(range(min = 1, message = "author_id must be a positive id"))]
    pub author_id: Option<i32>,

    #[validate(range(min = 1, message = "category_id must be a positive id"))]
    pub category_id: Option<i32>,

    pub date: Option<NaiveDate>,

    #[validate(nested)]
    pub texts: Option<UpdateReportTextsDto>,

    /// Full replacement of all 11 event flags
    pub events: Option<EventRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateReportTextsDto {
    #[validate(length(min = 50, message = "full_text must have at least 50 characters"))]
    pub full_text: Option<String>,

    #[validate(length(min = 7, message = "final_things must have at least 7 characters"))]
    pub final_things: Option<String>,
}

impl UpdateReportTextsDto {
    pub fn is_empty(&self) -> bool {
        self.full_text.is_none() && self.final_things.is_none()
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportIdDto {
    pub id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryInfoDto {
    pub category_id: i32,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorInfoDto {
    pub author_id: i32,
    pub author_name: String,
    pub author_nationality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportTextsDto {
    pub full_text: String,
    pub final_things: Option<String>,
}

/// Nested view of a report with its category, author, texts and events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportItemDetailsDto {
    pub id: i32,
    pub title: String,
    pub date: NaiveDate,
    pub category_info: CategoryInfoDto,
    pub author_info: AuthorInfoDto,
    pub texts: ReportTextsDto,
    pub events: EventRecord,
}

impl From<ReportDetailsRow> for ReportItemDetailsDto {
    fn from(row: ReportDetailsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            date: row.date,
            category_info: CategoryInfoDto {
                category_id: row.category_id,
                category_name: row.category_name,
            },
            author_info: AuthorInfoDto {
                author_id: row.author_id,
                author_name: row.author_name,
                author_nationality: row.author_nationality,
            },
            texts: ReportTextsDto {
                full_text: row.full_text,
                final_things: row.final_things,
            },
            events: row.events,
        }
    }
}

/// Result of a delete. `found = false` with `success = true` means nothing matched the id;
/// `success = false` means the storage call itself failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteOutcome {
    pub success: bool,
    pub found: bool,
}

impl DeleteOutcome {
    pub const DELETED: Self = Self {
        success: true,
        found: true,
    };
    pub const NOT_FOUND: Self = Self {
        success: true,
        found: false,
    };
    pub const FAILED: Self = Self {
        success: false,
        found: false,
    };
}

/// The allowed event tag vocabulary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventVocabularyDto {
    pub events: Vec<String>,
}

use chrono::NaiveDate;
use sqlx::FromRow;

use crate::features::reports::models::EventRecord;

/// Database model for `reports`; reads go through [`ReportDetailsRow`]
#[cfg(test)]
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub category_id: i32,
    pub date: NaiveDate,
}

/// Database model for `reports_texts`
#[cfg(test)]
#[derive(Debug, Clone, FromRow)]
pub struct ReportText {
    pub report_id: i32,
    pub full_text: String,
    pub final_things: Option<String>,
}

/// One row of the reports / categories / authors / texts / events join
#[derive(Debug, Clone, FromRow)]
pub struct ReportDetailsRow {
    pub id: i32,
    pub title: String,
    pub date: NaiveDate,
    pub category_id: i32,
    pub category_name: String,
    pub author_id: i32,
    pub author_name: String,
    pub author_nationality: Option<String>,
    pub full_text: String,
    pub final_things: Option<String>,
    #[sqlx(flatten)]
    pub events: EventRecord,
}

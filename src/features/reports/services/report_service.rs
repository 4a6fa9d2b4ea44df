use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use sqlx::{PgConnection, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{
    CreateReportDto, DeleteOutcome, ReportIdDto, ReportItemDetailsDto, UpdateReportDto,
};
use crate::features::reports::models::{EventRecord, ReportDetailsRow, EVENT_NAMES};
use crate::shared::sql::{build_set_clause, placeholders};
use crate::shared::types::PaginationQuery;

/// SELECT over the five report tables; callers append `WHERE` / `ORDER BY`.
static REPORT_DETAILS_SELECT: LazyLock<String> = LazyLock::new(|| {
    let event_columns = EVENT_NAMES
        .iter()
        .map(|name| format!("reports_events.{}", name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"
        SELECT
            reports.id, reports.title, reports.date,
            reports.category_id, reports_categories.name AS category_name,
            reports.author_id, reports_authors.name AS author_name,
            reports_authors.nationality AS author_nationality,
            reports_texts.full_text, reports_texts.final_things,
            {}
        FROM reports
        JOIN reports_categories ON reports_categories.id = reports.category_id
        JOIN reports_authors ON reports_authors.id = reports.author_id
        JOIN reports_texts ON reports_texts.report_id = reports.id
        JOIN reports_events ON reports_events.report_id = reports.id
        "#,
        event_columns
    )
});

/// Repository for reports and their text and event rows.
///
/// Writes span three tables and run inside one transaction; every operation is
/// bounded by `operation_timeout`.
pub struct ReportService {
    pool: PgPool,
    operation_timeout: Duration,
}

impl ReportService {
    pub fn new(pool: PgPool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    /// Create a report with its text and events, returning the generated id
    pub async fn create(&self, dto: &CreateReportDto) -> Result<ReportIdDto> {
        self.with_timeout("Create report", self.create_in_transaction(dto))
            .await
    }

    async fn create_in_transaction(&self, dto: &CreateReportDto) -> Result<ReportIdDto> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        match Self::insert_report(&mut tx, dto).await {
            Ok(id) => {
                tx.commit().await.map_err(|e| {
                    tracing::error!("Failed to commit report creation: {:?}", e);
                    AppError::WriteFailed("Failed to create report".to_string())
                })?;

                tracing::info!("Created report: {}", id);
                Ok(ReportIdDto { id })
            }
            Err(e) => {
                tracing::error!("Failed to create report, rolling back: {:?}", e);
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Rollback failed: {:?}", rollback_err);
                }
                Err(AppError::WriteFailed("Failed to create report".to_string()))
            }
        }
    }

    async fn insert_report(
        conn: &mut PgConnection,
        dto: &CreateReportDto,
    ) -> std::result::Result<i32, sqlx::Error> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO reports (title, author_id, category_id, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&dto.title)
        .bind(dto.author_id)
        .bind(dto.category_id)
        .bind(dto.date)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO reports_texts (report_id, full_text, final_things)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(&dto.full_text)
        .bind(&dto.final_things)
        .execute(&mut *conn)
        .await?;

        let events = EventRecord::from_tags(&dto.events);
        tracing::debug!("Report {} events: {:?}", id, events.tags());
        let (columns, values) = events.to_columns();
        let sql = format!(
            "INSERT INTO reports_events (report_id, {}) VALUES ($1, {})",
            columns.join(", "),
            placeholders(2, columns.len())
        );

        let mut query = sqlx::query(&sql).bind(id);
        for value in values {
            query = query.bind(value);
        }
        query.execute(&mut *conn).await?;

        Ok(id)
    }

    /// Get report details by id
    pub async fn get_by_id(&self, id: i32) -> Result<ReportItemDetailsDto> {
        self.with_timeout("Get report", async {
            let sql = format!("{} WHERE reports.id = $1", *REPORT_DETAILS_SELECT);

            sqlx::query_as::<_, ReportDetailsRow>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to get report: {:?}", e);
                    AppError::Database(e)
                })?
                .map(ReportItemDetailsDto::from)
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
        })
        .await
    }

    /// List one page of reports ordered by id. A page past the end is empty, not an error.
    pub async fn list_page(&self, params: &PaginationQuery) -> Result<Vec<ReportItemDetailsDto>> {
        self.with_timeout("List reports", async {
            let sql = format!(
                "{} ORDER BY reports.id ASC LIMIT $1 OFFSET $2",
                *REPORT_DETAILS_SELECT
            );

            let rows = sqlx::query_as::<_, ReportDetailsRow>(&sql)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to list reports: {:?}", e);
                    AppError::Database(e)
                })?;

            Ok(rows.into_iter().map(ReportItemDetailsDto::from).collect())
        })
        .await
    }

    /// Total number of reports
    pub async fn count(&self) -> Result<i64> {
        self.with_timeout("Count reports", async {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count reports: {:?}", e);
                    AppError::Database(e)
                })
        })
        .await
    }

    /// Delete a report; text and events go with it via `ON DELETE CASCADE`
    pub async fn delete_by_id(&self, id: i32) -> DeleteOutcome {
        let result = self
            .with_timeout("Delete report", async {
                sqlx::query("DELETE FROM reports WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map(|done| done.rows_affected())
                    .map_err(AppError::Database)
            })
            .await;

        match result {
            Ok(0) => DeleteOutcome::NOT_FOUND,
            Ok(_) => {
                tracing::info!("Deleted report: {}", id);
                DeleteOutcome::DELETED
            }
            Err(e) => {
                tracing::error!("Failed to delete report {}: {:?}", id, e);
                DeleteOutcome::FAILED
            }
        }
    }

    /// Apply a partial update across reports, texts and events
    pub async fn update(&self, id: i32, dto: &UpdateReportDto) -> Result<()> {
        self.with_timeout("Update report", self.update_in_transaction(id, dto))
            .await
    }

    async fn update_in_transaction(&self, id: i32, dto: &UpdateReportDto) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        match Self::apply_update(&mut tx, id, dto).await {
            Ok(true) => {
                tx.commit().await.map_err(|e| {
                    tracing::error!("Failed to commit report update: {:?}", e);
                    AppError::WriteFailed("Failed to update report".to_string())
                })?;

                tracing::info!("Updated report: {}", id);
                Ok(())
            }
            Ok(false) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Rollback failed: {:?}", rollback_err);
                }
                Err(AppError::NotFound(format!("Report {} not found", id)))
            }
            Err(e) => {
                tracing::error!("Failed to update report {}, rolling back: {:?}", id, e);
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Rollback failed: {:?}", rollback_err);
                }
                Err(AppError::WriteFailed("Failed to update report".to_string()))
            }
        }
    }

    /// Returns `Ok(false)` when no report has `id`
    async fn apply_update(
        conn: &mut PgConnection,
        id: i32,
        dto: &UpdateReportDto,
    ) -> std::result::Result<bool, sqlx::Error> {
        // NULL parameters keep the stored value
        let updated = sqlx::query(
            r#"
            UPDATE reports
            SET title = COALESCE($1, title),
                author_id = COALESCE($2, author_id),
                category_id = COALESCE($3, category_id),
                date = COALESCE($4, date)
            WHERE id = $5
            "#,
        )
        .bind(&dto.title)
        .bind(dto.author_id)
        .bind(dto.category_id)
        .bind(dto.date)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(texts) = dto.texts.as_ref().filter(|texts| !texts.is_empty()) {
            sqlx::query(
                r#"
                UPDATE reports_texts
                SET full_text = COALESCE($1, full_text),
                    final_things = COALESCE($2, final_things)
                WHERE report_id = $3
                "#,
            )
            .bind(&texts.full_text)
            .bind(&texts.final_things)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        }

        if let Some(events) = &dto.events {
            let clause = build_set_clause(events.columns(), 1);
            if !clause.is_empty() {
                let sql = format!(
                    "UPDATE reports_events SET {} WHERE report_id = ${}",
                    clause.sql, clause.next_index
                );

                let mut query = sqlx::query(&sql);
                for value in clause.values {
                    query = query.bind(value);
                }
                query.bind(id).execute(&mut *conn).await?;
            }
        }

        Ok(true)
    }

    async fn with_timeout<T, F>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    "{} exceeded operation timeout of {:?}",
                    operation,
                    self.operation_timeout
                );
                Err(AppError::Timeout(format!("{} timed out", operation)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::dtos::UpdateReportTextsDto;
    use crate::features::reports::models::{Report, ReportText};
    use crate::shared::test_helpers::unreachable_pool;
    use chrono::NaiveDate;
    use fake::faker::lorem::en::{Paragraph, Sentence};
    use fake::Fake;

    fn service(pool: PgPool) -> ReportService {
        ReportService::new(pool, Duration::from_secs(5))
    }

    fn fake_report(author_id: i32, category_id: i32, events: &[&str]) -> CreateReportDto {
        let full_text: String = Paragraph(8..10).fake();
        CreateReportDto {
            title: Sentence(3..6).fake::<String>().chars().take(255).collect(),
            author_id,
            category_id,
            date: NaiveDate::from_ymd_opt(2000, 3, 27).unwrap(),
            full_text,
            final_things: Some("Busquem o amor acima de tudo".to_string()),
            events: events.iter().map(|e| e.to_string()).collect(),
        }
    }

    async fn lookup_ids(pool: &PgPool) -> (i32, i32) {
        let author_id: i32 =
            sqlx::query_scalar("SELECT id FROM reports_authors WHERE name = 'Anonymous'")
                .fetch_one(pool)
                .await
                .unwrap();
        let category_id: i32 =
            sqlx::query_scalar("SELECT id FROM reports_categories WHERE name = 'American'")
                .fetch_one(pool)
                .await
                .unwrap();
        (author_id, category_id)
    }

    async fn table_counts(pool: &PgPool) -> (i64, i64, i64) {
        let reports: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(pool)
            .await
            .unwrap();
        let texts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports_texts")
            .fetch_one(pool)
            .await
            .unwrap();
        let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports_events")
            .fetch_one(pool)
            .await
            .unwrap();
        (reports, texts, events)
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let service = ReportService::new(unreachable_pool(), Duration::from_millis(20));

        let result = service
            .with_timeout("Slow operation", std::future::pending::<Result<()>>())
            .await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_not_found() {
        let service = ReportService::new(unreachable_pool(), Duration::from_secs(5));

        assert_eq!(service.delete_by_id(1).await, DeleteOutcome::FAILED);
        assert!(matches!(
            service.get_by_id(1).await,
            Err(AppError::Database(_))
        ));
        assert!(matches!(
            service.list_page(&PaginationQuery::default()).await,
            Err(AppError::Database(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_create_and_get(pool: PgPool) {
        let (author_id, category_id) = lookup_ids(&pool).await;
        let service = service(pool);
        let dto = fake_report(author_id, category_id, &["tunnel_vision", "need_finish_mission"]);

        let created = service.create(&dto).await.unwrap();
        assert!(created.id > 0);

        let details = service.get_by_id(created.id).await.unwrap();
        assert_eq!(details.id, created.id);
        assert_eq!(details.title, dto.title);
        assert_eq!(details.date, dto.date);
        assert_eq!(details.category_info.category_name, "American");
        assert_eq!(details.author_info.author_name, "Anonymous");
        assert_eq!(details.author_info.author_nationality, None);
        assert_eq!(details.texts.full_text, dto.full_text);
        assert_eq!(
            details.events,
            EventRecord::from_tags(["tunnel_vision", "need_finish_mission"])
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_create_with_missing_foreign_keys_leaves_nothing(pool: PgPool) {
        let service = service(pool.clone());
        let dto = fake_report(999_999_999, 99_999_999, &["lights"]);

        let result = service.create(&dto).await;
        assert!(matches!(result, Err(AppError::WriteFailed(_))));
        assert_eq!(table_counts(&pool).await, (0, 0, 0));
    }

    /// Make every write to `reports_events` fail, so the events step of create/update
    /// errors after the reports and texts steps already ran.
    async fn reject_event_writes(pool: &PgPool) {
        sqlx::query(
            r#"
            CREATE FUNCTION reject_event_write() RETURNS trigger AS $$
            BEGIN
                RAISE EXCEPTION 'event writes disabled';
            END;
            $$ LANGUAGE plpgsql
            "#,
        )
        .execute(pool)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TRIGGER reject_event_write
            BEFORE INSERT OR UPDATE ON reports_events
            FOR EACH ROW EXECUTE FUNCTION reject_event_write()
            "#,
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_create_failing_at_events_step_rolls_back_earlier_steps(pool: PgPool) {
        let (author_id, category_id) = lookup_ids(&pool).await;
        reject_event_writes(&pool).await;
        let service = service(pool.clone());

        let result = service
            .create(&fake_report(author_id, category_id, &["lights"]))
            .await;

        assert!(matches!(result, Err(AppError::WriteFailed(_))));
        assert_eq!(table_counts(&pool).await, (0, 0, 0));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_update_failing_at_events_step_rolls_back_earlier_steps(pool: PgPool) {
        let (author_id, category_id) = lookup_ids(&pool).await;
        let service = service(pool.clone());
        let dto = fake_report(author_id, category_id, &["lights"]);
        let created = service.create(&dto).await.unwrap();

        reject_event_writes(&pool).await;

        let update = UpdateReportDto {
            title: Some("Titulo que nao fica".to_string()),
            texts: Some(UpdateReportTextsDto {
                full_text: None,
                final_things: Some("Texto que nao fica".to_string()),
            }),
            events: Some(EventRecord::from_tags(["other_dimension"])),
            ..Default::default()
        };
        let result = service.update(created.id, &update).await;
        assert!(matches!(result, Err(AppError::WriteFailed(_))));

        let details = service.get_by_id(created.id).await.unwrap();
        assert_eq!(details.title, dto.title);
        assert_eq!(details.texts.final_things, dto.final_things);
        assert_eq!(details.events, EventRecord::from_tags(["lights"]));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_list_page_far_past_the_end_is_empty(pool: PgPool) {
        let (author_id, category_id) = lookup_ids(&pool).await;
        let service = service(pool);
        service
            .create(&fake_report(author_id, category_id, &[]))
            .await
            .unwrap();

        let page = service
            .list_page(&PaginationQuery::new(i64::MAX, 10))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_get_missing_report(pool: PgPool) {
        let result = service(pool).get_by_id(100_000).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_delete_cascades(pool: PgPool) {
        let (author_id, category_id) = lookup_ids(&pool).await;
        let service = service(pool.clone());
        let created = service
            .create(&fake_report(author_id, category_id, &["lights"]))
            .await
            .unwrap();

        assert_eq!(service.delete_by_id(created.id).await, DeleteOutcome::DELETED);
        assert_eq!(table_counts(&pool).await, (0, 0, 0));
        assert_eq!(
            service.delete_by_id(created.id).await,
            DeleteOutcome::NOT_FOUND
        );
        assert!(matches!(
            service.get_by_id(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_list_pages(pool: PgPool) {
        let (author_id, category_id) = lookup_ids(&pool).await;
        let service = service(pool);

        let mut ids = Vec::new();
        for _ in 0..3 {
            let created = service
                .create(&fake_report(author_id, category_id, &[]))
                .await
                .unwrap();
            ids.push(created.id);
        }

        let first = service.list_page(&PaginationQuery::new(1, 2)).await.unwrap();
        let second = service.list_page(&PaginationQuery::new(2, 2)).await.unwrap();
        let beyond = service.list_page(&PaginationQuery::new(5, 2)).await.unwrap();

        assert_eq!(first.iter().map(|r| r.id).collect::<Vec<_>>(), ids[..2].to_vec());
        assert_eq!(second.iter().map(|r| r.id).collect::<Vec<_>>(), ids[2..].to_vec());
        assert!(beyond.is_empty());
        assert_eq!(service.count().await.unwrap(), 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_partial_update(pool: PgPool) {
        let (author_id, category_id) = lookup_ids(&pool).await;
        let service = service(pool.clone());
        let dto = fake_report(author_id, category_id, &["lights"]);
        let created = service.create(&dto).await.unwrap();

        let update = UpdateReportDto {
            title: Some("Um novo titulo".to_string()),
            texts: Some(UpdateReportTextsDto {
                full_text: None,
                final_things: Some("Amem uns aos outros".to_string()),
            }),
            events: Some(EventRecord::from_tags(["other_dimension"])),
            ..Default::default()
        };
        service.update(created.id, &update).await.unwrap();

        let report: Report =
            sqlx::query_as("SELECT id, title, author_id, category_id, date FROM reports WHERE id = $1")
                .bind(created.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(report.title, "Um novo titulo");
        assert_eq!(report.author_id, author_id);
        assert_eq!(report.date, dto.date);

        let text: ReportText = sqlx::query_as(
            "SELECT report_id, full_text, final_things FROM reports_texts WHERE report_id = $1",
        )
        .bind(created.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(text.full_text, dto.full_text);
        assert_eq!(text.final_things.as_deref(), Some("Amem uns aos outros"));

        let details = service.get_by_id(created.id).await.unwrap();
        assert_eq!(details.events, EventRecord::from_tags(["other_dimension"]));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_update_missing_report(pool: PgPool) {
        let update = UpdateReportDto {
            title: Some("Um novo titulo".to_string()),
            ..Default::default()
        };

        let result = service(pool).update(100_000, &update).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn test_failed_update_rolls_back(pool: PgPool) {
        let (author_id, category_id) = lookup_ids(&pool).await;
        let service = service(pool);
        let dto = fake_report(author_id, category_id, &["lights"]);
        let created = service.create(&dto).await.unwrap();

        // The author_id foreign key rejects the whole statement
        let update = UpdateReportDto {
            title: Some("Titulo que nao fica".to_string()),
            author_id: Some(999_999_999),
            ..Default::default()
        };
        let result = service.update(created.id, &update).await;
        assert!(matches!(result, Err(AppError::WriteFailed(_))));

        let details = service.get_by_id(created.id).await.unwrap();
        assert_eq!(details.title, dto.title);
    }
}

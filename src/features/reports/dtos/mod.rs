pub mod report_dto;

pub use report_dto::{
    AuthorInfoDto, CategoryInfoDto, CreateReportDto, DeleteOutcome, EventVocabularyDto,
    ReportIdDto, ReportItemDetailsDto, ReportTextsDto, UpdateReportDto, UpdateReportTextsDto,
};

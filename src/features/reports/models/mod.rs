mod report;
mod report_events;

pub use report::ReportDetailsRow;
#[cfg(test)]
pub use report::{Report, ReportText};
pub use report_events::{is_known_event, EventRecord, EVENT_NAMES};

pub mod app;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod messages;
pub mod people;
pub mod students;

/// Calendar day used for "today" in summaries.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

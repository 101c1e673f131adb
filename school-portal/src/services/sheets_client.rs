//! Spreadsheet-backed roster over the spreadsheet REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use school_core::retry::{RetryConfig, with_retry};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::SheetsSettings;
use crate::models::sheet::{FromSheetRow, records_from_values};
use crate::models::{
    AttendanceRecord, ClassRecord, GradeRecord, MessageRecord, ParentRecord, StudentRecord,
    TeacherRecord,
};
use crate::services::{RosterError, RosterSource};

/// Failure of a single request to the spreadsheet API.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("spreadsheet API returned {status}")]
    Status { status: StatusCode },

    #[error("invalid spreadsheet base URL {0:?}")]
    BaseUrl(String),
}

/// Body of `GET .../values/{range}`. `values` is absent for an empty sheet.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_text(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub struct SheetsClient {
    client: Client,
    settings: SheetsSettings,
    retry: RetryConfig,
}

impl SheetsClient {
    pub fn new(settings: SheetsSettings, retry: RetryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            settings,
            retry,
        })
    }

    /// Sheet names are user-chosen, so each path part is percent-encoded.
    fn values_url(&self, sheet: &str) -> Result<Url, SheetsError> {
        let invalid = || SheetsError::BaseUrl(self.settings.base_url.clone());
        let mut url = Url::parse(&self.settings.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend([self.settings.spreadsheet_id.as_str(), "values", sheet]);
        Ok(url)
    }

    async fn fetch_values_once(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let response = self
            .client
            .get(self.values_url(sheet)?)
            .query(&[("key", self.settings.api_key.expose_secret())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::Status { status });
        }

        let range: ValueRange = response.json().await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Raw values of a whole sheet, header line first.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, RosterError> {
        let values = with_retry(&self.retry, "fetch_sheet", || self.fetch_values_once(sheet))
            .await
            .map_err(|e| RosterError::lookup(sheet, e.attempts, e.last_error))?;

        tracing::debug!(rows = values.len().saturating_sub(1), "Fetched sheet");
        Ok(values)
    }

    async fn fetch_records<T: FromSheetRow>(&self, sheet: &str) -> Result<Vec<T>, RosterError> {
        let values = self.fetch_values(sheet).await?;
        records_from_values(sheet, &values).map_err(|e| {
            tracing::warn!(error = %e, "Rejected malformed spreadsheet row");
            RosterError::from(e)
        })
    }
}

#[async_trait]
impl RosterSource for SheetsClient {
    async fn teachers(&self) -> Result<Vec<TeacherRecord>, RosterError> {
        self.fetch_records(&self.settings.names.teachers).await
    }

    async fn parents(&self) -> Result<Vec<ParentRecord>, RosterError> {
        self.fetch_records(&self.settings.names.parents).await
    }

    async fn students(&self) -> Result<Vec<StudentRecord>, RosterError> {
        self.fetch_records(&self.settings.names.students).await
    }

    async fn classes(&self) -> Result<Vec<ClassRecord>, RosterError> {
        self.fetch_records(&self.settings.names.classes).await
    }

    async fn attendance(&self) -> Result<Vec<AttendanceRecord>, RosterError> {
        self.fetch_records(&self.settings.names.attendance).await
    }

    async fn grades(&self) -> Result<Vec<GradeRecord>, RosterError> {
        self.fetch_records(&self.settings.names.grades).await
    }

    async fn messages(&self) -> Result<Vec<MessageRecord>, RosterError> {
        self.fetch_records(&self.settings.names.messages).await
    }
}

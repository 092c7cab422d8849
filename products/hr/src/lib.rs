//! HR vertical slice: spreadsheet import and employee search.

pub mod coerce;
mod error;
pub mod import;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

use chrono::NaiveDate;
use entity::employees;
use platform_db::DbPool;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::{ImportError, ImportResult};
pub use import::{NewEmployee, ParsedSheet, parse_workbook};

/// Employee as exposed over the API.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i32,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub hire_date: NaiveDate,
    pub salary: f64,
}

impl From<employees::Model> for Employee {
    fn from(model: employees::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            department: model.department,
            hire_date: model.hire_date,
            salary: model.salary_cents as f64 / 100.0,
        }
    }
}

/// Outcome of a committed import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub count: u64,
    pub message: String,
}

impl ImportSummary {
    fn new(count: u64) -> Self {
        Self {
            count,
            message: format!("{count} employees successfully imported."),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HrModule {
    db: DbPool,
}

impl HrModule {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Parse `bytes` off the async runtime, then store every record in one batch.
    pub async fn import_workbook(&self, bytes: Vec<u8>) -> ImportResult<ImportSummary> {
        let parsed = tokio::task::spawn_blocking(move || parse_workbook(&bytes)).await??;
        let ParsedSheet {
            records,
            rows_scanned,
            rows_skipped,
        } = parsed;
        let count = store::append_batch(&self.db, records).await?;
        info!(count, rows_scanned, rows_skipped, "employee import committed");
        Ok(ImportSummary::new(count))
    }

    pub async fn search(&self, term: Option<&str>) -> Result<Vec<Employee>, DbErr> {
        let rows = store::search(&self.db, term).await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }
}

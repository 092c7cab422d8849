use platform_api::ApiError;
use sea_orm::DbErr;
use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Worksheet not found.")]
    NoWorksheet,
    #[error("No valid employee data found in the Excel sheet. Check column structure.")]
    NoRecords,
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("failed to store employees: {0}")]
    Database(#[from] DbErr),
    #[error("import worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ImportError {
    /// Whether the caller sent something unusable, as opposed to a server fault.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ImportError::NoWorksheet | ImportError::NoRecords)
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_invalid_input() {
            ApiError::invalid_input(err.to_string())
        } else {
            ApiError::internal(anyhow::Error::new(err))
        }
    }
}

use crate::domain::stock::StockRecord;

pub trait StockReportRepository {
    /// Appends records, writing the header row only when the file is new.
    fn append(&self, records: &[StockRecord]) -> Result<(), ReportStoreError>;
    fn load(&self) -> Result<Vec<u8>, ReportStoreError>;
    fn file_name(&self) -> String;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReportStoreError {
    #[error("report file {0} not found")]
    Missing(String),
    #[error("report storage error: {0}")]
    StorageError(String),
}

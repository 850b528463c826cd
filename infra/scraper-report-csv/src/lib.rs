use std::{
    fs::OpenOptions,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use scraper_app::{
    domain::stock::StockRecord,
    ports::report::{ReportStoreError, StockReportRepository},
};

#[derive(serde::Serialize)]
struct CsvStockRow<'a> {
    timestamp: String,
    name: &'a str,
    symbol: &'a str,
    price: String,
    change_percent: &'a str,
    volume: &'a str,
    value: &'a str,
}

impl<'a> From<&'a StockRecord> for CsvStockRow<'a> {
    fn from(record: &'a StockRecord) -> Self {
        Self {
            timestamp: record.timestamp(),
            name: &record.name,
            symbol: &record.symbol,
            price: record.price.to_string(),
            change_percent: &record.change_percent,
            volume: &record.volume,
            value: &record.value,
        }
    }
}

/// Keeps every run's rows in one growing CSV file.
pub struct CsvReportRepository {
    path: PathBuf,
}

impl CsvReportRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StockReportRepository for CsvReportRepository {
    fn append(&self, records: &[StockRecord]) -> Result<(), ReportStoreError> {
        let file_exists = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                ReportStoreError::StorageError(format!(
                    "Failed to open {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);
        for record in records {
            writer
                .serialize(CsvStockRow::from(record))
                .map_err(|e| ReportStoreError::StorageError(format!("Failed to write row: {}", e)))?;
        }
        writer
            .flush()
            .map_err(|e| ReportStoreError::StorageError(format!("Failed to flush CSV: {}", e)))?;

        log::debug!(
            "Appended {} rows to {} (header written: {})",
            records.len(),
            self.path.display(),
            !file_exists
        );
        Ok(())
    }

    fn load(&self) -> Result<Vec<u8>, ReportStoreError> {
        std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReportStoreError::Missing(self.path.display().to_string()),
            _ => ReportStoreError::StorageError(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            )),
        })
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

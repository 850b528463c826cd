use chrono::NaiveDateTime;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Minimum number of cells a table row needs to describe a stock.
pub const MIN_ROW_CELLS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StockPrice {
    Missing,
    Quoted(f64),
}

impl StockPrice {
    /// Parses the text of a price cell. Thousands separators and the rupee
    /// sign are dropped; anything else that fails to parse counts as zero.
    pub fn parse(raw: &str) -> Self {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| *c != ',' && *c != '₹')
            .collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return StockPrice::Missing;
        }
        match cleaned.parse::<f64>() {
            Ok(price) => StockPrice::Quoted(price),
            Err(_) => {
                log::warn!("Could not convert price to float: {}", cleaned);
                StockPrice::Quoted(0.0)
            }
        }
    }
}

impl std::fmt::Display for StockPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockPrice::Missing => Ok(()),
            StockPrice::Quoted(price) if price.is_finite() && price.fract() == 0.0 => {
                write!(f, "{:.1}", price)
            }
            StockPrice::Quoted(price) => write!(f, "{}", price),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StockRecord {
    pub scraped_at: NaiveDateTime,
    pub name: String,
    pub symbol: String,
    pub price: StockPrice,
    pub change_percent: String,
    pub volume: String,
    pub value: String,
}

impl StockRecord {
    pub fn timestamp(&self) -> String {
        self.scraped_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Turns the cell texts of one table row into a record.
///
/// The listing renders the company name and its ticker on two lines of the
/// first cell, followed by price, change %, volume and traded value.
pub fn parse_row(cells: &[String], scraped_at: NaiveDateTime) -> Option<StockRecord> {
    if cells.len() < MIN_ROW_CELLS {
        return None;
    }
    let name = cells[0].trim();
    if name.is_empty() {
        return None;
    }
    let symbol = match name.split_once('\n') {
        Some((_, rest)) => rest.lines().next().unwrap_or(rest).trim(),
        None => name,
    };
    Some(StockRecord {
        scraped_at,
        name: name.to_string(),
        symbol: symbol.to_string(),
        price: StockPrice::parse(&cells[1]),
        change_percent: cells[2].trim().to_string(),
        volume: cells[3].trim().to_string(),
        value: cells[4].trim().to_string(),
    })
}

/// Accumulates records across scroll attempts, keeping the first row seen
/// for every stock name.
#[derive(Default)]
pub struct StockCollector {
    records: Vec<StockRecord>,
    seen: std::collections::HashSet<String>,
}

impl StockCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the row produced a new record.
    pub fn collect_row(&mut self, cells: &[String], scraped_at: NaiveDateTime) -> bool {
        let Some(record) = parse_row(cells, scraped_at) else {
            return false;
        };
        if !self.seen.insert(record.name.clone()) {
            return false;
        }
        log::debug!("Extracted stock: {} - {}", record.name, record.price);
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<StockRecord> {
        self.records
    }
}

use chrono::NaiveDate;

pub const CSV_HEADERS: [&str; 7] = [
    "timestamp",
    "name",
    "symbol",
    "price",
    "change_percent",
    "volume",
    "value",
];

/// The daily email carrying the CSV export.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportEmail {
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

impl ReportEmail {
    pub fn for_date(date: NaiveDate, attachment_name: &str, attachment: Vec<u8>) -> Self {
        let day = date.format("%Y-%m-%d");
        Self {
            subject: format!("Stock Data Report - {}", day),
            body: format!(
                "Please find attached the stock data report for {}.",
                day
            ),
            attachment_name: attachment_name.to_string(),
            attachment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_email_wording() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        let email = ReportEmail::for_date(date, "dhan_stocks.csv", b"a,b\n".to_vec());
        assert_eq!(email.subject, "Stock Data Report - 2024-07-04");
        assert_eq!(
            email.body,
            "Please find attached the stock data report for 2024-07-04."
        );
        assert_eq!(email.attachment_name, "dhan_stocks.csv");
        assert_eq!(email.attachment, b"a,b\n");
    }
}

use std::str::FromStr;

use lettre::{
    Message, SmtpTransport, Transport,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use scraper_app::{
    domain::report::ReportEmail,
    ports::email::{EmailPort, SendEmailError},
};

pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailSetupError {
    #[error("invalid sender address '{0}'")]
    InvalidFromAddress(String),
    #[error("failed to create SMTP transport: {0}")]
    Transport(String),
}

pub struct LettreEmailAdapter {
    transport: SmtpTransport,
    from: Mailbox,
}

impl LettreEmailAdapter {
    /// Sends as the SMTP user over STARTTLS, the way Gmail app passwords expect.
    pub fn new(settings: SmtpSettings) -> Result<Self, EmailSetupError> {
        let from = Mailbox::from_str(&settings.username)
            .map_err(|_| EmailSetupError::InvalidFromAddress(settings.username.clone()))?;
        let transport = SmtpTransport::starttls_relay(&settings.host)
            .map_err(|e| EmailSetupError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .build();
        Ok(Self { transport, from })
    }

    fn build_message(&self, to: &str, report: &ReportEmail) -> Result<Message, SendEmailError> {
        let to = Mailbox::from_str(to)
            .map_err(|e| SendEmailError::InvalidToAddress(format!("{}: {}", to, e)))?;
        let csv_type = ContentType::parse("text/csv")
            .map_err(|e| SendEmailError::BuildError(e.to_string()))?;
        let attachment =
            Attachment::new(report.attachment_name.clone()).body(report.attachment.clone(), csv_type);

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(report.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(report.body.clone()))
                    .singlepart(attachment),
            )
            .map_err(|e| SendEmailError::BuildError(e.to_string()))
    }
}

impl EmailPort for LettreEmailAdapter {
    fn send_report(&self, to: &str, report: &ReportEmail) -> Result<(), SendEmailError> {
        let email = self.build_message(to, report)?;
        log::debug!(
            "Sending {} ({} bytes attached) to {}",
            report.subject,
            report.attachment.len(),
            to
        );
        self.transport
            .send(&email)
            .map_err(|e| SendEmailError::SendEmailError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn adapter() -> LettreEmailAdapter {
        LettreEmailAdapter::new(SmtpSettings {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: "scraper@example.com".to_string(),
            password: "app-password".to_string(),
        })
        .unwrap()
    }

    fn report() -> ReportEmail {
        ReportEmail::for_date(
            NaiveDate::from_ymd_opt(2024, 7, 4).unwrap(),
            "dhan_stocks.csv",
            b"timestamp,name\n".to_vec(),
        )
    }

    #[test]
    fn test_message_carries_csv_attachment() {
        let message = adapter()
            .build_message("ops@example.com", &report())
            .unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();

        assert!(raw.contains("From: scraper@example.com"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("Subject: Stock Data Report - 2024-07-04"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("text/csv"));
        assert!(raw.contains("dhan_stocks.csv"));
        assert!(raw.contains("Please find attached the stock data report for 2024-07-04."));
    }

    #[test]
    fn test_invalid_recipient() {
        let err = adapter().build_message("not an address", &report()).unwrap_err();
        assert!(matches!(err, SendEmailError::InvalidToAddress(_)));
    }

    #[test]
    fn test_invalid_sender() {
        let result = LettreEmailAdapter::new(SmtpSettings {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: "nobody".to_string(),
            password: String::new(),
        });
        assert!(matches!(result, Err(EmailSetupError::InvalidFromAddress(_))));
    }
}

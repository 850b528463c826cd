use crate::domain::report::ReportEmail;

pub trait EmailPort {
    fn send_report(&self, to: &str, report: &ReportEmail) -> Result<(), SendEmailError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SendEmailError {
    #[error("invalid recipient address: {0}")]
    InvalidToAddress(String),
    #[error("failed to build email: {0}")]
    BuildError(String),
    #[error("failed to send email: {0}")]
    SendEmailError(String),
}

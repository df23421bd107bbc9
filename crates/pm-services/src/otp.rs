//! Password-reset code delivery

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to deliver reset code: {0}")]
    Failed(String),
}

/// Where a reset code is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpDestination {
    Email(String),
    Phone(String),
}

impl OtpDestination {
    /// The address with most of it hidden, safe for logs and responses
    pub fn masked(&self) -> String {
        match self {
            OtpDestination::Email(email) => match email.split_once('@') {
                Some((local, domain)) => format!("{}***@{}", first_char(local), domain),
                None => "***".to_string(),
            },
            OtpDestination::Phone(phone) => {
                let digits: Vec<char> = phone.chars().collect();
                let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
                format!("***{}", tail)
            }
        }
    }
}

fn first_char(s: &str) -> String {
    s.chars().next().map(String::from).unwrap_or_default()
}

/// Sends reset codes by e-mail or SMS
#[async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn deliver(
        &self,
        destination: &OtpDestination,
        code: &str,
        valid_for_minutes: u64,
    ) -> Result<(), DeliveryError>;
}

/// Development delivery that only writes the code to the log
#[derive(Debug, Clone, Default)]
pub struct LogOtpDelivery;

#[async_trait]
impl OtpDelivery for LogOtpDelivery {
    async fn deliver(
        &self,
        destination: &OtpDestination,
        code: &str,
        valid_for_minutes: u64,
    ) -> Result<(), DeliveryError> {
        tracing::info!(to = %destination.masked(), valid_for_minutes, "Password reset code issued");
        tracing::debug!(code, "Password reset code");
        Ok(())
    }
}

use chrono::NaiveDate;
use explore_core::identity::is_email;
use explore_core::{CoreError, CoreResult, Record};
use explore_shared::pii::Masked;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    #[default]
    New,
    Responded,
    Archived,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Responded => "responded",
            InquiryStatus::Archived => "archived",
        }
    }
}

/// A freeform custom-trip request submitted by a visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inquiry {
    pub id: u64,
    pub user_name: String,
    pub email: Masked<String>,
    pub destination: String,
    pub budget: String,
    pub notes: String,
    pub status: InquiryStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInquiry {
    pub user_name: String,
    pub email: String,
    pub destination: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub notes: String,
}

impl NewInquiry {
    pub fn into_inquiry(self, date: NaiveDate) -> CoreResult<Inquiry> {
        if self.user_name.trim().is_empty() {
            return Err(CoreError::ValidationError("Name is required".to_string()));
        }
        if !is_email(self.email.trim()) {
            return Err(CoreError::ValidationError("Please enter a valid email".to_string()));
        }
        if self.destination.trim().is_empty() {
            return Err(CoreError::ValidationError("Destination is required".to_string()));
        }
        Ok(Inquiry {
            id: 0,
            user_name: self.user_name,
            email: Masked(self.email.trim().to_string()),
            destination: self.destination,
            budget: self.budget,
            notes: self.notes,
            status: InquiryStatus::New,
            date,
        })
    }
}

impl Record for Inquiry {
    type Patch = InquiryStatus;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, status: InquiryStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str) -> NewInquiry {
        NewInquiry {
            user_name: "Ahad Malik".to_string(),
            email: email.to_string(),
            destination: "Custom Skardu Honeymoon".to_string(),
            budget: "2000".to_string(),
            notes: "Need a private cottage near Shangrila.".to_string(),
        }
    }

    #[test]
    fn test_new_inquiry_starts_as_new() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let inquiry = form("aadimalik226@gmail.com").into_inquiry(date).unwrap();
        assert_eq!(inquiry.status, InquiryStatus::New);
        assert_eq!(inquiry.date, date);
    }

    #[test]
    fn test_malformed_email_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        assert!(form("not-an-email").into_inquiry(date).is_err());
    }
}

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::document::{DocumentKind, DocumentStatus, NewDocument, StatusUpdate};

const TEXT_MAX_LEN: u64 = 256;
const NOTES_MAX_LEN: u64 = 2000;

pub type DocumentFormResult<T> = Result<T, DocumentFormError>;

#[derive(Debug, Error)]
pub enum DocumentFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("unknown document type `{0}`")]
    UnknownKind(String),
    #[error("customer name cannot be empty")]
    EmptyCustomerName,
    #[error("status cannot be empty")]
    EmptyStatus,
}

/// Form payload emitted by the "new document" dialog.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AddDocumentForm {
    /// `order` or `delivery_note`.
    pub kind: String,
    /// Left blank to have the next free number assigned.
    #[serde(default)]
    #[validate(length(max = 32))]
    pub number: Option<String>,
    /// Defaults to the current day.
    #[serde(default)]
    pub date: Option<String>,
    #[validate(length(min = 1, max = TEXT_MAX_LEN))]
    pub customer_name: String,
    #[serde(default)]
    #[validate(length(max = TEXT_MAX_LEN))]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    #[validate(length(max = TEXT_MAX_LEN))]
    pub action_type: Option<String>,
    #[serde(default)]
    #[validate(length(max = TEXT_MAX_LEN))]
    pub agent: Option<String>,
    #[serde(default)]
    #[validate(length(max = NOTES_MAX_LEN))]
    pub notes: Option<String>,
}

impl AddDocumentForm {
    pub fn document_kind(&self) -> DocumentFormResult<DocumentKind> {
        DocumentKind::parse(&self.kind).ok_or_else(|| DocumentFormError::UnknownKind(self.kind.clone()))
    }

    /// Validate and sanitise into a domain payload.
    ///
    /// `next_number` is used when the form leaves the number blank; `today`
    /// when it leaves the date blank.
    pub fn into_new_document(
        self,
        next_number: impl FnOnce(DocumentKind) -> String,
        today: NaiveDate,
    ) -> DocumentFormResult<NewDocument> {
        self.validate()?;
        let kind = self.document_kind()?;

        let customer_name = sanitize_inline_text(&self.customer_name);
        if customer_name.is_empty() {
            return Err(DocumentFormError::EmptyCustomerName);
        }

        let number = match optional_text(self.number) {
            Some(number) => number,
            None => next_number(kind),
        };
        let date = optional_text(self.date).unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
        let status = optional_text(self.status)
            .map(|status| DocumentStatus::parse(&status))
            .unwrap_or_default();

        let mut document = NewDocument::new(kind, number, date).with_status(status);
        document.customer_name = customer_name;
        document.address = sanitize_inline_text(&self.address);
        document.phone = sanitize_inline_text(&self.phone);
        document.action_type = optional_text(self.action_type);
        document.agent = optional_text(self.agent);
        document.notes = self
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());
        Ok(document)
    }
}

/// Form payload for changing an order's status.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusForm {
    #[validate(length(min = 1, max = 64))]
    pub status: String,
}

impl UpdateStatusForm {
    pub fn into_status_update(self, number: &str) -> DocumentFormResult<StatusUpdate> {
        self.validate()?;

        let status = sanitize_inline_text(&self.status);
        if status.is_empty() {
            return Err(DocumentFormError::EmptyStatus);
        }

        Ok(StatusUpdate::new(number.trim(), DocumentStatus::parse(&status)))
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| sanitize_inline_text(&value))
        .filter(|value| !value.is_empty())
}

fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

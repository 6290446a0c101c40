//! Sheet records as they travel over the wire.
//!
//! The sheet uses natural-language column names as keys. This module is the
//! only place that knows them; everything past the gateway works with the
//! typed records from [`crate::domain::document`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::document::{
    Document as DomainDocument, DocumentKind, DocumentStatus, NewDocument as DomainNewDocument,
    StatusUpdate as DomainStatusUpdate,
};

pub const KEY_NUMBER: &str = "מספר מסמך";
pub const KEY_KIND: &str = "סוג מסמך";
pub const KEY_DATE: &str = "תאריך";
pub const KEY_CUSTOMER: &str = "שם לקוח";
pub const KEY_ADDRESS: &str = "כתובת";
pub const KEY_PHONE: &str = "טלפון לקוח";
pub const KEY_STATUS: &str = "סטטוס";
pub const KEY_ACTION_TYPE: &str = "סוג פעולה";
pub const KEY_AGENT: &str = "סוכן";
pub const KEY_NOTES: &str = "הערות";
pub const KEY_LINKED_ORDER: &str = "מספר הזמנה מקושר";

/// A row read from either sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(rename = "מספר מסמך", default, deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(rename = "סוג מסמך", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(rename = "תאריך", default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "שם לקוח", default, deserialize_with = "lenient_string")]
    pub customer_name: String,
    #[serde(rename = "כתובת", default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(rename = "טלפון לקוח", default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(rename = "סטטוס", default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(rename = "סוג פעולה", default, deserialize_with = "lenient_string")]
    pub action_type: String,
    #[serde(rename = "סוכן", default, deserialize_with = "lenient_string")]
    pub agent: String,
    #[serde(rename = "הערות", default, deserialize_with = "lenient_string")]
    pub notes: String,
    #[serde(rename = "מספר הזמנה מקושר", default, deserialize_with = "lenient_string")]
    pub linked_order: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Document {
    /// Convert into the domain record. `kind` comes from the sheet the row was
    /// read from; the row's own type column is not trusted.
    pub fn into_domain(self, kind: DocumentKind) -> DomainDocument {
        DomainDocument {
            number: self.number.trim().to_string(),
            kind,
            date: self.date,
            customer_name: self.customer_name,
            address: self.address,
            phone: self.phone,
            status: DocumentStatus::parse(&self.status),
            action_type: non_empty(self.action_type),
            agent: non_empty(self.agent),
            notes: non_empty(self.notes),
            linked_order: non_empty(self.linked_order),
            extra: self
                .extra
                .into_iter()
                .map(|(key, value)| (key, value_to_string(&value)))
                .collect(),
        }
    }
}

/// Decode a `data` payload into domain documents of the given kind.
///
/// Anything that is not an array yields no documents. Array entries that are
/// not objects are skipped.
pub fn documents_from_payload(data: Option<Value>, kind: DocumentKind) -> Vec<DomainDocument> {
    let rows = match data {
        Some(Value::Array(rows)) => rows,
        None | Some(Value::Null) => return Vec::new(),
        Some(other) => {
            log::warn!("Expected an array of {kind} records, got {other}");
            return Vec::new();
        }
    };

    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            if !row.is_object() {
                log::warn!("Skipping {kind} record #{index}: not an object");
                return None;
            }
            match serde_json::from_value::<Document>(row) {
                Ok(record) => Some(record.into_domain(kind)),
                Err(err) => {
                    log::warn!("Skipping {kind} record #{index}: {err}");
                    None
                }
            }
        })
        .collect()
}

/// Payload sent when creating a document.
#[derive(Debug, Serialize)]
pub struct NewDocument<'a> {
    #[serde(rename = "מספר מסמך")]
    pub number: &'a str,
    #[serde(rename = "סוג מסמך")]
    pub kind: &'a str,
    #[serde(rename = "תאריך")]
    pub date: &'a str,
    #[serde(rename = "שם לקוח")]
    pub customer_name: &'a str,
    #[serde(rename = "כתובת")]
    pub address: &'a str,
    #[serde(rename = "טלפון לקוח")]
    pub phone: &'a str,
    #[serde(rename = "סטטוס")]
    pub status: &'a str,
    #[serde(rename = "סוג פעולה", skip_serializing_if = "Option::is_none")]
    pub action_type: Option<&'a str>,
    #[serde(rename = "סוכן", skip_serializing_if = "Option::is_none")]
    pub agent: Option<&'a str>,
    #[serde(rename = "הערות", skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
    #[serde(rename = "מספר הזמנה מקושר", skip_serializing_if = "Option::is_none")]
    pub linked_order: Option<&'a str>,
}

impl<'a> From<&'a DomainNewDocument> for NewDocument<'a> {
    fn from(document: &'a DomainNewDocument) -> Self {
        Self {
            number: &document.number,
            kind: document.kind.wire_label(),
            date: &document.date,
            customer_name: &document.customer_name,
            address: &document.address,
            phone: &document.phone,
            status: document.status.as_wire(),
            action_type: document.action_type.as_deref(),
            agent: document.agent.as_deref(),
            notes: document.notes.as_deref(),
            linked_order: document.linked_order.as_deref(),
        }
    }
}

/// Payload sent when changing an order's status.
#[derive(Debug, Serialize)]
pub struct StatusUpdate<'a> {
    #[serde(rename = "מספר מסמך")]
    pub number: &'a str,
    #[serde(rename = "סטטוס")]
    pub status: &'a str,
}

impl<'a> From<&'a DomainStatusUpdate> for StatusUpdate<'a> {
    fn from(update: &'a DomainStatusUpdate) -> Self {
        Self {
            number: &update.number,
            status: update.status.as_wire(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The two document families kept in separate sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Customer order, numbered under the `620` prefix.
    Order,
    /// Delivery note, numbered under the `671` prefix.
    DeliveryNote,
}

impl DocumentKind {
    /// Numeric prefix shared by every document number of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Order => "620",
            DocumentKind::DeliveryNote => "671",
        }
    }

    /// Label stored in the sheet's document type column.
    pub fn wire_label(self) -> &'static str {
        match self {
            DocumentKind::Order => "הזמנה",
            DocumentKind::DeliveryNote => "תעודת משלוח",
        }
    }

    /// Parses either the sheet label or the snake case name used by forms.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "הזמנה" | "order" => Some(DocumentKind::Order),
            "תעודת משלוח" | "delivery_note" => Some(DocumentKind::DeliveryNote),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_label())
    }
}

/// Lifecycle status of a document.
///
/// The sheet stores free-form strings. Known values are mapped to variants and
/// anything else is kept verbatim in [`DocumentStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DocumentStatus {
    #[default]
    New,
    InProgress,
    Urgent,
    /// Terminal status. Converted orders and delivery notes end here.
    Closed,
    Other(String),
}

impl DocumentStatus {
    /// Maps a sheet or form value to a status. Blank input is `New`.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "חדש" | "new" | "open" => DocumentStatus::New,
            "בטיפול" | "in progress" | "in_progress" => DocumentStatus::InProgress,
            "דחוף" | "urgent" => DocumentStatus::Urgent,
            "הושלם" | "closed" => DocumentStatus::Closed,
            _ => DocumentStatus::Other(trimmed.to_string()),
        }
    }

    /// Canonical value written back to the sheet.
    pub fn as_wire(&self) -> &str {
        match self {
            DocumentStatus::New => "חדש",
            DocumentStatus::InProgress => "בטיפול",
            DocumentStatus::Urgent => "דחוף",
            DocumentStatus::Closed => "הושלם",
            DocumentStatus::Other(value) => value,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, DocumentStatus::Closed)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl From<&str> for DocumentStatus {
    fn from(value: &str) -> Self {
        DocumentStatus::parse(value)
    }
}

impl Serialize for DocumentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for DocumentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(DocumentStatus::parse(&value))
    }
}

/// Domain representation of an order or a delivery note.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Document {
    /// Document number, unique within its kind.
    pub number: String,
    /// Which sheet the document belongs to.
    pub kind: DocumentKind,
    /// Document date exactly as stored in the sheet.
    pub date: String,
    pub customer_name: String,
    pub address: String,
    /// Customer phone; the key used to derive customers.
    pub phone: String,
    pub status: DocumentStatus,
    pub action_type: Option<String>,
    pub agent: Option<String>,
    pub notes: Option<String>,
    /// Number of the order a delivery note was converted from.
    pub linked_order: Option<String>,
    /// Sheet columns without a dedicated field.
    pub extra: BTreeMap<String, String>,
}

impl Document {
    /// Creates a document with empty descriptive fields.
    pub fn new(kind: DocumentKind, number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            kind,
            date: String::new(),
            customer_name: String::new(),
            address: String::new(),
            phone: String::new(),
            status: DocumentStatus::default(),
            action_type: None,
            agent: None,
            notes: None,
            linked_order: None,
            extra: BTreeMap::new(),
        }
    }

    /// Every field value joined by spaces, used for free-text search.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            &self.number,
            self.kind.wire_label(),
            &self.date,
            &self.customer_name,
            &self.address,
            &self.phone,
            self.status.as_wire(),
        ];
        parts.extend(self.action_type.as_deref());
        parts.extend(self.agent.as_deref());
        parts.extend(self.notes.as_deref());
        parts.extend(self.linked_order.as_deref());
        parts.extend(self.extra.values().map(String::as_str));
        parts.join(" ")
    }
}

/// Payload written to the sheet when a document is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub number: String,
    pub kind: DocumentKind,
    pub date: String,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub status: DocumentStatus,
    pub action_type: Option<String>,
    pub agent: Option<String>,
    pub notes: Option<String>,
    pub linked_order: Option<String>,
}

impl NewDocument {
    /// Build a payload with the default status and no optional fields.
    pub fn new(kind: DocumentKind, number: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            kind,
            date: date.into(),
            customer_name: String::new(),
            address: String::new(),
            phone: String::new(),
            status: DocumentStatus::default(),
            action_type: None,
            agent: None,
            notes: None,
            linked_order: None,
        }
    }

    /// Copy the customer block (name, address, phone) from another document.
    pub fn with_customer_of(mut self, source: &Document) -> Self {
        self.customer_name = source.customer_name.clone();
        self.address = source.address.clone();
        self.phone = source.phone.clone();
        self
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach a back-reference to the order this document was derived from.
    pub fn with_linked_order(mut self, order_number: impl Into<String>) -> Self {
        self.linked_order = Some(order_number.into());
        self
    }
}

/// Status change applied to an existing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub number: String,
    pub status: DocumentStatus,
}

impl StatusUpdate {
    pub fn new(number: impl Into<String>, status: DocumentStatus) -> Self {
        Self {
            number: number.into(),
            status,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::document::{Document, DocumentStatus};

/// Filters applied to the orders table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub action_type: Option<String>,
    pub agent: Option<String>,
    /// Case-insensitive substring matched against every field value.
    pub search: Option<String>,
    /// Closed rows are hidden when this is unset.
    pub show_closed: bool,
}

impl OrderFilter {
    pub fn matches(&self, document: &Document) -> bool {
        if !self.show_closed && document.status.is_closed() {
            return false;
        }
        if let Some(status) = non_blank(&self.status) {
            if document.status != DocumentStatus::parse(status) {
                return false;
            }
        }
        if let Some(action_type) = non_blank(&self.action_type) {
            if document.action_type.as_deref() != Some(action_type) {
                return false;
            }
        }
        if let Some(agent) = non_blank(&self.agent) {
            if document.agent.as_deref() != Some(agent) {
                return false;
            }
        }
        if let Some(term) = non_blank(&self.search) {
            let haystack = document.search_text().to_lowercase();
            if !haystack.contains(&term.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Keep the documents accepted by `filter`, preserving order.
pub fn filter_documents<'a>(documents: &'a [Document], filter: &OrderFilter) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|document| filter.matches(document))
        .collect()
}

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Number,
    Date,
    Customer,
    Address,
    Phone,
    Status,
    ActionType,
    Agent,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Number,
        SortColumn::Date,
        SortColumn::Customer,
        SortColumn::Address,
        SortColumn::Phone,
        SortColumn::Status,
        SortColumn::ActionType,
        SortColumn::Agent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortColumn::Number => "number",
            SortColumn::Date => "date",
            SortColumn::Customer => "customer",
            SortColumn::Address => "address",
            SortColumn::Phone => "phone",
            SortColumn::Status => "status",
            SortColumn::ActionType => "action_type",
            SortColumn::Agent => "agent",
        }
    }

    fn text(self, document: &Document) -> &str {
        match self {
            SortColumn::Number => &document.number,
            SortColumn::Date => &document.date,
            SortColumn::Customer => &document.customer_name,
            SortColumn::Address => &document.address,
            SortColumn::Phone => &document.phone,
            SortColumn::Status => document.status.as_wire(),
            SortColumn::ActionType => document.action_type.as_deref().unwrap_or(""),
            SortColumn::Agent => document.agent.as_deref().unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn name(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Current sort of a table. `column == None` keeps sheet order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self {
            column: Some(column),
            direction,
        }
    }

    /// State after clicking the header of `column`: a new column starts
    /// ascending, the active column flips direction.
    pub fn toggle(self, column: SortColumn) -> Self {
        match self.column {
            Some(current) if current == column => {
                let direction = match self.direction {
                    SortDirection::Asc => SortDirection::Desc,
                    SortDirection::Desc => SortDirection::Asc,
                };
                SortState::new(column, direction)
            }
            _ => SortState::new(column, SortDirection::Asc),
        }
    }
}

/// Lexicographic sort on the column text. Equal keys keep their order.
pub fn sort_documents(documents: &mut [&Document], state: SortState) {
    let Some(column) = state.column else {
        return;
    };
    documents.sort_by(|a, b| {
        let ordering = column.text(a).cmp(column.text(b));
        match state.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Distinct non-empty values of a field, in order of first appearance.
/// Feeds the filter drop-downs.
pub fn distinct_values<'a, F>(documents: &'a [Document], field: F) -> Vec<&'a str>
where
    F: Fn(&'a Document) -> Option<&'a str>,
{
    let mut values: Vec<&str> = Vec::new();
    for value in documents.iter().filter_map(field) {
        if !value.is_empty() && !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::DocumentKind;

    fn order(number: &str, status: DocumentStatus, customer: &str) -> Document {
        let mut document = Document::new(DocumentKind::Order, number);
        document.status = status;
        document.customer_name = customer.to_string();
        document
    }

    fn mixed_orders() -> Vec<Document> {
        vec![
            order("620-0001", DocumentStatus::New, "Dana"),
            order("620-0002", DocumentStatus::Closed, "Avi"),
            order("620-0003", DocumentStatus::Urgent, "Noa"),
            order("620-0004", DocumentStatus::Closed, "Dana"),
            order("620-0005", DocumentStatus::New, "Eli"),
        ]
    }

    fn numbers(documents: &[&Document]) -> Vec<String> {
        documents.iter().map(|d| d.number.clone()).collect()
    }

    #[test]
    fn hiding_closed_removes_exactly_the_closed_rows() {
        let orders = mixed_orders();
        let shown = OrderFilter {
            show_closed: true,
            ..OrderFilter::default()
        };
        let hidden = OrderFilter::default();

        let all = filter_documents(&orders, &shown);
        let open = filter_documents(&orders, &hidden);

        assert_eq!(all.len(), 5);
        assert_eq!(numbers(&open), vec!["620-0001", "620-0003", "620-0005"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut orders = mixed_orders();
        orders[4].address = "HAIFA port".to_string();
        let filter = OrderFilter {
            search: Some("haifa".to_string()),
            show_closed: true,
            ..OrderFilter::default()
        };

        assert_eq!(numbers(&filter_documents(&orders, &filter)), vec!["620-0005"]);
    }

    #[test]
    fn status_agent_and_action_type_filters_combine() {
        let mut orders = mixed_orders();
        orders[0].agent = Some("Yossi".to_string());
        orders[0].action_type = Some("installation".to_string());
        orders[4].agent = Some("Yossi".to_string());
        let filter = OrderFilter {
            status: Some("new".to_string()),
            agent: Some("Yossi".to_string()),
            action_type: Some("installation".to_string()),
            ..OrderFilter::default()
        };

        assert_eq!(numbers(&filter_documents(&orders, &filter)), vec!["620-0001"]);
    }

    #[test]
    fn blank_filter_values_are_ignored() {
        let orders = mixed_orders();
        let filter = OrderFilter {
            status: Some("  ".to_string()),
            search: Some(String::new()),
            show_closed: true,
            ..OrderFilter::default()
        };

        assert_eq!(filter_documents(&orders, &filter).len(), 5);
    }

    #[test]
    fn toggle_cycles_between_ascending_and_descending() {
        let state = SortState::default().toggle(SortColumn::Customer);
        assert_eq!(state, SortState::new(SortColumn::Customer, SortDirection::Asc));

        let state = state.toggle(SortColumn::Customer);
        assert_eq!(state.direction, SortDirection::Desc);

        let state = state.toggle(SortColumn::Customer);
        assert_eq!(state.direction, SortDirection::Asc);

        let state = state.toggle(SortColumn::Date);
        assert_eq!(state, SortState::new(SortColumn::Date, SortDirection::Asc));
    }

    #[test]
    fn sort_is_lexicographic_and_keeps_ties_in_order() {
        let orders = mixed_orders();
        let mut rows: Vec<&Document> = orders.iter().collect();

        sort_documents(
            &mut rows,
            SortState::new(SortColumn::Customer, SortDirection::Asc),
        );
        assert_eq!(
            numbers(&rows),
            vec!["620-0002", "620-0001", "620-0004", "620-0005", "620-0003"]
        );

        sort_documents(
            &mut rows,
            SortState::new(SortColumn::Customer, SortDirection::Desc),
        );
        assert_eq!(numbers(&rows)[0], "620-0003");
    }

    #[test]
    fn numbers_sort_as_text() {
        let orders = vec![
            order("620-10000", DocumentStatus::New, ""),
            order("620-0009", DocumentStatus::New, ""),
        ];
        let mut rows: Vec<&Document> = orders.iter().collect();

        sort_documents(&mut rows, SortState::new(SortColumn::Number, SortDirection::Asc));

        assert_eq!(numbers(&rows), vec!["620-0009", "620-10000"]);
    }

    #[test]
    fn distinct_values_skips_blanks_and_duplicates() {
        let mut orders = mixed_orders();
        orders[0].agent = Some("Yossi".to_string());
        orders[1].agent = Some("Rina".to_string());
        orders[2].agent = Some("Yossi".to_string());

        let agents = distinct_values(&orders, |d| d.agent.as_deref());

        assert_eq!(agents, vec!["Yossi", "Rina"]);
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;
use crate::domain::dashboard::Kpis;
use crate::domain::document::{Document, DocumentKind};
use crate::repository::DocumentReader;
use crate::services::ServiceResult;
use crate::services::customers::{MissingPhonePolicy, aggregate_customers};
use crate::services::filter::{
    OrderFilter, SortColumn, SortDirection, SortState, distinct_values, filter_documents,
    sort_documents,
};
use crate::services::numbering::next_document_number;

/// Everything derived from one complete data load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub orders: Vec<Document>,
    pub delivery_notes: Vec<Document>,
    pub customers: Vec<Customer>,
    pub kpis: Kpis,
    /// Ticket of the reload that produced this snapshot; `0` before any load.
    pub generation: u64,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn find_order(&self, number: &str) -> Option<&Document> {
        let number = number.trim();
        self.orders.iter().find(|order| order.number == number)
    }

    /// Documents of `kind`, used for number generation.
    pub fn documents_of(&self, kind: DocumentKind) -> &[Document] {
        match kind {
            DocumentKind::Order => &self.orders,
            DocumentKind::DeliveryNote => &self.delivery_notes,
        }
    }

    pub fn next_number(&self, kind: DocumentKind) -> String {
        next_document_number(kind, self.documents_of(kind))
    }
}

/// Owner of the dashboard data.
///
/// Readers get immutable snapshots. [`DashboardState::reload`] builds a new
/// snapshot off to the side and swaps it in whole; a reload that finishes
/// after a newer one was already applied is dropped.
pub struct DashboardState<R> {
    repo: R,
    policy: MissingPhonePolicy,
    current: RwLock<Arc<DashboardSnapshot>>,
    tickets: AtomicU64,
}

impl<R> DashboardState<R>
where
    R: DocumentReader,
{
    pub fn new(repo: R, policy: MissingPhonePolicy) -> Self {
        Self {
            repo,
            policy,
            current: RwLock::new(Arc::new(DashboardSnapshot::default())),
            tickets: AtomicU64::new(0),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Fetch both lists, derive customers and KPIs, then publish the result.
    ///
    /// On error the previous snapshot stays in place.
    pub async fn reload(&self) -> ServiceResult<Arc<DashboardSnapshot>> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;

        let orders = self.repo.list_orders().await?;
        let delivery_notes = self.repo.list_delivery_notes().await?;
        let customers = aggregate_customers(&orders, &delivery_notes, self.policy)?;
        let kpis = Kpis::compute(&orders, &delivery_notes, &customers);

        let fresh = Arc::new(DashboardSnapshot {
            orders,
            delivery_notes,
            customers,
            kpis,
            generation: ticket,
            loaded_at: Some(Utc::now()),
        });

        Ok(self.publish(fresh))
    }

    /// Swap in `fresh` unless a newer snapshot is already published, and
    /// return whichever snapshot is current afterwards.
    fn publish(&self, fresh: Arc<DashboardSnapshot>) -> Arc<DashboardSnapshot> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if fresh.generation > current.generation {
            log::debug!(
                "Dashboard reloaded (generation {}, {} orders, {} delivery notes)",
                fresh.generation,
                fresh.orders.len(),
                fresh.delivery_notes.len()
            );
            *current = Arc::clone(&fresh);
            fresh
        } else {
            log::debug!(
                "Dropping reload {}: generation {} already applied",
                fresh.generation,
                current.generation
            );
            Arc::clone(&current)
        }
    }
}

/// Query parameters accepted by the orders table.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub action_type: Option<String>,
    pub agent: Option<String>,
    pub search: Option<String>,
    /// Closed orders are listed unless the query turns them off.
    #[serde(default = "show_closed_by_default")]
    pub show_closed: bool,
    pub sort: Option<SortColumn>,
    pub dir: Option<SortDirection>,
}

fn show_closed_by_default() -> bool {
    true
}

impl Default for OrdersQuery {
    fn default() -> Self {
        Self {
            status: None,
            action_type: None,
            agent: None,
            search: None,
            show_closed: show_closed_by_default(),
            sort: None,
            dir: None,
        }
    }
}

impl OrdersQuery {
    pub fn filter(&self) -> OrderFilter {
        OrderFilter {
            status: self.status.clone(),
            action_type: self.action_type.clone(),
            agent: self.agent.clone(),
            search: self.search.clone(),
            show_closed: self.show_closed,
        }
    }

    pub fn sort_state(&self) -> SortState {
        SortState {
            column: self.sort,
            direction: self.dir.unwrap_or_default(),
        }
    }
}

/// Header link target for one sortable column.
#[derive(Debug, Clone, Serialize)]
pub struct SortLink {
    pub column: &'static str,
    pub direction: SortDirection,
    pub active: bool,
    /// Table URL with the current filters and this column's next sort.
    pub href: String,
}

/// Orders table URL for `filter` sorted by `sort`.
pub fn orders_href(filter: &OrderFilter, sort: SortState) -> String {
    let mut params: Vec<(&str, &str)> = [
        ("status", &filter.status),
        ("action_type", &filter.action_type),
        ("agent", &filter.agent),
        ("search", &filter.search),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(|value| (name, value))
    })
    .collect();
    params.push(("show_closed", if filter.show_closed { "true" } else { "false" }));
    if let Some(column) = sort.column {
        params.push(("sort", column.name()));
        params.push(("dir", sort.direction.name()));
    }

    match serde_html_form::to_string(&params) {
        Ok(query) => format!("/?{query}"),
        Err(err) => {
            log::warn!("Failed to encode orders query: {err}");
            "/".to_string()
        }
    }
}

/// Data required to render the orders table.
#[derive(Debug, Serialize)]
pub struct OrdersPageData {
    pub orders: Vec<Document>,
    pub filter: OrderFilter,
    pub sort: SortState,
    pub sort_links: Vec<SortLink>,
    pub statuses: Vec<String>,
    pub action_types: Vec<String>,
    pub agents: Vec<String>,
    pub next_order_number: String,
    pub next_delivery_note_number: String,
}

/// Filter and sort the snapshot's orders for display.
pub fn load_orders_page(snapshot: &DashboardSnapshot, query: &OrdersQuery) -> OrdersPageData {
    let filter = query.filter();
    let sort = query.sort_state();

    let mut rows = filter_documents(&snapshot.orders, &filter);
    sort_documents(&mut rows, sort);

    let sort_links = SortColumn::ALL
        .iter()
        .map(|&column| {
            let next = sort.toggle(column);
            SortLink {
                column: column.name(),
                direction: next.direction,
                active: sort.column == Some(column),
                href: orders_href(&filter, next),
            }
        })
        .collect();

    let owned = |values: Vec<&str>| -> Vec<String> {
        values.into_iter().map(str::to_string).collect()
    };

    OrdersPageData {
        orders: rows.into_iter().cloned().collect(),
        statuses: owned(distinct_values(&snapshot.orders, |d| {
            Some(d.status.as_wire())
        })),
        action_types: owned(distinct_values(&snapshot.orders, |d| {
            d.action_type.as_deref()
        })),
        agents: owned(distinct_values(&snapshot.orders, |d| d.agent.as_deref())),
        next_order_number: snapshot.next_number(DocumentKind::Order),
        next_delivery_note_number: snapshot.next_number(DocumentKind::DeliveryNote),
        filter,
        sort,
        sort_links,
    }
}

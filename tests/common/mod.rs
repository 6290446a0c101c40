//! Helpers for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use sheet_orders::gateway::transport::{Transport, TransportError, TransportResponse};
use sheet_orders::gateway::{BusyIndicator, Endpoints, SheetGateway, Sleeper};
use sheet_orders::repository::SheetRepository;

pub const ORDERS_URL: &str = "https://script.test/orders";
pub const DELIVERY_NOTES_URL: &str = "https://script.test/delivery-notes";

/// One request seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Get {
        url: String,
        query: Vec<(String, String)>,
    },
    Post {
        url: String,
        body: Value,
    },
}

impl Recorded {
    pub fn action(&self) -> Option<String> {
        match self {
            Recorded::Get { query, .. } => query
                .iter()
                .find(|(key, _)| key == "action")
                .map(|(_, value)| value.clone()),
            Recorded::Post { body, .. } => body["action"].as_str().map(str::to_string),
        }
    }
}

pub type Scripted = Result<TransportResponse, TransportError>;

/// Transport that answers from a queue and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    busy: Arc<Mutex<Option<BusyIndicator>>>,
    in_flight_seen: Arc<Mutex<Vec<usize>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Scripted) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn push_json(&self, body: Value) -> &Self {
        self.push(Ok(TransportResponse::new(200, body.to_string())))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Note the indicator's in-flight count each time a request arrives.
    pub fn watch_busy(&self, busy: BusyIndicator) {
        *self.busy.lock().unwrap() = Some(busy);
    }

    pub fn in_flight_seen(&self) -> Vec<usize> {
        self.in_flight_seen.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    fn next(&self) -> Scripted {
        if let Some(busy) = self.busy.lock().unwrap().as_ref() {
            self.in_flight_seen.lock().unwrap().push(busy.in_flight());
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more often than scripted")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(Recorded::Get {
            url: url.to_string(),
            query: query.to_vec(),
        });
        self.next()
    }

    async fn post(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(Recorded::Post {
            url: url.to_string(),
            body: body.clone(),
        });
        self.next()
    }
}

/// Sleeper that records the requested delays instead of waiting.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<u64> {
        self.delays
            .lock()
            .unwrap()
            .iter()
            .map(Duration::as_secs)
            .collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

pub fn endpoints() -> Endpoints {
    Endpoints::new(ORDERS_URL, DELIVERY_NOTES_URL)
}

pub fn gateway(
    transport: &ScriptedTransport,
    sleeper: &RecordingSleeper,
) -> SheetGateway<ScriptedTransport, RecordingSleeper> {
    SheetGateway::new(transport.clone(), sleeper.clone(), endpoints())
}

pub fn repository(
    transport: &ScriptedTransport,
    sleeper: &RecordingSleeper,
) -> SheetRepository<ScriptedTransport, RecordingSleeper> {
    SheetRepository::new(gateway(transport, sleeper))
}

pub fn success(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn rate_limited() -> Value {
    json!({
        "success": false,
        "message": "Exception: Service invoked too many times for one day: urlfetch."
    })
}

/// A sheet row with the Hebrew column names.
pub fn order_row(number: &str, customer: &str, phone: &str, status: &str) -> Value {
    json!({
        "מספר מסמך": number,
        "סוג מסמך": "הזמנה",
        "תאריך": "2024-03-01",
        "שם לקוח": customer,
        "כתובת": "Herzl 1, Haifa",
        "טלפון לקוח": phone,
        "סטטוס": status,
        "סוג פעולה": "delivery",
        "סוכן": "Noa",
    })
}

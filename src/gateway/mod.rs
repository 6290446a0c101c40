//! Remote data gateway for the spreadsheet script endpoints.
//!
//! Every call resolves to a [`GatewayResult`]; transport errors, bad HTTP
//! statuses, malformed bodies and exhausted rate-limit retries are all turned
//! into [`GatewayResult::Failure`] here and never escape as errors.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

pub mod busy;
pub mod transport;

pub use busy::{BusyGuard, BusyIndicator};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};

/// Retries granted to a call whose response reports rate limiting.
pub const MAX_RETRIES: u32 = 5;
/// Text the script puts in `message` when its quota is exhausted.
pub const RATE_LIMIT_MARKER: &str = "Service invoked too many times";
/// Message returned once every retry has been used up.
pub const SERVICE_BUSY_MESSAGE: &str = "Service too busy";
/// Fallback for `success: false` answers that carry no message.
pub const GENERIC_FAILURE_MESSAGE: &str = "The operation failed on the server.";

/// Delay slept before retry number `attempt + 1`: 1s, 2s, 4s, 8s, 16s.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

/// Which spreadsheet script a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sheet {
    Orders,
    DeliveryNotes,
}

/// Script actions understood by the endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetOrders,
    GetDeliveryNotes,
    AddOrder,
    AddDeliveryNote,
    UpdateOrderStatus,
}

impl Action {
    /// Discriminator sent in the `action` parameter.
    pub fn name(self) -> &'static str {
        match self {
            Action::GetOrders => "getOrders",
            Action::GetDeliveryNotes => "getDeliveryNotes",
            Action::AddOrder => "addOrder",
            Action::AddDeliveryNote => "addDeliveryNote",
            Action::UpdateOrderStatus => "updateOrderStatus",
        }
    }

    pub fn sheet(self) -> Sheet {
        match self {
            Action::GetOrders | Action::AddOrder | Action::UpdateOrderStatus => Sheet::Orders,
            Action::GetDeliveryNotes | Action::AddDeliveryNote => Sheet::DeliveryNotes,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Script URLs, one per sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub orders: String,
    pub delivery_notes: String,
}

impl Endpoints {
    pub fn new(orders: impl Into<String>, delivery_notes: impl Into<String>) -> Self {
        Self {
            orders: orders.into(),
            delivery_notes: delivery_notes.into(),
        }
    }

    pub fn url(&self, sheet: Sheet) -> &str {
        match sheet {
            Sheet::Orders => &self.orders,
            Sheet::DeliveryNotes => &self.delivery_notes,
        }
    }
}

/// How the request carries its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// GET with `action` plus these pairs in the query string.
    Query(Vec<(String, String)>),
    /// POST with `{"action": .., "data": ..}` as the JSON body.
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub action: Action,
    pub body: RequestBody,
}

impl GatewayRequest {
    pub fn read(action: Action, params: Vec<(String, String)>) -> Self {
        Self {
            action,
            body: RequestBody::Query(params),
        }
    }

    pub fn write(action: Action, data: Value) -> Self {
        Self {
            action,
            body: RequestBody::Json(data),
        }
    }
}

/// Category of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Rate limiting persisted past [`MAX_RETRIES`].
    RateLimited,
    /// Non-2xx HTTP status.
    Http(u16),
    /// No HTTP answer was received.
    Transport,
    /// The body was not the expected JSON envelope.
    Malformed,
    /// The script answered `success: false`.
    Application,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of a gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResult {
    Success { data: Option<Value> },
    Failure(GatewayFailure),
}

impl GatewayResult {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        GatewayResult::Failure(GatewayFailure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GatewayResult::Success { .. })
    }
}

/// Injected delay used between retries.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Result of a single HTTP exchange, before retry handling.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    RateLimited(String),
    Done(GatewayResult),
}

/// Classify one HTTP answer.
pub fn classify(response: TransportResponse) -> Attempt {
    let envelope = serde_json::from_str::<Envelope>(&response.body);

    if !response.is_ok() {
        let message = envelope
            .ok()
            .and_then(|envelope| envelope.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error: {}", response.status));
        return Attempt::Done(GatewayResult::failure(
            FailureKind::Http(response.status),
            message,
        ));
    }

    let envelope = match envelope {
        Ok(envelope) => envelope,
        Err(err) => {
            return Attempt::Done(GatewayResult::failure(
                FailureKind::Malformed,
                format!("Malformed response: {err}"),
            ));
        }
    };

    if envelope.success {
        return Attempt::Done(GatewayResult::Success {
            data: envelope.data,
        });
    }

    match envelope.message {
        Some(message) if message.contains(RATE_LIMIT_MARKER) => Attempt::RateLimited(message),
        Some(message) if !message.trim().is_empty() => Attempt::Done(GatewayResult::failure(
            FailureKind::Application,
            message,
        )),
        _ => Attempt::Done(GatewayResult::failure(
            FailureKind::Application,
            GENERIC_FAILURE_MESSAGE,
        )),
    }
}

/// Issues requests to the script endpoints with rate-limit backoff.
pub struct SheetGateway<T = ReqwestTransport, S = TokioSleeper> {
    transport: T,
    sleeper: S,
    endpoints: Endpoints,
    busy: BusyIndicator,
    max_retries: u32,
}

impl<T, S> SheetGateway<T, S>
where
    T: Transport,
    S: Sleeper,
{
    pub fn new(transport: T, sleeper: S, endpoints: Endpoints) -> Self {
        Self {
            transport,
            sleeper,
            endpoints,
            busy: BusyIndicator::new(),
            max_retries: MAX_RETRIES,
        }
    }

    /// Share an existing busy indicator instead of a private one.
    pub fn with_busy_indicator(mut self, busy: BusyIndicator) -> Self {
        self.busy = busy;
        self
    }

    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Perform `request`, retrying while the script reports rate limiting.
    pub async fn call(&self, request: &GatewayRequest) -> GatewayResult {
        let _busy = self.busy.enter();
        let url = self.endpoints.url(request.action.sheet());
        let mut attempt = 0;

        loop {
            match self.dispatch(url, request).await {
                Attempt::Done(result) => {
                    if let GatewayResult::Failure(failure) = &result {
                        log::warn!("{} failed: {}", request.action, failure.message);
                    }
                    return result;
                }
                Attempt::RateLimited(message) => {
                    if attempt >= self.max_retries {
                        log::error!(
                            "{} still rate limited after {} retries: {message}",
                            request.action,
                            self.max_retries
                        );
                        return GatewayResult::failure(
                            FailureKind::RateLimited,
                            SERVICE_BUSY_MESSAGE,
                        );
                    }
                    let delay = backoff_delay(attempt);
                    attempt += 1;
                    log::warn!(
                        "{} rate limited, retrying in {}s (attempt {attempt})",
                        request.action,
                        delay.as_secs()
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }

    async fn dispatch(&self, url: &str, request: &GatewayRequest) -> Attempt {
        let action = request.action.name();
        let response = match &request.body {
            RequestBody::Query(params) => {
                let mut query = Vec::with_capacity(params.len() + 1);
                query.push(("action".to_string(), action.to_string()));
                query.extend(params.iter().cloned());
                log::debug!("GET {url} action={action}");
                self.transport.get(url, &query).await
            }
            RequestBody::Json(data) => {
                let body = json!({ "action": action, "data": data });
                log::debug!("POST {url} action={action}");
                self.transport.post(url, &body).await
            }
        };

        match response {
            Ok(response) => classify(response),
            Err(err) => Attempt::Done(GatewayResult::failure(
                FailureKind::Transport,
                format!("Communication error: {err}"),
            )),
        }
    }
}

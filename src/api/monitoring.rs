//! System logs, domain events and metrics (admin only).

use super::client::ApiClient;
use super::types::{Event, Log, LogLevel, Metric};
use crate::error::ApiResult;

/// Filter for `/api/admin/logs`. Exactly one filter applies per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogQuery {
  All,
  Level(LogLevel),
  Source(String),
  Search(String),
  DateRange { start: String, end: String },
}

impl LogQuery {
  fn params(&self) -> Vec<(&'static str, String)> {
    match self {
      LogQuery::All => vec![],
      LogQuery::Level(level) => vec![("level", level.as_str().to_string())],
      LogQuery::Source(source) => vec![("source", source.clone())],
      LogQuery::Search(text) => vec![("search", text.clone())],
      LogQuery::DateRange { start, end } => {
        vec![("start_date", start.clone()), ("end_date", end.clone())]
      }
    }
  }
}

/// Filter for `/api/admin/events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventQuery {
  All,
  Type(String),
  EntityType(String),
  EntityId(u64),
  UserId(u64),
  DateRange { start: String, end: String },
}

impl EventQuery {
  fn params(&self) -> Vec<(&'static str, String)> {
    match self {
      EventQuery::All => vec![],
      EventQuery::Type(kind) => vec![("type", kind.clone())],
      EventQuery::EntityType(kind) => vec![("entity_type", kind.clone())],
      EventQuery::EntityId(id) => vec![("entity_id", id.to_string())],
      EventQuery::UserId(id) => vec![("user_id", id.to_string())],
      EventQuery::DateRange { start, end } => {
        vec![("start_date", start.clone()), ("end_date", end.clone())]
      }
    }
  }
}

#[derive(Clone)]
pub struct MonitoringApi {
  client: ApiClient,
}

impl MonitoringApi {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }

  pub async fn logs(&self, query: &LogQuery) -> ApiResult<Vec<Log>> {
    self
      .client
      .get_with_query("/api/admin/logs", &query.params())
      .await
  }

  pub async fn events(&self, query: &EventQuery) -> ApiResult<Vec<Event>> {
    self
      .client
      .get_with_query("/api/admin/events", &query.params())
      .await
  }

  pub async fn metrics(&self) -> ApiResult<Vec<Metric>> {
    self.client.get("/api/admin/metrics").await
  }
}

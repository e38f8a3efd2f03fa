//! Typed query keys and their canonical cache-key serialization.

use serde_json::{json, Map, Value};

use crate::api::{EventQuery, LogQuery};

/// Key of the cache entry for requests without parameters.
pub const DEFAULT_KEY: &str = "default";

/// Parameters of a store request.
///
/// `params` returns `None` for the parameterless request. Otherwise the
/// returned object is serialized with its fields in sorted order, so equal
/// parameters always map to the same cache entry.
pub trait QueryKey: Clone + Send + Sync + 'static {
  fn params(&self) -> Option<Map<String, Value>>;

  fn cache_key(&self) -> String {
    match self.params() {
      Some(params) => Value::Object(params).to_string(),
      None => DEFAULT_KEY.to_string(),
    }
  }
}

fn single(field: &str, value: Value) -> Option<Map<String, Value>> {
  let mut params = Map::new();
  params.insert(field.to_string(), value);
  Some(params)
}

fn date_range(start: &str, end: &str) -> Option<Map<String, Value>> {
  let mut params = Map::new();
  params.insert("endDate".to_string(), json!(end));
  params.insert("startDate".to_string(), json!(start));
  Some(params)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseKey {
  All,
  ById(u64),
}

impl QueryKey for CourseKey {
  fn params(&self) -> Option<Map<String, Value>> {
    match self {
      CourseKey::All => None,
      CourseKey::ById(id) => single("courseId", json!(id)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKey {
  /// No course selected yet; resolves to an empty list.
  None,
  ById(u64),
  ByCourse(u64),
}

impl QueryKey for AssignmentKey {
  fn params(&self) -> Option<Map<String, Value>> {
    match self {
      AssignmentKey::None => None,
      AssignmentKey::ById(id) => single("assignmentId", json!(id)),
      AssignmentKey::ByCourse(id) => single("courseId", json!(id)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeKey {
  None,
  ById(u64),
  ByAssignment(u64),
  /// All grades of the logged-in student.
  StudentView,
}

impl QueryKey for GradeKey {
  fn params(&self) -> Option<Map<String, Value>> {
    match self {
      GradeKey::None => None,
      GradeKey::ById(id) => single("gradeId", json!(id)),
      GradeKey::ByAssignment(id) => single("assignmentId", json!(id)),
      GradeKey::StudentView => single("studentView", json!(true)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKey {
  All,
  ById(u64),
  Profile,
}

impl QueryKey for UserKey {
  fn params(&self) -> Option<Map<String, Value>> {
    match self {
      UserKey::All => None,
      UserKey::ById(id) => single("userId", json!(id)),
      UserKey::Profile => single("profile", json!(true)),
    }
  }
}

impl QueryKey for LogQuery {
  fn params(&self) -> Option<Map<String, Value>> {
    match self {
      LogQuery::All => None,
      LogQuery::Level(level) => single("level", json!(level.as_str())),
      LogQuery::Source(source) => single("source", json!(source)),
      LogQuery::Search(text) => single("search", json!(text)),
      LogQuery::DateRange { start, end } => date_range(start, end),
    }
  }
}

impl QueryKey for EventQuery {
  fn params(&self) -> Option<Map<String, Value>> {
    match self {
      EventQuery::All => None,
      EventQuery::Type(kind) => single("type", json!(kind)),
      EventQuery::EntityType(kind) => single("entityType", json!(kind)),
      EventQuery::EntityId(id) => single("entityId", json!(id)),
      EventQuery::UserId(id) => single("userId", json!(id)),
      EventQuery::DateRange { start, end } => date_range(start, end),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::LogLevel;

  #[test]
  fn test_parameterless_keys_use_default() {
    assert_eq!(CourseKey::All.cache_key(), "default");
    assert_eq!(AssignmentKey::None.cache_key(), "default");
    assert_eq!(LogQuery::All.cache_key(), "default");
  }

  #[test]
  fn test_single_field_keys() {
    assert_eq!(CourseKey::ById(5).cache_key(), r#"{"courseId":5}"#);
    assert_eq!(AssignmentKey::ByCourse(5).cache_key(), r#"{"courseId":5}"#);
    assert_eq!(GradeKey::StudentView.cache_key(), r#"{"studentView":true}"#);
    assert_eq!(UserKey::Profile.cache_key(), r#"{"profile":true}"#);
    assert_eq!(
      LogQuery::Level(LogLevel::Warning).cache_key(),
      r#"{"level":"warning"}"#
    );
    assert_eq!(EventQuery::EntityId(7).cache_key(), r#"{"entityId":7}"#);
  }

  #[test]
  fn test_date_range_field_order_is_fixed() {
    let key = EventQuery::DateRange {
      start: "2026-03-01".to_string(),
      end: "2026-03-31".to_string(),
    };
    assert_eq!(
      key.cache_key(),
      r#"{"endDate":"2026-03-31","startDate":"2026-03-01"}"#
    );
  }

  #[test]
  fn test_search_text_is_escaped() {
    assert_eq!(
      LogQuery::Search("say \"hi\"".to_string()).cache_key(),
      r#"{"search":"say \"hi\""}"#
    );
  }
}

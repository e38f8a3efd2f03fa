//! Store state and the reducer that transitions it.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Data held by a store: a list from a collection endpoint or a single
/// entity from a by-id endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
  Collection(Vec<T>),
  Item(T),
}

impl<T> Resource<T> {
  /// List-shaped data, if any.
  pub fn as_slice(&self) -> Option<&[T]> {
    match self {
      Resource::Collection(items) => Some(items),
      Resource::Item(_) => None,
    }
  }

  pub fn as_item(&self) -> Option<&T> {
    match self {
      Resource::Item(item) => Some(item),
      Resource::Collection(_) => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<T> {
  pub data: Option<Resource<T>>,
  pub is_loading: bool,
  pub error: Option<String>,
  pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for StoreState<T> {
  fn default() -> Self {
    Self {
      data: None,
      is_loading: false,
      error: None,
      last_updated: None,
    }
  }
}

#[derive(Debug, Clone)]
pub enum StoreAction<T> {
  FetchStart,
  FetchSuccess(Resource<T>),
  FetchError(String),
  SetData(Resource<T>),
  ClearData,
  /// Shallow-merge `updates` into the list element whose `id_field` equals `id`.
  UpdateItem {
    id: Value,
    updates: Map<String, Value>,
    id_field: String,
  },
}

/// Apply `action` to `state`. `now` stamps `last_updated`.
pub fn reduce<T>(state: &mut StoreState<T>, action: StoreAction<T>, now: DateTime<Utc>)
where
  T: Serialize + DeserializeOwned,
{
  match action {
    StoreAction::FetchStart => {
      state.is_loading = true;
      state.error = None;
    }
    StoreAction::FetchSuccess(data) | StoreAction::SetData(data) => {
      state.data = Some(data);
      state.is_loading = false;
      state.error = None;
      state.last_updated = Some(now);
    }
    StoreAction::FetchError(error) => {
      state.is_loading = false;
      state.error = Some(error);
    }
    StoreAction::ClearData => {
      state.data = None;
      state.error = None;
    }
    StoreAction::UpdateItem {
      id,
      updates,
      id_field,
    } => {
      if let Some(Resource::Collection(items)) = state.data.as_mut() {
        for item in items.iter_mut() {
          if field_matches(item, &id_field, &id) {
            if let Some(merged) = merge(item, &updates) {
              *item = merged;
            }
          }
        }
        state.last_updated = Some(now);
      }
    }
  }
}

/// Whether `item` serializes to an object whose `field` equals `id`.
pub(crate) fn field_matches<T: Serialize>(item: &T, field: &str, id: &Value) -> bool {
  match serde_json::to_value(item) {
    Ok(Value::Object(object)) => object.get(field) == Some(id),
    _ => false,
  }
}

/// Shallow merge. `None` when the merged object no longer fits `T`, in which
/// case the item is left as it was.
fn merge<T>(item: &T, updates: &Map<String, Value>) -> Option<T>
where
  T: Serialize + DeserializeOwned,
{
  let mut object = match serde_json::to_value(item).ok()? {
    Value::Object(object) => object,
    _ => return None,
  };
  for (key, value) in updates {
    object.insert(key.clone(), value.clone());
  }
  serde_json::from_value(Value::Object(object)).ok()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use serde_json::json;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Row {
    id: u64,
    title: String,
  }

  fn row(id: u64, title: &str) -> Row {
    Row {
      id,
      title: title.to_string(),
    }
  }

  fn now() -> DateTime<Utc> {
    Utc::now()
  }

  #[test]
  fn test_fetch_cycle() {
    let mut state = StoreState::<Row>::default();
    reduce(&mut state, StoreAction::FetchStart, now());
    assert!(state.is_loading);

    reduce(&mut state, StoreAction::FetchError("boom".to_string()), now());
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("boom"));
    assert!(state.last_updated.is_none());

    reduce(&mut state, StoreAction::FetchStart, now());
    assert!(state.error.is_none());
    reduce(
      &mut state,
      StoreAction::FetchSuccess(Resource::Collection(vec![row(1, "a")])),
      now(),
    );
    assert!(!state.is_loading);
    assert!(state.last_updated.is_some());
  }

  #[test]
  fn test_clear_keeps_last_updated() {
    let mut state = StoreState::<Row>::default();
    reduce(&mut state, StoreAction::SetData(Resource::Item(row(1, "a"))), now());
    reduce(&mut state, StoreAction::ClearData, now());
    assert!(state.data.is_none());
    assert!(state.last_updated.is_some());
  }

  #[test]
  fn test_update_item_merges_matching_row_only() {
    let mut state = StoreState::default();
    reduce(
      &mut state,
      StoreAction::SetData(Resource::Collection(vec![row(1, "a"), row(2, "b")])),
      now(),
    );

    let mut updates = Map::new();
    updates.insert("title".to_string(), json!("renamed"));
    reduce(
      &mut state,
      StoreAction::UpdateItem {
        id: json!(2),
        updates,
        id_field: "id".to_string(),
      },
      now(),
    );

    assert_eq!(
      state.data,
      Some(Resource::Collection(vec![row(1, "a"), row(2, "renamed")]))
    );
  }

  #[test]
  fn test_update_item_with_mistyped_value_is_ignored() {
    let mut state = StoreState::default();
    reduce(
      &mut state,
      StoreAction::SetData(Resource::Collection(vec![row(1, "a")])),
      now(),
    );

    let mut updates = Map::new();
    updates.insert("title".to_string(), json!(42));
    reduce(
      &mut state,
      StoreAction::UpdateItem {
        id: json!(1),
        updates,
        id_field: "id".to_string(),
      },
      now(),
    );

    assert_eq!(state.data, Some(Resource::Collection(vec![row(1, "a")])));
  }

  #[test]
  fn test_update_item_on_single_entity_is_noop() {
    let mut state = StoreState::default();
    reduce(&mut state, StoreAction::SetData(Resource::Item(row(1, "a"))), now());
    let before = state.clone();

    reduce(
      &mut state,
      StoreAction::UpdateItem {
        id: json!(1),
        updates: Map::new(),
        id_field: "id".to_string(),
      },
      now(),
    );
    assert_eq!(state, before);
  }
}

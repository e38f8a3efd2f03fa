//! The six application stores, wired to the backend.

use chrono::Duration;
use futures::FutureExt;
use std::sync::Arc;

use super::keys::{AssignmentKey, CourseKey, GradeKey, UserKey};
use super::{Resource, Store};
use crate::api::types::{Assignment, Course, Event, Grade, Log, Role, UserData};
use crate::api::{Api, EventQuery, LogQuery};
use crate::clock::SharedClock;
use crate::config::{CacheConfig, MAX_LIFETIME_SECS};

pub type CourseStore = Store<Course, CourseKey>;
pub type AssignmentStore = Store<Assignment, AssignmentKey>;
pub type GradeStore = Store<Grade, GradeKey>;
pub type UserStore = Store<UserData, UserKey>;
pub type LogStore = Store<Log, LogQuery>;
pub type EventStore = Store<Event, EventQuery>;

#[derive(Clone)]
pub struct Stores {
  pub courses: CourseStore,
  pub assignments: AssignmentStore,
  pub grades: GradeStore,
  pub users: UserStore,
  pub logs: LogStore,
  pub events: EventStore,
}

fn ttl(secs: u64) -> Duration {
  Duration::seconds(secs.min(MAX_LIFETIME_SECS) as i64)
}

impl Stores {
  pub fn new(api: &Api, config: &CacheConfig, clock: SharedClock) -> Self {
    Self {
      courses: course_store(api.clone(), ttl(config.courses_ttl_secs), clock.clone()),
      assignments: assignment_store(api.clone(), ttl(config.assignments_ttl_secs), clock.clone()),
      grades: grade_store(api.clone(), ttl(config.grades_ttl_secs), clock.clone()),
      users: user_store(api.clone(), ttl(config.users_ttl_secs), clock.clone()),
      logs: log_store(api.clone(), ttl(config.logs_ttl_secs), clock.clone()),
      events: event_store(api.clone(), ttl(config.events_ttl_secs), clock),
    }
  }

  /// Drop expired cache entries in every store. Called on each UI tick.
  pub fn sweep_expired(&self) -> usize {
    self.courses.sweep_expired()
      + self.assignments.sweep_expired()
      + self.grades.sweep_expired()
      + self.users.sweep_expired()
      + self.logs.sweep_expired()
      + self.events.sweep_expired()
  }

  /// Forget all data, e.g. when the user logs out.
  pub fn clear_all(&self) {
    self.courses.reset();
    self.assignments.reset();
    self.grades.reset();
    self.users.reset();
    self.logs.reset();
    self.events.reset();
  }

  /// Mean score of the grades currently loaded.
  pub fn grade_average(&self) -> f64 {
    average_score(&self.grades.items())
  }
}

/// Mean score rounded to two decimals; 0 for no grades.
pub fn average_score(grades: &[Grade]) -> f64 {
  mean_score(grades.iter().map(|g| g.score))
}

/// Mean of any scores, rounded to two decimals; 0 when there are none.
pub fn mean_score(scores: impl IntoIterator<Item = f64>) -> f64 {
  let (total, count) = scores
    .into_iter()
    .fold((0.0, 0usize), |(total, count), score| (total + score, count + 1));
  if count == 0 {
    return 0.0;
  }
  let mean = total / count as f64;
  (mean * 100.0).round() / 100.0
}

fn is_teacher(api: &Api) -> bool {
  api.client.session().role() == Some(Role::Teacher)
}

fn course_store(api: Api, ttl: Duration, clock: SharedClock) -> CourseStore {
  let api = Arc::new(api);
  Store::new("courses", ttl, clock, move |key: CourseKey| {
    let api = api.clone();
    async move {
      match key {
        CourseKey::All => api.admin.courses().await.map(Resource::Collection),
        CourseKey::ById(id) => api.admin.course(id).await.map(Resource::Item),
      }
    }
    .boxed()
  })
}

/// Teachers read through their own endpoints, everyone else through admin ones.
fn assignment_store(api: Api, ttl: Duration, clock: SharedClock) -> AssignmentStore {
  let api = Arc::new(api);
  Store::new("assignments", ttl, clock, move |key: AssignmentKey| {
    let api = api.clone();
    async move {
      let teacher = is_teacher(&api);
      match key {
        AssignmentKey::None => Ok(Resource::Collection(Vec::new())),
        AssignmentKey::ById(id) if teacher => api.teacher.assignment(id).await.map(Resource::Item),
        AssignmentKey::ById(id) => api.admin.assignment(id).await.map(Resource::Item),
        AssignmentKey::ByCourse(id) if teacher => api
          .teacher
          .course_assignments(id)
          .await
          .map(Resource::Collection),
        AssignmentKey::ByCourse(id) => api
          .admin
          .course_assignments(id)
          .await
          .map(Resource::Collection),
      }
    }
    .boxed()
  })
}

fn grade_store(api: Api, ttl: Duration, clock: SharedClock) -> GradeStore {
  let api = Arc::new(api);
  Store::new("grades", ttl, clock, move |key: GradeKey| {
    let api = api.clone();
    async move {
      let teacher = is_teacher(&api);
      match key {
        GradeKey::None => Ok(Resource::Collection(Vec::new())),
        GradeKey::ById(id) if teacher => api.teacher.grade(id).await.map(Resource::Item),
        GradeKey::ById(id) => api.admin.grade(id).await.map(Resource::Item),
        GradeKey::ByAssignment(id) if teacher => api
          .teacher
          .assignment_grades(id)
          .await
          .map(Resource::Collection),
        GradeKey::ByAssignment(id) => api
          .admin
          .assignment_grades(id)
          .await
          .map(Resource::Collection),
        GradeKey::StudentView => api
          .student
          .grades()
          .await
          .map(|grades| Resource::Collection(grades.into_iter().map(Grade::from).collect())),
      }
    }
    .boxed()
  })
}

fn user_store(api: Api, ttl: Duration, clock: SharedClock) -> UserStore {
  let api = Arc::new(api);
  Store::new("users", ttl, clock, move |key: UserKey| {
    let api = api.clone();
    async move {
      match key {
        UserKey::All => api.users.users().await.map(Resource::Collection),
        UserKey::ById(id) => api.users.user(id).await.map(Resource::Item),
        UserKey::Profile => api.users.profile().await.map(Resource::Item),
      }
    }
    .boxed()
  })
}

fn log_store(api: Api, ttl: Duration, clock: SharedClock) -> LogStore {
  let api = Arc::new(api);
  Store::new("logs", ttl, clock, move |query: LogQuery| {
    let api = api.clone();
    async move { api.monitoring.logs(&query).await.map(Resource::Collection) }.boxed()
  })
}

fn event_store(api: Api, ttl: Duration, clock: SharedClock) -> EventStore {
  let api = Arc::new(api);
  Store::new("events", ttl, clock, move |query: EventQuery| {
    let api = api.clone();
    async move { api.monitoring.events(&query).await.map(Resource::Collection) }.boxed()
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::client_for;
  use crate::api::types::LogLevel;
  use crate::clock::{system_clock, ManualClock};
  use chrono::{TimeZone, Utc};
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn grade(score: f64) -> Grade {
    Grade {
      id: 1,
      assignment_id: 1,
      student_id: 1,
      student_name: None,
      score,
      feedback: String::new(),
      created_at: String::new(),
      updated_at: String::new(),
    }
  }

  #[test]
  fn test_average_score_rounds_to_two_decimals() {
    assert_eq!(average_score(&[]), 0.0);
    assert_eq!(average_score(&[grade(90.0), grade(85.0), grade(88.0)]), 87.67);
    assert_eq!(average_score(&[grade(10.0)]), 10.0);
  }

  fn stores_for(server: &MockServer, clock: SharedClock) -> Stores {
    let api = Api::new(client_for(server), Duration::hours(1));
    Stores::new(&api, &CacheConfig::default(), clock)
  }

  #[tokio::test]
  async fn test_empty_keys_do_not_hit_network() {
    let server = MockServer::start().await;
    let stores = stores_for(&server, system_clock());

    stores.assignments.fetch_data(AssignmentKey::None).await.unwrap();
    stores.grades.fetch_data(GradeKey::None).await.unwrap();

    assert!(stores.assignments.items().is_empty());
    assert!(stores.grades.items().is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
  }

  #[tokio::test]
  async fn test_course_store_caches_per_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/courses/5"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 5, "title": "Physics", "description": "Mechanics", "teacher_id": 2
      })))
      .expect(1)
      .mount(&server)
      .await;

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap());
    let stores = stores_for(&server, Arc::new(clock.clone()));

    stores.courses.fetch_data(CourseKey::ById(5)).await.unwrap();
    clock.advance(Duration::milliseconds(299_999));
    stores.courses.fetch_data(CourseKey::ById(5)).await.unwrap();

    assert_eq!(stores.courses.item().map(|c| c.title), Some("Physics".to_string()));
  }

  #[tokio::test]
  async fn test_log_store_filters_and_sweeps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/admin/logs"))
      .and(query_param("level", "error"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
        {"id": 1, "level": "error", "message": "boom", "source": "api"}
      ])))
      .mount(&server)
      .await;

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap());
    let stores = stores_for(&server, Arc::new(clock.clone()));

    stores
      .logs
      .fetch_data(LogQuery::Level(LogLevel::Error))
      .await
      .unwrap();
    assert_eq!(stores.logs.items().len(), 1);

    // Logs live for two minutes
    clock.advance(Duration::seconds(121));
    assert_eq!(stores.sweep_expired(), 1);

    stores.clear_all();
    assert!(stores.logs.items().is_empty());
  }

  #[tokio::test]
  async fn test_student_view_reads_own_grades() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/student/grades"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
        {"id": 4, "assignment_id": 2, "assignment_title": "Essay", "course_id": 1,
         "course_title": "Physics", "score": 8, "max_score": 10, "feedback": "good"}
      ])))
      .expect(1)
      .mount(&server)
      .await;

    let stores = stores_for(&server, system_clock());
    stores.grades.fetch_data(GradeKey::StudentView).await.unwrap();

    let grades = stores.grades.items();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0].assignment_id, 2);
    assert_eq!(grades[0].feedback, "good");
    assert_eq!(stores.grade_average(), 8.0);
  }

  #[test]
  fn test_oversized_ttl_is_clamped() {
    assert_eq!(ttl(u64::MAX), Duration::seconds(MAX_LIFETIME_SECS as i64));
    assert_eq!(ttl(300), Duration::seconds(300));
  }
}

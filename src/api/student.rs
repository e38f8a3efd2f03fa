//! Student endpoints (read-only).

use super::client::ApiClient;
use super::types::{CourseDetail, StudentAssignment, StudentCourse, StudentGrade};
use crate::error::ApiResult;

#[derive(Clone)]
pub struct StudentApi {
  client: ApiClient,
}

impl StudentApi {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }

  pub async fn courses(&self) -> ApiResult<Vec<StudentCourse>> {
    self.client.get("/api/student/courses").await
  }

  pub async fn course(&self, id: u64) -> ApiResult<CourseDetail> {
    self.client.get(&format!("/api/student/courses/{}", id)).await
  }

  pub async fn course_assignments(&self, course_id: u64) -> ApiResult<Vec<StudentAssignment>> {
    self
      .client
      .get(&format!("/api/student/courses/{}/assignments", course_id))
      .await
  }

  pub async fn grades(&self) -> ApiResult<Vec<StudentGrade>> {
    self.client.get("/api/student/grades").await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::client_for;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[tokio::test]
  async fn test_course_assignments_with_nested_grade() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/student/courses/2/assignments"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
        {
          "id": 5, "course_id": 2, "title": "Essay", "max_score": 10, "is_completed": true,
          "grade": {"id": 1, "assignment_id": 5, "score": 9, "max_score": 10, "feedback": "nice"}
        },
        {"id": 6, "course_id": 2, "title": "Quiz", "max_score": 5, "is_completed": false, "grade": null}
      ])))
      .mount(&server)
      .await;

    let assignments = StudentApi::new(client_for(&server))
      .course_assignments(2)
      .await
      .unwrap();

    assert_eq!(assignments.len(), 2);
    assert_eq!(assignments[0].grade.as_ref().map(|g| g.score), Some(9.0));
    assert!(assignments[1].grade.is_none());
  }
}

//! Teacher endpoints. The backend scopes every call to the caller's own courses.

use super::client::ApiClient;
use super::types::{
  Assignment, AssignmentCreateRequest, AssignmentUpdateRequest, CourseStudent, Grade,
  GradeCreateRequest, GradeUpdateRequest, TeacherCourse,
};
use crate::error::ApiResult;

#[derive(Clone)]
pub struct TeacherApi {
  client: ApiClient,
}

impl TeacherApi {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }

  pub async fn courses(&self) -> ApiResult<Vec<TeacherCourse>> {
    self.client.get("/api/teacher/courses").await
  }

  pub async fn course(&self, id: u64) -> ApiResult<TeacherCourse> {
    self.client.get(&format!("/api/teacher/courses/{}", id)).await
  }

  pub async fn course_students(&self, course_id: u64) -> ApiResult<Vec<CourseStudent>> {
    self
      .client
      .get(&format!("/api/teacher/courses/{}/students", course_id))
      .await
  }

  pub async fn course_assignments(&self, course_id: u64) -> ApiResult<Vec<Assignment>> {
    self
      .client
      .get(&format!("/api/teacher/courses/{}/assignments", course_id))
      .await
  }

  pub async fn create_assignment(
    &self,
    course_id: u64,
    request: &AssignmentCreateRequest,
  ) -> ApiResult<Assignment> {
    self
      .client
      .post(
        &format!("/api/teacher/courses/{}/assignments", course_id),
        request,
      )
      .await
  }

  pub async fn assignment(&self, id: u64) -> ApiResult<Assignment> {
    self
      .client
      .get(&format!("/api/teacher/assignments/{}", id))
      .await
  }

  pub async fn update_assignment(
    &self,
    id: u64,
    request: &AssignmentUpdateRequest,
  ) -> ApiResult<Assignment> {
    self
      .client
      .put(&format!("/api/teacher/assignments/{}", id), request)
      .await
  }

  pub async fn delete_assignment(&self, id: u64) -> ApiResult<()> {
    self
      .client
      .delete(&format!("/api/teacher/assignments/{}", id))
      .await
  }

  pub async fn assignment_grades(&self, assignment_id: u64) -> ApiResult<Vec<Grade>> {
    self
      .client
      .get(&format!("/api/teacher/assignments/{}/grades", assignment_id))
      .await
  }

  pub async fn create_grade(
    &self,
    assignment_id: u64,
    request: &GradeCreateRequest,
  ) -> ApiResult<Grade> {
    self
      .client
      .post(
        &format!("/api/teacher/assignments/{}/grades", assignment_id),
        request,
      )
      .await
  }

  pub async fn grade(&self, id: u64) -> ApiResult<Grade> {
    self.client.get(&format!("/api/teacher/grades/{}", id)).await
  }

  pub async fn update_grade(&self, id: u64, request: &GradeUpdateRequest) -> ApiResult<Grade> {
    self
      .client
      .put(&format!("/api/teacher/grades/{}", id), request)
      .await
  }

  pub async fn delete_grade(&self, id: u64) -> ApiResult<()> {
    self
      .client
      .delete(&format!("/api/teacher/grades/{}", id))
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::client_for;
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[tokio::test]
  async fn test_create_assignment_uses_course_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/teacher/courses/3/assignments"))
      .and(body_json(serde_json::json!({
        "title": "Lab 1",
        "description": "Ownership",
        "deadline": "2026-11-01T12:00:00Z",
        "max_score": 20
      })))
      .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
        "id": 30, "course_id": 3, "title": "Lab 1", "description": "Ownership",
        "deadline": "2026-11-01T12:00:00Z", "max_score": 20
      })))
      .expect(1)
      .mount(&server)
      .await;

    let teacher = TeacherApi::new(client_for(&server));
    let assignment = teacher
      .create_assignment(
        3,
        &AssignmentCreateRequest {
          course_id: None,
          title: "Lab 1".to_string(),
          description: "Ownership".to_string(),
          deadline: "2026-11-01T12:00:00Z".to_string(),
          max_score: 20,
        },
      )
      .await
      .unwrap();

    assert_eq!(assignment.course_id, 3);
    assert_eq!(assignment.max_score, 20);
  }

  #[tokio::test]
  async fn test_assignment_grades_include_student_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/teacher/assignments/30/grades"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
        {"id": 1, "assignment_id": 30, "student_id": 9, "student_name": "Eve", "score": 18, "feedback": "good"}
      ])))
      .mount(&server)
      .await;

    let grades = TeacherApi::new(client_for(&server))
      .assignment_grades(30)
      .await
      .unwrap();
    assert_eq!(grades[0].student_name.as_deref(), Some("Eve"));
    assert_eq!(grades[0].score, 18.0);
  }
}

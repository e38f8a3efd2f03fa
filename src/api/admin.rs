//! Administrator endpoints: courses, enrolment, assignments and grades.

use super::client::ApiClient;
use super::types::{
  Assignment, AssignmentCreateRequest, AssignmentUpdateRequest, Course, CourseCreateRequest,
  CourseStudent, CourseUpdateRequest, EnrollStudentRequest, Grade, GradeCreateRequest,
  GradeUpdateRequest,
};
use crate::error::ApiResult;

#[derive(Clone)]
pub struct AdminApi {
  client: ApiClient,
}

impl AdminApi {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }

  // ==========================================================================
  // Courses
  // ==========================================================================

  pub async fn courses(&self) -> ApiResult<Vec<Course>> {
    self.client.get("/api/admin/courses").await
  }

  pub async fn course(&self, id: u64) -> ApiResult<Course> {
    self.client.get(&format!("/api/admin/courses/{}", id)).await
  }

  pub async fn create_course(&self, request: &CourseCreateRequest) -> ApiResult<Course> {
    self.client.post("/api/admin/courses", request).await
  }

  pub async fn update_course(&self, id: u64, request: &CourseUpdateRequest) -> ApiResult<Course> {
    self
      .client
      .put(&format!("/api/admin/courses/{}", id), request)
      .await
  }

  pub async fn delete_course(&self, id: u64) -> ApiResult<()> {
    self.client.delete(&format!("/api/admin/courses/{}", id)).await
  }

  // ==========================================================================
  // Enrolment
  // ==========================================================================

  pub async fn course_students(&self, course_id: u64) -> ApiResult<Vec<CourseStudent>> {
    self
      .client
      .get(&format!("/api/admin/courses/{}/students", course_id))
      .await
  }

  pub async fn add_student(&self, course_id: u64, student_id: u64) -> ApiResult<()> {
    self
      .client
      .post_unit(
        &format!("/api/admin/courses/{}/students", course_id),
        &EnrollStudentRequest { student_id },
      )
      .await
  }

  pub async fn remove_student(&self, course_id: u64, student_id: u64) -> ApiResult<()> {
    self
      .client
      .delete(&format!(
        "/api/admin/courses/{}/students/{}",
        course_id, student_id
      ))
      .await
  }

  // ==========================================================================
  // Assignments
  // ==========================================================================

  pub async fn course_assignments(&self, course_id: u64) -> ApiResult<Vec<Assignment>> {
    self
      .client
      .get(&format!("/api/admin/courses/{}/assignments", course_id))
      .await
  }

  pub async fn assignment(&self, id: u64) -> ApiResult<Assignment> {
    self
      .client
      .get(&format!("/api/admin/assignments/{}", id))
      .await
  }

  pub async fn create_assignment(&self, request: &AssignmentCreateRequest) -> ApiResult<Assignment> {
    self.client.post("/api/admin/assignments", request).await
  }

  pub async fn update_assignment(
    &self,
    id: u64,
    request: &AssignmentUpdateRequest,
  ) -> ApiResult<Assignment> {
    self
      .client
      .put(&format!("/api/admin/assignments/{}", id), request)
      .await
  }

  pub async fn delete_assignment(&self, id: u64) -> ApiResult<()> {
    self
      .client
      .delete(&format!("/api/admin/assignments/{}", id))
      .await
  }

  // ==========================================================================
  // Grades
  // ==========================================================================

  pub async fn assignment_grades(&self, assignment_id: u64) -> ApiResult<Vec<Grade>> {
    self
      .client
      .get(&format!("/api/admin/assignments/{}/grades", assignment_id))
      .await
  }

  pub async fn grade(&self, id: u64) -> ApiResult<Grade> {
    self.client.get(&format!("/api/admin/grades/{}", id)).await
  }

  pub async fn create_grade(&self, request: &GradeCreateRequest) -> ApiResult<Grade> {
    self.client.post("/api/admin/grades", request).await
  }

  pub async fn update_grade(&self, id: u64, request: &GradeUpdateRequest) -> ApiResult<Grade> {
    self
      .client
      .put(&format!("/api/admin/grades/{}", id), request)
      .await
  }

  pub async fn delete_grade(&self, id: u64) -> ApiResult<()> {
    self.client.delete(&format!("/api/admin/grades/{}", id)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::client_for;
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  #[tokio::test]
  async fn test_create_course_posts_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/admin/courses"))
      .and(body_json(serde_json::json!({
        "title": "Databases",
        "description": "Relational modelling",
        "teacher_id": 3
      })))
      .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
        "id": 11, "title": "Databases", "description": "Relational modelling", "teacher_id": 3
      })))
      .expect(1)
      .mount(&server)
      .await;

    let admin = AdminApi::new(client_for(&server));
    let course = admin
      .create_course(&CourseCreateRequest {
        title: "Databases".to_string(),
        description: "Relational modelling".to_string(),
        teacher_id: 3,
      })
      .await
      .unwrap();

    assert_eq!(course.id, 11);
    assert_eq!(course.teacher_id, 3);
  }

  #[tokio::test]
  async fn test_enrolment_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/admin/courses/5/students"))
      .and(body_json(serde_json::json!({"student_id": 42})))
      .respond_with(ResponseTemplate::new(200))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("DELETE"))
      .and(path("/api/admin/courses/5/students/42"))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/api/admin/courses/5/students"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
        {"id": 42, "user_id": 42, "name": "Dana", "email": "dana@example.com"}
      ])))
      .mount(&server)
      .await;

    let admin = AdminApi::new(client_for(&server));
    admin.add_student(5, 42).await.unwrap();
    let students = admin.course_students(5).await.unwrap();
    assert_eq!(students[0].name, "Dana");
    admin.remove_student(5, 42).await.unwrap();
  }

  #[tokio::test]
  async fn test_update_grade_sends_only_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/api/admin/grades/8"))
      .and(body_json(serde_json::json!({"score": 91.0})))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 8, "assignment_id": 2, "student_id": 6, "score": 91.0, "feedback": ""
      })))
      .expect(1)
      .mount(&server)
      .await;

    let admin = AdminApi::new(client_for(&server));
    let grade = admin
      .update_grade(
        8,
        &GradeUpdateRequest {
          score: Some(91.0),
          feedback: None,
        },
      )
      .await
      .unwrap();
    assert_eq!(grade.score, 91.0);
  }
}

//! Request and response bodies of the Smart Course REST API.
//!
//! Field names follow the backend's snake_case JSON. Fields the backend omits
//! on some endpoints carry `#[serde(default)]` so one type serves every
//! endpoint returning that entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Roles
// ============================================================================

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  Student,
}

impl Role {
  pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Teacher => "teacher",
      Role::Student => "student",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "admin" => Ok(Role::Admin),
      "teacher" => Ok(Role::Teacher),
      "student" => Ok(Role::Student),
      other => Err(format!("unknown role: {}", other)),
    }
  }
}

// ============================================================================
// Authentication and users
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
  pub username: String,
  pub email: String,
  pub password: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
  pub token: String,
  pub user: UserData,
}

/// User profile as returned by the backend and persisted in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
  pub id: u64,
  pub username: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  /// Kept as the raw string so profiles with unexpected roles still load.
  pub role: String,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

impl UserData {
  pub fn role(&self) -> Option<Role> {
    self.role.parse().ok()
  }

  /// Display name, falling back to the username.
  pub fn display_name(&self) -> &str {
    if self.name.trim().is_empty() {
      &self.username
    } else {
      &self.name
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserCreateRequest {
  pub username: String,
  pub name: String,
  pub email: String,
  pub password: String,
  pub role: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdateRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role: Option<String>,
}

// ============================================================================
// Courses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub teacher_id: u64,
  #[serde(default)]
  pub teacher_name: String,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseCreateRequest {
  pub title: String,
  pub description: String,
  pub teacher_id: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseUpdateRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub teacher_id: Option<u64>,
}

/// Student enrolled in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseStudent {
  pub id: u64,
  #[serde(default)]
  pub user_id: u64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollStudentRequest {
  pub student_id: u64,
}

/// Course as seen by its teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherCourse {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub students_count: u64,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

/// Course as seen by an enrolled student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentCourse {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub teacher_name: String,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDetail {
  #[serde(flatten)]
  pub course: StudentCourse,
  #[serde(default)]
  pub lessons_count: u64,
  #[serde(default)]
  pub assignments_count: u64,
  #[serde(default)]
  pub completed_assignments_count: u64,
  #[serde(default)]
  pub average_grade: f64,
}

// ============================================================================
// Assignments and grades
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
  pub id: u64,
  #[serde(default)]
  pub course_id: u64,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub deadline: String,
  #[serde(default)]
  pub max_score: u32,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentCreateRequest {
  /// Only sent on admin endpoints; teacher endpoints carry the course in the path.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub course_id: Option<u64>,
  pub title: String,
  pub description: String,
  pub deadline: String,
  pub max_score: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignmentUpdateRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deadline: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
  pub id: u64,
  #[serde(default)]
  pub assignment_id: u64,
  #[serde(default)]
  pub student_id: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub student_name: Option<String>,
  pub score: f64,
  #[serde(default)]
  pub feedback: String,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeCreateRequest {
  /// Only sent on admin endpoints.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignment_id: Option<u64>,
  pub student_id: u64,
  pub score: f64,
  pub feedback: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GradeUpdateRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub score: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentGrade {
  pub id: u64,
  #[serde(default)]
  pub assignment_id: u64,
  #[serde(default)]
  pub assignment_title: String,
  #[serde(default)]
  pub course_id: u64,
  #[serde(default)]
  pub course_title: String,
  pub score: f64,
  #[serde(default)]
  pub max_score: u32,
  #[serde(default)]
  pub feedback: String,
  #[serde(default)]
  pub created_at: String,
}

/// The student's own grade as a plain grade record. The student is implied.
impl From<StudentGrade> for Grade {
  fn from(grade: StudentGrade) -> Self {
    Grade {
      id: grade.id,
      assignment_id: grade.assignment_id,
      student_id: 0,
      student_name: None,
      score: grade.score,
      feedback: grade.feedback,
      created_at: grade.created_at,
      updated_at: String::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAssignment {
  pub id: u64,
  #[serde(default)]
  pub course_id: u64,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub deadline: String,
  #[serde(default)]
  pub max_score: u32,
  #[serde(default)]
  pub is_completed: bool,
  #[serde(default)]
  pub grade: Option<StudentGrade>,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

// ============================================================================
// Monitoring
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Debug,
  Info,
  Warning,
  Error,
}

impl LogLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warning => "warning",
      LogLevel::Error => "error",
    }
  }
}

impl FromStr for LogLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "debug" => Ok(LogLevel::Debug),
      "info" => Ok(LogLevel::Info),
      "warn" | "warning" => Ok(LogLevel::Warning),
      "error" => Ok(LogLevel::Error),
      other => Err(format!("unknown log level: {}", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
  pub id: u64,
  /// Raw level string; the backend is not strict about casing.
  pub level: String,
  pub message: String,
  #[serde(default)]
  pub source: String,
  #[serde(default)]
  pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub id: u64,
  #[serde(rename = "type")]
  pub event_type: String,
  #[serde(default)]
  pub entity_type: String,
  #[serde(default)]
  pub entity_id: u64,
  #[serde(default)]
  pub user_id: u64,
  #[serde(default)]
  pub details: serde_json::Value,
  #[serde(default)]
  pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
  pub name: String,
  pub value: f64,
  #[serde(default)]
  pub labels: BTreeMap<String, String>,
  #[serde(default)]
  pub timestamp: String,
}

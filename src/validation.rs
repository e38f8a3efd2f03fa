//! Client-side form validation.
//!
//! Each `validate_*` function takes raw form input and returns the request
//! body to send, or the first problem found.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::api::types::{
  AssignmentCreateRequest, CourseCreateRequest, GradeCreateRequest, LoginRequest,
  RegisterRequest, Role, UserCreateRequest, UserUpdateRequest,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// A form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
  pub field: &'static str,
  pub message: String,
}

impl ValidationError {
  pub fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self {
      field,
      message: message.into(),
    }
  }
}

type Validated<T> = Result<T, ValidationError>;

fn required(field: &'static str, value: &str, message: &str) -> Validated<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(ValidationError::new(field, message));
  }
  Ok(trimmed.to_string())
}

/// Positive integer id typed into a form.
fn positive_id(field: &'static str, value: &str, message: &str) -> Validated<u64> {
  match value.trim().parse::<u64>() {
    Ok(id) if id > 0 => Ok(id),
    _ => Err(ValidationError::new(field, message)),
  }
}

fn is_email(value: &str) -> bool {
  match value.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain
          .split_once('.')
          .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
    }
    None => false,
  }
}

pub fn validate_login(username: &str, password: &str) -> Validated<LoginRequest> {
  let username = required("username", username, "Username is required")?;
  if password.is_empty() {
    return Err(ValidationError::new("password", "Password is required"));
  }
  Ok(LoginRequest {
    username,
    password: password.to_string(),
  })
}

pub fn validate_register(username: &str, email: &str, password: &str) -> Validated<RegisterRequest> {
  let username = required("username", username, "Username is required")?;
  let email = required("email", email, "Email is required")?;
  if !is_email(&email) {
    return Err(ValidationError::new("email", "Enter a valid email address"));
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ValidationError::new(
      "password",
      format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
    ));
  }
  Ok(RegisterRequest {
    username,
    email,
    password: password.to_string(),
    role: None,
  })
}

pub fn validate_course(title: &str, description: &str, teacher_id: &str) -> Validated<CourseCreateRequest> {
  Ok(CourseCreateRequest {
    title: required("title", title, "Course title is required")?,
    description: required("description", description, "Course description is required")?,
    teacher_id: positive_id("teacher_id", teacher_id, "Enter a valid teacher ID")?,
  })
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM` (UTC) or `YYYY-MM-DD` (midnight UTC)
/// and returns RFC 3339 in UTC.
pub fn parse_deadline(value: &str) -> Validated<String> {
  let value = value.trim();
  let parsed = DateTime::parse_from_rfc3339(value)
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").map(|dt| dt.and_utc()))
    .or_else(|_| {
      NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(Default::default()).and_utc())
    });

  match parsed {
    Ok(deadline) => Ok(deadline.to_rfc3339_opts(SecondsFormat::Secs, true)),
    Err(_) => Err(ValidationError::new(
      "deadline",
      "Deadline must look like 2026-05-31 or 2026-05-31 18:00",
    )),
  }
}

pub fn validate_assignment(
  title: &str,
  description: &str,
  deadline: &str,
  max_score: &str,
) -> Validated<AssignmentCreateRequest> {
  let title = required("title", title, "Assignment title is required")?;
  let description = required("description", description, "Assignment description is required")?;
  let deadline = parse_deadline(deadline)?;
  let max_score = match max_score.trim().parse::<u32>() {
    Ok(score) if score > 0 => score,
    _ => {
      return Err(ValidationError::new(
        "max_score",
        "Maximum score must be a positive whole number",
      ))
    }
  };
  Ok(AssignmentCreateRequest {
    course_id: None,
    title,
    description,
    deadline,
    max_score,
  })
}

/// Score a student for an assignment worth `max_score` points.
pub fn validate_grade(
  student_id: &str,
  score: &str,
  feedback: &str,
  max_score: u32,
) -> Validated<GradeCreateRequest> {
  let student_id = positive_id("student_id", student_id, "Enter a valid student ID")?;
  let score = parse_score(score, max_score)?;
  Ok(GradeCreateRequest {
    assignment_id: None,
    student_id,
    score,
    feedback: feedback.trim().to_string(),
  })
}

/// Whole-number score in `0..=max_score`.
pub fn parse_score(score: &str, max_score: u32) -> Validated<f64> {
  match score.trim().parse::<u32>() {
    Ok(score) if score <= max_score => Ok(f64::from(score)),
    _ => Err(ValidationError::new(
      "score",
      format!("Score must be between 0 and {}", max_score),
    )),
  }
}

pub fn validate_user(
  username: &str,
  name: &str,
  email: &str,
  password: &str,
  role: &str,
) -> Validated<UserCreateRequest> {
  let username = required("username", username, "Username is required")?;
  let name = required("name", name, "Name is required")?;
  let email = required("email", email, "Email is required")?;
  if !is_email(&email) {
    return Err(ValidationError::new("email", "Enter a valid email address"));
  }
  if password.is_empty() {
    return Err(ValidationError::new("password", "Password is required"));
  }
  let role: Role = role
    .parse()
    .map_err(|_| ValidationError::new("role", "Role must be admin, teacher or student"))?;
  Ok(UserCreateRequest {
    username,
    name,
    email,
    password: password.to_string(),
    role: role.as_str().to_string(),
  })
}

/// Changes to an existing account. An empty password keeps the current one;
/// `role` is `None` where the role cannot be changed (own profile).
pub fn validate_user_update(
  name: &str,
  email: &str,
  password: &str,
  role: Option<&str>,
) -> Validated<UserUpdateRequest> {
  let name = required("name", name, "Name is required")?;
  let email = required("email", email, "Email is required")?;
  if !is_email(&email) {
    return Err(ValidationError::new("email", "Enter a valid email address"));
  }
  let password = match password {
    "" => None,
    p if p.chars().count() < MIN_PASSWORD_LEN => {
      return Err(ValidationError::new(
        "password",
        format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
      ))
    }
    p => Some(p.to_string()),
  };
  let role = match role {
    Some(role) => Some(
      role
        .parse::<Role>()
        .map_err(|_| ValidationError::new("role", "Role must be admin, teacher or student"))?
        .as_str()
        .to_string(),
    ),
    None => None,
  };
  Ok(UserUpdateRequest {
    name: Some(name),
    email: Some(email),
    password,
    role,
  })
}

pub fn validate_student_id(value: &str) -> Validated<u64> {
  positive_id("student_id", value, "Enter a valid student ID")
}

/// `YYYY-MM-DD..YYYY-MM-DD`, inclusive, start not after end.
pub fn parse_date_range(value: &str) -> Validated<(String, String)> {
  let invalid = || ValidationError::new("date_range", "Date range must look like 2026-01-01..2026-01-31");
  let (start, end) = value.split_once("..").ok_or_else(invalid)?;
  let (start, end) = (start.trim(), end.trim());
  let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d").map_err(|_| invalid())?;
  let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d").map_err(|_| invalid())?;
  if start_date > end_date {
    return Err(ValidationError::new("date_range", "Start date is after end date"));
  }
  Ok((start.to_string(), end.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_login_requires_both_fields() {
    assert_eq!(validate_login("", "pw").unwrap_err().field, "username");
    assert_eq!(validate_login("alice", "").unwrap_err().field, "password");
    assert_eq!(validate_login("  alice ", "pw").unwrap().username, "alice");
  }

  #[test]
  fn test_register_rules() {
    assert_eq!(
      validate_register("bob", "bob.example.com", "secret1")
        .unwrap_err()
        .field,
      "email"
    );
    assert_eq!(
      validate_register("bob", "bob@localhost", "secret1")
        .unwrap_err()
        .field,
      "email"
    );
    let err = validate_register("bob", "bob@example.com", "12345").unwrap_err();
    assert_eq!(err.to_string(), "Password must be at least 6 characters");
    assert!(validate_register("bob", "bob@example.com", "123456").is_ok());
  }

  #[test]
  fn test_course_rules() {
    assert_eq!(
      validate_course(" ", "d", "1").unwrap_err().to_string(),
      "Course title is required"
    );
    assert_eq!(validate_course("t", "", "1").unwrap_err().field, "description");
    assert_eq!(validate_course("t", "d", "0").unwrap_err().field, "teacher_id");
    assert_eq!(validate_course("t", "d", "abc").unwrap_err().field, "teacher_id");
    assert_eq!(validate_course("t", "d", "7").unwrap().teacher_id, 7);
  }

  #[test]
  fn test_deadline_formats() {
    assert_eq!(parse_deadline("2026-05-31").unwrap(), "2026-05-31T00:00:00Z");
    assert_eq!(
      parse_deadline("2026-05-31 18:30").unwrap(),
      "2026-05-31T18:30:00Z"
    );
    assert_eq!(
      parse_deadline("2026-05-31T20:30:00+02:00").unwrap(),
      "2026-05-31T18:30:00Z"
    );
    assert!(parse_deadline("next friday").is_err());
    assert!(parse_deadline("2026-02-30").is_err());
  }

  #[test]
  fn test_assignment_max_score() {
    assert_eq!(
      validate_assignment("t", "d", "2026-01-01", "0")
        .unwrap_err()
        .field,
      "max_score"
    );
    assert_eq!(
      validate_assignment("t", "d", "2026-01-01", "12.5")
        .unwrap_err()
        .field,
      "max_score"
    );
    let request = validate_assignment("t", "d", "2026-01-01", "100").unwrap();
    assert_eq!(request.max_score, 100);
    assert_eq!(request.course_id, None);
  }

  #[test]
  fn test_score_bounds() {
    assert_eq!(parse_score("0", 20).unwrap(), 0.0);
    assert_eq!(parse_score("20", 20).unwrap(), 20.0);
    assert_eq!(
      parse_score("21", 20).unwrap_err().to_string(),
      "Score must be between 0 and 20"
    );
    assert!(parse_score("-1", 20).is_err());
    assert!(validate_grade("0", "5", "", 20).is_err());
    assert_eq!(validate_grade("4", "5", " ok ", 20).unwrap().feedback, "ok");
  }

  #[test]
  fn test_user_role() {
    assert_eq!(
      validate_user("u", "U", "u@x.io", "pw", "janitor")
        .unwrap_err()
        .field,
      "role"
    );
    assert_eq!(
      validate_user("u", "U", "u@x.io", "pw", "Teacher").unwrap().role,
      "teacher"
    );
  }

  #[test]
  fn test_user_update_keeps_blank_password() {
    let update = validate_user_update("Ann", "ann@example.edu", "", None).unwrap();
    assert_eq!(update.password, None);
    assert_eq!(update.role, None);
    assert_eq!(update.name.as_deref(), Some("Ann"));

    assert_eq!(
      validate_user_update("Ann", "ann@example.edu", "abc", None)
        .unwrap_err()
        .field,
      "password"
    );
    assert_eq!(
      validate_user_update("Ann", "ann@example.edu", "", Some("dean"))
        .unwrap_err()
        .field,
      "role"
    );
    let update = validate_user_update("Ann", "ann@example.edu", "secret1", Some("Teacher")).unwrap();
    assert_eq!(update.role.as_deref(), Some("teacher"));
  }

  #[test]
  fn test_date_range() {
    assert_eq!(
      parse_date_range("2026-01-01 .. 2026-01-31").unwrap(),
      ("2026-01-01".to_string(), "2026-01-31".to_string())
    );
    assert!(parse_date_range("2026-01-01").is_err());
    assert_eq!(
      parse_date_range("2026-02-01..2026-01-01").unwrap_err().to_string(),
      "Start date is after end date"
    );
  }

  #[test]
  fn test_student_id() {
    assert!(validate_student_id("").is_err());
    assert!(validate_student_id("-3").is_err());
    assert_eq!(validate_student_id(" 42 ").unwrap(), 42);
  }
}

//! Routes, role guards and fallback redirects.

use std::fmt;

use crate::api::types::Role;
use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Home,
  Login,
  Register,
  NotFound,

  AdminDashboard,
  AdminCourses,
  AdminCourseNew,
  AdminCourseEdit(u64),
  AdminCourseStudents(u64),
  AdminUsers,
  AdminUserNew,
  AdminUserEdit(u64),
  AdminLogs,
  AdminEvents,
  AdminMetrics,

  TeacherDashboard,
  TeacherCourses,
  TeacherAssignments { course_id: u64 },
  TeacherAssignmentNew { course_id: u64 },
  TeacherAssignmentEdit(u64),
  TeacherGrades(u64),
  TeacherGradeNew(u64),
  TeacherGradeEdit(u64),

  StudentDashboard,
  StudentCourses,
  StudentCourse(u64),
  StudentAssignments(u64),
  StudentGrades,

  /// Own profile, under the role's prefix
  Profile(Role),
}

fn id(segment: &str) -> Option<u64> {
  segment.parse().ok()
}

impl Route {
  /// Match `path` against the route table, applying the fallback redirects:
  /// anything unknown under a role prefix goes to that role's dashboard,
  /// anything else unknown goes to the not-found page.
  pub fn parse(path: &str) -> Route {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
      [] => Route::Home,
      ["login"] => Route::Login,
      ["register"] => Route::Register,
      ["404"] => Route::NotFound,
      ["admin", rest @ ..] => Self::match_admin(rest).unwrap_or(Route::AdminDashboard),
      ["teacher", rest @ ..] => Self::match_teacher(rest).unwrap_or(Route::TeacherDashboard),
      ["student", rest @ ..] => Self::match_student(rest).unwrap_or(Route::StudentDashboard),
      _ => Route::NotFound,
    }
  }

  fn match_admin(rest: &[&str]) -> Option<Route> {
    match rest {
      [] => Some(Route::AdminDashboard),
      ["courses"] => Some(Route::AdminCourses),
      ["courses", "new"] => Some(Route::AdminCourseNew),
      ["courses", course] => id(course).map(Route::AdminCourseEdit),
      ["courses", course, "students"] => id(course).map(Route::AdminCourseStudents),
      ["users"] => Some(Route::AdminUsers),
      ["users", "new"] => Some(Route::AdminUserNew),
      ["users", user] => id(user).map(Route::AdminUserEdit),
      ["profile"] => Some(Route::Profile(Role::Admin)),
      ["logs"] => Some(Route::AdminLogs),
      ["events"] => Some(Route::AdminEvents),
      ["metrics"] => Some(Route::AdminMetrics),
      _ => None,
    }
  }

  fn match_teacher(rest: &[&str]) -> Option<Route> {
    match rest {
      [] => Some(Route::TeacherDashboard),
      ["courses"] => Some(Route::TeacherCourses),
      ["courses", course, "assignments"] => {
        id(course).map(|course_id| Route::TeacherAssignments { course_id })
      }
      ["courses", course, "assignments", "new"] => {
        id(course).map(|course_id| Route::TeacherAssignmentNew { course_id })
      }
      ["assignments", assignment] => id(assignment).map(Route::TeacherAssignmentEdit),
      ["assignments", assignment, "grades"] => id(assignment).map(Route::TeacherGrades),
      ["assignments", assignment, "grades", "new"] => id(assignment).map(Route::TeacherGradeNew),
      ["grades", grade] => id(grade).map(Route::TeacherGradeEdit),
      ["profile"] => Some(Route::Profile(Role::Teacher)),
      _ => None,
    }
  }

  fn match_student(rest: &[&str]) -> Option<Route> {
    match rest {
      [] => Some(Route::StudentDashboard),
      ["courses"] => Some(Route::StudentCourses),
      ["courses", course] => id(course).map(Route::StudentCourse),
      ["courses", course, "assignments"] => id(course).map(Route::StudentAssignments),
      ["grades"] => Some(Route::StudentGrades),
      ["profile"] => Some(Route::Profile(Role::Student)),
      _ => None,
    }
  }

  /// Role a user must have to open this route. `None` for public routes.
  pub fn required_role(&self) -> Option<Role> {
    use Route::*;
    match self {
      Home | Login | Register | NotFound => None,
      AdminDashboard | AdminCourses | AdminCourseNew | AdminCourseEdit(_)
      | AdminCourseStudents(_) | AdminUsers | AdminUserNew | AdminUserEdit(_) | AdminLogs
      | AdminEvents | AdminMetrics => Some(Role::Admin),
      TeacherDashboard
      | TeacherCourses
      | TeacherAssignments { .. }
      | TeacherAssignmentNew { .. }
      | TeacherAssignmentEdit(_)
      | TeacherGrades(_)
      | TeacherGradeNew(_)
      | TeacherGradeEdit(_) => Some(Role::Teacher),
      StudentDashboard | StudentCourses | StudentCourse(_) | StudentAssignments(_)
      | StudentGrades => Some(Role::Student),
      Profile(role) => Some(*role),
    }
  }

  pub fn path(&self) -> String {
    use Route::*;
    match self {
      Home => "/".to_string(),
      Login => "/login".to_string(),
      Register => "/register".to_string(),
      NotFound => "/404".to_string(),
      AdminDashboard => "/admin".to_string(),
      AdminCourses => "/admin/courses".to_string(),
      AdminCourseNew => "/admin/courses/new".to_string(),
      AdminCourseEdit(id) => format!("/admin/courses/{}", id),
      AdminCourseStudents(id) => format!("/admin/courses/{}/students", id),
      AdminUsers => "/admin/users".to_string(),
      AdminUserNew => "/admin/users/new".to_string(),
      AdminUserEdit(id) => format!("/admin/users/{}", id),
      AdminLogs => "/admin/logs".to_string(),
      AdminEvents => "/admin/events".to_string(),
      AdminMetrics => "/admin/metrics".to_string(),
      TeacherDashboard => "/teacher".to_string(),
      TeacherCourses => "/teacher/courses".to_string(),
      TeacherAssignments { course_id } => format!("/teacher/courses/{}/assignments", course_id),
      TeacherAssignmentNew { course_id } => {
        format!("/teacher/courses/{}/assignments/new", course_id)
      }
      TeacherAssignmentEdit(id) => format!("/teacher/assignments/{}", id),
      TeacherGrades(id) => format!("/teacher/assignments/{}/grades", id),
      TeacherGradeNew(id) => format!("/teacher/assignments/{}/grades/new", id),
      TeacherGradeEdit(id) => format!("/teacher/grades/{}", id),
      StudentDashboard => "/student".to_string(),
      StudentCourses => "/student/courses".to_string(),
      StudentCourse(id) => format!("/student/courses/{}", id),
      StudentAssignments(id) => format!("/student/courses/{}/assignments", id),
      StudentGrades => "/student/grades".to_string(),
      Profile(role) => format!("/{}/profile", role.as_str()),
    }
  }

  /// Dashboard a user lands on after logging in.
  pub fn landing(role: Role) -> Route {
    match role {
      Role::Admin => Route::AdminDashboard,
      Role::Teacher => Route::TeacherDashboard,
      Role::Student => Route::StudentDashboard,
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.path())
  }
}

/// Who is asking for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  Anonymous,
  /// Holds a valid token. The role is `None` when the stored profile has
  /// a role this client does not know.
  Authenticated(Option<Role>),
}

impl Access {
  pub fn of(session: &SessionManager) -> Self {
    match session.current() {
      Some(current) => Access::Authenticated(current.user.role()),
      None => Access::Anonymous,
    }
  }
}

/// Route to show for `path`, after fallbacks and guards.
///
/// Guarded routes send anonymous users to the login screen and users with
/// another role to the home page.
pub fn resolve(path: &str, access: Access) -> Route {
  let route = Route::parse(path);
  match (route.required_role(), access) {
    (None, _) => route,
    (Some(_), Access::Anonymous) => Route::Login,
    (Some(required), Access::Authenticated(Some(role))) if required == role => route,
    (Some(_), Access::Authenticated(_)) => Route::Home,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TEACHER: Access = Access::Authenticated(Some(Role::Teacher));
  const STUDENT: Access = Access::Authenticated(Some(Role::Student));
  const ADMIN: Access = Access::Authenticated(Some(Role::Admin));

  #[test]
  fn test_paths_round_trip() {
    let routes = [
      Route::Home,
      Route::AdminCourseStudents(4),
      Route::AdminUserNew,
      Route::AdminUserEdit(6),
      Route::Profile(Role::Teacher),
      Route::TeacherAssignmentNew { course_id: 3 },
      Route::TeacherGradeNew(8),
      Route::TeacherGradeEdit(9),
      Route::StudentAssignments(2),
    ];
    for route in routes {
      assert_eq!(Route::parse(&route.path()), route);
    }
  }

  #[test]
  fn test_unknown_top_level_goes_to_404() {
    assert_eq!(Route::parse("/nope"), Route::NotFound);
    assert_eq!(Route::parse("/login/extra"), Route::NotFound);
  }

  #[test]
  fn test_unknown_under_role_prefix_goes_to_dashboard() {
    assert_eq!(Route::parse("/teacher/whatever"), Route::TeacherDashboard);
    assert_eq!(Route::parse("/student/courses/abc"), Route::StudentDashboard);
    assert_eq!(Route::parse("/admin/courses/1/2/3"), Route::AdminDashboard);
  }

  #[test]
  fn test_trailing_slash_and_query_are_ignored() {
    assert_eq!(Route::parse("/teacher/courses/"), Route::TeacherCourses);
    assert_eq!(Route::parse("/student/grades?page=2"), Route::StudentGrades);
  }

  #[test]
  fn test_new_is_not_an_id() {
    assert_eq!(Route::parse("/admin/courses/new"), Route::AdminCourseNew);
    assert_eq!(Route::parse("/admin/courses/12"), Route::AdminCourseEdit(12));
  }

  #[test]
  fn test_teacher_on_admin_path_goes_home() {
    assert_eq!(resolve("/admin", TEACHER), Route::Home);
    assert_eq!(resolve("/admin/users", STUDENT), Route::Home);
    assert_eq!(resolve("/student/profile", TEACHER), Route::Home);
    assert_eq!(resolve("/teacher/profile", TEACHER), Route::Profile(Role::Teacher));
  }

  #[test]
  fn test_anonymous_on_guarded_path_goes_to_login() {
    assert_eq!(resolve("/teacher/courses", Access::Anonymous), Route::Login);
    assert_eq!(resolve("/", Access::Anonymous), Route::Home);
    assert_eq!(resolve("/register", Access::Anonymous), Route::Register);
  }

  #[test]
  fn test_unknown_role_goes_home() {
    assert_eq!(resolve("/student", Access::Authenticated(None)), Route::Home);
  }

  #[test]
  fn test_matching_role_passes() {
    assert_eq!(resolve("/admin/metrics", ADMIN), Route::AdminMetrics);
    assert_eq!(
      resolve("/teacher/assignments/5/grades", TEACHER),
      Route::TeacherGrades(5)
    );
  }

  #[test]
  fn test_landing_per_role() {
    assert_eq!(Route::landing(Role::Admin).path(), "/admin");
    assert_eq!(Route::landing(Role::Teacher).path(), "/teacher");
    assert_eq!(Route::landing(Role::Student).path(), "/student");
  }
}

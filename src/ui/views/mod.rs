//! One view per route.

mod admin;
mod dashboard;
mod home;
mod login;
mod profile;
mod register;
mod student;
mod teacher;

pub use dashboard::DashboardView;
pub use home::{HomeView, NotFoundView};
pub use login::LoginView;
pub use profile::ProfileView;
pub use register::RegisterView;

use crate::api::types::Role;
use crate::error::{ApiError, ApiResult};
use crate::query::{Query, QueryState};
use crate::router::Route;
use crate::store::StoreState;
use crate::ui::components::ListingStatus;
use crate::ui::view::View;
use crate::ui::Context;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Build the view for an already resolved route.
pub fn build(route: Route, ctx: &Context) -> Box<dyn View> {
  let ctx = ctx.clone();
  match route {
    Route::Home => Box::new(HomeView::new(ctx)),
    Route::NotFound => Box::new(NotFoundView),
    Route::Login => Box::new(LoginView::new(ctx)),
    Route::Register => Box::new(RegisterView::new(ctx)),

    Route::AdminDashboard => Box::new(DashboardView::new(ctx, Role::Admin)),
    Route::AdminCourses => Box::new(admin::CoursesView::new(ctx)),
    Route::AdminCourseNew => Box::new(admin::CourseFormView::new(ctx, None)),
    Route::AdminCourseEdit(id) => Box::new(admin::CourseFormView::new(ctx, Some(id))),
    Route::AdminCourseStudents(id) => Box::new(admin::CourseStudentsView::new(ctx, id)),
    Route::AdminUsers => Box::new(admin::UsersView::new(ctx)),
    Route::AdminUserNew => Box::new(admin::UserFormView::new(ctx, admin::UserTarget::New)),
    Route::AdminUserEdit(id) => {
      Box::new(admin::UserFormView::new(ctx, admin::UserTarget::Edit(id)))
    }
    Route::AdminLogs => Box::new(admin::LogsView::new(ctx)),
    Route::AdminEvents => Box::new(admin::EventsView::new(ctx)),
    Route::AdminMetrics => Box::new(admin::MetricsView::new(ctx)),

    Route::TeacherDashboard => Box::new(DashboardView::new(ctx, Role::Teacher)),
    Route::TeacherCourses => Box::new(teacher::CoursesView::new(ctx)),
    Route::TeacherAssignments { course_id } => {
      Box::new(teacher::AssignmentsView::new(ctx, course_id))
    }
    Route::TeacherAssignmentNew { course_id } => Box::new(teacher::AssignmentFormView::new(
      ctx,
      teacher::AssignmentTarget::New { course_id },
    )),
    Route::TeacherAssignmentEdit(id) => Box::new(teacher::AssignmentFormView::new(
      ctx,
      teacher::AssignmentTarget::Edit(id),
    )),
    Route::TeacherGrades(assignment_id) => Box::new(teacher::GradesView::new(ctx, assignment_id)),
    Route::TeacherGradeNew(assignment_id) => Box::new(teacher::GradeFormView::new(
      ctx,
      teacher::GradeTarget::New { assignment_id },
    )),
    Route::TeacherGradeEdit(id) => Box::new(teacher::GradeFormView::new(
      ctx,
      teacher::GradeTarget::Edit(id),
    )),

    Route::StudentDashboard => Box::new(DashboardView::new(ctx, Role::Student)),
    Route::StudentCourses => Box::new(student::CoursesView::new(ctx)),
    Route::StudentCourse(id) => Box::new(student::CourseView::new(ctx, id)),
    Route::StudentAssignments(course_id) => {
      Box::new(student::AssignmentsView::new(ctx, course_id))
    }
    Route::StudentGrades => Box::new(student::GradesView::new(ctx)),

    Route::Profile(_) => Box::new(ProfileView::new(ctx)),
  }
}

/// Outcome of the last action, shown under a view's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
  Info(String),
  Error(String),
}

impl Flash {
  pub fn line(&self) -> Line<'static> {
    match self {
      Flash::Info(msg) => Line::from(Span::styled(
        format!(" {}", msg),
        Style::default().fg(Color::Green),
      )),
      Flash::Error(msg) => Line::from(Span::styled(
        format!(" {}", msg),
        Style::default().fg(Color::Red),
      )),
    }
  }
}

/// Split off a one-line status row at the bottom of `area`
pub fn with_status_line(area: Rect) -> (Rect, Rect) {
  let [main, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
  (main, status)
}

pub fn render_flash(frame: &mut Frame, area: Rect, flash: Option<&Flash>, hint: &str) {
  let line = match flash {
    Some(flash) => flash.line(),
    None => Line::from(Span::styled(
      format!(" {}", hint),
      Style::default().fg(Color::DarkGray),
    )),
  };
  frame.render_widget(Paragraph::new(line), area);
}

pub fn query_status<T: Send + 'static>(query: &Query<T>) -> ListingStatus {
  match query.state() {
    QueryState::Loading => ListingStatus::Loading,
    QueryState::Error(e) => ListingStatus::Error(e.to_string()),
    QueryState::Idle | QueryState::Success(_) => ListingStatus::Ready,
  }
}

pub fn store_status<T>(state: &StoreState<T>) -> ListingStatus {
  if state.is_loading {
    ListingStatus::Loading
  } else if let Some(error) = &state.error {
    ListingStatus::Error(error.clone())
  } else {
    ListingStatus::Ready
  }
}

/// Poll a mutation; on completion drop it and hand back the result once.
pub fn poll_mutation<T: Send + 'static>(mutation: &mut Option<Query<T>>) -> Option<ApiResult<T>> {
  let query = mutation.as_mut()?;
  if !query.poll() {
    return None;
  }
  match mutation.take()?.into_state() {
    QueryState::Success(value) => Some(Ok(value)),
    QueryState::Error(e) => Some(Err(e)),
    QueryState::Idle | QueryState::Loading => None,
  }
}

impl From<ApiError> for Flash {
  fn from(error: ApiError) -> Self {
    Flash::Error(error.to_string())
  }
}

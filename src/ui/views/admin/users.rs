use crate::api::types::UserData;
use crate::query::Query;
use crate::router::Route;
use crate::store::UserKey;
use crate::ui::components::{
  Confirm, KeyResult, Listing, ListingEvent, ListingTable, Prompt, PromptEvent,
};
use crate::ui::renderfns::{format_timestamp, role_color};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{poll_mutation, render_flash, store_status, with_status_line, Flash};
use crate::ui::Context;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};
use tracing::info;

/// Every account, with create and delete.
pub struct UsersView {
  ctx: Context,
  listing: Listing,
  filter: Prompt,
  filter_text: String,
  confirm: Confirm,
  pending_delete: Option<UserData>,
  delete: Option<Query<()>>,
  flash: Option<Flash>,
}

impl UsersView {
  pub fn new(ctx: Context) -> Self {
    ctx.stores.users.spawn_fetch(UserKey::All);
    Self {
      listing: Listing::new(ctx.page_size),
      ctx,
      filter: Prompt::new(),
      filter_text: String::new(),
      confirm: Confirm::default(),
      pending_delete: None,
      delete: None,
      flash: None,
    }
  }

  fn users(&self) -> Vec<UserData> {
    let needle = self.filter_text.to_lowercase();
    self
      .ctx
      .stores
      .users
      .items()
      .into_iter()
      .filter(|u| {
        needle.is_empty()
          || u.username.to_lowercase().contains(&needle)
          || u.name.to_lowercase().contains(&needle)
          || u.email.to_lowercase().contains(&needle)
          || u.role.eq_ignore_ascii_case(&needle)
      })
      .collect()
  }

  fn reload(&self) {
    self.ctx.stores.users.invalidate(&UserKey::All);
    self.ctx.stores.users.spawn_fetch(UserKey::All);
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.confirm.handle_key(key) {
      KeyResult::Event(true) => {
        if let Some(id) = self.pending_delete.as_ref().map(|u| u.id) {
          let api = self.ctx.api.clone();
          self.delete = Some(Query::started(move || {
            let api = api.clone();
            async move { api.users.delete_user(id).await }
          }));
        }
        return Some(ViewAction::None);
      }
      KeyResult::Event(false) => {
        self.pending_delete = None;
        return Some(ViewAction::None);
      }
      KeyResult::Handled => return Some(ViewAction::None),
      KeyResult::NotHandled => {}
    }

    match self.filter.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(text)) => {
        self.filter_text = text;
        self.listing.reset();
        Some(ViewAction::None)
      }
      KeyResult::Event(PromptEvent::Cancelled) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let users = self.users();
    match self.listing.handle_key(key, users.len()) {
      KeyResult::Event(ListingEvent::Activate(idx)) => Some(
        users
          .get(idx)
          .map(|u| ViewAction::Navigate(Route::AdminUserEdit(u.id).path()))
          .unwrap_or(ViewAction::None),
      ),
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('n') => Some(ViewAction::Navigate(Route::AdminUserNew.path())),
      KeyCode::Char('e') => {
        let users = self.users();
        let edit = self
          .listing
          .selected(users.len())
          .and_then(|idx| users.get(idx))
          .map(|u| ViewAction::Navigate(Route::AdminUserEdit(u.id).path()));
        Some(edit.unwrap_or(ViewAction::None))
      }
      KeyCode::Char('d') => {
        let users = self.users();
        let selected = self
          .listing
          .selected(users.len())
          .and_then(|idx| users.into_iter().nth(idx));
        match selected {
          Some(user) if Some(user.id) == self.ctx.user().map(|me| me.id) => {
            self.flash = Some(Flash::Error("You cannot delete your own account".to_string()));
          }
          Some(user) => {
            self.confirm.ask(format!("Delete user '{}'?", user.username));
            self.pending_delete = Some(user);
          }
          None => {}
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('/') => {
        self.filter.open("Filter by name, email or role", &self.filter_text);
        Some(ViewAction::None)
      }
      KeyCode::Char('r') => {
        self.reload();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Back),
      _ => None,
    }
  }
}

impl View for UsersView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn tick(&mut self) -> ViewAction {
    match poll_mutation(&mut self.delete) {
      Some(Ok(())) => {
        if let Some(user) = self.pending_delete.take() {
          info!(user_id = user.id, "deleted user");
          self.ctx.stores.users.invalidate(&UserKey::ById(user.id));
          self.flash = Some(Flash::Info(format!("Deleted user '{}'", user.username)));
        }
        self.reload();
      }
      Some(Err(e)) => {
        self.pending_delete = None;
        self.flash = Some(e.into());
      }
      None => {}
    }
    ViewAction::None
  }

  fn resume(&mut self) {
    self.ctx.stores.users.spawn_fetch(UserKey::All);
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (main, status) = with_status_line(area);
    let state = self.ctx.stores.users.state();
    let rows: Vec<Row> = self
      .users()
      .into_iter()
      .map(|u| {
        let role_style = Style::default().fg(role_color(&u.role));
        Row::new(vec![
          Cell::from(u.id.to_string()).style(Style::default().fg(Color::Cyan)),
          Cell::from(u.username.clone()),
          Cell::from(u.display_name().to_string()),
          Cell::from(u.email.clone()).style(Style::default().fg(Color::DarkGray)),
          Cell::from(u.role.clone()).style(role_style),
          Cell::from(format_timestamp(&u.created_at)),
        ])
      })
      .collect();

    let title = if self.filter_text.is_empty() {
      "Users".to_string()
    } else {
      format!("Users matching '{}'", self.filter_text)
    };
    self.listing.render(
      frame,
      main,
      ListingTable {
        title: &title,
        status: store_status(&state),
        header: vec!["ID", "Username", "Name", "Email", "Role", "Created"],
        widths: &[
          Constraint::Length(6),
          Constraint::Length(16),
          Constraint::Min(16),
          Constraint::Min(20),
          Constraint::Length(8),
          Constraint::Length(17),
        ],
        rows,
        empty_text: "No users.",
      },
    );
    render_flash(frame, status, self.flash.as_ref(), "n new  d delete  / filter  r reload");

    self.filter.render_overlay(frame, main);
    self.confirm.render_overlay(frame, main);
  }

  fn breadcrumb_label(&self) -> String {
    "Users".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("n", "new").with_priority(10),
      ShortcutInfo::new("e", "edit").with_priority(15),
      ShortcutInfo::new("d", "delete").with_priority(20),
      ShortcutInfo::new("/", "filter").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

use tracing::info;

use crate::error::AppError;
use crate::state::backend::Backend;
use crate::state::data::{ProjectDraft, ProjectRecord, RecordId};
use crate::state::edit::ProjectPatch;
use crate::state::library::{LoadReport, RecordStore};
use crate::state::seed::SeedSource;
use crate::state::session::{Authenticator, Credentials, Permission, Session};
use crate::state::subscription::Subscription;
use crate::ui::projection::{project, Filter, Projection};
use crate::ui::surface::Surface;

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Login form submitted
    Login(Credentials),
    /// Logout button
    Logout,
    /// The authenticator reported the session gone
    SessionExpired,
    /// Filter button clicked
    SetFilter(Filter),
    /// Project form submitted: create without an id, full update with one
    Submit {
        id: Option<RecordId>,
        draft: ProjectDraft,
    },
    /// Replace some fields of a project
    Edit { id: RecordId, patch: ProjectPatch },
    /// Delete button on a project
    Delete(RecordId),
    /// "Delete all" button
    ClearAll,
    /// The backend pushed a new snapshot of the collection
    StoreChanged(Vec<ProjectRecord>),
    /// Re-read the backend
    Refresh,
}

/// What a successful message did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    LoggedIn,
    LoggedOut,
    FilterChanged,
    Created(ProjectRecord),
    /// `None` when the id was unknown
    Updated(Option<ProjectRecord>),
    /// `false` when the id was unknown
    Deleted(bool),
    Cleared,
    Synced,
}

/// Snapshot of the state that drives the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub permission: Permission,
    pub filter: Filter,
}

/// The application: record store, admin session, current filter and
/// the surface every new projection is rendered to.
pub struct App<B: Backend, A: Authenticator, S: Surface> {
    store: RecordStore<B>,
    session: Session<A>,
    filter: Filter,
    surface: S,
}

impl<B: Backend, A: Authenticator, S: Surface> App<B, A, S> {
    pub fn new(store: RecordStore<B>, session: Session<A>, surface: S) -> Self {
        Self {
            store,
            session,
            filter: Filter::All,
            surface,
        }
    }

    /// Load the collection (seeding an empty backend) and draw the first view
    pub fn start(&mut self, seed: &dyn SeedSource) -> LoadReport {
        let report = self.store.load(seed);
        info!(
            "🎨 Folio ready with {} projects ({:?})",
            self.store.len(),
            self.session.permission()
        );
        self.render();
        report
    }

    pub fn state(&self) -> AppState {
        AppState {
            permission: self.session.permission(),
            filter: self.filter.clone(),
        }
    }

    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<B> {
        &mut self.store
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Current view, computed from scratch
    pub fn projection(&self) -> Projection<'_> {
        project(self.store.list(), &self.filter, self.session.permission())
    }

    /// Watch the collection; see [`RecordStore::subscribe`]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[ProjectRecord]) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    /// Redraw the surface from the current state
    pub fn render(&mut self) {
        let projection = project(self.store.list(), &self.filter, self.session.permission());
        self.surface.render(&projection);
    }

    /// Handle a message, then re-project on success.
    ///
    /// Mutations while logged out are rejected with `PermissionDenied`
    /// before the store is touched.
    pub fn update(&mut self, message: Message) -> Result<Outcome, AppError> {
        let outcome = self.apply(message)?;
        self.render();
        Ok(outcome)
    }

    fn apply(&mut self, message: Message) -> Result<Outcome, AppError> {
        match message {
            Message::Login(credentials) => {
                self.session.login(&credentials)?;
                Ok(Outcome::LoggedIn)
            }
            Message::Logout => {
                self.session.logout();
                Ok(Outcome::LoggedOut)
            }
            Message::SessionExpired => {
                self.session.expire();
                Ok(Outcome::LoggedOut)
            }
            Message::SetFilter(filter) => {
                self.filter = filter;
                Ok(Outcome::FilterChanged)
            }
            Message::Submit { id: None, draft } => {
                self.session.require_admin()?;
                Ok(Outcome::Created(self.store.create(draft)?))
            }
            Message::Submit { id: Some(id), draft } => {
                self.session.require_admin()?;
                Ok(Outcome::Updated(self.store.update(&id, draft.into())?))
            }
            Message::Edit { id, patch } => {
                self.session.require_admin()?;
                Ok(Outcome::Updated(self.store.update(&id, patch)?))
            }
            Message::Delete(id) => {
                self.session.require_admin()?;
                Ok(Outcome::Deleted(self.store.delete(&id)?))
            }
            Message::ClearAll => {
                self.session.require_admin()?;
                self.store.clear_all()?;
                Ok(Outcome::Cleared)
            }
            Message::StoreChanged(records) => {
                self.store.replace(records);
                Ok(Outcome::Synced)
            }
            Message::Refresh => {
                self.store.refresh()?;
                Ok(Outcome::Synced)
            }
        }
    }
}

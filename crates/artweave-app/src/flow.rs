// Navigation flow: the explicit orchestrator behind the set -> paintings ->
// result walk. Holds the API client and borrows the session context, so all
// per-session state lives in one place that tests can build directly.

use artweave_client::{ApiClient, ApiError};
use artweave_core::images::resolve_image_url;
use artweave_core::model::{CompareResponse, Painting, SetSummary};
use artweave_core::session::{paintings_key, Session, Toggle, SETS_KEY};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// The steps of the flow, one per page of the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Tutorial,
    Sets,
    Paintings,
    Result,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Tutorial => "/tutorial",
            Route::Sets => "/sets",
            Route::Paintings => "/paintings",
            Route::Result => "/result",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        [
            Route::Landing,
            Route::Tutorial,
            Route::Sets,
            Route::Paintings,
            Route::Result,
        ]
        .into_iter()
        .find(|r| r.path() == path)
    }

    /// Where the back control leads. The landing page has none.
    pub fn back(self) -> Option<Route> {
        match self {
            Route::Landing => None,
            Route::Tutorial => Some(Route::Landing),
            Route::Sets => Some(Route::Tutorial),
            Route::Paintings => Some(Route::Sets),
            Route::Result => Some(Route::Paintings),
        }
    }
}

/// Either the data a step needs, or the step the user must go to instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ready(T),
    Redirect(Route),
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

pub struct Flow<'s> {
    client: ApiClient,
    session: &'s mut Session,
    route: Route,
}

impl<'s> Flow<'s> {
    pub fn new(client: ApiClient, session: &'s mut Session) -> Self {
        Self {
            client,
            session,
            route: Route::Landing,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &*self.session
    }

    pub fn navigate(&mut self, route: Route) {
        debug!(from = self.route.path(), to = route.path(), "navigate");
        self.route = route;
    }

    /// Follow the current route's back link. Stays put on the landing page.
    pub fn back(&mut self) -> Route {
        if let Some(prev) = self.route.back() {
            self.navigate(prev);
        }
        self.route
    }

    /// The set list, fetched at most once per session.
    pub async fn load_sets(&mut self) -> Result<Vec<SetSummary>, ApiError> {
        let client = &self.client;
        self.session
            .store_mut()
            .get_or_populate(SETS_KEY, || client.list_sets())
            .await
    }

    /// Remember `set_id` as the active set and start a fresh painting
    /// selection.
    pub fn choose_set(&mut self, set_id: &str) -> Route {
        info!(set_id, "set chosen");
        self.session.set_selected_set(set_id);
        self.session.clear_selection();
        self.navigate(Route::Paintings);
        self.route
    }

    /// Paintings of the active set, fetched at most once per set per session.
    /// Without an active set the user is sent back to set selection.
    pub async fn load_paintings(&mut self) -> Result<Outcome<Vec<Painting>>, ApiError> {
        let Some(set_id) = self.session.selected_set() else {
            self.navigate(Route::Sets);
            return Ok(Outcome::Redirect(Route::Sets));
        };
        let client = &self.client;
        let paintings = self
            .session
            .store_mut()
            .get_or_populate(&paintings_key(&set_id), || client.list_paintings(&set_id))
            .await?;
        Ok(Outcome::Ready(paintings))
    }

    /// Toggle `painting_id` in the selection and persist the result.
    pub fn toggle_painting(&mut self, painting_id: &str) -> Result<Toggle, ApiError> {
        let mut selection = self.session.selection();
        let toggle = selection.toggle(painting_id);
        if toggle != Toggle::Full {
            self.session.set_selection(&selection)?;
        }
        debug!(painting_id, ?toggle, selected = selection.len(), "selection toggled");
        Ok(toggle)
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    /// Request a comparison of the two selected paintings.
    ///
    /// Unless exactly two distinct paintings are selected, no request is made
    /// and the user is sent back to set selection. Errors are returned to the
    /// caller, which decides whether to offer a retry.
    pub async fn compare(&mut self) -> Result<Outcome<CompareResponse>, ApiError> {
        let selection = self.session.selection();
        let Some((a, b)) = selection.pair() else {
            info!(selected = selection.len(), "comparison needs two paintings; redirecting");
            self.navigate(Route::Sets);
            return Ok(Outcome::Redirect(Route::Sets));
        };
        self.navigate(Route::Result);
        let result = self.client.compare(a, b).await?;
        Ok(Outcome::Ready(result))
    }

    /// Absolute image URL for `painting`, resolved against the API base.
    pub fn image_url(&self, painting: &Painting) -> Option<String> {
        resolve_image_url(painting.image_url.as_deref(), self.client.base_url())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

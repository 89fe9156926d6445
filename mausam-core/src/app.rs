//! Application state and the actions that drive it.
//!
//! [`WeatherApp`] owns one [`AppState`] and publishes every change through a
//! [`tokio::sync::watch`] channel. Front-ends call the action methods and
//! render whatever arrives on [`WeatherApp::subscribe`].

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::{
    Config, ResponseOrdering,
    geocode::{Geocoder, geocoder_from_config},
    location::{LocationError, LocationSource},
    model::{Coordinate, PlaceCandidate, WeatherSnapshot},
    provider::{WeatherProvider, provider_from_config},
    snapshot::fetch_snapshot,
};

/// Search text shorter than this never triggers a suggestion lookup.
pub const SUGGESTION_MIN_CHARS: usize = 3;
pub const SUGGESTION_LIMIT: u8 = 5;
pub const NOT_FOUND: &str = "Location Not Found";

const INITIAL_LOCATION: &str = "Fetching Location...";
const LOADING: &str = "Loading...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Locating,
    FetchingWeather,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub phase: Phase,
    /// Place label shown above the snapshot.
    pub location: String,
    pub snapshot: WeatherSnapshot,
    pub search_query: String,
    pub suggestions: Vec<PlaceCandidate>,
    /// Dismissible error banner.
    pub error: Option<String>,
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            location: INITIAL_LOCATION.to_string(),
            snapshot: WeatherSnapshot::placeholder(LOADING),
            search_query: String::new(),
            suggestions: Vec::new(),
            error: None,
            loading: false,
        }
    }
}

#[derive(Debug)]
struct Shared {
    provider: Arc<dyn WeatherProvider>,
    geocoder: Arc<dyn Geocoder>,
    location: Arc<dyn LocationSource>,
    ordering: ResponseOrdering,
    state: watch::Sender<AppState>,
    fetches: AtomicU64,
    lookups: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct WeatherApp {
    shared: Arc<Shared>,
}

impl WeatherApp {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        geocoder: Arc<dyn Geocoder>,
        location: Arc<dyn LocationSource>,
        ordering: ResponseOrdering,
    ) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            shared: Arc::new(Shared {
                provider,
                geocoder,
                location,
                ordering,
                state,
                fetches: AtomicU64::new(0),
                lookups: AtomicU64::new(0),
            }),
        }
    }

    /// OpenWeather-backed app using `location` as the device location.
    pub fn from_config(config: &Config, location: Arc<dyn LocationSource>) -> anyhow::Result<Self> {
        Ok(Self::new(
            provider_from_config(config)?,
            geocoder_from_config(config)?,
            location,
            config.ordering,
        ))
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> AppState {
        self.shared.state.borrow().clone()
    }

    /// Outcome of the location permission prompt.
    #[instrument(skip(self))]
    pub async fn permission_result(&self, granted: bool) {
        if granted {
            self.refresh().await;
        } else {
            info!("location permission denied");
            let label = LocationError::PermissionDenied.location_label();
            self.shared.state.send_modify(|s| s.location = label.to_string());
        }
    }

    /// Locate the device, then fetch weather for it.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        let ticket = self.begin_fetch(Phase::Locating);

        let at = match self.shared.location.current_location().await {
            Ok(at) => at,
            Err(e) => {
                warn!("location lookup failed: {e}");
                self.commit(&self.shared.fetches, ticket, |s| {
                    s.location = e.location_label().to_string();
                    s.snapshot = WeatherSnapshot::placeholder(e.condition_label());
                    s.phase = Phase::Failed(e.to_string());
                    s.loading = false;
                });
                return;
            }
        };

        let label = self.shared.geocoder.reverse_geocode(at).await;
        let current = self.commit(&self.shared.fetches, ticket, |s| {
            s.location = label;
            s.phase = Phase::FetchingWeather;
        });
        if current {
            self.fetch_weather(ticket, at).await;
        }
    }

    /// Submit the current search text.
    pub async fn submit_search(&self) {
        let query = self.state().search_query;
        self.search(query).await;
    }

    /// Geocode `query` and fetch weather for the first match.
    #[instrument(skip(self))]
    pub async fn search(&self, query: String) {
        let ticket = self.begin_fetch(Phase::FetchingWeather);

        let candidates = if query.trim().is_empty() {
            Vec::new()
        } else {
            self.shared.geocoder.search_places(&query, 1).await
        };

        let Some(place) = candidates.into_iter().next() else {
            info!("no place matches {:?}", query);
            self.commit(&self.shared.fetches, ticket, |s| {
                s.phase = Phase::Failed(NOT_FOUND.to_string());
                s.error = Some(NOT_FOUND.to_string());
                s.loading = false;
            });
            return;
        };

        let label = place.label();
        let current = self.commit(&self.shared.fetches, ticket, |s| {
            self.shared.lookups.fetch_add(1, Ordering::SeqCst);
            s.location = label;
            s.suggestions.clear();
            s.search_query.clear();
        });
        if current {
            self.fetch_weather(ticket, place.coordinate).await;
        }
    }

    /// Store new search text and refresh the suggestion list for it.
    pub async fn set_search_query(&self, text: impl Into<String>) {
        let text = text.into();
        let ticket = self.shared.lookups.fetch_add(1, Ordering::SeqCst) + 1;
        let lookup = text.chars().count() >= SUGGESTION_MIN_CHARS;

        self.shared.state.send_modify(|s| {
            s.search_query = text.clone();
            if !lookup {
                s.suggestions.clear();
            }
        });
        if !lookup {
            return;
        }

        let suggestions = self.shared.geocoder.search_places(&text, SUGGESTION_LIMIT).await;
        debug!(count = suggestions.len(), "suggestions for {:?}", text);
        self.commit(&self.shared.lookups, ticket, |s| s.suggestions = suggestions);
    }

    /// Copy a suggestion into the search text. Returns false for an index
    /// past the end of the list.
    pub async fn select_suggestion(&self, index: usize) -> bool {
        let Some(label) = self.state().suggestions.get(index).map(PlaceCandidate::label) else {
            return false;
        };
        self.set_search_query(label).await;
        true
    }

    pub fn dismiss_error(&self) {
        self.shared.state.send_if_modified(|s| s.error.take().is_some());
    }

    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let app = self.clone();
        tokio::spawn(async move { app.refresh().await })
    }

    pub fn spawn_search(&self, query: impl Into<String>) -> JoinHandle<()> {
        let app = self.clone();
        let query = query.into();
        tokio::spawn(async move { app.search(query).await })
    }

    /// Run [`Self::set_search_query`] in the background, one task per keystroke.
    pub fn spawn_set_search_query(&self, text: impl Into<String>) -> JoinHandle<()> {
        let app = self.clone();
        let text = text.into();
        tokio::spawn(async move { app.set_search_query(text).await })
    }

    async fn fetch_weather(&self, ticket: u64, at: Coordinate) {
        info!(%at, "fetching weather");
        let result = fetch_snapshot(self.shared.provider.as_ref(), at).await;

        if let Err(e) = &result {
            warn!("weather fetch for {} failed: {:#}", at, e);
        }

        self.commit(&self.shared.fetches, ticket, |s| {
            match result {
                Ok(snapshot) => {
                    s.snapshot = snapshot;
                    s.phase = Phase::Ready;
                }
                Err(e) => {
                    s.snapshot = WeatherSnapshot::placeholder(format!("Error: {e}"));
                    s.phase = Phase::Failed(e.to_string());
                }
            }
            s.loading = false;
        });
    }

    fn begin_fetch(&self, phase: Phase) -> u64 {
        let mut ticket = 0;
        self.shared.state.send_modify(|s| {
            ticket = self.shared.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            s.phase = phase;
            s.loading = true;
            s.error = None;
        });
        ticket
    }

    /// Apply `update` unless `ticket` has been superseded on `counter` and
    /// stale responses are being dropped. Returns whether it was applied.
    fn commit(&self, counter: &AtomicU64, ticket: u64, update: impl FnOnce(&mut AppState)) -> bool {
        let ordering = self.shared.ordering;
        self.shared.state.send_if_modified(|s| {
            if ordering == ResponseOrdering::LatestRequestWins
                && counter.load(Ordering::SeqCst) != ticket
            {
                debug!(ticket, "discarding stale response");
                return false;
            }
            update(s);
            true
        })
    }
}

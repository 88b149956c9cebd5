//! Polling coordinator for the easyjob timecard client.
//!
//! Runs one fetch cycle per fixed interval and exposes a consistent
//! cached view to all consumers. The cycle merges a required fetch (the
//! time-card details) with a best-effort fetch (the calendar items):
//! details failure fails the cycle, calendar failure only marks the
//! calendar cache as stale.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

use ejt_client::{Client, ClientError};
use ejt_core::{CalendarItem, TimecardSnapshot};

/// Default polling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default calendar lookahead window in days.
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 30;

/// A poll cycle failed because the details fetch failed.
///
/// Calendar-only failures never produce this error; they are recorded in
/// [`PollState::calendar_last_error`] instead.
#[derive(Debug, Error)]
#[error("update failed: {0}")]
pub struct UpdateFailed(#[from] pub ClientError);

/// Cached view produced by the last poll cycles.
///
/// The snapshot and the calendar list are replaced together under one
/// write lock, so no reader ever observes a half-updated pair.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Last successfully fetched time-card snapshot.
    pub snapshot: Option<TimecardSnapshot>,
    /// Full, unfiltered calendar list. Any denylist filtering is a
    /// presentation concern applied downstream; this cache is raw truth.
    pub calendar_items: Vec<CalendarItem>,
    /// Whether the most recent cycle succeeded.
    pub last_update_success: bool,
    /// When the calendar cache was last replaced.
    pub calendar_last_updated: Option<DateTime<Utc>>,
    /// Message of the last calendar sub-fetch failure, cleared on the
    /// next calendar success. Lets consumers report staleness without
    /// failing availability checks.
    pub calendar_last_error: Option<String>,
}

/// Periodic refresh driver around a [`Client`].
pub struct Coordinator {
    client: Arc<Client>,
    interval: Duration,
    lookahead_days: i64,
    state: RwLock<PollState>,
}

impl Coordinator {
    /// Creates a coordinator with the default interval and lookahead.
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            interval: DEFAULT_INTERVAL,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            state: RwLock::new(PollState::default()),
        }
    }

    /// Sets the polling interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the calendar lookahead window in days.
    #[must_use]
    pub const fn with_lookahead_days(mut self, days: i64) -> Self {
        self.lookahead_days = days;
        self
    }

    /// Runs one update cycle.
    ///
    /// The details and calendar fetches run concurrently; neither
    /// cancels the other. A details failure fails the cycle and the
    /// concurrent calendar result is discarded. A calendar-only failure
    /// keeps the previous calendar cache and records the error.
    pub async fn refresh(&self) -> Result<TimecardSnapshot, UpdateFailed> {
        let today = Local::now().date_naive();
        let end = today + TimeDelta::days(self.lookahead_days);

        // The cache holds the unfiltered list; Some(&[]) disables the
        // client's denylist.
        let (details, calendar) = tokio::join!(
            self.client.fetch_details(None),
            self.client.fetch_calendar(today, end, Some(&[])),
        );

        let mut state = self.state.write().await;

        let snapshot = match details {
            Ok(snapshot) => snapshot,
            Err(err) => {
                state.last_update_success = false;
                return Err(UpdateFailed::from(err));
            }
        };

        state.snapshot = Some(snapshot.clone());
        state.last_update_success = true;

        match calendar {
            Ok(items) => {
                state.calendar_items = items;
                state.calendar_last_updated = Some(Utc::now());
                state.calendar_last_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "calendar fetch failed, keeping previous items");
                state.calendar_last_error = Some(err.to_string());
            }
        }

        Ok(snapshot)
    }

    /// Polls forever at the configured interval, logging cycle outcomes.
    ///
    /// There is no retry inside a tick; the next tick is the retry.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.refresh().await {
                Ok(snapshot) => {
                    tracing::debug!(working = snapshot.is_working(), "poll cycle succeeded");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "poll cycle failed");
                }
            }
        }
    }

    /// Snapshot of the full cached state.
    pub async fn state(&self) -> PollState {
        self.state.read().await.clone()
    }

    /// Last successfully fetched time-card snapshot.
    pub async fn snapshot(&self) -> Option<TimecardSnapshot> {
        self.state.read().await.snapshot.clone()
    }

    /// Cached, unfiltered calendar items.
    pub async fn calendar_items(&self) -> Vec<CalendarItem> {
        self.state.read().await.calendar_items.clone()
    }

    /// Whether the most recent cycle succeeded.
    pub async fn last_update_success(&self) -> bool {
        self.state.read().await.last_update_success
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use ejt_client::Credentials;

    use super::*;

    fn coordinator_for(server: &MockServer) -> Coordinator {
        let client = Client::new(&Credentials {
            base_url: server.uri(),
            username: "worker".to_string(),
            password: "hunter2".to_string(),
            verify_ssl: true,
        })
        .unwrap();
        Coordinator::new(Arc::new(client))
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-1",
                "expires_in": 600,
            })))
            .mount(server)
            .await;
    }

    fn details_body(minutes: i64) -> serde_json::Value {
        json!({
            "Date": "2025-03-14",
            "WorkMinutes": minutes,
            "CurrentWorkTime": "07:30",
        })
    }

    #[tokio::test]
    async fn successful_cycle_replaces_snapshot_and_calendar_together() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/api.json/Timecard/Details"))
            .respond_with(ResponseTemplate::new(200).set_body_json(details_body(120)))
            .mount(&server)
            .await;
        // IdT 3 is on the default denylist; the cache must still hold it.
        Mock::given(method("GET"))
            .and(path("/api.json/dashboard/calendar/"))
            .and(query_param("days", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"Id": 1, "IdT": 3, "Caption": "Blocked"},
                {"Id": 2, "IdT": 5, "Caption": "Gig"},
            ])))
            .mount(&server)
            .await;

        let coordinator = coordinator_for(&server);
        let snapshot = coordinator.refresh().await.unwrap();
        assert_eq!(snapshot.work_minutes, Some(120));

        let state = coordinator.state().await;
        assert!(state.last_update_success);
        assert_eq!(state.snapshot.unwrap().work_minutes, Some(120));
        assert_eq!(state.calendar_items.len(), 2);
        assert_eq!(state.calendar_items[0].type_id, Some(3));
        assert!(state.calendar_last_updated.is_some());
        assert_eq!(state.calendar_last_error, None);
    }

    #[tokio::test]
    async fn calendar_failure_is_not_fatal_and_keeps_previous_items() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/api.json/Timecard/Details"))
            .respond_with(ResponseTemplate::new(200).set_body_json(details_body(120)))
            .mount(&server)
            .await;

        let calendar_calls = AtomicUsize::new(0);
        Mock::given(method("GET"))
            .and(path("/api.json/dashboard/calendar/"))
            .respond_with(move |_req: &Request| {
                if calendar_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(200)
                        .set_body_json(json!([{"Id": 1, "IdT": 5, "Caption": "Gig"}]))
                } else {
                    ResponseTemplate::new(500).set_body_string("calendar offline")
                }
            })
            .mount(&server)
            .await;

        let coordinator = coordinator_for(&server);
        coordinator.refresh().await.unwrap();
        let first_updated = coordinator.state().await.calendar_last_updated;

        // Second cycle: details fine, calendar broken.
        coordinator.refresh().await.unwrap();

        let state = coordinator.state().await;
        assert!(state.last_update_success);
        assert_eq!(state.calendar_items.len(), 1);
        assert_eq!(state.calendar_items[0].id, Some(1));
        assert_eq!(state.calendar_last_updated, first_updated);
        let message = state.calendar_last_error.unwrap();
        assert!(message.contains("calendar offline"), "got: {message}");
    }

    #[tokio::test]
    async fn details_failure_fails_the_cycle_and_discards_calendar_result() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        let details_calls = AtomicUsize::new(0);
        Mock::given(method("GET"))
            .and(path("/api.json/Timecard/Details"))
            .respond_with(move |_req: &Request| {
                if details_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(200).set_body_json(details_body(120))
                } else {
                    ResponseTemplate::new(500).set_body_string("details offline")
                }
            })
            .mount(&server)
            .await;

        let calendar_calls = AtomicUsize::new(0);
        Mock::given(method("GET"))
            .and(path("/api.json/dashboard/calendar/"))
            .respond_with(move |_req: &Request| {
                if calendar_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(200)
                        .set_body_json(json!([{"Id": 1, "IdT": 5, "Caption": "Gig"}]))
                } else {
                    // This cycle's calendar result must be discarded.
                    ResponseTemplate::new(200)
                        .set_body_json(json!([{"Id": 99, "IdT": 7, "Caption": "Other"}]))
                }
            })
            .mount(&server)
            .await;

        let coordinator = coordinator_for(&server);
        coordinator.refresh().await.unwrap();

        let err = coordinator.refresh().await.unwrap_err();
        assert!(err.to_string().contains("details offline"), "got: {err}");

        let state = coordinator.state().await;
        assert!(!state.last_update_success);
        // Previous snapshot and calendar cache survive the failed cycle.
        assert_eq!(state.snapshot.unwrap().work_minutes, Some(120));
        assert_eq!(state.calendar_items.len(), 1);
        assert_eq!(state.calendar_items[0].id, Some(1));
        assert_eq!(state.calendar_last_error, None);
    }

    #[tokio::test]
    async fn first_cycle_failure_leaves_empty_state() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/api.json/Timecard/Details"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api.json/dashboard/calendar/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let coordinator = coordinator_for(&server);
        assert!(coordinator.refresh().await.is_err());

        let state = coordinator.state().await;
        assert!(!state.last_update_success);
        assert!(state.snapshot.is_none());
        assert!(state.calendar_items.is_empty());
    }

    #[tokio::test]
    async fn lookahead_is_configurable() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/api.json/Timecard/Details"))
            .respond_with(ResponseTemplate::new(200).set_body_json(details_body(0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api.json/dashboard/calendar/"))
            .and(query_param("days", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = coordinator_for(&server).with_lookahead_days(7);
        coordinator.refresh().await.unwrap();
    }
}

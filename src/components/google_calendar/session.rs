use super::auth;
use super::models::{CalendarEvent, EventsPage};
use super::token::{StoredToken, TokenManager};
use super::CalendarSource;
use crate::components::storage::KeyValueStore;
use crate::config::Config;
use crate::error::{google_calendar_error, AuthError, JobResult};
use crate::utils::time::DayRange;
use async_trait::async_trait;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Signed-in state plus the calendar list query.
///
/// One session is created per process and passed by reference to whatever needs
/// calendar access.
pub struct CalendarSession {
    config: Arc<Config>,
    client: Client,
    tokens: TokenManager,
    token: Option<StoredToken>,
}

impl CalendarSession {
    pub fn new(config: Arc<Config>, storage: Arc<dyn KeyValueStore>) -> Self {
        let client = Client::new();
        Self {
            tokens: TokenManager::new(Arc::clone(&config), storage, client.clone()),
            config,
            client,
            token: None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// Pick up a stored token, refreshing it if needed. Returns whether we are signed in.
    pub async fn restore(&mut self) -> JobResult<bool> {
        self.token = self.tokens.get_token().await?;
        debug!(signed_in = self.token.is_some(), "Session restored");
        Ok(self.is_signed_in())
    }

    /// Run the browser consent flow and store the resulting token
    pub async fn sign_in(&mut self) -> JobResult<()> {
        let code = auth::request_authorization_code(&self.config).await?;
        let token = self.tokens.exchange_code(&code).await?;
        self.token = Some(token);
        info!("Signed in to Google Calendar");
        Ok(())
    }

    /// Restore a stored token or, failing that, sign in interactively
    pub async fn ensure_signed_in(&mut self) -> JobResult<()> {
        if self.restore().await? {
            return Ok(());
        }
        self.sign_in().await
    }

    /// Revoke and forget the token. Does nothing when no token is held or stored.
    pub async fn sign_out(&mut self) -> JobResult<()> {
        let token = match self.token.take() {
            Some(token) => token,
            None => match self.tokens.stored_token().await? {
                Some(token) => token,
                None => return Ok(()),
            },
        };
        self.tokens.revoke(&token).await;
        self.tokens.clear_token().await?;
        info!("Signed out");
        Ok(())
    }

    fn events_url(&self, range: &DayRange, page_token: Option<&str>) -> JobResult<Url> {
        let mut url = Url::parse(CALENDAR_API_BASE)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API base cannot take a path"))?
            .push(&self.config.google_calendar_id)
            .push("events");

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("timeMin", &range.time_min())
                .append_pair("timeMax", &range.time_max())
                .append_pair("singleEvents", "true")
                .append_pair("orderBy", "startTime");
            if let Some(page_token) = page_token {
                query.append_pair("pageToken", page_token);
            }
        }

        Ok(url)
    }

    async fn fetch_page(
        &self,
        access_token: &str,
        range: &DayRange,
        page_token: Option<&str>,
    ) -> JobResult<EventsPage> {
        let url = self.events_url(range, page_token)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json::<EventsPage>()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))
    }
}

/// Fetch pages until `nextPageToken` runs out, keeping events in page order.
/// An empty token ends the listing.
async fn collect_pages<F, Fut>(mut fetch: F) -> JobResult<Vec<CalendarEvent>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = JobResult<EventsPage>>,
{
    let mut events = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = fetch(page_token.take()).await?;
        events.extend(page.items);
        match page.next_page_token {
            Some(next) if !next.is_empty() => page_token = Some(next),
            _ => break,
        }
    }
    Ok(events)
}

#[async_trait]
impl CalendarSource for CalendarSession {
    /// All events in `range`, in start-time order, across every result page
    async fn list_events(&self, range: &DayRange) -> JobResult<Vec<CalendarEvent>> {
        let token = self.token.as_ref().ok_or(AuthError::NotSignedIn)?;
        let access_token = token.access_token.as_str();

        let events = collect_pages(move |page_token| async move {
            self.fetch_page(access_token, range, page_token.as_deref()).await
        })
        .await?;

        debug!(count = events.len(), "Fetched calendar events");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::EventTime;
    use crate::components::storage::{keys, MemoryStore};
    use chrono::{NaiveDate, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn session(calendar_id: &str) -> CalendarSession {
        let config = Config {
            google_calendar_id: calendar_id.to_string(),
            ..Default::default()
        };
        CalendarSession::new(Arc::new(config), Arc::new(MemoryStore::new()))
    }

    /// Session whose token and revoke requests go to a closed local port
    fn offline_session(storage: Arc<MemoryStore>) -> CalendarSession {
        let config = Arc::new(Config {
            google_client_id: "client".to_string(),
            google_client_secret: "secret".to_string(),
            ..Default::default()
        });
        let client = Client::new();
        let tokens = TokenManager::new(Arc::clone(&config), storage, client.clone())
            .with_endpoints("http://127.0.0.1:1/token", "http://127.0.0.1:1/revoke");
        CalendarSession {
            config,
            client,
            tokens,
            token: None,
        }
    }

    fn event(id: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            start: EventTime::at("2024-05-01T09:00:00Z"),
            end: EventTime::at("2024-05-01T10:00:00Z"),
            ..Default::default()
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> EventsPage {
        EventsPage {
            items: ids.iter().map(|id| event(id)).collect(),
            next_page_token: next.map(str::to_string),
        }
    }

    /// Serves `pages` in order and records the page token of each request
    async fn collect_from(pages: Vec<EventsPage>) -> (Vec<String>, Vec<Option<String>>) {
        let pages = Mutex::new(VecDeque::from(pages));
        let requested = Mutex::new(Vec::new());
        let events = collect_pages(|page_token| {
            requested.lock().unwrap().push(page_token);
            let page = pages.lock().unwrap().pop_front();
            async move { page.ok_or_else(|| google_calendar_error("no more pages")) }
        })
        .await
        .unwrap();
        let ids = events.into_iter().map(|e| e.id).collect();
        (ids, requested.into_inner().unwrap())
    }

    fn range() -> DayRange {
        DayRange::for_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), chrono_tz::UTC).unwrap()
    }

    #[test]
    fn test_events_url_query() {
        let url = session("primary").events_url(&range(), None).unwrap();
        assert_eq!(url.path(), "/calendar/v3/calendars/primary/events");
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            query,
            vec![
                ("timeMin".to_string(), "2024-05-01T00:00:00+00:00".to_string()),
                ("timeMax".to_string(), "2024-05-01T23:59:59+00:00".to_string()),
                ("singleEvents".to_string(), "true".to_string()),
                ("orderBy".to_string(), "startTime".to_string()),
            ]
        );
    }

    #[test]
    fn test_events_url_escapes_calendar_id_and_pages() {
        let url = session("team#holiday@group.calendar.google.com")
            .events_url(&range(), Some("next"))
            .unwrap();
        assert!(url.path().contains("team%23holiday@group.calendar.google.com"));
        assert!(url.query_pairs().any(|(k, v)| k == "pageToken" && v == "next"));
    }

    #[tokio::test]
    async fn test_list_requires_sign_in() {
        let session = session("primary");
        let err = session.list_events(&range()).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Auth(AuthError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_sign_out_when_signed_out_is_noop() {
        let mut session = session("primary");
        session.sign_out().await.unwrap();
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn test_pages_are_joined_in_order() {
        let (ids, requested) = collect_from(vec![
            page(&["a", "b"], Some("p2")),
            page(&["c"], None),
        ])
        .await;
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(requested, vec![None, Some("p2".to_string())]);
    }

    #[tokio::test]
    async fn test_empty_page_token_ends_listing() {
        let (ids, requested) = collect_from(vec![
            page(&["a"], Some("")),
            page(&["never"], None),
        ])
        .await;
        assert_eq!(ids, vec!["a"]);
        assert_eq!(requested.len(), 1);
    }

    #[tokio::test]
    async fn test_page_error_is_returned() {
        let result =
            collect_pages(|_| async { Err::<EventsPage, _>(google_calendar_error("HTTP 500")) })
                .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_sign_out_clears_token_when_revoke_fails() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = offline_session(storage.clone());
        session
            .tokens
            .set_token(&StoredToken {
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
                expires_at: Utc::now().timestamp() + 3600,
            })
            .await
            .unwrap();
        assert!(session.restore().await.unwrap());

        session.sign_out().await.unwrap();

        assert!(!session.is_signed_in());
        assert_eq!(storage.get(keys::GOOGLE_CALENDAR_TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_after_failed_refresh_is_signed_out() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = offline_session(storage.clone());
        session
            .tokens
            .set_token(&StoredToken {
                access_token: "access".to_string(),
                refresh_token: Some("revoked".to_string()),
                expires_at: 0,
            })
            .await
            .unwrap();

        assert!(!session.restore().await.unwrap());
        assert!(!session.is_signed_in());
        assert_eq!(storage.get(keys::GOOGLE_CALENDAR_TOKEN).await.unwrap(), None);
    }
}

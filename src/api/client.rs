use crate::api::following_page;
use crate::api::models::*;
use crate::api::response::{decode_response, ApiError, Outcome};
use crate::api::{Reply, Request};
use crate::app::event::AppEvent;
use crate::config::model::ServerConfig;
use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::REFERER;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

const CALENDAR_EVENTS: &str = "calendar/events/";
const LIST_JSON: &str = "list/json/";
const MOBILE_LOGIN: &str = "mobile/login/";
const MOBILE_LOGOUT: &str = "mobile/logout/";
const MOBILE_RIGHT_NOW: &str = "mobile/rightnow.json";
const MOBILE_LEFT: &str = "mobile/left.json";
const MOBILE_TAKEN: &str = "mobile/taken.json";
const MOBILE_SETTINGS: &str = "mobile/settings.json";
const MOBILE_SAVE_SETTINGS: &str = "mobile/settings/";
const MOBILE_NOTIFY: &str = "mobile/notify/";
const MOBILE_HOURS: &str = "mobile/hours.json";
const MOBILE_SAVE_HOURS: &str = "mobile/hours/";
const FOLLOWING: &str = "following/";
const FOLLOWING_SAVE: &str = "following/save/";
const AUTOCOMPLETE_USERS: &str = "autocomplete/users/knownonly/";

const CSRF_FIELD: &str = "csrfmiddlewaretoken";
const CSRF_COOKIE: &str = "csrftoken";

/// Form action and token scraped from the following page.
#[derive(Debug, Clone, Default)]
struct FollowingForm {
    action: Option<String>,
    csrf_token: Option<String>,
}

/// HTTP client for the PTO server.
///
/// Requests are spawned onto the runtime and report back through the app
/// event channel, so the UI loop never waits on the network. The session
/// lives in the cookie jar for the lifetime of the process.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    following: Arc<Mutex<FollowingForm>>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ApiClient {
    pub fn new(config: &ServerConfig, event_tx: mpsc::UnboundedSender<AppEvent>) -> Result<Self> {
        let mut base_url = config.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)
            .with_context(|| format!("Invalid server base_url {:?}", config.base_url))?;

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("ptoterm/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            jar,
            base,
            following: Arc::new(Mutex::new(FollowingForm::default())),
            event_tx,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Run `request` in the background; its [`Reply`] arrives as
    /// [`AppEvent::Api`].
    pub fn submit(&self, request: Request) {
        let client = self.clone();
        tokio::spawn(async move {
            let name = request.name();
            debug!(request = name, "sending");
            let reply = client.execute(request).await;
            if client.event_tx.send(AppEvent::Api(reply)).is_err() {
                debug!(request = name, "reply dropped, event loop gone");
            }
        });
    }

    async fn execute(&self, request: Request) -> Reply {
        match request {
            Request::CalendarEvents { start_ms, end_ms } => {
                let query = [("start", start_ms.to_string()), ("end", end_ms.to_string())];
                Reply::Calendar {
                    start_ms,
                    end_ms,
                    outcome: self.get_json(CALENDAR_EVENTS, &query).await,
                }
            }
            Request::ListEntries { query } => {
                let outcome = match self.url(LIST_JSON) {
                    Ok(mut url) => {
                        url.set_query(Some(query.as_str()));
                        self.fetch(self.http.get(url)).await
                    }
                    Err(e) => e.into(),
                };
                Reply::List { query, outcome }
            }
            Request::Session => Reply::Session(self.get_json(MOBILE_LOGIN, &[]).await),
            Request::Login { username, password } => {
                let form = [("username", username), ("password", password)];
                Reply::Login(self.post_form(MOBILE_LOGIN, &form).await)
            }
            Request::Logout => Reply::Logout(self.post_form(MOBILE_LOGOUT, &[]).await),
            Request::RightNow => Reply::RightNow(self.get_json(MOBILE_RIGHT_NOW, &[]).await),
            Request::Left => Reply::Left(self.get_json(MOBILE_LEFT, &[]).await),
            Request::Taken => Reply::Taken(self.get_json(MOBILE_TAKEN, &[]).await),
            Request::Settings => Reply::Settings(self.get_json(MOBILE_SETTINGS, &[]).await),
            Request::SaveSettings { start_date, country, city } => {
                let form = [("start_date", start_date), ("country", country), ("city", city)];
                Reply::SettingsSaved(self.post_form(MOBILE_SAVE_SETTINGS, &form).await)
            }
            Request::Notify { start, end, details } => {
                let form = [("start", start), ("end", end), ("details", details)];
                Reply::Notified(self.post_form(MOBILE_NOTIFY, &form).await)
            }
            Request::Hours { entry } => Reply::Hours {
                entry,
                outcome: self.get_json(MOBILE_HOURS, &[("entry", entry.to_string())]).await,
            },
            Request::SaveHours { entry, durations } => {
                let mut form: Vec<(&str, String)> = vec![("entry", entry.to_string())];
                form.extend(durations.iter().map(|(key, value)| (key.as_str(), value.to_string())));
                Reply::HoursSaved(self.post_form(MOBILE_SAVE_HOURS, &form).await)
            }
            Request::FollowingPage => Reply::FollowingPage(self.following_page().await),
            Request::Follow { search, restoring } => Reply::Followed {
                restoring,
                outcome: self.follow(&search).await,
            },
            Request::Unfollow { id } => Reply::Unfollowed {
                id,
                outcome: self.unfollow(id).await,
            },
            Request::Autocomplete { term } => {
                let outcome = self.get_json(AUTOCOMPLETE_USERS, &[("term", term.clone())]).await;
                Reply::Suggestions { term, outcome }
            }
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Outcome<T> {
        let outcome = match builder.send().await {
            Ok(response) => decode_response(response).await,
            Err(e) => e.into(),
        };
        if let Outcome::Failed(ref err) = outcome {
            warn!(error = %err, "request failed");
        }
        outcome
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Outcome<T> {
        match self.url(path) {
            Ok(url) => self.fetch(self.http.get(url).query(query)).await,
            Err(e) => e.into(),
        }
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(&str, String)]) -> Outcome<T> {
        match self.url(path) {
            Ok(url) => self.fetch(self.http.post(url).form(form)).await,
            Err(e) => e.into(),
        }
    }

    // --- following ---

    async fn following_page(&self) -> Outcome<FollowingPage> {
        let url = match self.url(FOLLOWING) {
            Ok(url) => url,
            Err(e) => return e.into(),
        };
        let response = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => return e.into(),
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return e.into(),
        };
        if !status.is_success() {
            return ApiError::Status { status, body: body.trim().to_string() }.into();
        }

        let page = following_page::parse(&body);
        if page.action.is_none() {
            // Redirected to a login page or similar.
            return ApiError::Page("following form not found, are you logged in?".into()).into();
        }
        if let Ok(mut form) = self.following.lock() {
            form.action = page.action.clone();
            form.csrf_token = page.csrf_token.clone();
        }
        debug!(
            observed = page.observed.len(),
            not_observed = page.not_observed.len(),
            "following page loaded"
        );
        Outcome::Ok(page)
    }

    fn following_form(&self) -> FollowingForm {
        self.following
            .lock()
            .map(|form| form.clone())
            .unwrap_or_default()
    }

    /// Action URL of the following form, falling back to the default route.
    fn following_action(&self) -> Result<Url, ApiError> {
        match self.following_form().action {
            Some(action) => Ok(self.base.join(action.trim_start_matches('/'))?),
            None => self.url(FOLLOWING_SAVE),
        }
    }

    fn csrf_token(&self) -> Option<String> {
        self.following_form()
            .csrf_token
            .or_else(|| csrf_from_cookies(self.jar.cookies(&self.base)?.to_str().ok()?))
    }

    async fn post_following<T: DeserializeOwned>(&self, url: Url, field: &'static str, value: String) -> Outcome<T> {
        if self.csrf_token().is_none() {
            if let Outcome::Failed(err) = self.following_page().await {
                return err.into();
            }
        }
        let mut form = vec![(field, value)];
        if let Some(token) = self.csrf_token() {
            form.push((CSRF_FIELD, token));
        }
        let builder = self
            .http
            .post(url)
            .header(REFERER, self.base.as_str())
            .form(&form);
        self.fetch(builder).await
    }

    async fn follow(&self, search: &str) -> Outcome<FollowReply> {
        match self.following_action() {
            Ok(url) => self.post_following(url, "search", search.to_string()).await,
            Err(e) => e.into(),
        }
    }

    async fn unfollow(&self, id: UserId) -> Outcome<UnfollowReply> {
        match self.following_action().and_then(|url| Ok(url.join("unfollow/")?)) {
            Ok(url) => self.post_following(url, "remove", id.to_string()).await,
            Err(e) => e.into(),
        }
    }
}

/// Pull the CSRF token out of a `Cookie` header value.
fn csrf_from_cookies(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = ServerConfig {
            base_url: base_url.to_string(),
            ..ServerConfig::default()
        };
        ApiClient::new(&config, tx).unwrap()
    }

    #[test]
    fn test_csrf_from_cookies() {
        assert_eq!(
            csrf_from_cookies("sessionid=abc; csrftoken=xyz").as_deref(),
            Some("xyz")
        );
        assert_eq!(csrf_from_cookies("sessionid=abc"), None);
    }

    #[test]
    fn test_base_url_keeps_prefix() {
        let api = client("https://pto.example.com/app");
        assert_eq!(api.base_url().as_str(), "https://pto.example.com/app/");
        assert_eq!(
            api.url(CALENDAR_EVENTS).unwrap().as_str(),
            "https://pto.example.com/app/calendar/events/"
        );
    }

    #[test]
    fn test_following_action_urls() {
        let api = client("https://pto.example.com/");
        assert_eq!(
            api.following_action().unwrap().as_str(),
            "https://pto.example.com/following/save/"
        );
        api.following.lock().unwrap().action = Some("/following/save/".into());
        let unfollow = api.following_action().unwrap().join("unfollow/").unwrap();
        assert_eq!(unfollow.as_str(), "https://pto.example.com/following/save/unfollow/");
    }
}

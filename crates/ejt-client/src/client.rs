//! The easyjob API client.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use reqwest::{Method, StatusCode, header};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use ejt_core::{
    CalendarItem, DEFAULT_FILTERED_IDT, DetailsPayload, ResourceStateType, TimecardSnapshot,
    apply_denylist, util::format_vendor_datetime,
};

use crate::error::ClientError;

/// Fixed timeout for every HTTP call, token endpoint included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Cached tokens are refreshed this many seconds before their expiry.
const TOKEN_SAFETY_BUFFER_SECS: i64 = 60;

/// Fallback token lifetime when the token response omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 600;

/// Vendor client-identification header, sent on every request.
const CLIENT_ID_HEADER: &str = "X-Ej-Client";
const CLIENT_ID: &str = concat!("ejt/", env!("CARGO_PKG_VERSION"));

/// Connection settings for one easyjob account.
///
/// Immutable for the lifetime of a [`Client`]; changing credentials means
/// building a new client.
#[derive(Clone)]
pub struct Credentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub verify_ssl: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Decoded response body: JSON when the content type says so, raw text
/// otherwise.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// The JSON body, or a request error for text responses.
    pub fn into_json(self) -> Result<Value, ClientError> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Text(_) => Err(ClientError::request("expected a JSON response body")),
        }
    }
}

/// Single point of contact with the easyjob HTTP API.
///
/// The bearer token and the resolved address id are cached in memory only
/// and mutated behind mutexes, so concurrent callers await one in-flight
/// refresh instead of issuing duplicate requests.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    token: Mutex<Option<CachedToken>>,
    id_address: Mutex<Option<i64>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the given account.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or username is empty, or if the
    /// HTTP client fails to build.
    pub fn new(credentials: &Credentials) -> Result<Self, ClientError> {
        if credentials.base_url.trim().is_empty() {
            return Err(ClientError::auth("base URL cannot be empty"));
        }
        if credentials.username.trim().is_empty() {
            return Err(ClientError::auth("username cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!credentials.verify_ssl)
            .build()
            .map_err(|err| ClientError::request(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            token: Mutex::new(None),
            id_address: Mutex::new(None),
        })
    }

    // -------- Token --------

    /// Returns a bearer token, reusing the cached one while it is at
    /// least 60 seconds away from expiry. `force` bypasses the cache.
    pub async fn get_token(&self, force: bool) -> Result<String, ClientError> {
        let mut cache = self.token.lock().await;

        if !force {
            if let Some(cached) = cache.as_ref() {
                let deadline = cached.expires_at - TimeDelta::seconds(TOKEN_SAFETY_BUFFER_SECS);
                if Utc::now() < deadline {
                    return Ok(cached.token.clone());
                }
            }
        }

        tracing::debug!(force, "requesting fresh access token");
        let refreshed = self.fetch_token().await?;
        let token = refreshed.token.clone();
        *cache = Some(refreshed);
        Ok(token)
    }

    /// POSTs the password grant to `/token`. Every failure on this path,
    /// including network faults, is an authentication error.
    async fn fetch_token(&self) -> Result<CachedToken, ClientError> {
        let url = format!("{}/token", self.base_url);
        let form = [
            ("grant_type", "password"),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .header(CLIENT_ID_HEADER, CLIENT_ID)
            .form(&form)
            .send()
            .await
            .map_err(|err| ClientError::auth(format!("token request failed: {err}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::auth(format!(
                "token login rejected (HTTP {status})"
            )));
        }
        if !status.is_success() {
            return Err(ClientError::auth(format!(
                "token endpoint returned HTTP {status}"
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|err| ClientError::auth(format!("invalid token response: {err}")))?;

        let token = payload
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::auth("no access_token in token response"))?;
        let expires_in = payload.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok(CachedToken {
            token,
            expires_at: Utc::now() + TimeDelta::seconds(expires_in),
        })
    }

    // -------- Request execution --------

    /// Issues one authenticated request; on 401 the token is
    /// force-refreshed and the request replayed exactly once.
    ///
    /// Prefer the typed endpoint methods; this is the escape hatch for
    /// endpoints they do not cover.
    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&Value>,
    ) -> Result<Payload, ClientError> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let token = self.get_token(false).await?;
        let response = self.execute(method.clone(), &url, body, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(%url, "got 401, retrying once with a fresh token");
            let token = self.get_token(true).await?;
            let retried = self.execute(method, &url, body, &token).await?;

            let status = retried.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(ClientError::auth(format!(
                    "still unauthorized after token refresh (HTTP {status})"
                )));
            }
            return Self::decode(retried).await;
        }

        Self::decode(response).await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let mut builder = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json")
            .header(CLIENT_ID_HEADER, CLIENT_ID)
            .bearer_auth(token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await.map_err(classify_transport_error)
    }

    async fn decode(response: reqwest::Response) -> Result<Payload, ClientError> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("json"));

        let text = response
            .text()
            .await
            .map_err(|err| ClientError::request(format!("failed to read response body: {err}")))?;

        if !status.is_success() {
            return Err(ClientError::status(status.as_u16(), text));
        }

        if is_json {
            let value = if text.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|err| {
                    ClientError::request(format!("invalid JSON response: {err}"))
                })?
            };
            Ok(Payload::Json(value))
        } else {
            Ok(Payload::Text(text))
        }
    }

    // -------- Typed endpoints --------

    /// Fetches the time-card details, optionally for a specific date.
    ///
    /// Without a date the vendor expects the bare `?d` parameter.
    pub async fn fetch_details(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<TimecardSnapshot, ClientError> {
        let path = match date {
            Some(d) => format!("/api.json/Timecard/Details?d={}", d.format("%Y-%m-%d")),
            None => "/api.json/Timecard/Details?d".to_string(),
        };

        let value = self.request(Method::GET, &path, None).await?.into_json()?;
        let payload: DetailsPayload = serde_json::from_value(value)
            .map_err(|err| ClientError::request(format!("invalid details payload: {err}")))?;
        Ok(payload.into())
    }

    /// Starts a work session. No client-side guard against an already
    /// running session; the vendor accepts the call either way.
    pub async fn start_work(&self) -> Result<(), ClientError> {
        self.request(Method::POST, "/api.json/Timecard/StartWorkTime", None)
            .await
            .map(drop)
    }

    /// Closes the running work session, if any.
    pub async fn stop_work(&self) -> Result<(), ClientError> {
        self.request(Method::POST, "/api.json/Timecard/CloseWorkTime", None)
            .await
            .map(drop)
    }

    /// Fetches resource-plan calendar items for `[start, start + days)`
    /// where `days = max(1, end - start)`.
    ///
    /// Denylist semantics: `None` applies [`DEFAULT_FILTERED_IDT`], an
    /// explicit empty slice disables filtering, and any other slice is
    /// used as given. Callers wanting the raw truth must pass `Some(&[])`.
    pub async fn fetch_calendar(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        filtered_idt: Option<&[i64]>,
    ) -> Result<Vec<CalendarItem>, ClientError> {
        let days = (end - start).num_days().max(1);
        let path = format!(
            "/api.json/dashboard/calendar/?days={days}&startdate={}",
            start.format("%Y-%m-%d")
        );

        let value = self.request(Method::GET, &path, None).await?.into_json()?;
        let items: Vec<CalendarItem> = if value.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(value)
                .map_err(|err| ClientError::request(format!("invalid calendar payload: {err}")))?
        };

        let deny = filtered_idt.unwrap_or(DEFAULT_FILTERED_IDT);
        Ok(apply_denylist(items, deny))
    }

    /// Resolves the account's address id from the web settings, caching
    /// the result for the client's lifetime.
    ///
    /// The settings payload is inconsistent across installations, so
    /// three field names are tried in priority order.
    pub async fn id_address(&self, force: bool) -> Result<i64, ClientError> {
        let mut cache = self.id_address.lock().await;
        if !force {
            if let Some(id) = *cache {
                return Ok(id);
            }
        }

        let settings = self.web_settings().await?;
        let id = ["IdAddress", "IdAddressDefault", "idaddress"]
            .iter()
            .find_map(|key| settings.get(key).and_then(address_id_value))
            .ok_or_else(|| {
                ClientError::request("could not read an address id from the web settings")
            })?;

        *cache = Some(id);
        Ok(id)
    }

    /// Lists the selectable resource-state types for this account.
    pub async fn resource_state_types(&self) -> Result<Vec<ResourceStateType>, ClientError> {
        let idaddress = self.id_address(false).await?;
        let path = format!("/api.json/ResourceStates/GetFormData?id=0&idaddress={idaddress}");

        let value = self.request(Method::GET, &path, None).await?.into_json()?;
        match value.get("ResourceStateTypeSelection") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(selection) => serde_json::from_value(selection.clone()).map_err(|err| {
                ClientError::request(format!("invalid resource-state payload: {err}"))
            }),
        }
    }

    /// Saves a resource state over the given time range and returns the
    /// raw API payload.
    ///
    /// Timestamps are sent as naive local-style ISO strings without an
    /// offset; the vendor rejects anything else.
    pub async fn save_resource_state(
        &self,
        type_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Value, ClientError> {
        let idaddress = self.id_address(false).await?;
        let body = serde_json::json!({
            "IdResourceState": 0,
            "Address": {"IdAddress": idaddress},
            "IdResourceStateType": type_id,
            "StartDate": format_vendor_datetime(start),
            "EndDate": format_vendor_datetime(end),
        });

        self.request(Method::POST, "/api.json/ResourceStates/Save", Some(&body))
            .await?
            .into_json()
    }

    /// Fetches the raw web-settings object.
    pub async fn web_settings(&self) -> Result<Value, ClientError> {
        let value = self
            .request(Method::GET, "/api.json/Common/GetWebSettings", None)
            .await?
            .into_json()?;
        if !value.is_object() {
            return Err(ClientError::request(
                "web settings response is not an object",
            ));
        }
        Ok(value)
    }

    /// Checks that the account may use the timecard API at all.
    pub async fn validate_timecard_user(&self) -> Result<(), ClientError> {
        let settings = self.web_settings().await?;
        if settings.get("IsTimeCardUser").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            Err(ClientError::NotTimecardUser)
        }
    }

    /// Credential validation: one details fetch, discarding the result.
    pub async fn check_credentials(&self) -> Result<(), ClientError> {
        self.fetch_details(None).await.map(drop)
    }
}

/// Accepts numeric address ids and numeric strings; zero counts as
/// missing, matching the vendor's use of 0 as "unset".
fn address_id_value(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }?;
    (id != 0).then_some(id)
}

/// TLS/certificate failures are authentication faults; everything else on
/// an authenticated call is a request fault.
fn classify_transport_error(err: reqwest::Error) -> ClientError {
    if is_tls_error(&err) {
        ClientError::auth(format!("TLS error: {err}"))
    } else if err.is_timeout() {
        ClientError::request(format!("request timed out: {err}"))
    } else {
        ClientError::request(format!("network error: {err}"))
    }
}

/// Walks the error source chain looking for a TLS or certificate cause.
/// reqwest does not expose this classification directly.
fn is_tls_error(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        let text = inner.to_string().to_ascii_lowercase();
        if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
            return true;
        }
        source = inner.source();
    }
    false
}

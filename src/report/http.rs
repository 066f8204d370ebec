//! Fetch-based backend reporter (WASM only)
//!
//! Requests are fired on the browser event loop and never awaited by the
//! game; failures are logged. The backend session id arrives asynchronously,
//! shots fired before it is known are dropped.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestCredentials, RequestInit, RequestMode, Response};

use super::{
    ApiResponse, CreateSessionRequest, FinishSessionPayload, FinishedSessionData,
    GameSessionData, RecordShotPayload, ReportError, SessionReporter,
};

/// LocalStorage key holding the bearer token
const AUTH_TOKEN_KEY: &str = "google_auth_token";

/// Reporter talking to the REST backend at `base_url`
#[derive(Debug, Clone)]
pub struct HttpReporter {
    base_url: String,
    session_id: Rc<Cell<Option<u64>>>,
}

impl HttpReporter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: Rc::new(Cell::new(None)),
        }
    }

    /// Backend id of the current session, once `POST /sessions` answered
    pub fn session_id(&self) -> Option<u64> {
        self.session_id.get()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl SessionReporter for HttpReporter {
    fn create_session(&mut self, request: &CreateSessionRequest) -> Result<(), ReportError> {
        self.session_id.set(None);
        let body = serde_json::to_string(request)?;
        let url = self.url("/sessions");
        let slot = self.session_id.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let result = send("POST", &url, body).await.and_then(|text| {
                Ok(serde_json::from_str::<ApiResponse<GameSessionData>>(&text)?)
            });
            match result {
                Ok(response) if response.success => {
                    log::info!("Backend session {} created", response.data.id);
                    slot.set(Some(response.data.id));
                }
                Ok(_) => log::warn!("Backend refused to create a session"),
                Err(e) => log::warn!("Failed to create backend session: {}", e),
            }
        });
        Ok(())
    }

    fn record_shot(&mut self, shot: &RecordShotPayload) -> Result<(), ReportError> {
        let Some(id) = self.session_id.get() else {
            log::debug!("Dropping shot: no backend session yet");
            return Ok(());
        };
        let body = serde_json::to_string(shot)?;
        let url = self.url(&format!("/sessions/{}/shots", id));

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = send("POST", &url, body).await {
                log::warn!("Failed to record shot: {}", e);
            }
        });
        Ok(())
    }

    fn finish_session(&mut self, payload: &FinishSessionPayload) -> Result<(), ReportError> {
        let id = self.session_id.get().ok_or(ReportError::NoSession)?;
        let body = serde_json::to_string(payload)?;
        let url = self.url(&format!("/sessions/{}/finish", id));

        wasm_bindgen_futures::spawn_local(async move {
            let result = send("PUT", &url, body).await.and_then(|text| {
                Ok(serde_json::from_str::<ApiResponse<FinishedSessionData>>(&text)?)
            });
            match result {
                Ok(response) => log::info!(
                    "Backend session {} finished: {} shots, {:.1}% accuracy",
                    response.data.session.id,
                    response.data.total_shots,
                    response.data.accuracy
                ),
                Err(e) => log::warn!("Failed to finish backend session: {}", e),
            }
        });
        Ok(())
    }
}

fn auth_token() -> Option<String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .and_then(|s| s.get_item(AUTH_TOKEN_KEY).ok())
        .flatten()
}

fn transport(e: JsValue) -> ReportError {
    ReportError::Transport(format!("{:?}", e))
}

/// Send a JSON request and return the response body
async fn send(method: &str, url: &str, body: String) -> Result<String, ReportError> {
    let headers = Headers::new().map_err(transport)?;
    headers
        .set("Content-Type", "application/json")
        .map_err(transport)?;
    if let Some(token) = auth_token() {
        headers
            .set("Authorization", &format!("Bearer {}", token))
            .map_err(transport)?;
    }

    let init = RequestInit::new();
    init.set_method(method);
    init.set_mode(RequestMode::Cors);
    init.set_credentials(RequestCredentials::Include);
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(url, &init).map_err(transport)?;
    let window =
        web_sys::window().ok_or_else(|| ReportError::Transport("no window".to_string()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?
        .dyn_into()
        .map_err(transport)?;

    if !response.ok() {
        return Err(ReportError::Status(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?;
    Ok(text.as_string().unwrap_or_default())
}

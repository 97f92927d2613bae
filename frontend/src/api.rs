use gloo_net::http::{Method, Request, Response};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;
use wasm_bindgen::JsValue;
use shared::{
    ActivitySummary, CastBallotRequest, CurrentUser, ErrorCode, ErrorResponse, Poll, PollForm,
    PollPatch, PollView, SortSpec,
};
use crate::config::CONFIG;

pub type ApiResult<T> = Result<T, ErrorResponse>;

fn network_error(err: gloo_net::Error) -> ErrorResponse {
    web_sys::console::error_1(&JsValue::from_str(&format!("Request failed: {err}")));
    ErrorResponse {
        error: "Could not reach the server. Check your connection.".into(),
        code: None,
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if response.ok() {
        return response.json::<T>().await.map_err(|e| {
            web_sys::console::error_1(&JsValue::from_str(&format!("Bad response body ({status}): {e}")));
            ErrorResponse::new(ErrorCode::SystemError, "The server sent an unexpected response.")
        });
    }

    let body = response.json::<ErrorResponse>().await.unwrap_or_else(|_| ErrorResponse {
        error: format!("Request failed with status {status}"),
        code: None,
    });
    web_sys::console::warn_1(&JsValue::from_str(&format!("API error {status}: {}", body.error)));
    Err(body)
}

async fn get<T: DeserializeOwned>(path: &str) -> ApiResult<T> {
    let response = Request::get(&CONFIG.url(path))
        .send()
        .await
        .map_err(network_error)?;
    read(response).await
}

async fn send_json<B: Serialize, T: DeserializeOwned>(method: Method, path: &str, body: &B) -> ApiResult<T> {
    let response = Request::new(&CONFIG.url(path))
        .method(method)
        .json(body)
        .map_err(network_error)?
        .send()
        .await
        .map_err(network_error)?;
    read(response).await
}

pub async fn fetch_me() -> ApiResult<CurrentUser> {
    get("/me").await
}

pub async fn fetch_polls(sort: SortSpec) -> ApiResult<Vec<PollView>> {
    get(&format!("/votes?sort={}", sort.as_str())).await
}

pub async fn fetch_poll(id: &str) -> ApiResult<PollView> {
    get(&format!("/votes/{id}")).await
}

pub async fn fetch_summary() -> ApiResult<ActivitySummary> {
    get("/summary").await
}

pub async fn create_poll(form: &PollForm) -> ApiResult<Poll> {
    send_json(Method::POST, "/votes", form).await
}

pub async fn edit_poll(id: Uuid, patch: &PollPatch) -> ApiResult<Poll> {
    send_json(Method::PATCH, &format!("/votes/{id}"), patch).await
}

pub async fn cast_ballot(id: Uuid, option: &str) -> ApiResult<PollView> {
    let body = CastBallotRequest { option: option.to_string() };
    send_json(Method::POST, &format!("/votes/{id}/ballot"), &body).await
}

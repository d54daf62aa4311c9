//! Shared HTTP plumbing: one reqwest client and envelope handling.
use crate::error::ApiError;
use once_cell::sync::Lazy;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

static CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Endpoints answer either `{ success, data }` or the bare payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        success: bool,
        data: Option<T>,
        message: Option<String>,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Result<T, ApiError> {
        match self {
            Envelope::Bare(data) => Ok(data),
            Envelope::Wrapped { success: true, data: Some(data), .. } => Ok(data),
            Envelope::Wrapped { success: true, data: None, .. } => {
                Err(ApiError::Unsuccessful("response carried no data".to_string()))
            }
            Envelope::Wrapped { success: false, message, .. } => Err(ApiError::Unsuccessful(
                message.unwrap_or_else(|| "request failed".to_string()),
            )),
        }
    }
}

async fn read_body(resp: reqwest::Response) -> Result<String, ApiError> {
    let status = resp.status();
    let text = resp.text().await?;
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

/// GET `url` and unwrap whichever envelope the endpoint uses.
pub(crate) async fn get_json<T: DeserializeOwned>(url: &str, token: Option<&str>) -> Result<T, ApiError> {
    log::debug!("GET {}", url);
    let mut request = CLIENT.get(url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let text = read_body(request.send().await?).await?;
    let envelope: Envelope<T> = serde_json::from_str(&text)?;
    envelope.into_data()
}

/// POST a JSON body; the response body is returned as loose JSON (null when empty).
pub(crate) async fn post_json<B: Serialize + ?Sized>(url: &str, body: &B) -> Result<serde_json::Value, ApiError> {
    log::debug!("POST {}", url);
    let text = read_body(CLIENT.post(url).json(body).send().await?).await?;
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

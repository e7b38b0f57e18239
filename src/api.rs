// API client module: a small blocking HTTP client for the Agave token and
// files services. One session is created per run and only read afterwards.

use crate::config::{AgaveEnv, Credentials};
use crate::error::{Error, Result};
use log::{debug, info};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;

/// Authenticated handle to the Agave API: the reqwest blocking client, the
/// server base URL and the bearer token obtained at login.
pub struct AgaveSession {
    client: Client,
    base_url: Url,
    token: String,
}

/// Reply of the `/token` endpoint. Only the access token is used.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Body of a files "manage" call (`mkdir` is the only action issued).
#[derive(Serialize, Debug)]
struct ManageRequest<'a> {
    action: &'a str,
    path: &'a str,
}

/// The parts of Agave's JSON envelope we look at. Token errors use the
/// OAuth `error_description` field instead of `message`.
#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl AgaveSession {
    /// Log in with the OAuth password grant and keep the access token.
    ///
    /// The HTTP client has no request timeout: uploads of large files must
    /// not be cut off half way.
    pub fn login(env: &AgaveEnv, credentials: &Credentials) -> Result<Self> {
        let base_url = env.api_base()?;
        let client = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(format!("{}/{}", env.client_name, env!("CARGO_PKG_VERSION")))
            .build()?;

        let url = endpoint(&base_url, ["token"])?;
        debug!("POST {} (user {})", url, credentials.username);
        let form = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("scope", "PRODUCTION"),
        ];
        let res = client
            .post(url)
            .basic_auth(&env.api_key, Some(&env.api_secret))
            .form(&form)
            .send()?;

        let status = res.status();
        if !status.is_success() {
            let txt = res.text().unwrap_or_default();
            return Err(Error::Auth {
                status: status.as_u16(),
                message: server_message(&txt),
            });
        }
        let token: TokenResponse = res.json().map_err(|e| Error::Auth {
            status: status.as_u16(),
            message: format!("unexpected token response: {}", e),
        })?;

        info!(
            "Authenticated as {} on {} (client {})",
            credentials.username, base_url, env.client_name
        );
        if let Some(secs) = token.expires_in {
            debug!("Access token valid for {}s", secs);
        }

        Ok(AgaveSession {
            client,
            base_url,
            token: token.access_token,
        })
    }

    /// Create `path` below `parent` on `system_id`.
    pub fn mkdir(&self, system_id: &str, parent: &str, path: &str) -> Result<()> {
        let url = self.media_url(system_id, parent)?;
        debug!("PUT {} mkdir {}", url, path);
        let res = self
            .authorized(self.client.put(url))
            .json(&ManageRequest {
                action: "mkdir",
                path,
            })
            .send()?;
        check_response("mkdir", res)
    }

    /// Upload the whole reader as `filename` into directory `dest` on
    /// `system_id`, in a single multipart request.
    pub fn import_data(
        &self,
        system_id: &str,
        dest: &str,
        filename: &str,
        reader: Box<dyn Read + Send>,
    ) -> Result<()> {
        let url = self.media_url(system_id, dest)?;
        debug!("POST {} importData {}", url, filename);
        let part = multipart::Part::reader(reader).file_name(filename.to_string());
        let form = multipart::Form::new()
            .text("fileName", filename.to_string())
            .part("fileToUpload", part);
        let res = self.authorized(self.client.post(url)).multipart(form).send()?;
        check_response("importData", res)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
    }

    fn media_url(&self, system_id: &str, path: &str) -> Result<Url> {
        endpoint(
            &self.base_url,
            ["files", "v2", "media", "system", system_id]
                .into_iter()
                .chain(path.split('/')),
        )
    }
}

/// Append `segments` to `base`, percent-encoding each one. Empty segments
/// are dropped, so leading, trailing and doubled `/` never reach the URL.
fn endpoint<'a, I>(base: &Url, segments: I) -> Result<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidServer {
            server: base.to_string(),
            reason: "not a base URL".into(),
        })?
        .pop_if_empty()
        .extend(segments.into_iter().filter(|s| !s.is_empty()));
    Ok(url)
}

/// Turn a files API reply into `Ok(())` or `Error::Api`. Agave sometimes
/// reports failures with a 200 and `"status": "error"` in the body.
fn check_response(operation: &'static str, res: Response) -> Result<()> {
    let status = res.status();
    let body = res.text()?;
    if !status.is_success() {
        return Err(Error::Api {
            operation,
            status: status.as_u16(),
            message: server_message(&body),
        });
    }
    if let Ok(envelope) = serde_json::from_str::<Envelope>(&body) {
        if envelope.status.as_deref() == Some("error") {
            return Err(Error::Api {
                operation,
                status: status.as_u16(),
                message: envelope.message.unwrap_or_default(),
            });
        }
    }
    Ok(())
}

/// Best human-readable message in an error body.
fn server_message(body: &str) -> String {
    serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|e| e.message.or(e.error_description))
        .unwrap_or_else(|| body.trim().to_string())
}

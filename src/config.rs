// Configuration: the Agave endpoint comes from the environment, the
// destination area is fixed.

use crate::error::{Error, Result};
use reqwest::Url;

/// Remote base directory the tree is mirrored under.
pub const DEFAULT_ROOT_PATH: &str = "/sample/biofab";

/// Storage system that holds the community data area.
pub const DEFAULT_SYSTEM_ID: &str = "data-sd2e-community";

pub const ENV_SERVER: &str = "AGAVE_SERVER";
pub const ENV_CLIENT: &str = "AGAVE_CLIENT";
pub const ENV_API_KEY: &str = "AGAVE_API_KEY";
pub const ENV_API_SECRET: &str = "AGAVE_API_SECRET";

/// Endpoint and OAuth client settings read from the process environment.
#[derive(Clone)]
pub struct AgaveEnv {
    pub server: String,
    pub client_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl AgaveEnv {
    /// Read all four `AGAVE_*` variables. The first one missing aborts.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` but with an injected lookup, so callers (and
    /// tests) can supply values without touching the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| lookup(name).ok_or(Error::MissingEnv(name));
        Ok(AgaveEnv {
            server: require(ENV_SERVER)?,
            client_name: require(ENV_CLIENT)?,
            api_key: require(ENV_API_KEY)?,
            api_secret: require(ENV_API_SECRET)?,
        })
    }

    /// Base URL of the API server. A bare host gets `https://`; an explicit
    /// `http://` or `https://` scheme is kept as given.
    pub fn api_base(&self) -> Result<Url> {
        let server = self.server.trim();
        let raw = if server.starts_with("http://") || server.starts_with("https://") {
            server.to_string()
        } else {
            format!("https://{}", server)
        };
        let url = Url::parse(&raw).map_err(|e| Error::InvalidServer {
            server: self.server.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidServer {
                server: self.server.clone(),
                reason: "not a base URL".into(),
            });
        }
        Ok(url)
    }
}

// Keep secrets out of `{:?}` output.
impl std::fmt::Debug for AgaveEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgaveEnv")
            .field("server", &self.server)
            .field("client_name", &self.client_name)
            .finish_non_exhaustive()
    }
}

/// Where on the remote side the copy lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    pub root_path: String,
    pub system_id: String,
}

impl Default for StorageTarget {
    fn default() -> Self {
        StorageTarget {
            root_path: DEFAULT_ROOT_PATH.into(),
            system_id: DEFAULT_SYSTEM_ID.into(),
        }
    }
}

/// Account credentials used for the password grant.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Login name of the invoking user, looked up the same way most Unix
/// tools do: `LOGNAME`, `USER`, `LNAME`, `USERNAME`, then the password
/// database entry for the real user id.
pub fn login_name() -> Option<String> {
    login_name_from(|name| std::env::var(name).ok(), passwd_name)
}

pub fn login_name_from<F, P>(lookup: F, fallback: P) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
    P: FnOnce() -> Option<String>,
{
    ["LOGNAME", "USER", "LNAME", "USERNAME"]
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.is_empty())
        .or_else(fallback)
}

/// User name of the current real uid from the password database.
#[cfg(unix)]
pub fn passwd_name() -> Option<String> {
    use std::ffi::CStr;

    let uid = unsafe { libc::getuid() };
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::passwd = std::ptr::null_mut();
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < 1 << 20 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        break;
    }
    if result.is_null() || pwd.pw_name.is_null() {
        return None;
    }
    // pw_name points into `buf`, which is still alive here.
    let name = unsafe { CStr::from_ptr(pwd.pw_name) };
    name.to_str()
        .ok()
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
}

#[cfg(not(unix))]
pub fn passwd_name() -> Option<String> {
    None
}

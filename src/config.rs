use std::path::Path;

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Environment variables overriding the file, e.g. `BVDL_COOKIE`
const ENV_PREFIX: &str = "BVDL";

/// Settings persisted between runs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Raw `Cookie` header of a logged-in browser session
    #[serde(default)]
    cookie: Option<String>,
}

impl Config {
    /// Read the JSON file at `path`, then the `BVDL_*` environment.
    ///
    /// A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not read config file {}", path.display()))?;

        config
            .try_deserialize()
            .into_diagnostic()
            .wrap_err("Invalid configuration")
    }

    #[cfg(test)]
    pub fn with_cookie<S: Into<String>>(cookie: S) -> Self {
        Self {
            cookie: Some(cookie.into()),
        }
    }

    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    /// The cookie, if one is set and not blank
    pub fn cookie(&self) -> Option<&str> {
        self.cookie
            .as_deref()
            .map(str::trim)
            .filter(|cookie| !cookie.is_empty())
    }

    /// Without `SESSDATA` the platform treats the session as logged out
    pub fn cookie_lacks_session(&self) -> bool {
        self.cookie()
            .is_some_and(|cookie| !cookie.contains("SESSDATA"))
    }

    /// Write the cookie to the JSON file at `path`.
    ///
    /// Other keys already in the file are kept.
    pub fn save_cookie(&self, path: &Path) -> Result<()> {
        let mut root = if path.exists() {
            let content = std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Could not read {}", path.display()))?;
            serde_json::from_str::<serde_json::Value>(&content)
                .into_diagnostic()
                .wrap_err_with(|| format!("{} is not valid JSON", path.display()))?
        } else {
            serde_json::Value::Object(Default::default())
        };

        let object = root
            .as_object_mut()
            .ok_or_else(|| miette!("{} does not contain a JSON object", path.display()))?;
        object.insert(
            "cookie".to_owned(),
            serde_json::Value::String(self.cookie().unwrap_or_default().to_owned()),
        );

        let content = serde_json::to_string_pretty(&root).into_diagnostic()?;
        std::fs::write(path, content)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not write {}", path.display()))?;

        debug!("Cookie saved to {}", path.display());
        Ok(())
    }
}

use std::env;
use std::net::SocketAddr;

use chrono::Duration;

use crate::error::{invalid_input_error, Error};

pub const DEFAULT_GOOGLE_MAPS_API_BASE: &str = "maps.googleapis.com";
pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_FORM_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub google_maps_api_base: String,
    pub google_maps_api_key: String,
    pub osrm_url: String,
    pub listen_addr: SocketAddr,
    /// Forms older than this are dropped from the store.
    pub form_ttl: Duration,
}

impl Config {
    /// Reads the configuration from the process environment, after loading
    /// a `.env` file from the working directory if one exists.
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        if let Err(err) = dotenv::dotenv() {
            tracing::debug!("no .env file loaded: {}", err);
        }

        Self::from_lookup(|key| env::var(key))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let google_maps_api_base = lookup("GOOGLE_MAPS_API_BASE")
            .unwrap_or_else(|_| DEFAULT_GOOGLE_MAPS_API_BASE.into());
        let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")?;
        let osrm_url = lookup("OSRM_URL").unwrap_or_else(|_| DEFAULT_OSRM_URL.into());
        let listen_addr = lookup("ERRAND_LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into())
            .parse()
            .map_err(|_| invalid_input_error())?;
        let form_ttl_secs = match lookup("ERRAND_FORM_TTL_SECS") {
            Ok(secs) => secs.parse::<i64>().map_err(|_| invalid_input_error())?,
            Err(_) => DEFAULT_FORM_TTL_SECS,
        };

        Ok(Self {
            google_maps_api_base,
            google_maps_api_key,
            osrm_url: osrm_url.trim_end_matches('/').into(),
            listen_addr,
            form_ttl: Duration::seconds(form_ttl_secs),
        })
    }
}

#[test]
fn config_defaults() {
    let config = Config::from_lookup(|key| match key {
        "GOOGLE_MAPS_API_KEY" => Ok("secret".into()),
        _ => Err(env::VarError::NotPresent),
    })
    .unwrap();

    assert_eq!(config.google_maps_api_base, DEFAULT_GOOGLE_MAPS_API_BASE);
    assert_eq!(config.osrm_url, DEFAULT_OSRM_URL);
    assert_eq!(config.listen_addr.port(), 3000);
    assert_eq!(config.form_ttl, Duration::hours(24));
}

#[test]
fn config_requires_api_key() {
    let result = Config::from_lookup(|_| Err(env::VarError::NotPresent));

    assert_eq!(result.unwrap_err().code, crate::error::ENV_VAR_ERROR);
}

#[test]
fn config_trims_osrm_url() {
    let config = Config::from_lookup(|key| match key {
        "GOOGLE_MAPS_API_KEY" => Ok("secret".into()),
        "OSRM_URL" => Ok("http://localhost:5000/".into()),
        "ERRAND_LISTEN_ADDR" => Ok("0.0.0.0:8080".into()),
        "ERRAND_FORM_TTL_SECS" => Ok("600".into()),
        _ => Err(env::VarError::NotPresent),
    })
    .unwrap();

    assert_eq!(config.osrm_url, "http://localhost:5000");
    assert_eq!(config.listen_addr.port(), 8080);
    assert_eq!(config.form_ttl, Duration::minutes(10));
}

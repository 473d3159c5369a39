//! Typed view of the demo's settings.
//!
//! After resolution the store holds the winning value for every flag, so the
//! whole set can be decoded into a struct with `Store::unmarshal`. Field names
//! match flag names; `log-level` needs a rename.
//!
//! | Flag          | Env var                   | Config key  |
//! |---------------|---------------------------|-------------|
//! | `--host`      | `FLAGBIND_DEMO_HOST`      | `host`      |
//! | `--port`      | `FLAGBIND_DEMO_PORT`      | `port`      |
//! | `--log-level` | `FLAGBIND_DEMO_LOG_LEVEL` | `log-level` |
//! | `--color`     | `FLAGBIND_DEMO_COLOR`     | `color`     |

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub host: String,

    /// Flags without a type hint arrive as text.
    #[serde(deserialize_with = "port_from_text")]
    pub port: u16,

    #[serde(rename = "log-level")]
    pub log_level: String,

    #[serde(default)]
    pub color: String,
}

fn port_from_text<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(n) => Ok(n),
        Port::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

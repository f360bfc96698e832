use serde::{Deserialize, Deserializer};
use std::time::Duration;

crate::arg_wrapper!(ArgDuration, Duration, humantime::parse_duration);

/// Deserializes a human readable duration such as `1500ms` or `3s`.
pub fn deserialize_human_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = Option::<String>::deserialize(deserializer)?;

    if let Some(b) = buf {
        humantime::parse_duration(&b)
            .map(Some)
            .map_err(serde::de::Error::custom)
    } else {
        Ok(None)
    }
}

pub fn format_millis(duration: Duration) -> String {
    format!("{:.2}", duration.as_secs_f64() * 1000.0)
}

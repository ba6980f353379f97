//! Deserialization helpers for patch payloads.

use serde::{Deserialize, Deserializer};

/// Distinguish an explicit `null` from an absent field.
///
/// Pair with `#[serde(default)]`: absent stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::nullable")]
        url: Option<Option<String>>,
    }

    #[test]
    fn null_clears_and_absent_keeps() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(p.url, None);
        let p: Patch = serde_json::from_str(r#"{"url": null}"#).unwrap();
        assert_eq!(p.url, Some(None));
        let p: Patch = serde_json::from_str(r#"{"url": "https://x/y.png"}"#).unwrap();
        assert_eq!(p.url, Some(Some("https://x/y.png".into())));
    }
}

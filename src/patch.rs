use serde::{Deserialize, Deserializer};

/// Deserializes a PATCH field so "absent" and "null" stay distinguishable:
/// a missing key gives `None` (leave the column alone), an explicit `null`
/// gives `Some(None)` (clear the column), a value gives `Some(Some(v))`.
///
/// Use together with `#[serde(default)]` on an `Option<Option<T>>` field.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "double_option")]
        note: Option<Option<String>>,
    }

    #[test]
    fn missing_key_means_unset() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.note, None);
    }

    #[test]
    fn explicit_null_means_clear() {
        let body: Body = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(body.note, Some(None));
    }

    #[test]
    fn value_means_set() {
        let body: Body = serde_json::from_str(r#"{"note": "x"}"#).unwrap();
        assert_eq!(body.note, Some(Some("x".into())));
    }
}

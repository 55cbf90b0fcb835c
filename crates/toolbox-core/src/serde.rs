use serde::{Deserialize, Deserializer};

/// Deserializes an optional query string value, trimming it and mapping
/// empty input to `None`.
pub fn deserialize_optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
        name: Option<String>,
    }

    #[test]
    fn test_blank_is_none() {
        let filter: Filter = serde_json::from_str(r#"{"name":"   "}"#).unwrap();
        assert_eq!(filter.name, None);
    }

    #[test]
    fn test_value_is_trimmed() {
        let filter: Filter = serde_json::from_str(r#"{"name":" admin "}"#).unwrap();
        assert_eq!(filter.name.as_deref(), Some("admin"));
    }

    #[test]
    fn test_missing_is_none() {
        let filter: Filter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.name, None);
    }
}

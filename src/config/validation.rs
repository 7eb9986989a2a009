use super::schema::{Config, SourceKind};
use crate::compare::MAX_COMPARE;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Source
    if let Some(ref url) = config.source.api_url {
        match reqwest::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(format!(
                "source.api_url: unsupported scheme '{}' (expected http or https)",
                parsed.scheme()
            )),
            Err(e) => errors.push(format!("source.api_url: invalid URL '{}' - {}", url, e)),
        }
    }
    if config.source.kind == SourceKind::Remote && config.source.api_url.is_none() {
        errors.push("source.api_url: required when source.kind is remote".to_string());
    }
    if config.source.kind == SourceKind::Local {
        if let Some(ref fixture) = config.source.fixture {
            if !fixture.exists() {
                errors.push(format!(
                    "source.fixture: file not found at {}",
                    fixture.display()
                ));
            }
        }
    }
    if let Err(e) = humantime::parse_duration(&config.source.cache_ttl) {
        errors.push(format!(
            "source.cache_ttl: invalid duration '{}' - {}",
            config.source.cache_ttl, e
        ));
    }

    // Compare
    let max = config.compare.max_colleges;
    if !(2..=MAX_COMPARE).contains(&max) {
        errors.push(format!(
            "compare.max_colleges: must be between 2 and {}, got {}",
            MAX_COMPARE, max
        ));
    }
    if config.compare.fields.is_empty() {
        errors.push("compare.fields: at least one field is required".to_string());
    }
    for (i, field) in config.compare.fields.iter().enumerate() {
        if config.compare.fields[..i].contains(field) {
            errors.push(format!("compare.fields[{}]: duplicate field {:?}", i, field));
        }
    }

    if config.page_size == 0 {
        errors.push("page_size: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparableField;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_remote_requires_url() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Remote;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("source.api_url"));
    }

    #[test]
    fn test_bad_url_scheme() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Remote;
        config.source.api_url = Some("ftp://example.com/api".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = Config::default();
        config.source.cache_ttl = "eventually".to_string();
        config.compare.max_colleges = 7;
        config.compare.fields = vec![];
        config.page_size = 0;
        config.source.fixture = Some(PathBuf::from("/definitely/not/here.json"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "{:?}", errors);
    }

    #[test]
    fn test_duplicate_fields() {
        let mut config = Config::default();
        config.compare.fields = vec![
            ComparableField::Fees,
            ComparableField::Rating,
            ComparableField::Fees,
        ];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec!["compare.fields[2]: duplicate field Fees".to_string()]);
    }

    #[test]
    fn test_max_colleges_lower_bound() {
        let mut config = Config::default();
        config.compare.max_colleges = 1;
        assert!(validate_config(&config).is_err());
        config.compare.max_colleges = 2;
        assert!(validate_config(&config).is_ok());
    }
}

use anyhow::{Context, Result};

use crate::college::CollegeRecord;

/// Open a URL in the user's default browser
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    webbrowser::open(url).with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

/// Website of a college, if it has a usable one
pub fn website_of(college: &CollegeRecord) -> Option<&str> {
    college
        .website
        .as_deref()
        .map(str::trim)
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
}

/// Open a college's website. Returns the URL that was opened.
pub fn open_website(college: &CollegeRecord) -> Result<String> {
    let Some(url) = website_of(college) else {
        anyhow::bail!("{} has no website listed", college.display_name());
    };
    open_url(url)?;
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_website_of() {
        let mut college = CollegeRecord::new(1, "Test College", "X");
        assert_eq!(website_of(&college), None);

        college.website = Some(" https://example.edu/ ".to_string());
        assert_eq!(website_of(&college), Some("https://example.edu/"));

        college.website = Some("javascript:alert(1)".to_string());
        assert_eq!(website_of(&college), None);
    }

    #[test]
    fn test_open_website_without_url_fails_before_launching() {
        let college = CollegeRecord::new(1, "Test College", "X");
        let err = open_website(&college).unwrap_err();
        assert_eq!(err.to_string(), "Test College has no website listed");
    }
}

use thiserror::Error;

/// Top-level path segments owned by the platform. A tenant slug that
/// collided with one of these would shadow the route, so creation and
/// renames reject them outright.
pub const RESERVED_SLUGS: &[&str] = &[
    "admin", "api", "assets", "auth", "dashboard", "docs", "domains", "health",
    "login", "logout", "register", "static", "www",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("Subdomain must be between 2 and 63 characters")]
    BadLength,
    #[error("Subdomain may only contain lowercase letters, digits, and hyphens")]
    BadCharset,
    #[error("Subdomain may not begin or end with a hyphen")]
    BadHyphen,
    #[error("'{0}' is a reserved name")]
    Reserved(String),
}

/// Validate a tenant subdomain slug. Applied at tenant creation and on
/// subdomain change; the directory may assume stored slugs passed this.
pub fn validate_slug(slug: &str) -> Result<(), SlugError> {
    if slug.len() < 2 || slug.len() > 63 {
        return Err(SlugError::BadLength);
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SlugError::BadCharset);
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(SlugError::BadHyphen);
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Err(SlugError::Reserved(slug.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert_eq!(validate_slug("acme"), Ok(()));
        assert_eq!(validate_slug("acme-store-2"), Ok(()));
        assert_eq!(validate_slug("a1"), Ok(()));
    }

    #[test]
    fn test_reserved_words_rejected() {
        // A tenant named "admin" would shadow the platform admin routes
        assert_eq!(validate_slug("admin"), Err(SlugError::Reserved("admin".into())));
        assert_eq!(validate_slug("login"), Err(SlugError::Reserved("login".into())));
        assert_eq!(validate_slug("www"), Err(SlugError::Reserved("www".into())));
    }

    #[test]
    fn test_charset_and_shape() {
        assert_eq!(validate_slug("a"), Err(SlugError::BadLength));
        assert_eq!(validate_slug("Acme"), Err(SlugError::BadCharset));
        assert_eq!(validate_slug("acme_store"), Err(SlugError::BadCharset));
        assert_eq!(validate_slug("acme.store"), Err(SlugError::BadCharset));
        assert_eq!(validate_slug("-acme"), Err(SlugError::BadHyphen));
        assert_eq!(validate_slug("acme-"), Err(SlugError::BadHyphen));
    }
}

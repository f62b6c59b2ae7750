//! Resolution of activity image references into absolute URLs.

/// Prefix of externally proxied media references.
const EXTERNAL_PREFIX: &str = "mp:external/";

/// Turns raw image references into absolute URLs.
///
/// Policy, in order:
/// 1. `mp:external/<rest>` → `<media_host>/external/<rest>`, remainder verbatim.
/// 2. With an application id → `<cdn_host>/app-assets/<app_id>/<image>.png`.
/// 3. Otherwise `None`.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    cdn_host: String,
    media_host: String,
}

impl ImageResolver {
    /// Creates a resolver for the given hosts. Trailing slashes are ignored.
    pub fn new(cdn_host: &str, media_host: &str) -> Self {
        Self {
            cdn_host: cdn_host.trim_end_matches('/').to_string(),
            media_host: media_host.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves one image reference.
    pub fn resolve(&self, application_id: Option<&str>, image: Option<&str>) -> Option<String> {
        let image = image.filter(|i| !i.is_empty())?;

        if let Some(rest) = image.strip_prefix(EXTERNAL_PREFIX) {
            return Some(format!("{}/external/{rest}", self.media_host));
        }

        let app_id = application_id.filter(|id| !id.is_empty())?;
        Some(format!("{}/app-assets/{app_id}/{image}.png", self.cdn_host))
    }
}

//! User avatar URLs.

use presence_entity::RawUser;

/// Builds the avatar URL for `user`, falling back to the platform default avatar.
///
/// Returns `None` only when the user has no id.
pub fn avatar_url(cdn_host: &str, user: &RawUser, size: u32) -> Option<String> {
    let id = user.id.as_deref()?;
    let cdn_host = cdn_host.trim_end_matches('/');

    match user.avatar.as_deref().filter(|h| !h.is_empty()) {
        Some(hash) => {
            let ext = if hash.starts_with("a_") { "gif" } else { "png" };
            Some(format!("{cdn_host}/avatars/{id}/{hash}.{ext}?size={size}"))
        }
        None => {
            let index = default_avatar_index(id, user.discriminator.as_deref());
            Some(format!("{cdn_host}/embed/avatars/{index}.png"))
        }
    }
}

/// Legacy accounts (non-zero discriminator) use `discriminator % 5`,
/// migrated accounts use `(id >> 22) % 6`.
fn default_avatar_index(id: &str, discriminator: Option<&str>) -> u64 {
    match discriminator
        .and_then(|d| d.parse::<u64>().ok())
        .filter(|d| *d != 0)
    {
        Some(d) => d % 5,
        None => id.parse::<u64>().map(|snowflake| (snowflake >> 22) % 6).unwrap_or(0),
    }
}

use crate::gauges::client::PageHit;

const SITE_ROOT: &str = "/";
const CATEGORY_SEGMENT: &str = "/categories/";
const ARCHIVES_INDEX: &str = "/archives/";
const PAGINATION_SEGMENT: &str = "/page/";
const ABOUT_PAGE: &str = "/about/";

/// Whether a raw API entry counts toward a content resource. Listing pages,
/// the site chrome, and traffic attributed to a foreign host are all noise
/// for the popularity ranking. Host comparison is case-sensitive against the
/// configured scheme-less canonical host.
pub fn is_content_hit(hit: &PageHit, canonical_host: &str) -> bool {
    !(hit.path == SITE_ROOT
        || hit.path.contains(CATEGORY_SEGMENT)
        || hit.path == ARCHIVES_INDEX
        || hit.path.contains(PAGINATION_SEGMENT)
        || hit.path == ABOUT_PAGE
        || hit.host != canonical_host)
}

/// Canonical record key for a raw path: drop a trailing `#fragment`, then
/// trailing slashes, so `/post/`, `/post` and `/post#anchor` share one
/// counter. The bare root collapses back to `/`.
pub fn normalize_path(path: &str) -> String {
    let without_fragment = match path.find('#') {
        Some(idx) => &path[..idx],
        None => path,
    };
    let trimmed = without_fragment.trim_end_matches('/');
    if trimmed.is_empty() {
        SITE_ROOT.to_string()
    } else {
        trimmed.to_string()
    }
}

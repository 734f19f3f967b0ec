//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/hello") // -> "/blog/post/hello"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Site-relative path of a document, from the configured route table.
/// Returns `None` when no route is configured for the type.
///
/// # Examples
/// ```ignore
/// document_path(&config, "posts", "como-utilizar-hooks") // -> "/post/como-utilizar-hooks"
/// ```
pub fn document_path(config: &SiteConfig, doc_type: &str, uid: &str) -> Option<String> {
    let route = config.route_for(doc_type)?;
    let path = route.path.replace(":uid", &encode_segment(uid));
    Some(url_for(config, &path))
}

/// A uid that can become a single path segment, and so has a page
pub fn is_routable_uid(uid: &str) -> bool {
    !uid.is_empty() && uid != "." && uid != ".." && !uid.contains(&['/', '\\'][..])
}

/// Encode a single URL path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

//! Page window computation and page link rewriting

use serde::Serialize;
use url::{form_urlencoded, Url};

/// Query parameter carrying the zero-based page number
pub const PAGE_PARAM: &str = "p";

// Base used to resolve relative request URIs; never appears in output.
const RELATIVE_BASE: &str = "http://relative.invalid";

/// Build a link to `target_page` from the current request URL.
///
/// Negative pages clamp to `0`. Only the `p` parameter is rewritten; every
/// other parameter keeps its value and position, and `p` is appended when
/// missing. Relative references (`/s?q=x`) produce relative links, absolute
/// URLs produce absolute links.
pub fn link_for(target_page: i64, current: &str) -> String {
    link_to_page(u64::try_from(target_page).unwrap_or(0), current)
}

/// [`link_for`] over the full unsigned page range
pub fn link_to_page(target_page: u64, current: &str) -> String {
    let page = target_page.to_string();

    let (mut url, relative) = match Url::parse(current) {
        Ok(url) => (url, false),
        Err(_) => match Url::parse(RELATIVE_BASE).and_then(|base| base.join(current)) {
            Ok(url) => (url, true),
            Err(_) => return format!("?{}={}", PAGE_PARAM, page),
        },
    };

    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter_map(|(k, v)| {
            if k == PAGE_PARAM {
                if replaced {
                    return None;
                }
                replaced = true;
                return Some((k, page.clone()));
            }
            Some((k, v))
        })
        .collect();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in &pairs {
        serializer.append_pair(k, v);
    }
    if !replaced {
        serializer.append_pair(PAGE_PARAM, &page);
    }
    url.set_query(Some(&serializer.finish()));

    if relative {
        let mut out = url.path().to_string();
        if let Some(query) = url.query() {
            out.push('?');
            out.push_str(query);
        }
        out
    } else {
        url.to_string()
    }
}

/// Number of pages needed for `total` hits, counting a trailing partial page
pub fn page_count(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// Derived pagination state handed to the HTML template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Current zero-based page
    pub page: u64,
    /// Offset of the first hit on this page
    pub frompage: u64,
    /// Total number of pages
    pub maxpages: u64,
    /// Link to the previous page (clamped to page 0)
    pub prevpage: String,
    /// Link to the next page
    pub nextpage: String,
    /// Whether a previous page exists
    pub has_prev: bool,
    /// Whether a next page exists
    pub has_next: bool,
}

impl PageWindow {
    pub fn new(page: u64, per_page: u64, total: u64, current: &str) -> Self {
        let maxpages = page_count(total, per_page);

        Self {
            page,
            frompage: per_page.saturating_mul(page),
            maxpages,
            prevpage: link_to_page(page.saturating_sub(1), current),
            nextpage: link_to_page(page.saturating_add(1), current),
            has_prev: page > 0,
            has_next: page.saturating_add(1) < maxpages,
        }
    }
}

//! Link-header pagination shared by the provider clients.
//!
//! Both GitHub and GitLab advertise continuation through an RFC 5988 `Link`
//! header (`<url>; rel="next", <url>; rel="last"`). The clients follow the
//! `next` URL verbatim rather than computing page numbers, so providers that
//! switch to keyset pagination keep working.

/// Pagination links parsed from a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// URL of the next page, if any.
    pub next: Option<String>,
    /// URL of the last page, if advertised.
    pub last: Option<String>,
    /// Page number extracted from the `next` URL.
    pub next_page: Option<u32>,
    /// Page number extracted from the `last` URL.
    pub last_page: Option<u32>,
}

impl LinkPagination {
    #[inline]
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// One page of a paged listing plus its continuation.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Continuation URL for the following page.
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// Create a page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Returns true if no further page follows.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Parse a `Link` header into its pagination links.
///
/// Entries without a `<url>` target or a `rel` parameter are ignored, as are
/// relations other than `next` and `last`.
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut links = LinkPagination::default();
    for (target, rel) in link_header.split(',').filter_map(link_entry) {
        let page = page_number(target);
        match rel {
            "next" => (links.next, links.next_page) = (Some(target.to_string()), page),
            "last" => (links.last, links.last_page) = (Some(target.to_string()), page),
            _ => {}
        }
    }
    links
}

/// Split one `<url>; rel="x"; ...` entry into its URL and relation.
fn link_entry(entry: &str) -> Option<(&str, &str)> {
    let mut params = entry.split(';').map(str::trim);
    let target = params.next()?.strip_prefix('<')?.strip_suffix('>')?;
    let rel = params.find_map(|p| p.strip_prefix("rel="))?;
    Some((target, rel.trim_matches('"')))
}

/// `page` query parameter of `target`, when it carries one.
fn page_number(target: &str) -> Option<u32> {
    let parsed = url::Url::parse(target).ok()?;
    parsed
        .query_pairs()
        .find_map(|(key, value)| (key == "page").then(|| value.parse().ok()).flatten())
}

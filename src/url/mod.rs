//! URL handling module for Filmow Exporter
//!
//! This module builds the three kinds of URLs the exporter requests (profile,
//! listing page, movie detail) from a single configurable base URL, and reads
//! page indices back out of pagination links.

use crate::ExporterError;
use url::Url;

/// Query parameter carrying the listing page index
pub const PAGE_PARAM: &str = "pagina";

/// URL builder rooted at the site's base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    /// Creates a URL builder for the given base URL
    ///
    /// # Example
    ///
    /// ```
    /// use filmow_exporter::url::SiteUrls;
    ///
    /// let urls = SiteUrls::new("https://filmow.com").unwrap();
    /// assert_eq!(
    ///     urls.listing_url("imp2", 3).as_str(),
    ///     "https://filmow.com/usuario/imp2/filmes/ja-vi/?pagina=3"
    /// );
    /// ```
    pub fn new(base_url: &str) -> Result<Self, ExporterError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ExporterError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self { base })
    }

    /// The base URL relative links are resolved against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Profile page of a user: `{base}/usuario/{user}`
    pub fn profile_url(&self, user: &str) -> Url {
        self.with_segments(&["usuario", user])
    }

    /// Watched-movies listing page: `{base}/usuario/{user}/filmes/ja-vi/?pagina={page}`
    pub fn listing_url(&self, user: &str, page: u32) -> Url {
        let mut url = self.with_segments(&["usuario", user, "filmes", "ja-vi", ""]);
        url.query_pairs_mut().append_pair(PAGE_PARAM, &page.to_string());
        url
    }

    /// Resolves a site-relative link to an absolute HTTP(S) URL
    ///
    /// Returns None for empty hrefs, fragment-only links and non-HTTP schemes.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        match self.base.join(href) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
            _ => None,
        }
    }

    /// Extracts the listing page index encoded in a pagination link
    pub fn page_index(&self, href: &str) -> Option<u32> {
        let url = self.resolve(href)?;
        url.query_pairs()
            .find(|(key, _)| key == PAGE_PARAM)
            .and_then(|(_, value)| value.trim().parse().ok())
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // `new` rejects cannot-be-a-base URLs, so segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Returns the last non-empty path segment of a URL (a movie's slug), percent-decoded
///
/// A segment that does not decode to UTF-8 is returned as it appears in the URL.
pub fn last_segment(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.rev().find(|segment| !segment.is_empty())?;
    Some(match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    })
}

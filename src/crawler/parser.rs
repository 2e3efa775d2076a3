//! HTML parser for profile, listing and movie detail pages
//!
//! Parsing is pure: every function takes HTML text and returns extracted data,
//! never performing I/O. Field-level misses are absorbed here and surface as
//! `None`, never as errors.

use crate::url::SiteUrls;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Minimal reference to a movie taken from a listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieStub {
    /// Absolute URL of the movie's detail page
    pub detail_url: Url,

    /// Numeric part of the star-rating label, if the user rated the movie
    pub rating: Option<String>,
}

/// Fields resolved from a movie detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieDetails {
    pub title: Option<String>,
    pub director: Option<String>,
    pub year: Option<String>,
}

/// Movie stubs of one listing page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub stubs: Vec<MovieStub>,

    /// Entries dropped because they had no usable link
    pub skipped: usize,
}

/// A single way of extracting a field; `None` means "try the next one"
type FieldStrategy = fn(&Html) -> Option<String>;

/// Title: original title, then the page heading
const TITLE_STRATEGIES: &[FieldStrategy] = &[original_title, page_heading];

/// Director: first emphasized name of the single director, then the full directors list
const DIRECTOR_STRATEGIES: &[FieldStrategy] = &[lead_director, directors_list];

/// Year: release tag only
const YEAR_STRATEGIES: &[FieldStrategy] = &[release_year];

/// Attributes that carry the star-rating label, in priority order
const RATING_ATTRIBUTES: &[&str] = &["title", "aria-label"];

/// Anchors that link a listing entry to its detail page, in priority order
const ENTRY_LINK_SELECTORS: &[&str] = &["a.tip-movie[href]", "a[href]"];

/// Parser bound to one site's URLs and not-found heading
#[derive(Debug, Clone)]
pub struct PageParser {
    urls: SiteUrls,
    not_found_heading: String,
}

impl PageParser {
    pub fn new(urls: SiteUrls, not_found_heading: impl Into<String>) -> Self {
        Self {
            urls,
            not_found_heading: not_found_heading.into(),
        }
    }

    /// Whether a profile page shows a real profile
    ///
    /// # Example
    ///
    /// ```
    /// use filmow_exporter::crawler::PageParser;
    /// use filmow_exporter::url::SiteUrls;
    ///
    /// let parser = PageParser::new(SiteUrls::new("https://filmow.com").unwrap(), "Not found");
    /// assert!(!parser.profile_exists("<html><body><h1>Not found</h1></body></html>"));
    /// assert!(parser.profile_exists("<html><body><h1>imp2</h1></body></html>"));
    /// ```
    pub fn profile_exists(&self, html: &str) -> bool {
        !self.is_not_found(&Html::parse_document(html))
    }

    /// Number of listing pages announced by a listing page's pagination control
    ///
    /// Never fails: any structural anomaly yields one page, and the not-found
    /// heading is ignored.
    pub fn parse_page_count(&self, html: &str) -> u32 {
        self.page_count(&Html::parse_document(html))
    }

    /// Movie entries of a listing page, or `None` when it shows the not-found heading
    pub fn parse_listing(&self, html: &str) -> Option<Listing> {
        let document = Html::parse_document(html);
        if self.is_not_found(&document) {
            None
        } else {
            Some(self.listing(&document))
        }
    }

    /// Resolves every detail field independently
    pub fn parse_detail(&self, html: &str) -> MovieDetails {
        let document = Html::parse_document(html);
        MovieDetails {
            title: resolve_field(&document, TITLE_STRATEGIES),
            director: resolve_field(&document, DIRECTOR_STRATEGIES),
            year: resolve_field(&document, YEAR_STRATEGIES),
        }
    }

    /// True when the top-level heading equals the not-found heading
    fn is_not_found(&self, document: &Html) -> bool {
        first_text(document, "h1").is_some_and(|text| text.trim() == self.not_found_heading)
    }

    /// Page index encoded in the second-to-last item of the pagination list
    ///
    /// Falls back to 1 when the control, its list or the link is missing, or when
    /// the index does not parse.
    fn page_count(&self, document: &Html) -> u32 {
        self.pagination_target(document)
            .filter(|&pages| pages >= 1)
            .unwrap_or(1)
    }

    fn pagination_target(&self, document: &Html) -> Option<u32> {
        let pagination = select_first(document.root_element(), "div.pagination")?;
        let list = select_first(pagination, "ul")?;

        let items: Vec<ElementRef> = list.children().filter_map(ElementRef::wrap).collect();
        let target = items.len().checked_sub(2).map(|index| items[index])?;

        let link = if target.value().name() == "a" {
            Some(target)
        } else {
            select_first(target, "a[href]")
        };
        let href = link?.value().attr("href")?;

        self.urls.page_index(href)
    }

    /// One stub per movie entry, in document order
    fn listing(&self, document: &Html) -> Listing {
        let mut listing = Listing::default();
        let Ok(entry_selector) = Selector::parse("li.movie_list_item") else {
            return listing;
        };

        for entry in document.select(&entry_selector) {
            match self.entry_link(entry) {
                Some(detail_url) => listing.stubs.push(MovieStub {
                    detail_url,
                    rating: entry_rating(entry),
                }),
                None => listing.skipped += 1,
            }
        }

        listing
    }

    fn entry_link(&self, entry: ElementRef) -> Option<Url> {
        ENTRY_LINK_SELECTORS.iter().find_map(|css| {
            select_first(entry, css)
                .and_then(|anchor| anchor.value().attr("href"))
                .and_then(|href| self.urls.resolve(href))
        })
    }
}

/// Rating token of a listing entry: the second whitespace-separated word of the
/// star-rating label ("Nota 4.5 estrelas" -> "4.5")
fn entry_rating(entry: ElementRef) -> Option<String> {
    let stars = select_first(entry, "span.star-rating")?;
    let label = RATING_ATTRIBUTES
        .iter()
        .find_map(|attribute| stars.value().attr(attribute))?;
    label.split_whitespace().nth(1).map(str::to_string)
}

/// First non-empty result of the strategies, in priority order
fn resolve_field(document: &Html, strategies: &[FieldStrategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy(document))
}

fn original_title(document: &Html) -> Option<String> {
    first_text(document, "h2.movie-original-title").and_then(trimmed)
}

fn page_heading(document: &Html) -> Option<String> {
    first_text(document, "h1").and_then(trimmed)
}

fn lead_director(document: &Html) -> Option<String> {
    let director = select_first(document.root_element(), r#"span[itemprop="director"]"#)?;
    let name = select_first(director, "strong")?;
    non_blank(name.text().collect())
}

fn directors_list(document: &Html) -> Option<String> {
    first_text(document, r#"span[itemprop="directors"]"#).and_then(trimmed)
}

fn release_year(document: &Html) -> Option<String> {
    first_text(document, "small.release").and_then(non_blank)
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    select_first(document.root_element(), css).map(|element| element.text().collect())
}

fn trimmed(text: String) -> Option<String> {
    non_blank(text.trim().to_string())
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

//! Client-side search shared by every catalog listing.
//!
//! A record matches when any of its searchable fields contains the query text
//! as a case-insensitive substring and, when a facet is selected, its facet
//! field equals the facet value exactly. Fields are tested one at a time so a
//! query can never match across the boundary between two fields. Results keep
//! the original collection order.

/// Fields a record exposes to free-text search and facet selection.
pub trait Searchable {
    /// Every field the text query is tested against, in any order.
    fn search_fields(&self) -> Vec<&str>;

    /// Value compared against a selected facet; `None` never matches one.
    fn facet(&self) -> Option<&str> {
        None
    }
}

/// Categorical filter applied alongside the text query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Facet {
    #[default]
    All,
    Value(String),
}

impl Facet {
    /// Sentinel the listing dropdowns use for "no facet".
    pub const ALL_SENTINEL: &'static str = "all";

    /// Empty input and the literal `all` sentinel select everything. Any other
    /// value, including `ALL`, is kept as given and compared exactly.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() || raw == Self::ALL_SENTINEL {
            Facet::All
        } else {
            Facet::Value(raw.to_string())
        }
    }

    pub fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Facet::All => true,
            Facet::Value(expected) => value == Some(expected.as_str()),
        }
    }
}

/// Free-text query plus optional facet.
#[derive(Clone, Debug, Default)]
pub struct FilterQuery {
    text: String,
    needle: String,
    facet: Facet,
}

impl FilterQuery {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let needle = text.to_lowercase();
        Self {
            text,
            needle,
            facet: Facet::All,
        }
    }

    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facet = facet;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn facet(&self) -> &Facet {
        &self.facet
    }

    /// Whether a single record passes both the text and the facet test.
    pub fn matches<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        if !self.facet.admits(item.facet()) {
            return false;
        }
        if self.needle.is_empty() {
            return true;
        }
        item.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// Outcome of a search, with an explicit empty case for the "no results" view.
#[derive(Debug)]
pub enum Listing<'a, T> {
    Matches(Vec<&'a T>),
    NoResults,
}

impl<'a, T> Listing<'a, T> {
    pub fn len(&self) -> usize {
        match self {
            Listing::Matches(items) => items.len(),
            Listing::NoResults => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> &[&'a T] {
        match self {
            Listing::Matches(items) => items,
            Listing::NoResults => &[],
        }
    }
}

/// Ordered subsequence of `items` accepted by `query`.
pub fn filter<'a, T, I>(items: I, query: &FilterQuery) -> Vec<&'a T>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(|item| query.matches(*item))
        .collect()
}

/// Like [`filter`], but reports an empty result as [`Listing::NoResults`].
pub fn search<'a, T, I>(items: I, query: &FilterQuery) -> Listing<'a, T>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let matches = filter(items, query);
    if matches.is_empty() {
        Listing::NoResults
    } else {
        Listing::Matches(matches)
    }
}

/// Distinct facet values in first-seen order, for populating facet pickers.
pub fn facet_values<'a, T, I>(items: I) -> Vec<&'a str>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut values: Vec<&'a str> = Vec::new();
    for item in items {
        if let Some(value) = item.facet() {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record {
        name: &'static str,
        tags: Vec<&'static str>,
        os: &'static str,
    }

    impl Searchable for Record {
        fn search_fields(&self) -> Vec<&str> {
            let mut fields = vec![self.name];
            fields.extend(self.tags.iter().copied());
            fields
        }

        fn facet(&self) -> Option<&str> {
            Some(self.os)
        }
    }

    fn emulators() -> Vec<Record> {
        vec![
            Record {
                name: "RPCS3",
                tags: vec!["PS3"],
                os: "Windows",
            },
            Record {
                name: "Dolphin",
                tags: vec!["GC", "Wii"],
                os: "Linux",
            },
        ]
    }

    fn names(items: &[&Record]) -> Vec<&'static str> {
        items.iter().map(|r| r.name).collect()
    }

    #[test]
    fn text_query_is_case_insensitive() {
        let items = emulators();
        let hits = filter(&items, &FilterQuery::new("ps3"));
        assert_eq!(names(&hits), vec!["RPCS3"]);
    }

    #[test]
    fn empty_query_keeps_everything_in_order() {
        let items = emulators();
        let hits = filter(&items, &FilterQuery::new(""));
        assert_eq!(names(&hits), vec!["RPCS3", "Dolphin"]);
    }

    #[test]
    fn unmatched_query_yields_no_results() {
        let items = emulators();
        assert!(filter(&items, &FilterQuery::new("xbox")).is_empty());
        let listing = search(&items, &FilterQuery::new("xbox"));
        assert!(listing.is_empty());
        assert_eq!(listing.len(), 0);
        assert!(listing.items().is_empty());
    }

    #[test]
    fn facet_restricts_to_exact_value() {
        let mut items = emulators();
        items.push(Record {
            name: "Cemu",
            tags: vec!["Wii U"],
            os: "Windows",
        });
        let query = FilterQuery::new("").with_facet(Facet::parse("Windows"));
        let hits = filter(&items, &query);
        assert_eq!(names(&hits), vec!["RPCS3", "Cemu"]);

        let lower = FilterQuery::new("").with_facet(Facet::Value("windows".into()));
        assert!(filter(&items, &lower).is_empty());
    }

    #[test]
    fn facet_and_text_combine() {
        let items = emulators();
        let query = FilterQuery::new("wii").with_facet(Facet::parse("Windows"));
        assert!(filter(&items, &query).is_empty());
        let query = FilterQuery::new("wii").with_facet(Facet::parse("Linux"));
        assert_eq!(names(&filter(&items, &query)), vec!["Dolphin"]);
    }

    #[test]
    fn fields_are_not_concatenated() {
        let items = emulators();
        // "Dolphin" + "GC" would contain "ngc" if the fields were joined.
        assert!(filter(&items, &FilterQuery::new("ngc")).is_empty());
        assert!(filter(&items, &FilterQuery::new("dolphingc")).is_empty());
    }

    #[test]
    fn all_sentinel_and_blank_select_everything() {
        assert_eq!(Facet::parse("all"), Facet::All);
        assert_eq!(Facet::parse(""), Facet::All);
        assert_eq!(Facet::parse("Sony"), Facet::Value("Sony".into()));
        assert!(Facet::All.admits(None));
        assert!(!Facet::Value("Sony".into()).admits(None));
    }

    #[test]
    fn sentinel_is_matched_literally() {
        assert_eq!(Facet::parse("ALL"), Facet::Value("ALL".into()));
        assert_eq!(Facet::parse(" all"), Facet::Value(" all".into()));
        assert_eq!(Facet::parse(" Sony "), Facet::Value(" Sony ".into()));

        let items = emulators();
        let query = FilterQuery::new("").with_facet(Facet::parse("ALL"));
        assert!(search(&items, &query).is_empty());
    }

    #[test]
    fn listing_emptiness_follows_its_length() {
        let listing: Listing<'_, Record> = Listing::Matches(Vec::new());
        assert_eq!(listing.len(), 0);
        assert!(listing.is_empty());

        let items = emulators();
        let listing = search(&items, &FilterQuery::new("dolphin"));
        assert!(!listing.is_empty());
        assert_eq!(listing.len(), 1);
    }

    #[test]
    fn facet_values_are_distinct_in_first_seen_order() {
        let mut items = emulators();
        items.push(Record {
            name: "Cemu",
            tags: vec![],
            os: "Windows",
        });
        assert_eq!(facet_values(&items), vec!["Windows", "Linux"]);
    }
}

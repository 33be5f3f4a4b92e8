use edit_distance::edit_distance;
use itertools::Itertools;

/// Up to five names closest (by edit distance) to one that wasn't found.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NearestMatches<T>(Vec<T>);

impl<T> Default for NearestMatches<T> {
    fn default() -> Self {
        Self(vec![])
    }
}

impl<T> NearestMatches<T> {
    pub fn map<T2>(self, f: impl Fn(T) -> T2) -> NearestMatches<T2> {
        NearestMatches(self.0.into_iter().map(f).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn inner(self) -> Vec<T> {
        self.0
    }
}

impl<'a> NearestMatches<&'a str> {
    /// Find the nearest matches to `query` among `items`.
    ///
    /// Ties are broken alphabetically so the suggestions are deterministic.
    pub fn new_nearest_strs(query: &str, items: impl Iterator<Item = &'a str>) -> Self {
        let nearest_matches: Vec<_> = items
            .map(|item| (edit_distance(query, item), item))
            .k_smallest(5)
            .map(|(_, item)| item)
            .collect();
        Self(nearest_matches)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for NearestMatches<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "none")
        } else {
            self.0
                .iter()
                .format_with(", ", |e, f| f(&format_args!("'{e}'")))
                .fmt(f)
        }
    }
}

impl<T> From<Vec<T>> for NearestMatches<T> {
    fn from(matches: Vec<T>) -> Self {
        Self(matches)
    }
}

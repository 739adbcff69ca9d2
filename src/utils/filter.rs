// src/utils/filter.rs

/// A record that can be matched by the dashboard search box.
pub trait Searchable {
    /// Fields compared against the search term.
    fn search_fields(&self) -> Vec<String>;
}

/// Case-insensitive substring filter over in-memory records.
///
/// An empty or whitespace-only term returns every item.
pub fn filter_by_term<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        })
        .collect()
}

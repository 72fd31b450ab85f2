use crate::catalog::Catalog;
use crate::models::{SearchFilters, Title, TitleId};
use std::collections::BTreeMap;
use tracing::debug;

pub const SIMILAR_LIMIT: usize = 6;

/// Read-only lookups over a borrowed catalog.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> QueryEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn find_by_id(&self, id: TitleId) -> Option<&'a Title> {
        self.catalog.titles().iter().find(|t| t.id == id)
    }

    /// Case-insensitive substring search over title, description, genres and
    /// cast, narrowed by `filters`. Results keep catalog order.
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<&'a Title> {
        let needle = query.to_lowercase();
        let results: Vec<&Title> = self
            .catalog
            .titles()
            .iter()
            .filter(|t| needle.is_empty() || matches_text(t, &needle))
            .filter(|t| filters.matches(t))
            .collect();

        debug!(query, ?filters, results = results.len(), "Search completed");
        results
    }

    /// Titles sharing at least one genre with `id`, excluding itself.
    pub fn similar_titles(&self, id: TitleId) -> Vec<&'a Title> {
        let Some(source) = self.find_by_id(id) else {
            debug!(id, "Similar titles requested for unknown title");
            return Vec::new();
        };

        self.catalog
            .titles()
            .iter()
            .filter(|t| t.id != source.id && t.shares_genre_with(source))
            .take(SIMILAR_LIMIT)
            .collect()
    }

    pub fn trending(&self) -> Vec<&'a Title> {
        self.catalog.trending()
    }

    pub fn top_rated(&self) -> Vec<&'a Title> {
        self.catalog.top_rated()
    }

    pub fn new_releases(&self) -> Vec<&'a Title> {
        self.catalog.new_releases()
    }

    pub fn by_genre(&self) -> BTreeMap<&'a str, Vec<&'a Title>> {
        self.catalog.by_genre()
    }

    pub fn all_genres(&self) -> Vec<&'a str> {
        self.catalog.genres()
    }

    pub fn all_years(&self) -> &'a [i32] {
        self.catalog.years()
    }

    /// Catalog titles whose id appears in `ids`, in catalog order.
    pub fn titles_in(&self, ids: &[TitleId]) -> Vec<&'a Title> {
        self.catalog
            .titles()
            .iter()
            .filter(|t| ids.contains(&t.id))
            .collect()
    }
}

fn matches_text(title: &Title, needle: &str) -> bool {
    title.title.to_lowercase().contains(needle)
        || title
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || title.genre.iter().any(|g| g.to_lowercase().contains(needle))
        || title.cast.iter().any(|c| c.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TitleType;
    use serde_json::json;

    fn small_catalog() -> Catalog {
        Catalog::from_json(
            &json!([
                {"id": 1, "title": "Alpha", "type": "movie", "year": 2001, "rating": 9.0, "genre": ["Action"]},
                {"id": 2, "title": "Beta", "type": "movie", "year": 2003, "rating": 7.0, "genre": ["Action"]},
                {"id": 3, "title": "Gamma", "type": "movie", "year": 2002, "rating": 8.0, "genre": ["Drama"]}
            ])
            .to_string(),
        )
        .unwrap()
    }

    fn ids(titles: &[&Title]) -> Vec<TitleId> {
        titles.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_three_title_scenario() {
        let catalog = small_catalog();
        let engine = QueryEngine::new(&catalog);

        assert_eq!(ids(&engine.similar_titles(1)), vec![2]);
        assert_eq!(ids(&engine.trending()), vec![1, 3, 2]);
        assert_eq!(ids(&engine.top_rated()), vec![1]);
        assert_eq!(ids(&engine.new_releases()), vec![2, 3, 1]);
    }

    #[test]
    fn test_find_by_id() {
        let catalog = small_catalog();
        let engine = QueryEngine::new(&catalog);
        assert_eq!(engine.find_by_id(3).map(|t| t.title.as_str()), Some("Gamma"));
        assert!(engine.find_by_id(42).is_none());
    }

    #[test]
    fn test_empty_search_returns_full_catalog_in_order() {
        let catalog = Catalog::bundled().unwrap();
        let engine = QueryEngine::new(&catalog);

        let all = engine.search("", &SearchFilters::default());
        let expected: Vec<TitleId> = catalog.titles().iter().map(|t| t.id).collect();
        assert_eq!(ids(&all), expected);
    }

    #[test]
    fn test_nan_rating_floor_searches_like_no_floor() {
        let catalog = Catalog::bundled().unwrap();
        let engine = QueryEngine::new(&catalog);
        let filters = SearchFilters {
            min_rating: Some(f32::NAN),
            ..Default::default()
        };

        let unfiltered = engine.search("", &SearchFilters::default());
        assert_eq!(ids(&engine.search("", &filters)), ids(&unfiltered));
    }

    #[test]
    fn test_search_without_match_is_empty() {
        let catalog = Catalog::bundled().unwrap();
        let engine = QueryEngine::new(&catalog);
        assert!(engine.search("zzz-no-match", &SearchFilters::default()).is_empty());
    }

    #[test]
    fn test_search_matches_cast_and_description_case_insensitively() {
        let catalog = Catalog::bundled().unwrap();
        let engine = QueryEngine::new(&catalog);

        let by_cast = engine.search("tom hardy", &SearchFilters::default());
        assert_eq!(ids(&by_cast), vec![1, 15]);

        let by_plot = engine.search("WORMHOLE", &SearchFilters::default());
        assert_eq!(ids(&by_plot), vec![5]);
    }

    #[test]
    fn test_search_matches_genre_substring() {
        let catalog = small_catalog();
        let engine = QueryEngine::new(&catalog);
        assert_eq!(ids(&engine.search("dram", &SearchFilters::default())), vec![3]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let catalog = Catalog::bundled().unwrap();
        let engine = QueryEngine::new(&catalog);
        let filters = SearchFilters {
            title_type: Some(TitleType::Movie),
            min_rating: Some(8.0),
            ..Default::default()
        };

        let results = engine.search("", &filters);
        assert!(!results.is_empty());
        assert!(results
            .iter()
            .all(|t| t.title_type == TitleType::Movie && t.rating >= 8.0));
    }

    #[test]
    fn test_genre_filter_is_exact() {
        let catalog = small_catalog();
        let engine = QueryEngine::new(&catalog);

        let exact = SearchFilters {
            genre: Some("action".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&engine.search("", &exact)), vec![1, 2]);

        let partial = SearchFilters {
            genre: Some("act".to_string()),
            ..Default::default()
        };
        assert!(engine.search("", &partial).is_empty());
    }

    #[test]
    fn test_year_filter_combines_with_query() {
        let catalog = small_catalog();
        let engine = QueryEngine::new(&catalog);
        let filters = SearchFilters {
            year: Some(2003),
            ..Default::default()
        };
        assert_eq!(ids(&engine.search("a", &filters)), vec![2]);
        assert!(engine.search("gamma", &filters).is_empty());
    }

    #[test]
    fn test_similar_titles_bounds() {
        let catalog = Catalog::bundled().unwrap();
        let engine = QueryEngine::new(&catalog);

        for title in catalog.titles() {
            let similar = engine.similar_titles(title.id);
            assert!(similar.len() <= SIMILAR_LIMIT);
            assert!(similar.iter().all(|t| t.id != title.id));
            assert!(similar.iter().all(|t| t.shares_genre_with(title)));
        }
        assert!(engine.similar_titles(999).is_empty());
    }

    #[test]
    fn test_trending_and_new_releases_are_sorted() {
        let catalog = Catalog::bundled().unwrap();
        let engine = QueryEngine::new(&catalog);

        let trending = engine.trending();
        assert_eq!(trending.len(), 8);
        assert!(trending.windows(2).all(|w| w[0].rating >= w[1].rating));

        let new_releases = engine.new_releases();
        assert_eq!(new_releases.len(), 8);
        assert!(new_releases.windows(2).all(|w| w[0].year >= w[1].year));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = Catalog::from_json(
            &json!([
                {"id": 5, "title": "E", "type": "movie", "year": 2020, "rating": 8.0, "genre": ["Drama"]},
                {"id": 4, "title": "D", "type": "movie", "year": 2020, "rating": 8.0, "genre": ["Drama"]},
                {"id": 6, "title": "F", "type": "movie", "year": 2021, "rating": 9.0, "genre": ["Drama"]}
            ])
            .to_string(),
        )
        .unwrap();
        let engine = QueryEngine::new(&catalog);

        assert_eq!(ids(&engine.trending()), vec![6, 5, 4]);
        assert_eq!(ids(&engine.new_releases()), vec![6, 5, 4]);
    }

    #[test]
    fn test_top_rated_threshold() {
        let catalog = Catalog::bundled().unwrap();
        let engine = QueryEngine::new(&catalog);
        let top = engine.top_rated();
        assert!(top.iter().all(|t| t.rating >= 8.5));
        let expected = catalog.titles().iter().filter(|t| t.rating >= 8.5).count();
        assert_eq!(top.len(), expected);
    }

    #[test]
    fn test_titles_in_skips_unknown_ids() {
        let catalog = small_catalog();
        let engine = QueryEngine::new(&catalog);
        assert_eq!(ids(&engine.titles_in(&[3, 99, 1])), vec![1, 3]);
    }

    #[test]
    fn test_genres_and_years() {
        let catalog = small_catalog();
        let engine = QueryEngine::new(&catalog);
        assert_eq!(engine.all_genres(), vec!["Action", "Drama"]);
        assert_eq!(engine.all_years(), &[2003, 2002, 2001]);
    }
}

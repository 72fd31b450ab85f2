//! The immutable title catalog.
//!
//! A [`Catalog`] is validated once when it is built and never changes
//! afterwards, so the derived categories (trending, top rated, new releases,
//! genre buckets) are computed up front and kept alongside the titles.

use crate::models::{Title, TitleId, TitleType};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info, instrument};

const BUNDLED_TITLES: &str = include_str!("titles.json");

pub const TRENDING_LIMIT: usize = 8;
pub const NEW_RELEASES_LIMIT: usize = 8;
pub const TOP_RATED_THRESHOLD: f32 = 8.5;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate title id {0}")]
    DuplicateId(TitleId),

    #[error("title {0} has no genre")]
    MissingGenre(TitleId),

    #[error("title {id} has rating {rating} outside 0-10")]
    RatingOutOfRange { id: TitleId, rating: f32 },

    #[error("movie {0} carries series-only fields")]
    SeriesFieldsOnMovie(TitleId),
}

/// Index lists into `Catalog::titles`, computed once per catalog.
#[derive(Debug, Clone)]
struct Categories {
    trending: Vec<usize>,
    top_rated: Vec<usize>,
    new_releases: Vec<usize>,
    by_genre: BTreeMap<String, Vec<usize>>,
    years: Vec<i32>,
}

impl Categories {
    fn compute(titles: &[Title]) -> Self {
        let mut by_rating: Vec<usize> = (0..titles.len()).collect();
        // sort_by is stable, so equal ratings keep catalog order
        by_rating.sort_by(|&a, &b| titles[b].rating.total_cmp(&titles[a].rating));
        by_rating.truncate(TRENDING_LIMIT);

        let mut by_year: Vec<usize> = (0..titles.len()).collect();
        by_year.sort_by(|&a, &b| titles[b].year.cmp(&titles[a].year));
        by_year.truncate(NEW_RELEASES_LIMIT);

        let top_rated = (0..titles.len())
            .filter(|&i| titles[i].rating >= TOP_RATED_THRESHOLD)
            .collect();

        let mut by_genre: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, title) in titles.iter().enumerate() {
            for genre in &title.genre {
                let bucket = by_genre.entry(genre.clone()).or_default();
                if bucket.last() != Some(&i) {
                    bucket.push(i);
                }
            }
        }

        let years: BTreeSet<i32> = titles.iter().map(|t| t.year).collect();

        Self {
            trending: by_rating,
            top_rated,
            new_releases: by_year,
            by_genre,
            years: years.into_iter().rev().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    titles: Vec<Title>,
    categories: Categories,
}

impl Catalog {
    pub fn new(titles: Vec<Title>) -> Result<Self, CatalogError> {
        validate(&titles)?;
        let categories = Categories::compute(&titles);
        debug!(
            titles = titles.len(),
            genres = categories.by_genre.len(),
            "Catalog categories computed"
        );
        Ok(Self { titles, categories })
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_TITLES)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let titles: Vec<Title> = serde_json::from_str(json)?;
        Self::new(titles)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let titles: Vec<Title> = serde_yaml::from_str(yaml)?;
        Self::new(titles)
    }

    /// Loads a `.yaml`/`.yml` file as YAML and anything else as JSON.
    #[instrument]
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let catalog = if is_yaml {
            Self::from_yaml(&content)?
        } else {
            Self::from_json(&content)?
        };
        info!("Loaded {} titles from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn trending(&self) -> Vec<&Title> {
        self.resolve(&self.categories.trending)
    }

    pub fn top_rated(&self) -> Vec<&Title> {
        self.resolve(&self.categories.top_rated)
    }

    pub fn new_releases(&self) -> Vec<&Title> {
        self.resolve(&self.categories.new_releases)
    }

    pub fn by_genre(&self) -> BTreeMap<&str, Vec<&Title>> {
        self.categories
            .by_genre
            .iter()
            .map(|(genre, indices)| (genre.as_str(), self.resolve(indices)))
            .collect()
    }

    /// Distinct genres, ascending.
    pub fn genres(&self) -> Vec<&str> {
        self.categories.by_genre.keys().map(String::as_str).collect()
    }

    /// Distinct release years, newest first.
    pub fn years(&self) -> &[i32] {
        &self.categories.years
    }

    fn resolve(&self, indices: &[usize]) -> Vec<&Title> {
        indices.iter().map(|&i| &self.titles[i]).collect()
    }
}

fn validate(titles: &[Title]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(titles.len());
    for title in titles {
        if !seen.insert(title.id) {
            return Err(CatalogError::DuplicateId(title.id));
        }
        if title.genre.is_empty() {
            return Err(CatalogError::MissingGenre(title.id));
        }
        if !(0.0..=10.0).contains(&title.rating) {
            return Err(CatalogError::RatingOutOfRange {
                id: title.id,
                rating: title.rating,
            });
        }
        if title.title_type == TitleType::Movie
            && (title.seasons.is_some() || title.episodes.is_some() || title.status.is_some())
        {
            return Err(CatalogError::SeriesFieldsOnMovie(title.id));
        }
    }
    Ok(())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TitleId = u32;
pub type CommentId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    pub id: TitleId,
    pub title: String,
    #[serde(rename = "type")]
    pub title_type: TitleType,
    pub year: i32,
    pub rating: f32,
    pub genre: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, alias = "plot", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub awards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer: Option<String>,
}

impl Title {
    pub fn has_genre(&self, genre: &str) -> bool {
        let genre = genre.to_lowercase();
        self.genre.iter().any(|g| g.to_lowercase() == genre)
    }

    pub fn shares_genre_with(&self, other: &Title) -> bool {
        self.genre.iter().any(|g| other.genre.contains(g))
    }

    /// Creator for series, director for movies, whichever is present.
    pub fn made_by(&self) -> Option<&str> {
        self.director.as_deref().or(self.creator.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TitleType {
    Movie,
    Series,
}

impl fmt::Display for TitleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleType::Movie => write!(f, "movie"),
            TitleType::Series => write!(f, "series"),
        }
    }
}

impl FromStr for TitleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(TitleType::Movie),
            "series" => Ok(TitleType::Series),
            other => Err(format!("unknown title type '{}', expected movie or series", other)),
        }
    }
}

/// Conjunctive filters applied after the text match of a search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub title_type: Option<TitleType>,
    pub year: Option<i32>,
    pub min_rating: Option<f32>,
    pub genre: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.title_type.is_none()
            && self.year.is_none()
            && self.min_rating().is_none()
            && self.genre.as_deref().map_or(true, str::is_empty)
    }

    /// The rating floor, if it is a usable number. NaN and infinities filter nothing.
    pub fn min_rating(&self) -> Option<f32> {
        self.min_rating.filter(|r| r.is_finite())
    }

    pub fn matches(&self, title: &Title) -> bool {
        if let Some(title_type) = self.title_type {
            if title.title_type != title_type {
                return false;
            }
        }
        if let Some(year) = self.year {
            if title.year != year {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating() {
            if title.rating < min_rating {
                return false;
            }
        }
        match self.genre.as_deref() {
            Some(genre) if !genre.is_empty() => title.has_genre(genre),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Like,
    Dislike,
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" | "up" => Ok(Vote::Like),
            "dislike" | "down" => Ok(Vote::Dislike),
            other => Err(format!("unknown vote '{}', expected like or dislike", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
    #[serde(default)]
    pub user_vote: Option<Vote>,
}

impl Comment {
    pub fn score(&self) -> i64 {
        i64::from(self.likes) - i64::from(self.dislikes)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentSort {
    #[default]
    Newest,
    Top,
}

impl FromStr for CommentSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newest" => Ok(CommentSort::Newest),
            "top" => Ok(CommentSort::Top),
            other => Err(format!("unknown sort '{}', expected newest or top", other)),
        }
    }
}

/// Editorial news types
use super::{NewsId, NewsImageId, UserId};
use crate::error::CadenceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visibility of a news article. Rejected articles become private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    #[default]
    Live,
    Private,
}

impl NewsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsStatus::Live => "live",
            NewsStatus::Private => "private",
        }
    }
}

impl fmt::Display for NewsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsStatus {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(NewsStatus::Live),
            "private" => Ok(NewsStatus::Private),
            other => Err(CadenceError::invalid_input(format!(
                "Invalid news status: {other}"
            ))),
        }
    }
}

sqlx_text_enum!(NewsStatus);

/// Fixed set of editorial categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsCategory {
    AlbumRelease,
    SingleRelease,
    ArtistNews,
    ConcertsAndTours,
    MusicAwards,
    MusicCharts,
    MusicReviews,
    Collaborations,
    MusicTrends,
    BehindTheScenes,
    MusicFestivals,
    NewArtistSpotlight,
    MusicTechnology,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 13] = [
        NewsCategory::AlbumRelease,
        NewsCategory::SingleRelease,
        NewsCategory::ArtistNews,
        NewsCategory::ConcertsAndTours,
        NewsCategory::MusicAwards,
        NewsCategory::MusicCharts,
        NewsCategory::MusicReviews,
        NewsCategory::Collaborations,
        NewsCategory::MusicTrends,
        NewsCategory::BehindTheScenes,
        NewsCategory::MusicFestivals,
        NewsCategory::NewArtistSpotlight,
        NewsCategory::MusicTechnology,
    ];

    /// Display label, also the stored value
    pub fn label(&self) -> &'static str {
        match self {
            NewsCategory::AlbumRelease => "Album Release",
            NewsCategory::SingleRelease => "Single Release",
            NewsCategory::ArtistNews => "Artist News",
            NewsCategory::ConcertsAndTours => "Concerts & Tours",
            NewsCategory::MusicAwards => "Music Awards",
            NewsCategory::MusicCharts => "Music Charts",
            NewsCategory::MusicReviews => "Music Reviews",
            NewsCategory::Collaborations => "Collaborations",
            NewsCategory::MusicTrends => "Music Trends",
            NewsCategory::BehindTheScenes => "Behind the Scenes",
            NewsCategory::MusicFestivals => "Music Festivals",
            NewsCategory::NewArtistSpotlight => "New Artist Spotlight",
            NewsCategory::MusicTechnology => "Music Technology",
        }
    }

    /// Exact label match
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct News {
    pub id: NewsId,
    pub title: String,
    pub content: String,
    /// Username of the author at the time of writing
    pub author: String,
    pub category: Option<String>,
    pub user_id: Option<UserId>,
    pub status: NewsStatus,
    pub reviewed: bool,
    pub published_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl News {
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        self.user_id.as_ref() == Some(user_id)
    }
}

#[derive(Debug, Clone)]
pub struct CreateNews {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: Option<NewsCategory>,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateNews {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<NewsCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct NewsImage {
    pub id: NewsImageId,
    pub news_id: NewsId,
    pub image_url: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for category in NewsCategory::ALL {
            assert_eq!(NewsCategory::parse(category.label()), Some(category));
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert_eq!(NewsCategory::parse("Gossip"), None);
        assert_eq!(NewsCategory::parse("album release"), None);
    }

    #[test]
    fn status_defaults_to_live() {
        assert_eq!(NewsStatus::default(), NewsStatus::Live);
        assert_eq!("private".parse::<NewsStatus>().unwrap(), NewsStatus::Private);
    }
}

//! News items and categories as served by the news backend.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category_id: i64,
    #[serde(default)]
    pub author: Option<String>,
    /// Naive ISO timestamp, e.g. `2024-03-01T08:30:00`
    #[serde(default)]
    pub publish_time: Option<NaiveDateTime>,
}

impl NewsItem {
    pub fn display_author(&self) -> &str {
        self.author.as_deref().filter(|a| !a.is_empty()).unwrap_or("-")
    }
}

/// One page of the news list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewsPage {
    pub list: Vec<NewsItem>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Body of `POST /api/news/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewNews {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Body of `PUT /api/news/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl NewsUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category_id.is_none()
            && self.author.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedNews {
    pub id: i64,
}

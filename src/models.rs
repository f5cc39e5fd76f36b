// Data structures shared by the CSV store, the review fetcher and the views

use serde::{Deserialize, Serialize};

// One row: column name -> value, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// A single review returned by the live review source
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")] // Match the upstream library's field names
pub struct ReviewRecord {
    pub review_id: String,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub content: Option<String>,
    pub score: Option<u8>,
    pub thumbs_up_count: Option<u64>,
    pub review_created_version: Option<String>,
    pub at: Option<String>, // "YYYY-MM-DD HH:MM:SS", UTC
    pub reply_content: Option<String>,
    pub replied_at: Option<String>,
    pub app_version: Option<String>,
}

impl ReviewRecord {
    // Flatten into a Record so live and CSV reviews share one view
    pub fn into_record(self) -> Record {
        fn text(value: Option<String>) -> String {
            value.unwrap_or_default()
        }

        let mut record = Record::new();
        record.push("reviewId", self.review_id);
        record.push("userName", text(self.user_name));
        record.push("userImage", text(self.user_image));
        record.push("content", text(self.content));
        record.push("score", self.score.map(|s| s.to_string()).unwrap_or_default());
        record.push(
            "thumbsUpCount",
            self.thumbs_up_count.map(|c| c.to_string()).unwrap_or_default(),
        );
        record.push("reviewCreatedVersion", text(self.review_created_version));
        record.push("at", text(self.at));
        record.push("replyContent", text(self.reply_content));
        record.push("repliedAt", text(self.replied_at));
        record.push("appVersion", text(self.app_version));
        record
    }
}

// Sort orders understood by the review source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    Relevancy,
    Newest,
    Helpfulness,
}

impl ReviewSort {
    // Numeric code used in the batch request payload
    pub fn code(self) -> u8 {
        match self {
            ReviewSort::Relevancy => 1,
            ReviewSort::Newest => 2,
            ReviewSort::Helpfulness => 3,
        }
    }
}

pub const MAX_REVIEW_COUNT: u32 = 100;

// Parameters for one review fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQuery {
    pub app_id: String,
    pub lang: String,
    pub country: String,
    pub sort: ReviewSort,
    pub count: u32,
}

impl ReviewQuery {
    pub fn new(app_id: impl Into<String>) -> Self {
        ReviewQuery {
            app_id: app_id.into(),
            lang: "en".to_string(),
            country: "us".to_string(),
            sort: ReviewSort::Relevancy,
            count: MAX_REVIEW_COUNT,
        }
    }

    pub fn with_sort(mut self, sort: ReviewSort) -> Self {
        self.sort = sort;
        self
    }

    // Clamped to 1..=100, the page size the source allows
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.clamp(1, MAX_REVIEW_COUNT);
        self
    }
}

// Opaque pagination token returned alongside a page of reviews
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(pub String);

// Form posted from the index page
#[derive(Debug, Deserialize)]
pub struct FetchReviewsForm {
    // Field name must match the 'name' attribute in the HTML form input
    pub app_id: Option<String>,
}

// Records laid out for a table: header row plus aligned cells
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RecordTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn from_records(records: &[Record]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.to_string());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();

        RecordTable { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

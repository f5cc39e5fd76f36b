// Live review fetching from the Google Play web endpoint

use crate::models::{ContinuationToken, ReviewQuery, ReviewRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const BATCH_EXECUTE_PATH: &str = "/_/PlayStoreUi/data/batchexecute";
const REVIEWS_RPC_ID: &str = "UsvDTd";
const XSSI_PREFIX: &str = ")]}'";

#[async_trait]
pub trait ReviewFetcher: Send + Sync {
    // Fetches one page of reviews; the token points at the next page
    async fn fetch_reviews(
        &self,
        query: &ReviewQuery,
    ) -> Result<(Vec<ReviewRecord>, Option<ContinuationToken>)>;
}

pub struct GooglePlayFetcher {
    client: Client,
    base_url: String,
}

impl GooglePlayFetcher {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        GooglePlayFetcher { client, base_url }
    }
}

#[async_trait]
impl ReviewFetcher for GooglePlayFetcher {
    async fn fetch_reviews(
        &self,
        query: &ReviewQuery,
    ) -> Result<(Vec<ReviewRecord>, Option<ContinuationToken>)> {
        let url = format!("{}{}", self.base_url, BATCH_EXECUTE_PATH);
        let payload = build_request_payload(query);
        tracing::debug!(app_id = %query.app_id, url = %url, payload = %payload, "Requesting reviews");

        let body = self
            .client
            .post(&url)
            .query(&[("hl", query.lang.as_str()), ("gl", query.country.as_str())])
            .form(&[("f.req", payload.as_str())])
            .send()
            .await
            .with_context(|| format!("Request for reviews of '{}' failed", query.app_id))?
            .error_for_status()
            .with_context(|| format!("Review source rejected request for '{}'", query.app_id))?
            .text()
            .await
            .context("Failed to read review response body")?;

        let (mut reviews, token) = parse_reviews_response(&body)
            .with_context(|| format!("Malformed review response for '{}'", query.app_id))?;
        reviews.truncate(query.count as usize);

        tracing::info!(app_id = %query.app_id, count = reviews.len(), "Fetched reviews");
        Ok((reviews, token))
    }
}

// f.req body for the reviews RPC: [[[rpc, inner, null, "generic"]]], inner being a JSON string
fn build_request_payload(query: &ReviewQuery) -> String {
    let inner = json!([
        null,
        null,
        [2, query.sort.code(), [query.count, null, null], null, []],
        [query.app_id, 7]
    ]);
    json!([[[REVIEWS_RPC_ID, inner.to_string(), null, "generic"]]]).to_string()
}

fn parse_reviews_response(body: &str) -> Result<(Vec<ReviewRecord>, Option<ContinuationToken>)> {
    let json_text = body
        .trim_start()
        .strip_prefix(XSSI_PREFIX)
        .context("Response is missing the batch response prefix")?;
    let envelope: Value =
        serde_json::from_str(json_text.trim()).context("Failed to parse batch response envelope")?;

    let inner = match nested(&envelope, &[0, 2]) {
        Some(Value::String(s)) => s,
        // No payload: the source has no reviews for this query
        Some(Value::Null) => return Ok((Vec::new(), None)),
        _ => anyhow::bail!("Batch response has no review payload"),
    };
    let data: Value = serde_json::from_str(inner).context("Failed to parse review payload")?;

    let reviews = match data.get(0) {
        Some(Value::Array(items)) => items.iter().filter_map(parse_review).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => anyhow::bail!("Unexpected review list shape: {}", other),
    };

    let token = data
        .as_array()
        .filter(|items| items.len() >= 2)
        .and_then(|items| items[items.len() - 2].as_array())
        .and_then(|page_info| page_info.last())
        .and_then(Value::as_str)
        .map(|t| ContinuationToken(t.to_string()));

    Ok((reviews, token))
}

fn parse_review(item: &Value) -> Option<ReviewRecord> {
    let review_id = nested(item, &[0])?.as_str()?.to_string();
    let text = |path: &[usize]| nested(item, path).and_then(Value::as_str).map(str::to_string);
    let timestamp = |path: &[usize]| nested(item, path).and_then(Value::as_i64).and_then(format_timestamp);

    Some(ReviewRecord {
        review_id,
        user_name: text(&[1, 0]),
        user_image: text(&[1, 1, 3, 2]),
        content: text(&[4]),
        score: nested(item, &[2]).and_then(Value::as_u64).and_then(|s| u8::try_from(s).ok()),
        thumbs_up_count: nested(item, &[6]).and_then(Value::as_u64),
        review_created_version: text(&[10]),
        at: timestamp(&[5, 0]),
        reply_content: text(&[7, 1]),
        replied_at: timestamp(&[7, 2, 0]),
        app_version: text(&[10]),
    })
}

fn nested<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, &index| current.get(index))
}

fn format_timestamp(secs: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewSort;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn review_entry(id: &str, score: u64) -> Value {
        json!([
            id,
            ["Ana Souza", [null, null, null, [null, null, "https://img.example/ana.png"]]],
            score,
            null,
            "Transfers are quick",
            [1726900000, 0],
            12,
            [null, "Thanks for the feedback!", [1726990000, 0]],
            null,
            null,
            "5.12.0"
        ])
    }

    fn batch_body(data: Value) -> String {
        let envelope = json!([["wrb.fr", REVIEWS_RPC_ID, data.to_string(), null, null, null, "generic"]]);
        format!(")]}}'\n\n{}", envelope)
    }

    #[test]
    fn payload_embeds_query_as_json_string() {
        let query = ReviewQuery::new("com.bank.mobile").with_sort(ReviewSort::Newest).with_count(40);
        let payload: Value = serde_json::from_str(&build_request_payload(&query)).unwrap();

        assert_eq!(payload[0][0][0], REVIEWS_RPC_ID);
        let inner: Value = serde_json::from_str(payload[0][0][1].as_str().unwrap()).unwrap();
        assert_eq!(inner[2][1], 2);
        assert_eq!(inner[2][2][0], 40);
        assert_eq!(inner[3][0], "com.bank.mobile");
    }

    #[test]
    fn parses_reviews_and_token() {
        let body = batch_body(json!([
            [review_entry("gp:1", 5), review_entry("gp:2", 2)],
            null,
            [null, "next-page-token"],
            null
        ]));

        let (reviews, token) = parse_reviews_response(&body).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(token, Some(ContinuationToken("next-page-token".to_string())));

        let first = &reviews[0];
        assert_eq!(first.review_id, "gp:1");
        assert_eq!(first.user_name.as_deref(), Some("Ana Souza"));
        assert_eq!(first.user_image.as_deref(), Some("https://img.example/ana.png"));
        assert_eq!(first.content.as_deref(), Some("Transfers are quick"));
        assert_eq!(first.score, Some(5));
        assert_eq!(first.thumbs_up_count, Some(12));
        assert_eq!(first.at.as_deref(), Some("2024-09-21 06:26:40"));
        assert_eq!(first.reply_content.as_deref(), Some("Thanks for the feedback!"));
        assert_eq!(first.app_version.as_deref(), Some("5.12.0"));
    }

    #[test]
    fn out_of_range_score_is_dropped() {
        let body = batch_body(json!([[review_entry("gp:1", 300)], [null, "tok"], null]));

        let (reviews, _) = parse_reviews_response(&body).unwrap();
        assert_eq!(reviews[0].review_id, "gp:1");
        assert_eq!(reviews[0].score, None);
    }

    #[test]
    fn null_payload_means_no_reviews() {
        let envelope = json!([["wrb.fr", REVIEWS_RPC_ID, null, null, null, null, "generic"]]);
        let body = format!(")]}}'\n\n{}", envelope);

        let (reviews, token) = parse_reviews_response(&body).unwrap();
        assert!(reviews.is_empty());
        assert!(token.is_none());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_reviews_response("<html>rate limited</html>").is_err());
        assert!(parse_reviews_response(")]}'\n\n{not json").is_err());
    }

    #[tokio::test]
    async fn fetches_from_batch_endpoint() {
        let mock_server = MockServer::start().await;
        let body = batch_body(json!([[review_entry("gp:9", 4)], [null, "tok"], null]));

        Mock::given(method("POST"))
            .and(path(BATCH_EXECUTE_PATH))
            .and(query_param("hl", "en"))
            .and(query_param("gl", "us"))
            .and(body_string_contains("f.req="))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = GooglePlayFetcher::new(Client::new(), mock_server.uri());
        let (reviews, token) = fetcher
            .fetch_reviews(&ReviewQuery::new("com.bank.mobile"))
            .await
            .unwrap();

        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].review_id, "gp:9");
        assert_eq!(token, Some(ContinuationToken("tok".to_string())));
    }

    #[tokio::test]
    async fn truncates_to_requested_count() {
        let mock_server = MockServer::start().await;
        let entries: Vec<Value> = (0..5).map(|i| review_entry(&format!("gp:{i}"), 3)).collect();
        let body = batch_body(json!([entries, [null, "tok"], null]));

        Mock::given(method("POST"))
            .and(path(BATCH_EXECUTE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let fetcher = GooglePlayFetcher::new(Client::new(), mock_server.uri());
        let (reviews, _) = fetcher
            .fetch_reviews(&ReviewQuery::new("com.bank.mobile").with_count(3))
            .await
            .unwrap();
        assert_eq!(reviews.len(), 3);
    }

    #[tokio::test]
    async fn http_error_is_err() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let fetcher = GooglePlayFetcher::new(Client::new(), mock_server.uri());
        assert!(fetcher.fetch_reviews(&ReviewQuery::new("com.bank.mobile")).await.is_err());
    }
}

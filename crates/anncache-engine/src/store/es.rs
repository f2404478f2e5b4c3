//! HTTP client for the document store's REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use anncache_common::Fingerprint;

use crate::error::{QueryError, SlotError};
use crate::store::{DocumentStore, SampledBatch};

/// Default request timeout. Pipeline-sized documents can take a while to
/// score server-side, so this is deliberately generous. Override with
/// `ANNCACHE_HTTP_TIMEOUT_SECS`.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 600;

/// Document store client.
///
/// Bound to one index and one parent document type for the lifetime of a
/// run.
pub struct EsStore {
    client: Client,
    base_url: String,
    index: String,
    parent_type: String,
}

impl EsStore {
    pub fn new(
        base_url: impl Into<String>,
        index: impl Into<String>,
        parent_type: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let timeout_secs = std::env::var("ANNCACHE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into(),
            parent_type: parent_type.into(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/{}/{}/_search", self.base_url, self.index, self.parent_type)
    }

    fn mapping_url(&self, fingerprint: &Fingerprint) -> String {
        format!("{}/{}/_mapping/{}", self.base_url, self.index, fingerprint)
    }
}

/// Filter matching set members that have no child record of the
/// fingerprint type under the parent.
fn uncached_filter(set_id: i64, fingerprint: &Fingerprint) -> Value {
    let no_result = json!({
        "not": {
            "has_child": {
                "type": fingerprint.as_str(),
                "query": { "match_all": {} }
            }
        }
    });
    json!({
        "bool": {
            "must": [
                { "term": { "sets": set_id } },
                no_result
            ]
        }
    })
}

/// Search body combining the uncached filter with randomized scoring, so
/// repeated samples surface different members of the pool. `fields: []`
/// suppresses document bodies; only ids are wanted.
fn sample_body(set_id: i64, fingerprint: &Fingerprint) -> Value {
    json!({
        "query": {
            "function_score": {
                "filter": uncached_filter(set_id, fingerprint),
                "random_score": {}
            }
        },
        "fields": []
    })
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    total: u64,
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
}

#[async_trait]
impl DocumentStore for EsStore {
    async fn sample_uncached(
        &self,
        set_id: i64,
        fingerprint: &Fingerprint,
        size: usize,
    ) -> Result<SampledBatch, QueryError> {
        let response = self
            .client
            .post(self.search_url())
            .query(&[("size", size)])
            .json(&sample_body(set_id, fingerprint))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Backend {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: SearchResponse = response.json().await?;
        let ids = parsed
            .hits
            .hits
            .iter()
            .map(|hit| {
                hit.id.parse::<i64>().map_err(|_| {
                    QueryError::Malformed(format!("non-numeric document id: {}", hit.id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            set_id,
            remaining = parsed.hits.total,
            sampled = ids.len(),
            "sampled uncached items"
        );

        Ok(SampledBatch {
            remaining: parsed.hits.total,
            ids,
        })
    }

    async fn child_mapping_exists(&self, fingerprint: &Fingerprint) -> Result<bool, SlotError> {
        let response = self.client.head(self.mapping_url(fingerprint)).send().await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(SlotError::Rejected {
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    async fn put_child_mapping(&self, fingerprint: &Fingerprint) -> Result<(), SlotError> {
        let body = json!({
            fingerprint.as_str(): {
                "_parent": { "type": self.parent_type }
            }
        });

        let response = self
            .client
            .put(self.mapping_url(fingerprint))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && text.contains("already exists") {
            return Err(SlotError::AlreadyExists(fingerprint.to_string()));
        }

        Err(SlotError::Rejected {
            status: status.as_u16(),
            body: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anncache_common::PipelineSpec;

    fn fingerprint() -> Fingerprint {
        let spec =
            PipelineSpec::new(vec!["tokenize".into(), "lemmatize".into()]).expect("non-empty");
        Fingerprint::derive("article", &spec)
    }

    #[test]
    fn test_uncached_filter_shape() {
        let filter = uncached_filter(42, &fingerprint());

        assert_eq!(filter["bool"]["must"][0]["term"]["sets"], 42);
        let has_child = &filter["bool"]["must"][1]["not"]["has_child"];
        assert_eq!(has_child["type"], "article__tokenize__lemmatize");
        assert!(has_child["query"]["match_all"].is_object());
    }

    #[test]
    fn test_sample_body_randomizes_and_suppresses_fields() {
        let body = sample_body(42, &fingerprint());

        assert!(body["query"]["function_score"]["random_score"].is_object());
        assert!(body["query"]["function_score"]["filter"]["bool"].is_object());
        assert_eq!(body["fields"], json!([]));
    }

    #[test]
    fn test_urls() {
        let store = EsStore::new("http://localhost:9200/", "amcat", "article").expect("client");
        assert_eq!(store.search_url(), "http://localhost:9200/amcat/article/_search");
        assert_eq!(
            store.mapping_url(&fingerprint()),
            "http://localhost:9200/amcat/_mapping/article__tokenize__lemmatize"
        );
    }
}

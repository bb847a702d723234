//! Sanity HTTP APIクライアント
//!
//! Sanity Content APIに対するGROQクエリとミューテーションの実行を提供する。
//! - クエリ: `GET /v{version}/data/query/{dataset}`（`$`パラメータはJSONエンコード）
//! - ミューテーション: `POST /v{version}/data/mutate/{dataset}?returnDocuments=true`
//!
//! 失敗時の再試行は行わない。エラーは呼び出し元へそのまま伝搬する。

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::config::{SanityConfig, SANITY_API_VERSION};

/// Sanityクライアントエラー
#[derive(Debug, Error)]
pub enum SanityClientError {
    /// エンドポイントURLの構築に失敗
    #[error("エンドポイントURLの構築に失敗: {0}")]
    Endpoint(#[from] url::ParseError),

    /// HTTP通信エラー
    #[error("Sanity APIリクエストに失敗: {0}")]
    Transport(String),

    /// APIがエラーステータスを返却
    #[error("Sanity APIエラー (status {status}): {body}")]
    Api { status: u16, body: String },

    /// レスポンスの解析に失敗
    #[error("Sanity APIレスポンスの解析に失敗: {0}")]
    MalformedResponse(String),
}

/// Sanity HTTP APIクライアント
///
/// reqwestのコネクションプールを再利用するため、リクエストごとではなく
/// ハンドラー初期化時に1度だけ構築する。
#[derive(Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    config: SanityConfig,
}

impl std::fmt::Debug for SanityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanityClient")
            .field("project_id", &self.config.project_id())
            .field("dataset", &self.config.dataset())
            .finish_non_exhaustive()
    }
}

impl SanityClient {
    /// 新しいSanityClientを作成
    pub fn new(config: SanityConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// データセット操作のエンドポイントURLを構築
    ///
    /// `action`は`query`または`mutate`。
    fn endpoint(&self, action: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "https://{}.api.sanity.io/v{}/data/{}/{}",
            self.config.project_id(),
            SANITY_API_VERSION,
            action,
            self.config.dataset()
        ))
    }

    /// GROQクエリを実行して`result`フィールドを返す
    ///
    /// # 引数
    /// * `groq` - GROQクエリ文字列
    /// * `params` - クエリパラメータ（名前は`$`プレフィックスなし、値はJSONエンコードされる）
    ///
    /// # 戻り値
    /// クエリ結果のJSON値。該当なしの場合は`Value::Null`。
    pub async fn query(
        &self,
        groq: &str,
        params: &[(&str, Value)],
    ) -> Result<Value, SanityClientError> {
        let mut url = self.endpoint("query")?;
        {
            let mut query_pairs = url.query_pairs_mut();
            query_pairs.append_pair("query", groq);
            for (name, value) in params {
                // Sanityのクエリパラメータ値はJSONエンコードで渡す
                query_pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }

        debug!(groq = %groq, "GROQクエリ実行");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.config.token())
            .send()
            .await
            .map_err(|e| SanityClientError::Transport(e.to_string()))?;

        let payload = Self::parse_response(response).await?;
        Ok(payload.get("result").cloned().unwrap_or(Value::Null))
    }

    /// ミューテーションを実行して`results`配列を返す
    ///
    /// # 引数
    /// * `mutations` - ミューテーションのJSON配列
    ///   （例: `[{"create": {...}}]`、`[{"patch": {"id": ..., "set": {...}}}]`）
    pub async fn mutate(&self, mutations: Value) -> Result<Vec<Value>, SanityClientError> {
        let mut url = self.endpoint("mutate")?;
        url.query_pairs_mut().append_pair("returnDocuments", "true");

        let body = serde_json::json!({ "mutations": mutations });

        let response = self
            .http
            .post(url)
            .bearer_auth(self.config.token())
            .json(&body)
            .send()
            .await
            .map_err(|e| SanityClientError::Transport(e.to_string()))?;

        let payload = Self::parse_response(response).await?;
        match payload.get("results") {
            Some(Value::Array(results)) => Ok(results.clone()),
            _ => Err(SanityClientError::MalformedResponse(
                "results array is missing".to_string(),
            )),
        }
    }

    /// レスポンスのステータス検査とJSON解析
    async fn parse_response(response: reqwest::Response) -> Result<Value, SanityClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SanityClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Sanity APIエラーレスポンス");
            return Err(SanityClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| SanityClientError::MalformedResponse(e.to_string()))
    }
}

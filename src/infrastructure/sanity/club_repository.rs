//! クラブリポジトリ - Sanityを使用したクラブドキュメントのCRUD
//!
//! すべての読み書きはテナント別ドキュメント種別タグでスコープする。
//! 例外は`fetch_document_type`のみで、テナント分離チェックのために
//! あえてスコープなしで種別タグを取得する。

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use super::client::{SanityClient, SanityClientError};
use crate::domain::club::{Club, ClubSlug, CreateClubInput, UpdateClubInput};

/// クラブリポジトリのエラー型
#[derive(Debug, Error)]
pub enum ClubRepositoryError {
    /// 対象IDのドキュメントが存在しない
    #[error("club not found: {0}")]
    NotFound(String),

    /// Sanity APIエラー
    #[error(transparent)]
    Client(#[from] SanityClientError),

    /// ドキュメントの組み立て・解析に失敗
    #[error("ドキュメントの解析に失敗: {0}")]
    MalformedDocument(String),
}

/// クラブリポジトリトレイト（テスト用の抽象化）
#[async_trait]
pub trait ClubRepository: Send + Sync {
    /// クラブドキュメントを作成する
    ///
    /// # 引数
    /// * `document_type` - テナント別ドキュメント種別タグ（`club_<domain>`）
    /// * `input` - 作成入力
    /// * `slug` - 生成済みスラッグ（作成後は不変）
    async fn create_club(
        &self,
        document_type: &str,
        input: &CreateClubInput,
        slug: ClubSlug,
    ) -> Result<Club, ClubRepositoryError>;

    /// IDでクラブを取得する（種別タグでスコープ）
    async fn get_club(
        &self,
        document_type: &str,
        id: &str,
    ) -> Result<Option<Club>, ClubRepositoryError>;

    /// クラブを部分更新する
    ///
    /// 設定済みフィールドのみをpatch setする。対象が存在しない場合は
    /// `NotFound`。
    async fn update_club(
        &self,
        id: &str,
        input: &UpdateClubInput,
    ) -> Result<Club, ClubRepositoryError>;

    /// ドキュメントの種別タグをスコープなしで取得する
    ///
    /// テナント分離チェック専用。存在しないIDは`Ok(None)`。
    async fn fetch_document_type(&self, id: &str) -> Result<Option<String>, ClubRepositoryError>;

    /// テナント内でクラブを検索する（名前・都市の部分一致）
    async fn search_clubs(
        &self,
        document_type: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Club>, ClubRepositoryError>;
}

/// Sanityを使用したクラブリポジトリ実装
#[derive(Debug, Clone)]
pub struct SanityClubRepository {
    client: SanityClient,
}

impl SanityClubRepository {
    /// 新しいSanityClubRepositoryを作成
    pub fn new(client: SanityClient) -> Self {
        Self { client }
    }

    /// ISO-8601（ミリ秒精度、UTC）の現在時刻文字列
    fn now_timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// 作成ミューテーション用のドキュメントを組み立てる
    fn build_create_document(
        document_type: &str,
        input: &CreateClubInput,
        slug: &ClubSlug,
        timestamp: &str,
    ) -> Result<Value, ClubRepositoryError> {
        let mut document = serde_json::to_value(input)
            .map_err(|e| ClubRepositoryError::MalformedDocument(e.to_string()))?;
        let fields = document
            .as_object_mut()
            .ok_or_else(|| ClubRepositoryError::MalformedDocument("input is not an object".to_string()))?;

        fields.insert("_type".to_string(), json!(document_type));
        fields.insert(
            "slug".to_string(),
            serde_json::to_value(slug)
                .map_err(|e| ClubRepositoryError::MalformedDocument(e.to_string()))?,
        );
        fields.insert("createdAt".to_string(), json!(timestamp));
        fields.insert("updatedAt".to_string(), json!(timestamp));

        Ok(document)
    }

    /// 更新ミューテーション用のsetオブジェクトを組み立てる
    ///
    /// 未設定フィールドはシリアライズ時に省略されるため、設定済み
    /// フィールドとupdatedAtのみが含まれる。
    fn build_update_set(
        input: &UpdateClubInput,
        timestamp: &str,
    ) -> Result<Value, ClubRepositoryError> {
        let mut set = serde_json::to_value(input)
            .map_err(|e| ClubRepositoryError::MalformedDocument(e.to_string()))?;
        let fields = set
            .as_object_mut()
            .ok_or_else(|| ClubRepositoryError::MalformedDocument("input is not an object".to_string()))?;

        fields.insert("updatedAt".to_string(), json!(timestamp));

        Ok(set)
    }

    /// ミューテーション結果の先頭ドキュメントをClubとして解析する
    fn parse_result_document(results: &[Value]) -> Result<Club, ClubRepositoryError> {
        let document = results
            .first()
            .and_then(|r| r.get("document"))
            .ok_or_else(|| {
                ClubRepositoryError::MalformedDocument(
                    "mutation result has no document".to_string(),
                )
            })?;

        serde_json::from_value(document.clone())
            .map_err(|e| ClubRepositoryError::MalformedDocument(e.to_string()))
    }
}

#[async_trait]
impl ClubRepository for SanityClubRepository {
    async fn create_club(
        &self,
        document_type: &str,
        input: &CreateClubInput,
        slug: ClubSlug,
    ) -> Result<Club, ClubRepositoryError> {
        let timestamp = Self::now_timestamp();
        let document = Self::build_create_document(document_type, input, &slug, &timestamp)?;

        let results = self
            .client
            .mutate(json!([{ "create": document }]))
            .await?;

        let club = Self::parse_result_document(&results)?;

        info!(
            document_type = %document_type,
            club_id = club.id.as_deref().unwrap_or("(unknown)"),
            "クラブドキュメントを作成"
        );

        Ok(club)
    }

    async fn get_club(
        &self,
        document_type: &str,
        id: &str,
    ) -> Result<Option<Club>, ClubRepositoryError> {
        let result = self
            .client
            .query(
                "*[_type == $type && _id == $id][0]",
                &[("type", json!(document_type)), ("id", json!(id))],
            )
            .await?;

        if result.is_null() {
            debug!(document_type = %document_type, club_id = %id, "クラブが見つかりません");
            return Ok(None);
        }

        let club = serde_json::from_value(result)
            .map_err(|e| ClubRepositoryError::MalformedDocument(e.to_string()))?;
        Ok(Some(club))
    }

    async fn update_club(
        &self,
        id: &str,
        input: &UpdateClubInput,
    ) -> Result<Club, ClubRepositoryError> {
        let timestamp = Self::now_timestamp();
        let set = Self::build_update_set(input, &timestamp)?;

        let results = self
            .client
            .mutate(json!([{ "patch": { "id": id, "set": set } }]))
            .await?;

        if results.is_empty() {
            return Err(ClubRepositoryError::NotFound(id.to_string()));
        }

        let club = Self::parse_result_document(&results)?;

        info!(club_id = %id, "クラブドキュメントを更新");

        Ok(club)
    }

    async fn fetch_document_type(&self, id: &str) -> Result<Option<String>, ClubRepositoryError> {
        // テナント分離チェックのため、あえて種別タグでスコープしない
        let result = self
            .client
            .query("*[_id == $id][0]._type", &[("id", json!(id))])
            .await?;

        match result {
            Value::Null => Ok(None),
            Value::String(document_type) => Ok(Some(document_type)),
            other => Err(ClubRepositoryError::MalformedDocument(format!(
                "unexpected _type value: {other}"
            ))),
        }
    }

    async fn search_clubs(
        &self,
        document_type: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Club>, ClubRepositoryError> {
        let groq = format!(
            "*[_type == $type && (clubName match $searchQuery || city match $searchQuery)][0...{limit}]"
        );
        let result = self
            .client
            .query(
                &groq,
                &[
                    ("type", json!(document_type)),
                    ("searchQuery", json!(format!("*{query}*"))),
                ],
            )
            .await?;

        match result {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .into_iter()
                .map(|item| {
                    serde_json::from_value(item)
                        .map_err(|e| ClubRepositoryError::MalformedDocument(e.to_string()))
                })
                .collect(),
            other => Err(ClubRepositoryError::MalformedDocument(format!(
                "unexpected search result: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::slug::club_slug_for_date;
    use chrono::NaiveDate;

    fn create_input() -> CreateClubInput {
        CreateClubInput {
            club_name: "Test Club".to_string(),
            email: "club@example.com".to_string(),
            city: "Skopje".to_string(),
            address: "Main St 1".to_string(),
            category: "sports".to_string(),
            subcategory: "football".to_string(),
        }
    }

    // ==================== 作成ドキュメント組み立てテスト ====================

    #[test]
    fn test_build_create_document_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let slug = club_slug_for_date("Test Club", "Skopje", "mk", date);
        let document = SanityClubRepository::build_create_document(
            "club_mk",
            &create_input(),
            &slug,
            "2025-05-01T10:00:00.000Z",
        )
        .unwrap();

        assert_eq!(document["_type"], "club_mk");
        assert_eq!(document["clubName"], "Test Club");
        assert_eq!(document["email"], "club@example.com");
        assert_eq!(document["slug"]["_type"], "slug");
        assert_eq!(document["slug"]["current"], "test-club-skopje-01052025");
        assert_eq!(document["createdAt"], "2025-05-01T10:00:00.000Z");
        assert_eq!(document["updatedAt"], "2025-05-01T10:00:00.000Z");
    }

    #[test]
    fn test_build_create_document_type_tag_is_tenant_scoped() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let slug = club_slug_for_date("Test Club", "Skopje", "rs", date);
        let document = SanityClubRepository::build_create_document(
            "club_rs",
            &create_input(),
            &slug,
            "2025-05-01T10:00:00.000Z",
        )
        .unwrap();

        assert_eq!(document["_type"], "club_rs");
    }

    // ==================== 更新set組み立てテスト ====================

    #[test]
    fn test_build_update_set_contains_only_set_fields() {
        let input = UpdateClubInput {
            phone: Some("+38970123456".to_string()),
            website: Some("https://club.mk".to_string()),
            ..Default::default()
        };
        let set =
            SanityClubRepository::build_update_set(&input, "2025-05-02T10:00:00.000Z").unwrap();
        let fields = set.as_object().unwrap();

        // phone + website + updatedAt のみ
        assert_eq!(fields.len(), 3);
        assert_eq!(set["phone"], "+38970123456");
        assert_eq!(set["website"], "https://club.mk");
        assert_eq!(set["updatedAt"], "2025-05-02T10:00:00.000Z");
        // 未設定フィールドを上書きしない
        assert!(fields.get("clubName").is_none());
    }

    // ==================== 結果解析テスト ====================

    #[test]
    fn test_parse_result_document() {
        let results = vec![serde_json::json!({
            "id": "club-abc123",
            "document": {
                "_id": "club-abc123",
                "_type": "club_mk",
                "clubName": "Test Club",
                "email": "club@example.com",
                "city": "Skopje",
                "address": "Main St 1",
                "category": "sports",
                "subcategory": "football"
            }
        })];

        let club = SanityClubRepository::parse_result_document(&results).unwrap();
        assert_eq!(club.id.as_deref(), Some("club-abc123"));
        assert_eq!(club.document_type.as_deref(), Some("club_mk"));
    }

    #[test]
    fn test_parse_result_document_empty_results() {
        let result = SanityClubRepository::parse_result_document(&[]);
        assert!(matches!(
            result,
            Err(ClubRepositoryError::MalformedDocument(_))
        ));
    }

    // ==================== エラー表示テスト ====================

    #[test]
    fn test_not_found_display() {
        let err = ClubRepositoryError::NotFound("club-xyz".to_string());
        assert_eq!(err.to_string(), "club not found: club-xyz");
    }
}

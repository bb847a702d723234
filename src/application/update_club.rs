//! クラブ更新ハンドラー
//!
//! ドメイン検証とテナント分離チェックを通過した場合のみ
//! クラブドキュメントを部分更新する。

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::allow_list::{DomainAllowList, DomainResolutionError};
use crate::domain::club::{Club, UpdateClubInput};
use crate::infrastructure::sanity::{ClubRepository, ClubRepositoryError};

/// クラブ更新のエラー型
#[derive(Debug, Error)]
pub enum UpdateClubError {
    /// クラブIDが指定されていない
    #[error("Missing club ID")]
    MissingClubId,

    /// 更新フィールドが1つも指定されていない
    #[error("No update fields provided")]
    EmptyInput,

    /// ドメイン検証エラー
    #[error(transparent)]
    Resolution(#[from] DomainResolutionError),

    /// クラブが別テナントに属している
    #[error("Club {id} does not belong to domain {domain}")]
    WrongDomain { id: String, domain: String },

    /// 対象クラブが存在しない
    #[error("Club not found")]
    NotFound,

    /// コンテンツストアエラー
    #[error("content store error: {0}")]
    Repository(String),
}

impl From<ClubRepositoryError> for UpdateClubError {
    fn from(err: ClubRepositoryError) -> Self {
        match err {
            ClubRepositoryError::NotFound(_) => UpdateClubError::NotFound,
            other => UpdateClubError::Repository(other.to_string()),
        }
    }
}

/// クラブ更新ハンドラー
pub struct UpdateClubHandler<CR: ClubRepository> {
    allow_list: DomainAllowList,
    repository: CR,
}

impl<CR: ClubRepository> UpdateClubHandler<CR> {
    /// 新しいUpdateClubHandlerを作成
    pub fn new(allow_list: DomainAllowList, repository: CR) -> Self {
        Self {
            allow_list,
            repository,
        }
    }

    /// クラブを更新する
    ///
    /// # 処理フロー
    /// 1. クラブID・更新フィールドの存在確認
    /// 2. ドメイン検証（許可リスト）
    /// 3. テナント分離チェック（下記）
    /// 4. 設定済みフィールドのpatch set
    pub async fn handle(
        &self,
        club_id: Option<&str>,
        domain: Option<&str>,
        input: &UpdateClubInput,
    ) -> Result<Club, UpdateClubError> {
        let club_id = club_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(UpdateClubError::MissingClubId)?;

        if input.is_empty() {
            return Err(UpdateClubError::EmptyInput);
        }

        let domain = self.allow_list.validate(domain)?;

        debug!(club_id = %club_id, domain = %domain, "クラブ更新開始");

        self.assert_belongs_to_domain(club_id, &domain).await?;

        let club = self.repository.update_club(club_id, input).await?;

        info!(club_id = %club_id, domain = %domain, "クラブ更新完了");

        Ok(club)
    }

    /// クラブが指定テナントに属することを検証する
    ///
    /// 種別タグをスコープなしで取得して期待タグと比較する。
    /// ドキュメントが存在しない場合（`NotFound`）と別テナントに属する
    /// 場合（`WrongDomain`）を区別して返す。
    async fn assert_belongs_to_domain(
        &self,
        club_id: &str,
        domain: &str,
    ) -> Result<(), UpdateClubError> {
        let expected = self.allow_list.document_type(Some(domain))?;
        let actual = self.repository.fetch_document_type(club_id).await?;

        match actual {
            None => Err(UpdateClubError::NotFound),
            Some(document_type) if document_type == expected => Ok(()),
            Some(document_type) => {
                warn!(
                    club_id = %club_id,
                    domain = %domain,
                    actual_type = %document_type,
                    "別テナントのクラブへの更新を拒否"
                );
                Err(UpdateClubError::WrongDomain {
                    id: club_id.to_string(),
                    domain: domain.to_string(),
                })
            }
        }
    }
}

//! クラブ取得ハンドラー
//!
//! クエリパラメータのドメインを検証し、テナントスコープ付きで
//! クラブドキュメントを取得する。

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::allow_list::{DomainAllowList, DomainResolutionError};
use crate::domain::club::Club;
use crate::infrastructure::sanity::{ClubRepository, ClubRepositoryError};

/// クラブ取得のエラー型
#[derive(Debug, Error)]
pub enum GetClubError {
    /// クラブIDが指定されていない
    #[error("Missing club ID")]
    MissingClubId,

    /// ドメイン検証エラー
    #[error(transparent)]
    Resolution(#[from] DomainResolutionError),

    /// 対象テナント内にクラブが存在しない
    #[error("Club not found")]
    NotFound,

    /// コンテンツストアエラー
    #[error("content store error: {0}")]
    Repository(String),
}

impl From<ClubRepositoryError> for GetClubError {
    fn from(err: ClubRepositoryError) -> Self {
        match err {
            ClubRepositoryError::NotFound(_) => GetClubError::NotFound,
            other => GetClubError::Repository(other.to_string()),
        }
    }
}

/// クラブ取得ハンドラー
pub struct GetClubHandler<CR: ClubRepository> {
    allow_list: DomainAllowList,
    repository: CR,
}

impl<CR: ClubRepository> GetClubHandler<CR> {
    /// 新しいGetClubHandlerを作成
    pub fn new(allow_list: DomainAllowList, repository: CR) -> Self {
        Self {
            allow_list,
            repository,
        }
    }

    /// クラブを取得する
    ///
    /// # 処理フロー
    /// 1. クラブIDの存在確認
    /// 2. ドメイン検証（許可リスト）
    /// 3. テナント別ドキュメント種別タグでスコープした取得
    ///
    /// # 引数
    /// * `club_id` - パスパラメータのクラブID
    /// * `domain` - クエリパラメータのドメイン
    pub async fn handle(
        &self,
        club_id: Option<&str>,
        domain: Option<&str>,
    ) -> Result<Club, GetClubError> {
        let club_id = club_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(GetClubError::MissingClubId)?;

        let domain = self.allow_list.validate(domain)?;
        let document_type = self.allow_list.document_type(Some(&domain))?;

        debug!(club_id = %club_id, domain = %domain, "クラブ取得開始");

        let club = self
            .repository
            .get_club(&document_type, club_id)
            .await?
            .ok_or(GetClubError::NotFound)?;

        info!(club_id = %club_id, domain = %domain, "クラブ取得完了");

        Ok(club)
    }
}

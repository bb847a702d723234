//! ドメイン解決サービス
//!
//! 許可リストとプールIDマッピングを合成し、リクエストからの
//! ドメイン解決を提供する。信頼境界を越えて渡ってきた値
//! （クエリパラメータ、Cognitoイベント、ストア上のマッピング値）は
//! 使用前に必ず許可リストで検証する。これがテナント分離の唯一の
//! 保証であり、どの経路でも省略してはならない。

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::allow_list::{DomainAllowList, DomainResolutionError};
use crate::infrastructure::parameter_store::{ParameterStore, ParameterStoreError};
use crate::infrastructure::pool_mapping::PoolIdMapping;

/// ドメイン解決サービスのエラー型
#[derive(Debug, Error)]
pub enum DomainResolverError {
    /// ドメイン検証・マッピング解決の失敗（呼び出し元で回復可能、4xx相当）
    #[error(transparent)]
    Resolution(#[from] DomainResolutionError),

    /// パラメータストアの通信エラー（5xx相当）
    #[error(transparent)]
    Store(#[from] ParameterStoreError),
}

/// ドメイン解決サービス
pub struct DomainResolver<P: ParameterStore> {
    allow_list: DomainAllowList,
    mapping: PoolIdMapping<P>,
}

impl<P: ParameterStore> DomainResolver<P> {
    /// 新しいDomainResolverを作成
    pub fn new(allow_list: DomainAllowList, mapping: PoolIdMapping<P>) -> Self {
        Self {
            allow_list,
            mapping,
        }
    }

    /// 許可リストへの参照を取得
    pub fn allow_list(&self) -> &DomainAllowList {
        &self.allow_list
    }

    /// クエリパラメータからドメインを解決する
    pub fn resolve_from_query(
        &self,
        candidate: Option<&str>,
    ) -> Result<String, DomainResolverError> {
        let domain = self.allow_list.validate(candidate)?;
        debug!(domain = %domain, "クエリパラメータからドメインを解決");
        Ok(domain)
    }

    /// CognitoプールIDからドメインを解決する
    ///
    /// # 処理フロー
    /// 1. プールID→ドメインマッピングを取得（不存在は型付きエラー）
    /// 2. 取得したドメインを許可リストで再検証
    ///    （許可リストから外れた古いマッピングを拒否するため）
    pub async fn resolve_from_pool_id(
        &self,
        pool_id: &str,
    ) -> Result<String, DomainResolverError> {
        let stored = self.mapping.get_domain(pool_id).await?;

        let Some(domain) = stored else {
            warn!(pool_id = %pool_id, "プールIDのドメインマッピングが存在しません");
            return Err(DomainResolutionError::PoolIdNotMapped {
                pool_id: pool_id.to_string(),
            }
            .into());
        };

        // ストア上の値も信頼せず再検証する
        let validated = self.allow_list.validate(Some(&domain))?;
        debug!(pool_id = %pool_id, domain = %validated, "プールIDからドメインを解決");
        Ok(validated)
    }

    /// ドメインのコンテンツストア上のドキュメント種別タグを返す
    ///
    /// 常に再検証する。別の呼び出し箇所で検証済みの値でも信頼しない。
    pub fn document_type(&self, candidate: Option<&str>) -> Result<String, DomainResolverError> {
        Ok(self.allow_list.document_type(candidate)?)
    }
}

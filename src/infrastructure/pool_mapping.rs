//! ドメイン↔CognitoプールIDマッピング
//!
//! パラメータストア上の双方向マッピングを読み取る。キー配置:
//! - `/{product}/{environment}/cognito/{domain}/poolId` （ドメイン→プールID）
//! - `/{product}/{environment}/cognito/poolId/{poolId}` （プールID→ドメイン）
//!
//! マッピングはプロビジョニング時に作成される。このクレートからの
//! 書き込みは行わない。

use std::collections::HashMap;

use tracing::debug;

use crate::domain::allow_list::DomainAllowList;
use crate::infrastructure::parameter_store::{ParameterStore, ParameterStoreError};

/// ドメイン↔プールIDマッピングリポジトリ
///
/// 任意の`ParameterStore`実装の上に構築する。不存在（`Ok(None)`）と
/// 通信エラー（`Err`）の区別は下位ストアの契約をそのまま引き継ぐ。
#[derive(Debug, Clone)]
pub struct PoolIdMapping<P: ParameterStore> {
    store: P,
    product: String,
    environment: String,
}

impl<P: ParameterStore> PoolIdMapping<P> {
    /// 新しいPoolIdMappingを作成
    pub fn new(store: P, product: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            store,
            product: product.into(),
            environment: environment.into(),
        }
    }

    /// ドメイン→プールIDのキーを構築
    fn pool_id_path(&self, domain: &str) -> String {
        format!(
            "/{}/{}/cognito/{}/poolId",
            self.product, self.environment, domain
        )
    }

    /// プールID→ドメインのキーを構築
    fn domain_path(&self, pool_id: &str) -> String {
        format!(
            "/{}/{}/cognito/poolId/{}",
            self.product, self.environment, pool_id
        )
    }

    /// ドメインに対応するCognitoプールIDを取得する
    pub async fn get_pool_id(&self, domain: &str) -> Result<Option<String>, ParameterStoreError> {
        let path = self.pool_id_path(domain);
        let pool_id = self.store.get(&path).await?;

        debug!(
            domain = %domain,
            found = pool_id.is_some(),
            "ドメイン→プールIDマッピング取得"
        );

        Ok(pool_id)
    }

    /// CognitoプールIDに対応するドメインを取得する
    pub async fn get_domain(&self, pool_id: &str) -> Result<Option<String>, ParameterStoreError> {
        let path = self.domain_path(pool_id);
        let domain = self.store.get(&path).await?;

        debug!(
            pool_id = %pool_id,
            found = domain.is_some(),
            "プールID→ドメインマッピング取得"
        );

        Ok(domain)
    }

    /// 許可リスト全体のドメイン→プールIDマップを構築する
    ///
    /// マッピングが存在しないドメインはスキップする。
    /// 通信エラーは最初の発生時点で伝搬する。
    pub async fn domain_to_pool_id_map(
        &self,
        allow_list: &DomainAllowList,
    ) -> Result<HashMap<String, String>, ParameterStoreError> {
        let mut mapping = HashMap::new();

        for domain in allow_list.domains() {
            if let Some(pool_id) = self.get_pool_id(domain).await? {
                mapping.insert(domain.clone(), pool_id);
            }
        }

        Ok(mapping)
    }
}

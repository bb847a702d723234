//! Sanity接続設定
//!
//! プロジェクトID・データセット・APIトークンを保持する。
//! トークンはテナントごとにパラメータストアのテンプレートパスから
//! 解決する。パス構築前にドメインが検証済みであることが前提。

use thiserror::Error;
use tracing::debug;

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::parameter_store::{ParameterStore, ParameterStoreError};

/// 使用するSanity APIバージョン
pub const SANITY_API_VERSION: &str = "2021-03-25";

/// Sanity設定のエラー型
#[derive(Debug, Error)]
pub enum SanityConfigError {
    /// パラメータストアの通信エラー
    #[error(transparent)]
    Store(#[from] ParameterStoreError),

    /// トークンパラメータが存在しない
    #[error("SanityトークンがSSMに存在しません: {path}")]
    MissingToken { path: String },
}

/// Sanity接続設定
#[derive(Debug, Clone)]
pub struct SanityConfig {
    /// SanityプロジェクトID
    project_id: String,
    /// データセット名
    dataset: String,
    /// APIトークン（テナント別）
    token: String,
}

impl SanityConfig {
    /// 明示的な値で設定を作成
    pub fn new(
        project_id: impl Into<String>,
        dataset: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            token: token.into(),
        }
    }

    /// アプリケーション設定とパラメータストアからテナント別設定を解決する
    ///
    /// # 引数
    /// * `app_config` - アプリケーション設定
    /// * `validated_domain` - 検証済みドメインコード（未検証の値を渡さないこと）
    /// * `store` - トークン取得に使用するパラメータストア
    pub async fn resolve<P: ParameterStore>(
        app_config: &AppConfig,
        validated_domain: &str,
        store: &P,
    ) -> Result<Self, SanityConfigError> {
        let token_path = app_config.sanity_token_path(validated_domain);

        let token = store
            .get(&token_path)
            .await?
            .ok_or_else(|| SanityConfigError::MissingToken {
                path: token_path.clone(),
            })?;

        debug!(domain = %validated_domain, "Sanityトークンを解決");

        Ok(Self::new(
            app_config.sanity_project_id(),
            app_config.sanity_dataset(),
            token,
        ))
    }

    /// プロジェクトIDを取得
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// データセット名を取得
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// APIトークンを取得
    pub fn token(&self) -> &str {
        &self.token
    }
}

//! SSM Parameter Store操作モジュール
//!
//! 外部パラメータストアに対する単一キーの読み取りを提供する。
//! キーが存在しないこと（`Ok(None)`）と通信・認証の失敗（`Err`）を
//! 区別する。読み取りは再試行しない。

use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;
use thiserror::Error;
use tracing::{debug, warn};

/// パラメータストア操作のエラー型
///
/// パラメータの不存在はエラーではなく`Ok(None)`として表現するため、
/// このエラーは通信・認証等の失敗のみを表す。
#[derive(Debug, Error)]
pub enum ParameterStoreError {
    /// AWS SDK エラー
    #[error("AWS SSM APIエラー: {0}")]
    AwsSdkError(String),
}

/// パラメータストア操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// 指定キーのパラメータ値を取得する
    ///
    /// # 戻り値
    /// * `Ok(Some(value))` - パラメータが存在する
    /// * `Ok(None)` - パラメータが存在しない（正常系）
    /// * `Err(ParameterStoreError)` - 通信・認証エラー
    async fn get(&self, name: &str) -> Result<Option<String>, ParameterStoreError>;
}

/// 実際のAWS SSM SDKを使用したパラメータストア実装
///
/// SecureStringパラメータに対応するため常に復号を要求する。
#[derive(Clone)]
pub struct AwsSsmParameterStore {
    client: SsmClient,
}

impl AwsSsmParameterStore {
    /// 新しいAwsSsmParameterStoreを作成
    pub fn new(client: SsmClient) -> Self {
        Self { client }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_config() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = SsmClient::new(&config);
        Self::new(client)
    }
}

#[async_trait]
impl ParameterStore for AwsSsmParameterStore {
    async fn get(&self, name: &str) -> Result<Option<String>, ParameterStoreError> {
        let result = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await;

        match result {
            Ok(output) => {
                let value = output
                    .parameter()
                    .and_then(|p| p.value())
                    .map(str::to_string);

                debug!(
                    name = %name,
                    found = value.is_some(),
                    "SSMパラメータ取得"
                );

                Ok(value)
            }
            Err(err) => {
                let service_err = err.into_service_error();

                // 不存在は正常系として扱い、通信エラーと区別する
                if service_err.is_parameter_not_found() {
                    debug!(name = %name, "SSMパラメータが存在しません");
                    return Ok(None);
                }

                warn!(
                    name = %name,
                    error = %service_err,
                    "SSMパラメータ取得エラー"
                );
                Err(ParameterStoreError::AwsSdkError(service_err.to_string()))
            }
        }
    }
}

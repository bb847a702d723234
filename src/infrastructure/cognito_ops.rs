//! Cognito操作モジュール
//!
//! ユーザープールに対する管理者操作を提供する。
//! - ユーザー属性の更新（作成済みクラブドキュメントIDの書き戻し）
//! - ユーザーの属性取得

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::types::AttributeType;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use thiserror::Error;
use tracing::{debug, info, warn};

/// クラブドキュメントIDを保持するカスタム属性名
pub const SANITY_ID_ATTRIBUTE: &str = "custom:sanity_id";

/// Cognito操作のエラー型
#[derive(Debug, Error)]
pub enum CognitoOpsError {
    /// AWS SDK エラー
    #[error("AWS Cognito APIエラー: {0}")]
    AwsSdkError(String),

    /// 属性の構築に失敗
    #[error("ユーザー属性の構築に失敗: {0}")]
    InvalidAttribute(String),
}

/// ユーザー属性の名前と値のペア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttribute {
    pub name: String,
    pub value: String,
}

/// Cognito操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait CognitoOps: Send + Sync {
    /// ユーザーの属性を1件更新する
    ///
    /// # 引数
    /// * `user_pool_id` - ユーザープールID
    /// * `username` - ユーザー名
    /// * `name` - 属性名
    /// * `value` - 属性値
    async fn update_user_attribute(
        &self,
        user_pool_id: &str,
        username: &str,
        name: &str,
        value: &str,
    ) -> Result<(), CognitoOpsError>;

    /// ユーザーを検索して属性一覧を返す
    ///
    /// # 戻り値
    /// * `Ok(Some(attributes))` - ユーザーが存在する
    /// * `Ok(None)` - ユーザーが存在しない（正常系）
    /// * `Err(CognitoOpsError)` - 通信・認証エラー
    async fn find_user(
        &self,
        user_pool_id: &str,
        username: &str,
    ) -> Result<Option<Vec<UserAttribute>>, CognitoOpsError>;
}

/// 実際のAWS Cognito SDKを使用した操作実装
pub struct AwsCognitoOps {
    client: CognitoClient,
}

impl AwsCognitoOps {
    /// 新しいAwsCognitoOpsを作成
    pub fn new(client: CognitoClient) -> Self {
        Self { client }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_config() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = CognitoClient::new(&config);
        Self::new(client)
    }
}

#[async_trait]
impl CognitoOps for AwsCognitoOps {
    async fn update_user_attribute(
        &self,
        user_pool_id: &str,
        username: &str,
        name: &str,
        value: &str,
    ) -> Result<(), CognitoOpsError> {
        let attribute = AttributeType::builder()
            .name(name)
            .value(value)
            .build()
            .map_err(|e| CognitoOpsError::InvalidAttribute(e.to_string()))?;

        let result = self
            .client
            .admin_update_user_attributes()
            .user_pool_id(user_pool_id)
            .username(username)
            .user_attributes(attribute)
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(
                    user_pool_id = %user_pool_id,
                    attribute = %name,
                    "ユーザー属性を更新"
                );
                Ok(())
            }
            Err(err) => {
                let service_err = err.into_service_error();
                warn!(
                    user_pool_id = %user_pool_id,
                    attribute = %name,
                    error = %service_err,
                    "ユーザー属性の更新に失敗"
                );
                Err(CognitoOpsError::AwsSdkError(service_err.to_string()))
            }
        }
    }

    async fn find_user(
        &self,
        user_pool_id: &str,
        username: &str,
    ) -> Result<Option<Vec<UserAttribute>>, CognitoOpsError> {
        let result = self
            .client
            .admin_get_user()
            .user_pool_id(user_pool_id)
            .username(username)
            .send()
            .await;

        match result {
            Ok(output) => {
                let attributes = output
                    .user_attributes()
                    .iter()
                    .map(|attr| UserAttribute {
                        name: attr.name().to_string(),
                        value: attr.value().unwrap_or_default().to_string(),
                    })
                    .collect();

                Ok(Some(attributes))
            }
            Err(err) => {
                let service_err = err.into_service_error();

                // 不存在は正常系として扱う
                if service_err.is_user_not_found_exception() {
                    debug!(user_pool_id = %user_pool_id, "ユーザーが存在しません");
                    return Ok(None);
                }

                warn!(
                    user_pool_id = %user_pool_id,
                    error = %service_err,
                    "ユーザー取得エラー"
                );
                Err(CognitoOpsError::AwsSdkError(service_err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// テスト用のモックCognito操作
    ///
    /// 更新された属性を(プールID, ユーザー名)ごとに記録する。
    struct MockCognitoOps {
        /// (プールID, ユーザー名) → 属性一覧
        users: Mutex<HashMap<(String, String), Vec<UserAttribute>>>,
        /// trueの場合すべての操作が通信エラーになる
        unavailable: bool,
    }

    impl MockCognitoOps {
        fn with_user(user_pool_id: &str, username: &str) -> Self {
            let mut users = HashMap::new();
            users.insert(
                (user_pool_id.to_string(), username.to_string()),
                Vec::new(),
            );
            Self {
                users: Mutex::new(users),
                unavailable: false,
            }
        }

        fn unavailable() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
                unavailable: true,
            }
        }
    }

    #[async_trait]
    impl CognitoOps for MockCognitoOps {
        async fn update_user_attribute(
            &self,
            user_pool_id: &str,
            username: &str,
            name: &str,
            value: &str,
        ) -> Result<(), CognitoOpsError> {
            if self.unavailable {
                return Err(CognitoOpsError::AwsSdkError("connection refused".to_string()));
            }

            let mut users = self.users.lock().unwrap();
            let key = (user_pool_id.to_string(), username.to_string());
            let attributes = users
                .get_mut(&key)
                .ok_or_else(|| CognitoOpsError::AwsSdkError("user not found".to_string()))?;

            attributes.retain(|a| a.name != name);
            attributes.push(UserAttribute {
                name: name.to_string(),
                value: value.to_string(),
            });
            Ok(())
        }

        async fn find_user(
            &self,
            user_pool_id: &str,
            username: &str,
        ) -> Result<Option<Vec<UserAttribute>>, CognitoOpsError> {
            if self.unavailable {
                return Err(CognitoOpsError::AwsSdkError("connection refused".to_string()));
            }

            let users = self.users.lock().unwrap();
            Ok(users
                .get(&(user_pool_id.to_string(), username.to_string()))
                .cloned())
        }
    }

    // ==================== CognitoOpsError テスト ====================

    #[test]
    fn test_error_display() {
        let err = CognitoOpsError::AwsSdkError("access denied".to_string());
        assert_eq!(err.to_string(), "AWS Cognito APIエラー: access denied");
    }

    // ==================== MockCognitoOps テスト ====================

    #[tokio::test]
    async fn test_update_then_find_user() {
        let ops = MockCognitoOps::with_user("pool-1", "user@example.com");

        ops.update_user_attribute("pool-1", "user@example.com", SANITY_ID_ATTRIBUTE, "club-123")
            .await
            .unwrap();

        let attributes = ops
            .find_user("pool-1", "user@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            attributes,
            vec![UserAttribute {
                name: SANITY_ID_ATTRIBUTE.to_string(),
                value: "club-123".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_find_unknown_user_is_none() {
        let ops = MockCognitoOps::with_user("pool-1", "user@example.com");

        let result = ops.find_user("pool-1", "other@example.com").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_error() {
        let ops = MockCognitoOps::with_user("pool-1", "user@example.com");

        let result = ops
            .update_user_attribute("pool-2", "user@example.com", SANITY_ID_ATTRIBUTE, "club-123")
            .await;
        assert!(matches!(result, Err(CognitoOpsError::AwsSdkError(_))));
    }

    #[tokio::test]
    async fn test_unavailable_ops_propagate_error() {
        let ops = MockCognitoOps::unavailable();

        let result = ops.find_user("pool-1", "user@example.com").await;
        assert!(matches!(result, Err(CognitoOpsError::AwsSdkError(_))));
    }
}

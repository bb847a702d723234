//! アプリケーション設定
//!
//! プロセス起動時に環境変数から一度だけ読み込む設定値を管理する。
//! ドメイン許可リストはここで解析し、各コンポーネントへ明示的に
//! 注入する（グローバル状態からの暗黙読み取りはしない）。

use thiserror::Error;

use crate::domain::allow_list::{AllowListParseError, DomainAllowList};

/// Sanityトークンパステンプレート内のドメインプレースホルダー
const DOMAIN_PLACEHOLDER: &str = "{{domain}}";

/// アプリケーション設定のエラー型
#[derive(Debug, Error)]
pub enum AppConfigError {
    /// 必須の環境変数が設定されていない
    #[error("環境変数が設定されていません: {0}")]
    MissingEnvVar(String),

    /// DOMAINS環境変数の解析に失敗
    #[error("DOMAINS環境変数が不正です: {0}")]
    InvalidAllowList(#[from] AllowListParseError),
}

/// アプリケーション設定
///
/// 以下の環境変数から読み込む:
/// - PRODUCT: SSMパスに使用するプロダクト名
/// - ENVIRONMENT: SSMパスに使用するデプロイ環境名
/// - DOMAINS: テナントドメイン許可リスト（カンマ区切り）
/// - SANITY_PROJECT_ID: SanityプロジェクトID
/// - SANITY_DATASET: Sanityデータセット名
/// - SSM_SANITY_TOKEN_PATH: Sanity APIトークンのSSMパステンプレート
///   （`{{domain}}`プレースホルダーを含む）
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// プロダクト名
    product: String,
    /// デプロイ環境名
    environment: String,
    /// テナントドメイン許可リスト
    allow_list: DomainAllowList,
    /// SanityプロジェクトID
    sanity_project_id: String,
    /// Sanityデータセット名
    sanity_dataset: String,
    /// SanityトークンのSSMパステンプレート
    sanity_token_path_template: String,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    /// 必要な環境変数が設定されていない場合、またはDOMAINSに有効な
    /// ドメインが含まれない場合はエラーを返す
    pub fn from_env() -> Result<Self, AppConfigError> {
        let product = require_env("PRODUCT")?;
        let environment = require_env("ENVIRONMENT")?;
        let domains = require_env("DOMAINS")?;
        let allow_list = DomainAllowList::parse(&domains)?;
        let sanity_project_id = require_env("SANITY_PROJECT_ID")?;
        let sanity_dataset = require_env("SANITY_DATASET")?;
        let sanity_token_path_template = require_env("SSM_SANITY_TOKEN_PATH")?;

        Ok(Self {
            product,
            environment,
            allow_list,
            sanity_project_id,
            sanity_dataset,
            sanity_token_path_template,
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(
        product: String,
        environment: String,
        allow_list: DomainAllowList,
        sanity_project_id: String,
        sanity_dataset: String,
        sanity_token_path_template: String,
    ) -> Self {
        Self {
            product,
            environment,
            allow_list,
            sanity_project_id,
            sanity_dataset,
            sanity_token_path_template,
        }
    }

    /// プロダクト名を取得
    pub fn product(&self) -> &str {
        &self.product
    }

    /// デプロイ環境名を取得
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// ドメイン許可リストを取得
    pub fn allow_list(&self) -> &DomainAllowList {
        &self.allow_list
    }

    /// SanityプロジェクトIDを取得
    pub fn sanity_project_id(&self) -> &str {
        &self.sanity_project_id
    }

    /// Sanityデータセット名を取得
    pub fn sanity_dataset(&self) -> &str {
        &self.sanity_dataset
    }

    /// 検証済みドメインのSanityトークンSSMパスを構築する
    ///
    /// テンプレート内の`{{domain}}`プレースホルダーを置換する。
    /// 未検証のドメインを渡してはならない（SSMパスに混入するため）。
    pub fn sanity_token_path(&self, validated_domain: &str) -> String {
        self.sanity_token_path_template
            .replace(DOMAIN_PLACEHOLDER, validated_domain)
    }
}

/// 必須環境変数を読み込むヘルパー
fn require_env(key: &str) -> Result<String, AppConfigError> {
    std::env::var(key).map_err(|_| AppConfigError::MissingEnvVar(key.to_string()))
}

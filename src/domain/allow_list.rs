//! ドメイン許可リストとテナント検証
//!
//! デプロイメント単位で設定されたテナント（ドメイン）コードの許可リストを保持し、
//! 信頼境界を越えて渡ってきたドメイン値の検証を提供する。
//! 許可リストはプロセス起動時に一度だけ構築され、以後不変。

use thiserror::Error;

/// ドメイン解決エラー
///
/// 各バリアントは構造化フィールドを持ち、呼び出し元は文字列照合ではなく
/// バリアント種別でハンドリングする。
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainResolutionError {
    /// ドメインパラメータが指定されていない
    #[error("Domain parameter is required")]
    Missing,

    /// ドメインが許可リストに含まれていない
    #[error("Invalid domain: {domain}. Valid domains are: {}", valid_domains.join(", "))]
    Invalid {
        domain: String,
        valid_domains: Vec<String>,
    },

    /// CognitoプールIDに対応するドメインマッピングが存在しない
    #[error("No domain mapping found for Cognito Pool ID: {pool_id}")]
    PoolIdNotMapped { pool_id: String },
}

/// 許可リスト解析エラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AllowListParseError {
    /// 設定値に有効なドメインが1つも含まれていない
    #[error("domain allow-list is empty")]
    Empty,
}

/// ドメイン許可リスト
///
/// カンマ区切りの設定値から構築される、有効なテナントコードの順序付きリスト。
/// コードは小文字に正規化して保持する。
#[derive(Debug, Clone, PartialEq)]
pub struct DomainAllowList {
    domains: Vec<String>,
}

impl DomainAllowList {
    /// カンマ区切り文字列から許可リストを構築
    ///
    /// 各要素はトリムして小文字化する。空要素は無視する。
    /// 有効な要素が1つも残らない場合はエラー。
    pub fn parse(raw: &str) -> Result<Self, AllowListParseError> {
        let domains: Vec<String> = raw
            .split(',')
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        if domains.is_empty() {
            return Err(AllowListParseError::Empty);
        }

        Ok(Self { domains })
    }

    /// 有効なドメインコードの一覧を取得
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// ドメインが許可リストに含まれるかを判定
    ///
    /// 未指定・空文字はfalse。大文字小文字は区別しない。
    pub fn is_valid(&self, candidate: Option<&str>) -> bool {
        match candidate {
            Some(domain) if !domain.trim().is_empty() => {
                self.domains.contains(&domain.trim().to_lowercase())
            }
            _ => false,
        }
    }

    /// ドメインを検証して小文字正規化済みコードを返す
    ///
    /// # エラー
    /// * `DomainResolutionError::Missing` - 未指定または空文字
    /// * `DomainResolutionError::Invalid` - 許可リスト外（エラーに有効ドメイン一覧を含む）
    pub fn validate(&self, candidate: Option<&str>) -> Result<String, DomainResolutionError> {
        let domain = candidate
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(DomainResolutionError::Missing)?;

        let normalized = domain.to_lowercase();
        if self.domains.contains(&normalized) {
            Ok(normalized)
        } else {
            Err(DomainResolutionError::Invalid {
                domain: domain.to_string(),
                valid_domains: self.domains.clone(),
            })
        }
    }

    /// ドメインのコンテンツストア上のドキュメント種別タグを返す
    ///
    /// 検証済みの値を受け取る場合でも必ず再検証する。呼び出し境界を越えた
    /// 値は信頼しない。
    pub fn document_type(&self, candidate: Option<&str>) -> Result<String, DomainResolutionError> {
        Ok(format!("club_{}", self.validate(candidate)?))
    }
}

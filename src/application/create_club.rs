//! クラブ作成ハンドラー
//!
//! ユーザー登録確認（Cognito Post Confirmation）を起点に、
//! 2フェーズのcreate-then-linkフローを実行する:
//!
//! 1. プールIDからドメインを解決し、ユーザー属性からクラブドキュメントを作成
//! 2. 作成されたドキュメントIDをユーザーのカスタム属性へ書き戻す
//!
//! フェーズ2の失敗時はフェーズ1をロールバックしない。孤児ドキュメントの
//! IDを含む型付きエラーとして必ず表面化させ、成功として報告しない。
//! 再試行も行わない（運用者の介入を前提とする）。

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::application::domain_resolver::{DomainResolver, DomainResolverError};
use crate::domain::club::{Club, CreateClubInput};
use crate::domain::slug::generate_club_slug;
use crate::infrastructure::cognito_ops::{CognitoOps, CognitoOpsError, SANITY_ID_ATTRIBUTE};
use crate::infrastructure::parameter_store::ParameterStore;
use crate::infrastructure::sanity::ClubRepository;

/// クラブ名のカスタム属性名
const ATTR_CLUB_NAME: &str = "custom:club_name";
/// 都市のカスタム属性名
const ATTR_CITY: &str = "custom:city";
/// カテゴリのカスタム属性名
const ATTR_CATEGORY: &str = "custom:category";
/// サブカテゴリのカスタム属性名
const ATTR_SUBCATEGORY: &str = "custom:subcategory";
/// 住所のカスタム属性名
const ATTR_ADDRESS: &str = "custom:address";
/// メールアドレスの標準属性名
const ATTR_EMAIL: &str = "email";

/// クラブ作成のエラー型
#[derive(Debug, Error)]
pub enum CreateClubError {
    /// ドメイン解決エラー
    #[error(transparent)]
    Resolution(#[from] DomainResolverError),

    /// 必須のユーザー属性がイベントに含まれていない
    #[error("required user attribute is missing: {0}")]
    MissingAttribute(&'static str),

    /// クラブドキュメントの作成に失敗（フェーズ1）
    #[error("クラブ作成に失敗: {0}")]
    Creation(String),

    /// 作成済みクラブとユーザーの連携に失敗（フェーズ2）
    ///
    /// `club_id`は連携されないまま残った孤児ドキュメントのID。
    #[error("作成済みクラブ {club_id} のユーザー連携に失敗: {source}")]
    UserLinkFailed {
        club_id: String,
        source: CognitoOpsError,
    },
}

/// クラブ作成ハンドラー
pub struct CreateClubHandler<P, CR, CO>
where
    P: ParameterStore,
    CR: ClubRepository,
    CO: CognitoOps,
{
    resolver: DomainResolver<P>,
    repository: CR,
    cognito: CO,
}

impl<P, CR, CO> CreateClubHandler<P, CR, CO>
where
    P: ParameterStore,
    CR: ClubRepository,
    CO: CognitoOps,
{
    /// 新しいCreateClubHandlerを作成
    pub fn new(resolver: DomainResolver<P>, repository: CR, cognito: CO) -> Self {
        Self {
            resolver,
            repository,
            cognito,
        }
    }

    /// ユーザー登録確認イベントからクラブを作成する
    ///
    /// # 引数
    /// * `user_pool_id` - イベントのユーザープールID
    /// * `username` - イベントのユーザー名
    /// * `attributes` - イベントのユーザー属性
    ///
    /// # 戻り値
    /// 作成されたクラブドキュメント
    pub async fn handle(
        &self,
        user_pool_id: &str,
        username: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<Club, CreateClubError> {
        // プールID→ドメイン解決（マッピング値も許可リストで再検証される）
        let domain = self.resolver.resolve_from_pool_id(user_pool_id).await?;
        let document_type = self.resolver.document_type(Some(&domain))?;

        let input = Self::input_from_attributes(attributes)?;
        let slug = generate_club_slug(&input.club_name, &input.city, &domain);

        debug!(
            user_pool_id = %user_pool_id,
            domain = %domain,
            club_name = %input.club_name,
            slug = %slug.current,
            "クラブ作成開始"
        );

        // フェーズ1: クラブドキュメント作成
        let club = self
            .repository
            .create_club(&document_type, &input, slug)
            .await
            .map_err(|e| CreateClubError::Creation(e.to_string()))?;

        let club_id = club.id.clone().ok_or_else(|| {
            CreateClubError::Creation("コンテンツストアがIDなしのドキュメントを返却".to_string())
        })?;

        // フェーズ2: ユーザー属性へドキュメントIDを書き戻す。
        // 失敗してもフェーズ1はロールバックせず、孤児ドキュメントIDを
        // 含むエラーとして伝搬する。
        self.cognito
            .update_user_attribute(user_pool_id, username, SANITY_ID_ATTRIBUTE, &club_id)
            .await
            .map_err(|source| {
                error!(
                    club_id = %club_id,
                    user_pool_id = %user_pool_id,
                    username = %username,
                    error = %source,
                    "クラブは作成済みだがユーザー連携に失敗（要運用対応）"
                );
                CreateClubError::UserLinkFailed { club_id: club_id.clone(), source }
            })?;

        info!(
            club_id = %club_id,
            domain = %domain,
            "クラブ作成・ユーザー連携完了"
        );

        Ok(club)
    }

    /// Cognitoユーザー属性からクラブ作成入力を組み立てる
    ///
    /// 必須属性が欠けている場合は属性名を含む型付きエラーを返す。
    fn input_from_attributes(
        attributes: &HashMap<String, String>,
    ) -> Result<CreateClubInput, CreateClubError> {
        let require = |name: &'static str| -> Result<String, CreateClubError> {
            attributes
                .get(name)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .ok_or(CreateClubError::MissingAttribute(name))
        };

        Ok(CreateClubInput {
            club_name: require(ATTR_CLUB_NAME)?,
            email: require(ATTR_EMAIL)?,
            city: require(ATTR_CITY)?,
            address: require(ATTR_ADDRESS)?,
            category: require(ATTR_CATEGORY)?,
            subcategory: require(ATTR_SUBCATEGORY)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allow_list::{DomainAllowList, DomainResolutionError};
    use crate::domain::club::{ClubSlug, UpdateClubInput};
    use crate::infrastructure::cognito_ops::UserAttribute;
    use crate::infrastructure::parameter_store::ParameterStoreError;
    use crate::infrastructure::pool_mapping::PoolIdMapping;
    use crate::infrastructure::sanity::ClubRepositoryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockParameterStore {
        parameters: HashMap<String, String>,
    }

    #[async_trait]
    impl ParameterStore for MockParameterStore {
        async fn get(&self, name: &str) -> Result<Option<String>, ParameterStoreError> {
            Ok(self.parameters.get(name).cloned())
        }
    }

    /// 作成されたドキュメントを記録するモックリポジトリ
    struct MockClubRepository {
        created: Mutex<Vec<(String, CreateClubInput)>>,
        fail_creation: bool,
    }

    impl MockClubRepository {
        fn new() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                fail_creation: false,
            }
        }

        fn failing() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                fail_creation: true,
            }
        }

        fn created_count(&self) -> usize {
            self.created.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ClubRepository for MockClubRepository {
        async fn create_club(
            &self,
            document_type: &str,
            input: &CreateClubInput,
            slug: ClubSlug,
        ) -> Result<Club, ClubRepositoryError> {
            if self.fail_creation {
                return Err(ClubRepositoryError::MalformedDocument(
                    "store unavailable".to_string(),
                ));
            }

            self.created
                .lock()
                .unwrap()
                .push((document_type.to_string(), input.clone()));

            Ok(Club {
                id: Some("club-created-1".to_string()),
                document_type: Some(document_type.to_string()),
                store_created_at: None,
                store_updated_at: None,
                club_name: input.club_name.clone(),
                email: input.email.clone(),
                city: input.city.clone(),
                address: input.address.clone(),
                category: input.category.clone(),
                subcategory: input.subcategory.clone(),
                phone: None,
                website: None,
                description: None,
                social_media: None,
                google_maps_url: None,
                main_image: None,
                media: None,
                slug: Some(slug),
                created_at: None,
                updated_at: None,
            })
        }

        async fn get_club(
            &self,
            _document_type: &str,
            _id: &str,
        ) -> Result<Option<Club>, ClubRepositoryError> {
            unimplemented!("not used in create tests")
        }

        async fn update_club(
            &self,
            _id: &str,
            _input: &UpdateClubInput,
        ) -> Result<Club, ClubRepositoryError> {
            unimplemented!("not used in create tests")
        }

        async fn fetch_document_type(
            &self,
            _id: &str,
        ) -> Result<Option<String>, ClubRepositoryError> {
            unimplemented!("not used in create tests")
        }

        async fn search_clubs(
            &self,
            _document_type: &str,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<Club>, ClubRepositoryError> {
            unimplemented!("not used in create tests")
        }
    }

    /// 属性更新を記録するモックCognito操作
    struct MockCognitoOps {
        updates: Mutex<Vec<(String, String, String, String)>>,
        fail_update: bool,
    }

    impl MockCognitoOps {
        fn new() -> Self {
            Self {
                updates: Mutex::new(Vec::new()),
                fail_update: false,
            }
        }

        fn failing() -> Self {
            Self {
                updates: Mutex::new(Vec::new()),
                fail_update: true,
            }
        }

        fn updates(&self) -> Vec<(String, String, String, String)> {
            self.updates.lock().unwrap().clone()
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
            if self.fail_update {
                return Err(CognitoOpsError::AwsSdkError("throttled".to_string()));
            }
            self.updates.lock().unwrap().push((
                user_pool_id.to_string(),
                username.to_string(),
                name.to_string(),
                value.to_string(),
            ));
            Ok(())
        }

        async fn find_user(
            &self,
            _user_pool_id: &str,
            _username: &str,
        ) -> Result<Option<Vec<UserAttribute>>, CognitoOpsError> {
            Ok(None)
        }
    }

    const POOL_ID: &str = "eu-central-1_AbCdEf";

    fn resolver() -> DomainResolver<MockParameterStore> {
        let store = MockParameterStore {
            parameters: [(
                format!("/skillstation/dev/cognito/poolId/{POOL_ID}"),
                "mk".to_string(),
            )]
            .into_iter()
            .collect(),
        };
        DomainResolver::new(
            DomainAllowList::parse("mk,rs").unwrap(),
            PoolIdMapping::new(store, "skillstation", "dev"),
        )
    }

    fn full_attributes() -> HashMap<String, String> {
        [
            (ATTR_EMAIL, "fk@example.com"),
            (ATTR_CLUB_NAME, "Фудбалски Клуб"),
            (ATTR_CITY, "Скопје"),
            (ATTR_ADDRESS, "ул. Македонија 1"),
            (ATTR_CATEGORY, "sports"),
            (ATTR_SUBCATEGORY, "football"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    // ==================== 正常系テスト ====================

    #[tokio::test]
    async fn test_create_club_full_flow() {
        let repository = MockClubRepository::new();
        let cognito = MockCognitoOps::new();
        let handler = CreateClubHandler::new(resolver(), repository, cognito);

        let club = handler
            .handle(POOL_ID, "user@example.com", &full_attributes())
            .await
            .unwrap();

        assert_eq!(club.id.as_deref(), Some("club-created-1"));
        assert_eq!(club.document_type.as_deref(), Some("club_mk"));
        // スラッグは両方の部分が文字変換されている
        assert!(club
            .slug
            .as_ref()
            .unwrap()
            .current
            .starts_with("fudbalski-klub-skopje-"));

        // フェーズ2でドキュメントIDがユーザー属性へ書き戻される
        let updates = handler.cognito.updates();
        assert_eq!(
            updates,
            vec![(
                POOL_ID.to_string(),
                "user@example.com".to_string(),
                SANITY_ID_ATTRIBUTE.to_string(),
                "club-created-1".to_string(),
            )]
        );
    }

    // ==================== ドメイン解決テスト ====================

    #[tokio::test]
    async fn test_create_club_unmapped_pool_id() {
        let handler = CreateClubHandler::new(
            resolver(),
            MockClubRepository::new(),
            MockCognitoOps::new(),
        );

        let err = handler
            .handle("eu-central-1_Unknown", "user@example.com", &full_attributes())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CreateClubError::Resolution(DomainResolverError::Resolution(
                DomainResolutionError::PoolIdNotMapped { .. }
            ))
        ));
        // ドメイン解決に失敗した場合、作成は実行されない
        assert_eq!(handler.repository.created_count(), 0);
    }

    // ==================== 属性検証テスト ====================

    #[tokio::test]
    async fn test_create_club_missing_attribute() {
        let handler = CreateClubHandler::new(
            resolver(),
            MockClubRepository::new(),
            MockCognitoOps::new(),
        );

        let mut attributes = full_attributes();
        attributes.remove(ATTR_CITY);

        let err = handler
            .handle(POOL_ID, "user@example.com", &attributes)
            .await
            .unwrap_err();

        match err {
            CreateClubError::MissingAttribute(name) => assert_eq!(name, ATTR_CITY),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(handler.repository.created_count(), 0);
    }

    #[tokio::test]
    async fn test_create_club_blank_attribute_is_missing() {
        let handler = CreateClubHandler::new(
            resolver(),
            MockClubRepository::new(),
            MockCognitoOps::new(),
        );

        let mut attributes = full_attributes();
        attributes.insert(ATTR_CLUB_NAME.to_string(), "   ".to_string());

        let err = handler
            .handle(POOL_ID, "user@example.com", &attributes)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateClubError::MissingAttribute(_)));
    }

    // ==================== フェーズ失敗テスト ====================

    #[tokio::test]
    async fn test_create_club_phase_one_failure() {
        let handler = CreateClubHandler::new(
            resolver(),
            MockClubRepository::failing(),
            MockCognitoOps::new(),
        );

        let err = handler
            .handle(POOL_ID, "user@example.com", &full_attributes())
            .await
            .unwrap_err();

        assert!(matches!(err, CreateClubError::Creation(_)));
        // フェーズ1が失敗した場合、フェーズ2は実行されない
        assert!(handler.cognito.updates().is_empty());
    }

    #[tokio::test]
    async fn test_create_club_phase_two_failure_carries_orphan_id() {
        let handler = CreateClubHandler::new(
            resolver(),
            MockClubRepository::new(),
            MockCognitoOps::failing(),
        );

        let err = handler
            .handle(POOL_ID, "user@example.com", &full_attributes())
            .await
            .unwrap_err();

        // フェーズ1は完了済み（孤児ドキュメント）、エラーにそのIDを含む
        match err {
            CreateClubError::UserLinkFailed { club_id, .. } => {
                assert_eq!(club_id, "club-created-1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(handler.repository.created_count(), 1);
    }
}

/// クラブ作成Lambdaエントリポイント（Cognito Post Confirmationトリガー）
///
/// ユーザーのメールアドレス確認完了を起点に、2フェーズの
/// create-then-linkフローを実行する:
/// 1. プールIDから解決したテナントのクラブドキュメントを作成
/// 2. 作成されたドキュメントIDをユーザーのカスタム属性へ書き戻す
///
/// 失敗時はエラーを返し、Cognito側で確認フローが失敗扱いになる。
/// フェーズ2の失敗はフェーズ1をロールバックせず、孤児ドキュメントIDを
/// 含むエラーとして表面化させる。
use aws_lambda_events::event::cognito::CognitoEventUserPoolsPostConfirmation;
use club_api::application::{CreateClubHandler, DomainResolver};
use club_api::infrastructure::{
    init_logging, AppConfig, AwsCognitoOps, AwsSsmParameterStore, PoolIdMapping, SanityClient,
    SanityClubRepository, SanityConfig,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("create-club Lambda関数を初期化");

    // Lambda関数を初期化して実行
    let func = service_fn(handler);
    lambda_runtime::run(func).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// # 処理フロー
/// 1. イベントからプールID・ユーザー名・属性を抽出
/// 2. プールIDからドメインを解決し、テナント別Sanityトークンを取得
/// 3. CreateClubHandlerで2フェーズフローを実行
/// 4. 成功時はイベントをそのまま返却（Cognitoの確認フロー継続）
async fn handler(
    event: LambdaEvent<CognitoEventUserPoolsPostConfirmation>,
) -> Result<CognitoEventUserPoolsPostConfirmation, Error> {
    let payload = event.payload;

    let user_pool_id = payload
        .cognito_event_user_pools_header
        .user_pool_id
        .clone()
        .ok_or("event has no user pool id")?;
    let username = payload
        .cognito_event_user_pools_header
        .user_name
        .clone()
        .ok_or("event has no user name")?;

    info!(
        user_pool_id = %user_pool_id,
        trigger_source = ?payload
            .cognito_event_user_pools_header
            .trigger_source,
        "Post Confirmationイベントを受信"
    );

    let config = AppConfig::from_env().inspect_err(|err| {
        error!(error = %err, "設定の読み込みに失敗");
    })?;

    let store = AwsSsmParameterStore::from_config().await;
    let resolver = DomainResolver::new(
        config.allow_list().clone(),
        PoolIdMapping::new(store.clone(), config.product(), config.environment()),
    );

    // Sanityトークン解決のため、先にドメインを解決する
    let domain = resolver
        .resolve_from_pool_id(&user_pool_id)
        .await
        .inspect_err(|err| {
            error!(user_pool_id = %user_pool_id, error = %err, "ドメイン解決に失敗");
        })?;

    let sanity_config = SanityConfig::resolve(&config, &domain, &store)
        .await
        .inspect_err(|err| {
            error!(domain = %domain, error = %err, "Sanity設定の解決に失敗");
        })?;

    let repository = SanityClubRepository::new(SanityClient::new(sanity_config));
    let cognito = AwsCognitoOps::from_config().await;
    let create_handler = CreateClubHandler::new(resolver, repository, cognito);

    match create_handler
        .handle(&user_pool_id, &username, &payload.request.user_attributes)
        .await
    {
        Ok(club) => {
            info!(
                club_id = club.id.as_deref().unwrap_or("(unknown)"),
                domain = %domain,
                "クラブ作成完了"
            );
            // Cognitoの確認フローを継続させるためイベントを返却
            Ok(payload)
        }
        Err(err) => {
            // エラー返却によりCognito側で確認が失敗扱いになる
            error!(
                user_pool_id = %user_pool_id,
                error = %err,
                "クラブ作成フローに失敗"
            );
            Err(err.into())
        }
    }
}

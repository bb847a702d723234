/// クラブ取得HTTP Lambdaエントリポイント
///
/// API Gateway経由の `GET /clubs/{id}?domain=<domain>` を処理し、
/// テナントスコープ付きでクラブドキュメントをJSONで返却する。
use club_api::application::{GetClubError, GetClubHandler};
use club_api::infrastructure::{
    init_logging, AppConfig, AwsSsmParameterStore, SanityClient, SanityClubRepository, SanityConfig,
};
use lambda_http::http::header::CONTENT_TYPE;
use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde_json::json;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("get-club Lambda関数を初期化");

    // Lambda関数を実行
    run(service_fn(handler)).await
}

/// HTTPリクエストハンドラー
///
/// # 処理フロー
/// 1. 設定を環境変数から読み込み
/// 2. パス・クエリパラメータを抽出
/// 3. ドメイン検証後、テナント別SanityトークンをSSMから解決
/// 4. GetClubHandlerでクラブを取得し、結果をステータスコードへ変換
async fn handler(request: Request) -> Result<Response<Body>, Error> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "設定の読み込みに失敗");
            return json_response(500, json!({ "message": "Internal server error" }));
        }
    };

    let path_parameters = request.path_parameters();
    let query_parameters = request.query_string_parameters();
    let club_id = path_parameters.first("id");
    let domain = query_parameters.first("domain");

    if club_id.is_none() {
        return json_response(400, json!({ "message": "Missing club ID" }));
    }

    // Sanityトークン解決の前にドメインを検証する
    // （未検証の値をSSMパスに使用しないため）
    let validated_domain = match config.allow_list().validate(domain) {
        Ok(domain) => domain,
        Err(err) => {
            warn!(error = %err, "ドメイン検証に失敗");
            return json_response(400, json!({ "message": err.to_string() }));
        }
    };

    let store = AwsSsmParameterStore::from_config().await;
    let sanity_config = match SanityConfig::resolve(&config, &validated_domain, &store).await {
        Ok(sanity_config) => sanity_config,
        Err(err) => {
            error!(error = %err, "Sanity設定の解決に失敗");
            return json_response(500, json!({ "message": "Internal server error" }));
        }
    };

    let repository = SanityClubRepository::new(SanityClient::new(sanity_config));
    let get_handler = GetClubHandler::new(config.allow_list().clone(), repository);

    match get_handler.handle(club_id, domain).await {
        Ok(club) => match serde_json::to_string(&club) {
            Ok(body) => Ok(Response::builder()
                .status(200)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::Text(body))?),
            Err(err) => {
                error!(error = %err, "レスポンスのシリアライズに失敗");
                json_response(500, json!({ "message": "Internal server error" }))
            }
        },
        Err(GetClubError::MissingClubId) => {
            json_response(400, json!({ "message": "Missing club ID" }))
        }
        Err(GetClubError::Resolution(err)) => {
            json_response(400, json!({ "message": err.to_string() }))
        }
        Err(GetClubError::NotFound) => json_response(404, json!({ "message": "Club not found" })),
        Err(GetClubError::Repository(err)) => {
            error!(error = %err, "クラブ取得に失敗");
            json_response(500, json!({ "message": "Internal server error" }))
        }
    }
}

/// JSONレスポンスを構築するヘルパー
fn json_response(status: u16, body: serde_json::Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::Text(body.to_string()))?)
}

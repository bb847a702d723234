/// クラブ更新HTTP Lambdaエントリポイント
///
/// API Gateway経由の `PUT /clubs/{id}?domain=<domain>` を処理する。
/// テナント分離チェックを通過した場合のみ、JSONボディの設定済み
/// フィールドでクラブドキュメントを部分更新する。
use club_api::application::{UpdateClubError, UpdateClubHandler};
use club_api::domain::UpdateClubInput;
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

    info!("update-club Lambda関数を初期化");

    // Lambda関数を実行
    run(service_fn(handler)).await
}

/// HTTPリクエストハンドラー
///
/// # 処理フロー
/// 1. 設定を環境変数から読み込み
/// 2. パス・クエリパラメータとJSONボディを抽出
/// 3. ドメイン検証後、テナント別SanityトークンをSSMから解決
/// 4. UpdateClubHandlerで更新し、結果をステータスコードへ変換
///    （別テナントのクラブへのアクセスは403）
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

    // ボディをUpdateClubInputとして解析（空ボディは空オブジェクト扱い）
    let input = match parse_body(request.body()) {
        Ok(input) => input,
        Err(message) => {
            return json_response(400, json!({ "message": message }));
        }
    };

    if input.is_empty() {
        return json_response(400, json!({ "message": "No update fields provided" }));
    }

    // Sanityトークン解決の前にドメインを検証する
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
    let update_handler = UpdateClubHandler::new(config.allow_list().clone(), repository);

    match update_handler.handle(club_id, domain, &input).await {
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
        Err(UpdateClubError::MissingClubId) => {
            json_response(400, json!({ "message": "Missing club ID" }))
        }
        Err(UpdateClubError::EmptyInput) => {
            json_response(400, json!({ "message": "No update fields provided" }))
        }
        Err(UpdateClubError::Resolution(err)) => {
            json_response(400, json!({ "message": err.to_string() }))
        }
        Err(UpdateClubError::WrongDomain { .. }) => json_response(
            403,
            json!({ "message": "Access denied: Club does not belong to the specified domain" }),
        ),
        Err(UpdateClubError::NotFound) => {
            json_response(404, json!({ "message": "Club not found" }))
        }
        Err(UpdateClubError::Repository(err)) => {
            error!(error = %err, "クラブ更新に失敗");
            json_response(500, json!({ "message": "Internal server error" }))
        }
    }
}

/// リクエストボディをUpdateClubInputとして解析する
fn parse_body(body: &Body) -> Result<UpdateClubInput, &'static str> {
    let text = match body {
        Body::Text(text) => text.clone(),
        Body::Binary(bytes) => {
            String::from_utf8(bytes.clone()).map_err(|_| "Invalid request body")?
        }
        Body::Empty => String::new(),
        _ => return Err("Invalid request body"),
    };

    if text.trim().is_empty() {
        // 空ボディは「更新フィールドなし」としてハンドラー側で拒否される
        return Ok(UpdateClubInput::default());
    }

    serde_json::from_str(&text).map_err(|_| "Invalid request body")
}

/// JSONレスポンスを構築するヘルパー
fn json_response(status: u16, body: serde_json::Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::Text(body.to_string()))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse_body テスト ====================

    #[test]
    fn test_parse_body_partial_json() {
        let body = Body::Text(r#"{ "phone": "+38970123456" }"#.to_string());
        let input = parse_body(&body).unwrap();

        assert_eq!(input.phone.as_deref(), Some("+38970123456"));
        assert!(input.club_name.is_none());
        assert!(!input.is_empty());
    }

    #[test]
    fn test_parse_body_empty_is_default() {
        let input = parse_body(&Body::Empty).unwrap();
        assert!(input.is_empty());

        let input = parse_body(&Body::Text("   ".to_string())).unwrap();
        assert!(input.is_empty());
    }

    #[test]
    fn test_parse_body_binary_utf8() {
        let body = Body::Binary(br#"{ "city": "Bitola" }"#.to_vec());
        let input = parse_body(&body).unwrap();
        assert_eq!(input.city.as_deref(), Some("Bitola"));
    }

    #[test]
    fn test_parse_body_invalid_json() {
        let body = Body::Text("not json".to_string());
        assert!(parse_body(&body).is_err());
    }

    // ==================== json_response テスト ====================

    #[test]
    fn test_forbidden_response_shape() {
        let response = json_response(
            403,
            json!({ "message": "Access denied: Club does not belong to the specified domain" }),
        )
        .unwrap();

        assert_eq!(response.status(), 403);
        let body = match response.body() {
            Body::Text(text) => text.clone(),
            _ => panic!("予期しないBody型"),
        };
        assert!(body.contains("does not belong"));
    }
}

//! クラブドキュメントモデル
//!
//! コンテンツストア（Sanity）に保存されるクラブドキュメントと、
//! 作成・更新リクエストの入力型を定義する。
//! フィールド名はストア上のドキュメント形式（camelCase）に合わせる。

use serde::{Deserialize, Serialize};

/// SNSリンク集
///
/// すべてのフィールドは任意。未設定のフィールドはシリアライズされない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitkit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sportmaster: Option<String>,
}

/// メディア項目の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

/// クラブに紐づくメディア項目（写真または動画）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

/// URLフレンドリーなスラッグ
///
/// ストア上では `{"_type": "slug", "current": "..."}` オブジェクトとして表現される。
/// 作成時に一度だけ生成され、以後変更されない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubSlug {
    #[serde(rename = "_type")]
    pub slug_type: String,
    pub current: String,
}

impl ClubSlug {
    /// スラッグ文字列からClubSlugを作成
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            slug_type: "slug".to_string(),
            current: current.into(),
        }
    }
}

/// クラブドキュメント
///
/// `_`プレフィックス付きフィールドはストアが付与するメタデータで、
/// 作成前のドキュメントには存在しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    /// ストアが発行するドキュメントID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// テナント別ドキュメント種別タグ（`club_<domain>`）
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(rename = "_createdAt", skip_serializing_if = "Option::is_none")]
    pub store_created_at: Option<String>,
    #[serde(rename = "_updatedAt", skip_serializing_if = "Option::is_none")]
    pub store_updated_at: Option<String>,
    pub club_name: String,
    pub email: String,
    pub city: String,
    pub address: String,
    pub category: String,
    pub subcategory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_url: Option<String>,
    /// メイン画像URL（単一）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    /// メディア一覧（写真・動画、最大10件）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<ClubSlug>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// クラブ作成入力
///
/// ユーザー登録確認時のCognito属性から組み立てられる必須フィールドのみを持つ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubInput {
    pub club_name: String,
    pub email: String,
    pub city: String,
    pub address: String,
    pub category: String,
    pub subcategory: String,
}

/// クラブ更新入力
///
/// すべてのフィールドが任意。設定されたフィールドのみがストアへ
/// patch setされる。全フィールド未設定の更新はハンドラー側で拒否する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaItem>>,
}

impl UpdateClubInput {
    /// 更新対象フィールドが1つも設定されていない場合にtrueを返す
    pub fn is_empty(&self) -> bool {
        self.club_name.is_none()
            && self.email.is_none()
            && self.city.is_none()
            && self.address.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
            && self.phone.is_none()
            && self.website.is_none()
            && self.description.is_none()
            && self.social_media.is_none()
            && self.google_maps_url.is_none()
            && self.main_image.is_none()
            && self.media.is_none()
    }
}

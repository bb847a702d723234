// アプリケーション層モジュール
pub mod create_club;
pub mod domain_resolver;
pub mod get_club;
pub mod update_club;

// 再エクスポート
pub use create_club::{CreateClubError, CreateClubHandler};
pub use domain_resolver::{DomainResolver, DomainResolverError};
pub use get_club::{GetClubError, GetClubHandler};
pub use update_club::{UpdateClubError, UpdateClubHandler};

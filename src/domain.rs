// Domain layer modules
pub mod allow_list;
pub mod club;
pub mod slug;

// Re-exports
pub use allow_list::{AllowListParseError, DomainAllowList, DomainResolutionError};
pub use club::{Club, ClubSlug, CreateClubInput, MediaItem, MediaType, SocialMedia, UpdateClubInput};
pub use slug::{generate_club_slug, to_slug, transliterate};

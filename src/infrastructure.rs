// Infrastructure layer modules
pub mod cognito_ops;
pub mod config;
pub mod logging;
pub mod parameter_store;
pub mod pool_mapping;
pub mod sanity;

// Re-exports
pub use cognito_ops::{AwsCognitoOps, CognitoOps, CognitoOpsError, UserAttribute, SANITY_ID_ATTRIBUTE};
pub use config::{AppConfig, AppConfigError};
pub use logging::init_logging;
pub use parameter_store::{AwsSsmParameterStore, ParameterStore, ParameterStoreError};
pub use pool_mapping::PoolIdMapping;
pub use sanity::{
    ClubRepository, ClubRepositoryError, SanityClient, SanityClientError, SanityClubRepository,
    SanityConfig, SanityConfigError,
};

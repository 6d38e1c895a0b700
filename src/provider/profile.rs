pub mod config;
pub mod validation;

pub use config::{ProviderConfig, ProviderType};
pub use validation::{parse_provider_type, provider_type_slug};

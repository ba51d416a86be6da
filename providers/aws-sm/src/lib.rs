//! AWS Secrets Manager secret provider.
//!
//! Read-only access to `GetSecretValue` with hand-rolled Signature V4
//! request signing.

mod config;
pub use config::AwsConfig;

mod provider;
pub use provider::AwsSecretsManagerProvider;

mod constants;
mod sign;

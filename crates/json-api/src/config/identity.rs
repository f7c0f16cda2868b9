//! Identity Provider Config

use clap::Args;

/// Identity provider settings.
#[derive(Debug, Args)]
pub struct IdentityProviderConfig {
    /// Identity provider base address
    #[arg(long = "identity-addr", env = "IDENTITY_ADDR")]
    pub addr: String,

    /// API key presented to the identity provider
    #[arg(long = "identity-api-key", env = "IDENTITY_API_KEY", hide_env_values = true)]
    pub api_key: String,
}

//! # CLI Interface
//!
//! Defines the command-line argument structure for `locus` using `clap`
//! derive. Every secret can come from the environment so it never has to
//! appear in shell history.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Locus identity binding.
///
/// Builds Google sign-in redirects, reads identity tokens back out of the
/// redirect fragment, and derives the Locus address bound to them.
#[derive(Parser, Debug)]
#[command(
    name = "locus",
    about = "Locus identity binding tool",
    version,
    propagate_version = true
)]
pub struct LocusCli {
    #[command(flatten)]
    pub binder: BinderArgs,

    /// Log output format: pretty or json.
    #[arg(long, global = true, env = "LOCUS_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the binder configuration comes from.
///
/// A `--config` file wins over the individual flags.
#[derive(Args, Debug)]
pub struct BinderArgs {
    /// Path to a TOML config with client_id, salt, redirect_uri.
    #[arg(long, short = 'c', global = true, env = "LOCUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// OAuth client id issued by Google.
    #[arg(long, global = true, env = "LOCUS_GOOGLE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Salt used for address derivation.
    ///
    /// **Never pass this flag in production**; use the environment or a
    /// config file instead.
    #[arg(long, global = true, env = "LOCUS_ZKLOGIN_SALT", hide_env_values = true)]
    pub salt: Option<String>,

    /// Callback target registered with the provider.
    #[arg(
        long,
        global = true,
        env = "LOCUS_REDIRECT_URI",
        default_value = "http://localhost:5173"
    )]
    pub redirect_uri: String,

    /// Override the provider's authorization endpoint.
    #[arg(long, global = true, env = "LOCUS_AUTH_ENDPOINT")]
    pub auth_endpoint: Option<String>,
}

/// Top-level subcommands for the locus binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a provider sign-in URL with a fresh nonce.
    AuthUrl,
    /// Print the id_token carried by a redirect fragment.
    Extract(FragmentArgs),
    /// Print the canonical form of the configured salt.
    Salt,
    /// Derive the address bound to an identity token.
    Derive(DeriveArgs),
    /// Finish a login: extract, check nonce and expiry, derive.
    Login(LoginArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct FragmentArgs {
    /// The redirect fragment, e.g. "#id_token=...&authuser=0".
    #[arg(long)]
    pub fragment: String,
}

#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// The identity token.
    #[arg(long, conflicts_with = "fragment", required_unless_present = "fragment")]
    pub token: Option<String>,

    /// A redirect fragment to take the token from.
    #[arg(long)]
    pub fragment: Option<String>,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// The redirect fragment returned by the provider.
    #[arg(long)]
    pub fragment: String,

    /// The nonce printed by `auth-url`. When omitted the nonce is not checked.
    #[arg(long)]
    pub nonce: Option<String>,
}

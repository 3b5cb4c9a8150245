// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Locus CLI
//!
//! Entry point for the `locus` binary. Parses CLI arguments, initializes
//! logging, builds an [`IdentityBinder`] from flags, environment, or a
//! config file, and runs one subcommand:
//!
//! - `auth-url` - print a sign-in URL and the nonce it carries
//! - `extract`  - pull the id_token out of a redirect fragment
//! - `salt`     - show the canonical salt
//! - `derive`   - derive the address for a token
//! - `login`    - extract, verify nonce and expiry, derive
//! - `version`  - print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use locus_identity::salt::salt_digest;
use locus_identity::{
    require_assertion, BinderConfig, IdentityAssertion, IdentityBinder, IdentityError, Nonce,
    Salt,
};

use cli::{BinderArgs, Commands, LocusCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = LocusCli::parse();

    logging::init_logging(
        "locus=info,locus_identity=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::AuthUrl => auth_url(&cli.binder, cli.json),
        Commands::Extract(args) => extract(&args.fragment, cli.json),
        Commands::Salt => show_salt(&cli.binder, cli.json),
        Commands::Derive(args) => derive(&cli.binder, args, cli.json),
        Commands::Login(args) => login(&cli.binder, args, cli.json),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Build the binder config: a `--config` file if given, flags/env otherwise.
fn load_config(args: &BinderArgs) -> Result<BinderConfig> {
    if let Some(path) = &args.config {
        tracing::debug!(path = %path.display(), "loading binder config file");
        return BinderConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    let client_id = args
        .client_id
        .clone()
        .context("no OAuth client id: pass --client-id or set LOCUS_GOOGLE_CLIENT_ID")?;
    let salt = args
        .salt
        .clone()
        .context("no salt: pass --salt or set LOCUS_ZKLOGIN_SALT")?;

    let config = BinderConfig::new(client_id, Salt::new(salt), args.redirect_uri.clone())
        .context("invalid binder configuration")?;
    match &args.auth_endpoint {
        Some(endpoint) => config
            .with_auth_endpoint(endpoint)
            .context("invalid authorization endpoint"),
        None => Ok(config),
    }
}

fn load_binder(args: &BinderArgs) -> Result<IdentityBinder> {
    Ok(IdentityBinder::new(load_config(args)?))
}

fn emit<T: Serialize>(json: bool, value: &T, plain: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        plain(value);
    }
    Ok(())
}

#[derive(Serialize)]
struct AuthUrlOutput {
    url: String,
    nonce: String,
}

fn auth_url(args: &BinderArgs, json: bool) -> Result<()> {
    let binder = load_binder(args)?;
    let request = binder.build_authorization_url();
    tracing::info!(nonce = %request.nonce, "authorization url issued");

    let output = AuthUrlOutput {
        url: request.url.to_string(),
        nonce: request.nonce.to_string(),
    };
    emit(json, &output, |o| {
        println!("{}", o.url);
        eprintln!("nonce: {}", o.nonce);
    })
}

#[derive(Debug, Serialize)]
struct ExtractOutput {
    id_token: String,
}

fn extract_output(fragment: &str) -> Result<ExtractOutput> {
    match require_assertion(fragment) {
        Ok(assertion) => Ok(ExtractOutput {
            id_token: assertion.as_str().to_string(),
        }),
        Err(IdentityError::MissingToken) => bail!("no login: the fragment carries no id_token"),
        Err(e) => Err(e.into()),
    }
}

fn extract(fragment: &str, json: bool) -> Result<()> {
    let output = extract_output(fragment)?;
    emit(json, &output, |o| println!("{}", o.id_token))
}

#[derive(Serialize)]
struct SaltOutput {
    digest: String,
    decimal: String,
}

fn show_salt(args: &BinderArgs, json: bool) -> Result<()> {
    let binder = load_binder(args)?;
    let output = SaltOutput {
        digest: salt_digest(binder.config().salt()),
        decimal: binder.canonical_salt().to_string(),
    };
    emit(json, &output, |o| {
        println!("digest  : {}", o.digest);
        println!("decimal : {}", o.decimal);
    })
}

#[derive(Serialize)]
struct AddressOutput {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

fn derive(args: &BinderArgs, derive_args: cli::DeriveArgs, json: bool) -> Result<()> {
    let binder = load_binder(args)?;
    let assertion = match (derive_args.token, derive_args.fragment) {
        (Some(token), _) => IdentityAssertion::new(token),
        (None, Some(fragment)) => require_assertion(&fragment)
            .context("no login: the fragment carries no id_token")?,
        (None, None) => bail!("pass --token or --fragment"),
    };

    let address = binder
        .derive_address(&assertion)
        .context("address derivation failed")?;

    let output = AddressOutput {
        address: address.to_string(),
        issuer: None,
        subject: None,
        email: None,
    };
    emit(json, &output, |o| println!("{}", o.address))
}

fn login(args: &BinderArgs, login_args: cli::LoginArgs, json: bool) -> Result<()> {
    let binder = load_binder(args)?;
    let nonce = login_args.nonce.map(Nonce::new);
    if nonce.is_none() {
        tracing::warn!("no --nonce given; the token's nonce claim will not be checked");
    }

    let outcome = binder
        .complete_login(&login_args.fragment, nonce.as_ref())
        .context("login failed")?;

    let output = AddressOutput {
        address: outcome.address.to_string(),
        issuer: Some(outcome.claims.iss),
        subject: Some(outcome.claims.sub),
        email: outcome.claims.email,
    };
    emit(json, &output, |o| {
        println!("Login complete.");
        println!("  Address : {}", o.address);
        if let Some(issuer) = &o.issuer {
            println!("  Issuer  : {}", issuer);
        }
        if let Some(subject) = &o.subject {
            println!("  Subject : {}", subject);
        }
        if let Some(email) = &o.email {
            println!("  Email   : {}", email);
        }
    })
}

/// Prints version information to stdout.
fn print_version() {
    println!("locus {}", env!("CARGO_PKG_VERSION"));
}

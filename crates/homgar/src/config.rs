//! CLI configuration: profile selection plus flag overrides on top of
//! `homgar_config`.
//!
//! Core never sees these types -- it receives a pre-built `HomgarConfig`.

use std::path::PathBuf;

use homgar_config::{Config, Profile};
use homgar_core::{Homgar, TokenCache};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a cloud command needs.
pub struct Context {
    pub homgar: Homgar,
    pub profile_name: String,
    pub profile: Profile,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Pick the profile: a standalone account file, a named profile, or an
/// empty one that flags and environment fill in.
fn select_profile(global: &GlobalOpts, config: &Config, name: &str) -> Result<Profile, CliError> {
    if let Some(ref path) = global.config {
        return Ok(homgar_config::load_profile_file(path)?);
    }

    match config.profiles.get(name) {
        Some(profile) => Ok(profile.clone()),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            Err(CliError::ProfileNotFound {
                name: name.into(),
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
                path: homgar_config::config_path().display().to_string(),
            })
        }
        None => Ok(Profile::default()),
    }
}

/// Apply CLI flag overrides. Flags win over profile values.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref email) = global.email {
        profile.email = Some(email.clone());
    }
    if let Some(ref url) = global.base_url {
        profile.base_url = Some(url.clone());
    }
    if let Some(ref cache) = global.cache {
        profile.cache_file = Some(cache.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

/// Build the facade for the active profile.
pub fn build_context(global: &GlobalOpts) -> Result<Context, CliError> {
    let cfg = homgar_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = select_profile(global, &cfg, &profile_name)?;
    apply_overrides(&mut profile, global);

    let mut core_config =
        homgar_config::profile_to_homgar_config(&profile, &profile_name, &cfg.defaults)?;
    if global.no_cache {
        core_config.token_cache = TokenCache::Memory;
    }
    if core_config.timeout.is_zero() {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least one second".into(),
        });
    }

    tracing::debug!(
        profile = %profile_name,
        base_url = %core_config.base_url,
        cache = ?core_config.token_cache,
        "resolved configuration"
    );

    Ok(Context {
        homgar: Homgar::new(core_config)?,
        profile_name,
        profile,
    })
}

/// Where the token lives for this context, if anywhere on disk.
pub fn cache_location(ctx: &Context) -> Option<PathBuf> {
    match ctx.homgar.config().token_cache {
        TokenCache::File(ref path) => Some(path.clone()),
        TokenCache::Memory => None,
    }
}


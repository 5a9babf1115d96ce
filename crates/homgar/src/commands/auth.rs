//! Session commands: explicit login and logout.

use homgar_core::Credentials;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::{self, Context};
use crate::error::CliError;

/// Credentials from the profile chain, or e-mail plus an interactive prompt.
fn login_credentials(ctx: &Context) -> Result<(Credentials, bool), CliError> {
    if let Some(ref credentials) = ctx.homgar.config().credentials {
        return Ok((credentials.clone(), false));
    }

    let email = homgar_config::resolve_email(&ctx.profile, &ctx.profile_name)?;
    let password = rpassword::prompt_password(format!("HomGar password for {email}: "))?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "must not be empty".into(),
        });
    }
    Ok((Credentials::new(email, password), true))
}

pub async fn login(ctx: &Context, args: &LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (credentials, prompted) = login_credentials(ctx)?;
    let token = ctx.homgar.login_with(&credentials).await?;

    if args.remember {
        homgar_config::store_password(&ctx.profile_name, &credentials.password)?;
        tracing::info!(profile = %ctx.profile_name, "password stored in keyring");
    } else if prompted {
        tracing::debug!("prompted password not stored; pass --remember to keep it");
    }

    if !global.quiet {
        match config::cache_location(ctx) {
            Some(path) => eprintln!(
                "Logged in as {} (token cached in {})",
                token.email,
                path.display()
            ),
            None => eprintln!("Logged in as {}", token.email),
        }
    }
    Ok(())
}

pub fn logout(ctx: &Context, global: &GlobalOpts) {
    ctx.homgar.logout();
    if !global.quiet {
        eprintln!("Logged out of profile '{}'", ctx.profile_name);
    }
}


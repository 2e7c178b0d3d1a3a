use crate::cli::{
    actions::{Action, countries, logout, profile, register, send_code, signup, verify},
    commands::{self, logging::ARG_VERBOSITY, store},
    globals::GlobalArgs,
};
use crate::{
    countries::find_country,
    model::{Country, VerificationMethod},
    store::StoreConfig,
};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use std::{path::PathBuf, time::Duration};
use tracing::debug;
use uuid::Uuid;

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let data_dir = matches
        .get_one::<String>(store::ARG_DATA_DIR)
        .map(PathBuf::from)
        .context("missing required argument: --data-dir")?;
    let code_ttl = matches
        .get_one::<i64>(store::ARG_CODE_TTL)
        .copied()
        .unwrap_or(120);
    let max_attempts = matches
        .get_one::<u32>(store::ARG_MAX_ATTEMPTS)
        .copied()
        .unwrap_or(3);
    let latency_ms = matches
        .get_one::<u64>(store::ARG_LATENCY_MS)
        .copied()
        .unwrap_or(0);

    Ok(GlobalArgs::new(data_dir)
        .with_store_config(
            StoreConfig::new()
                .with_code_ttl_seconds(code_ttl)
                .with_max_attempts(max_attempts),
        )
        .with_latency(Duration::from_millis(latency_ms)))
}

fn country(matches: &clap::ArgMatches) -> Result<Option<Country>> {
    matches
        .get_one::<String>(commands::ARG_COUNTRY)
        .map(|code| {
            find_country(code).ok_or_else(|| {
                anyhow!("unknown country code: {code} (see `onboard countries`)")
            })
        })
        .transpose()
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;
    debug!(
        data_dir = %globals.data_dir.display(),
        verbosity = matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0),
        "resolved global arguments"
    );

    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see `onboard --help`")?;

    let string = |id: &str| sub.get_one::<String>(id).cloned();
    let required = |id: &str| string(id).with_context(|| format!("missing required argument: --{id}"));
    let avatar = || sub.get_one::<String>(commands::ARG_AVATAR).map(PathBuf::from);
    let json = || sub.get_flag(commands::ARG_JSON);

    let action = match name {
        "register" => Action::Register(register::Args {
            globals,
            username: required(commands::ARG_USERNAME)?,
            email: required(commands::ARG_EMAIL)?,
            birth_date: sub
                .get_one::<NaiveDate>(commands::ARG_BIRTH_DATE)
                .copied()
                .context("missing required argument: --birth-date")?,
            country: country(sub)?.context("missing required argument: --country")?,
            phone: required(commands::ARG_PHONE)?,
            website: string(commands::ARG_WEBSITE).unwrap_or_default(),
            method: required(commands::ARG_METHOD)?
                .parse::<VerificationMethod>()
                .map_err(|err| anyhow!(err))?,
            avatar: avatar(),
            json: json(),
        }),
        "send-code" => Action::SendCode(send_code::Args {
            globals,
            user_id: sub
                .get_one::<Uuid>(commands::ARG_USER_ID)
                .copied()
                .context("missing required argument: --user-id")?,
        }),
        "verify" => Action::Verify(verify::Args {
            globals,
            session_id: sub
                .get_one::<Uuid>(commands::ARG_SESSION_ID)
                .copied()
                .context("missing required argument: --session-id")?,
            code: required(commands::ARG_CODE)?,
        }),
        "signup" => Action::Signup(signup::Args { globals }),
        "profile" => Action::Profile(profile::Args {
            globals,
            json: json(),
        }),
        "update-profile" => Action::UpdateProfile(profile::UpdateArgs {
            globals,
            username: string(commands::ARG_USERNAME),
            birth_date: sub.get_one::<NaiveDate>(commands::ARG_BIRTH_DATE).copied(),
            country: country(sub)?,
            website: string(commands::ARG_WEBSITE),
            avatar: avatar(),
            remove_avatar: sub.get_flag(commands::ARG_REMOVE_AVATAR),
            json: json(),
        }),
        "logout" => Action::Logout(logout::Args { globals }),
        "countries" => Action::Countries(countries::Args {
            search: string(commands::ARG_SEARCH),
        }),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}

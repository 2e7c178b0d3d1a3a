use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::{
    actions::{input, render},
    globals::GlobalArgs,
};
use crate::{
    model::{Country, RegistrationData, VerificationMethod},
    navigation::{Screen, guest_guard},
    validate,
};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub username: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub country: Country,
    pub phone: String,
    pub website: String,
    pub method: VerificationMethod,
    pub avatar: Option<PathBuf>,
    pub json: bool,
}

/// Register a user and print its id.
/// # Errors
/// Returns an error on invalid input, a duplicate user, or an active session.
pub async fn execute(args: Args) -> Result<()> {
    let avatar = match &args.avatar {
        Some(path) => Some(input::load_avatar(path).await?),
        None => None,
    };
    let data = RegistrationData {
        avatar,
        username: args.username.trim().to_string(),
        email: args.email.trim().to_string(),
        birth_date: args.birth_date,
        country: args.country,
        phone: args.phone.trim().to_string(),
        website: args.website.trim().to_string(),
        verification_method: args.method,
    };
    validate::validate_registration(&data, input::today()).map_err(|err| input::invalid(&err))?;

    let (mut facade, navigator) = args.globals.open(Screen::Register);
    if !guest_guard(&facade.state(), navigator.as_ref()) {
        let username = facade.profile().map(|user| user.username).unwrap_or_default();
        bail!("already signed in as {username}, run `onboard logout` first");
    }

    let user_id = facade.register(data).await?;
    debug!(%user_id, "registered from the command line");

    if args.json {
        if let Some(user) = facade.store().user(user_id) {
            render::print_user(user, true)?;
        }
    } else {
        println!("Registered user {user_id}");
        println!("Next: onboard send-code --user-id {user_id}");
    }
    Ok(())
}

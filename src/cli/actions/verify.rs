use anyhow::{Result, anyhow};
use uuid::Uuid;

use crate::cli::{
    actions::{input, render},
    globals::GlobalArgs,
};
use crate::{
    navigation::{Navigator, Screen},
    validate,
};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub session_id: Uuid,
    pub code: String,
}

/// Check a code; on success the user is signed in and the profile is shown.
/// # Errors
/// Returns an error for malformed codes and every verification failure.
pub async fn execute(args: Args) -> Result<()> {
    let code = validate::sanitize_code_input(&args.code);
    validate::validate_code(&code).map_err(|err| input::invalid(&err))?;

    let (mut facade, navigator) = args.globals.open(Screen::Verify);
    let auth = match facade.verify_code(args.session_id, &code).await {
        Ok(auth) => auth,
        Err(err) if err.requires_new_code() => {
            return Err(anyhow!("{err}, request a new one with `onboard send-code`"));
        }
        Err(err) => return Err(err.into()),
    };

    println!("Verified, welcome {}!", auth.user.username);
    if navigator.current() == Screen::Profile {
        render::print_user(&auth.user, false)?;
    }
    Ok(())
}

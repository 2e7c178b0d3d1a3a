use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::cli::{
    actions::{input, render},
    globals::GlobalArgs,
};
use crate::{
    model::{Country, ProfileUpdate},
    navigation::{Screen, auth_guard},
    validate,
};

const NOT_SIGNED_IN: &str = "not signed in, run `onboard signup` or `onboard verify` first";

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub json: bool,
}

#[derive(Debug)]
pub struct UpdateArgs {
    pub globals: GlobalArgs,
    pub username: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub country: Option<Country>,
    pub website: Option<String>,
    pub avatar: Option<PathBuf>,
    pub remove_avatar: bool,
    pub json: bool,
}

/// Show the signed-in user.
/// # Errors
/// Returns an error when nobody is signed in.
pub fn execute(args: Args) -> Result<()> {
    let (facade, navigator) = args.globals.open(Screen::Profile);
    if !auth_guard(&facade.state(), navigator.as_ref()) {
        bail!(NOT_SIGNED_IN);
    }
    match facade.profile() {
        Some(user) => render::print_user(&user, args.json),
        None => bail!(NOT_SIGNED_IN),
    }
}

async fn profile_update(args: &UpdateArgs) -> Result<ProfileUpdate> {
    let mut update = ProfileUpdate::new();
    if let Some(username) = &args.username {
        update = update.with_username(username.trim().to_string());
    }
    if let Some(birth_date) = args.birth_date {
        update = update.with_birth_date(birth_date);
    }
    if let Some(country) = &args.country {
        update = update.with_country(country.clone());
    }
    if let Some(website) = &args.website {
        update = update.with_website(website.trim().to_string());
    }
    if let Some(path) = &args.avatar {
        update = update.with_avatar(Some(input::load_avatar(path).await?));
    } else if args.remove_avatar {
        update = update.with_avatar(None);
    }
    Ok(update)
}

/// Apply the given edits to the signed-in user's profile.
/// # Errors
/// Returns an error when nothing is signed in, nothing changes, or a field is invalid.
pub async fn update(args: UpdateArgs) -> Result<()> {
    let update = profile_update(&args).await?;
    if update.is_empty() {
        bail!("nothing to update, see `onboard update-profile --help`");
    }
    validate::validate_profile_update(&update, input::today())
        .map_err(|err| input::invalid(&err))?;

    let (mut facade, navigator) = args.globals.open(Screen::Profile);
    if !auth_guard(&facade.state(), navigator.as_ref()) {
        bail!(NOT_SIGNED_IN);
    }

    let user = facade.update_profile(update).await?;
    if !args.json {
        println!("Profile updated");
    }
    render::print_user(&user, args.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(dir: &Path) -> UpdateArgs {
        UpdateArgs {
            globals: GlobalArgs::new(dir.to_path_buf()),
            username: None,
            birth_date: None,
            country: None,
            website: None,
            avatar: None,
            remove_avatar: false,
            json: false,
        }
    }

    #[tokio::test]
    async fn test_profile_update_from_flags() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut args = args(dir.path());
        assert!(profile_update(&args).await?.is_empty());

        args.username = Some(" alicia ".to_string());
        args.remove_avatar = true;
        let update = profile_update(&args).await?;
        assert_eq!(update.username.as_deref(), Some("alicia"));
        assert_eq!(update.avatar, Some(None));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_requires_sign_in() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut args = args(dir.path());
        args.website = Some("https://alicia.dev".to_string());
        let err = update(args).await.err().map(|err| err.to_string());
        assert_eq!(err.as_deref(), Some(NOT_SIGNED_IN));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_empty_edit() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(update(args(dir.path())).await.is_err());
        Ok(())
    }
}

pub mod countries;
pub mod logout;
pub mod profile;
pub mod register;
pub mod send_code;
pub mod signup;
pub mod verify;

mod input;
mod render;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

#[derive(Debug)]
pub enum Action {
    Register(register::Args),
    SendCode(send_code::Args),
    Verify(verify::Args),
    Signup(signup::Args),
    Profile(profile::Args),
    UpdateProfile(profile::UpdateArgs),
    Logout(logout::Args),
    Countries(countries::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

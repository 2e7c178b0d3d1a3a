use crate::cli::actions::{
    Action, countries, logout, profile, register, send_code, signup, verify,
};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Register(args) => register::execute(args).await,
        Action::SendCode(args) => send_code::execute(args).await,
        Action::Verify(args) => verify::execute(args).await,
        Action::Signup(args) => signup::execute(args).await,
        Action::Profile(args) => profile::execute(args),
        Action::UpdateProfile(args) => profile::update(args).await,
        Action::Logout(args) => {
            logout::execute(args).await;
            Ok(())
        }
        Action::Countries(args) => {
            countries::execute(&args);
            Ok(())
        }
    }
}

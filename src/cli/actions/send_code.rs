use anyhow::Result;
use uuid::Uuid;

use crate::cli::globals::GlobalArgs;
use crate::countdown::format_remaining;
use crate::navigation::Screen;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub user_id: Uuid,
}

/// Open a verification session; the code itself goes to the console notifier.
/// # Errors
/// Returns an error if the user does not exist.
pub async fn execute(args: Args) -> Result<()> {
    let (mut facade, _navigator) = args.globals.open(Screen::Verify);
    let session_id = facade.send_verification_code(args.user_id).await?;

    let ttl = u64::try_from(facade.store().config().code_ttl_seconds()).unwrap_or(0);
    println!(
        "Verification session {session_id}, the code is valid for {}",
        format_remaining(ttl)
    );
    println!("Next: onboard verify --session-id {session_id} --code <CODE>");
    Ok(())
}

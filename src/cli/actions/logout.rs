use crate::cli::globals::GlobalArgs;
use crate::navigation::Screen;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Storage problems are logged by the store, never reported here.
pub async fn execute(args: Args) {
    let (mut facade, _navigator) = args.globals.open(Screen::Profile);
    match facade.profile() {
        Some(user) => {
            facade.logout().await;
            println!("Signed out {}", user.username);
        }
        None => println!("Not signed in"),
    }
}

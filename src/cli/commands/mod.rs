pub mod logging;
pub mod store;

use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_USERNAME: &str = "username";
pub const ARG_EMAIL: &str = "email";
pub const ARG_BIRTH_DATE: &str = "birth-date";
pub const ARG_COUNTRY: &str = "country";
pub const ARG_PHONE: &str = "phone";
pub const ARG_WEBSITE: &str = "website";
pub const ARG_METHOD: &str = "method";
pub const ARG_AVATAR: &str = "avatar";
pub const ARG_REMOVE_AVATAR: &str = "remove-avatar";
pub const ARG_USER_ID: &str = "user-id";
pub const ARG_SESSION_ID: &str = "session-id";
pub const ARG_CODE: &str = "code";
pub const ARG_SEARCH: &str = "search";
pub const ARG_JSON: &str = "json";

fn birth_date_arg() -> Arg {
    Arg::new(ARG_BIRTH_DATE)
        .long("birth-date")
        .help("Birth date, YYYY-MM-DD")
        .value_parser(clap::value_parser!(chrono::NaiveDate))
}

fn country_arg() -> Arg {
    Arg::new(ARG_COUNTRY)
        .long("country")
        .help("Country code, e.g. DE (see `onboard countries`)")
}

fn avatar_arg() -> Arg {
    Arg::new(ARG_AVATAR)
        .long("avatar")
        .help("Path to an image file, at most 5MB")
}

fn json_arg() -> Arg {
    Arg::new(ARG_JSON)
        .long("json")
        .help("Print the result as JSON")
        .action(ArgAction::SetTrue)
}

fn register() -> Command {
    Command::new("register")
        .about("Create an unverified user")
        .arg(
            Arg::new(ARG_USERNAME)
                .short('u')
                .long("username")
                .help("Username, at least 3 characters")
                .required(true),
        )
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long("email")
                .help("Email address")
                .required(true),
        )
        .arg(birth_date_arg().required(true))
        .arg(country_arg().required(true))
        .arg(
            Arg::new(ARG_PHONE)
                .long("phone")
                .help("Phone number")
                .required(true),
        )
        .arg(
            Arg::new(ARG_WEBSITE)
                .long("website")
                .help("Website, http:// or https://")
                .default_value(""),
        )
        .arg(
            Arg::new(ARG_METHOD)
                .short('m')
                .long("method")
                .help("Where the verification code is sent")
                .value_parser(["email", "phone"])
                .default_value("email"),
        )
        .arg(avatar_arg())
        .arg(json_arg())
}

fn send_code() -> Command {
    Command::new("send-code")
        .about("Send a new verification code to a registered user")
        .arg(
            Arg::new(ARG_USER_ID)
                .long("user-id")
                .help("Id printed by `onboard register`")
                .required(true)
                .value_parser(clap::value_parser!(uuid::Uuid)),
        )
}

fn verify() -> Command {
    Command::new("verify")
        .about("Verify a code and sign the user in")
        .arg(
            Arg::new(ARG_SESSION_ID)
                .long("session-id")
                .help("Id printed by `onboard send-code`")
                .required(true)
                .value_parser(clap::value_parser!(uuid::Uuid)),
        )
        .arg(
            Arg::new(ARG_CODE)
                .short('c')
                .long("code")
                .help("The 6-digit code")
                .required(true),
        )
}

fn update_profile() -> Command {
    Command::new("update-profile")
        .about("Edit the signed-in user's profile")
        .arg(
            Arg::new(ARG_USERNAME)
                .short('u')
                .long("username")
                .help("New username"),
        )
        .arg(birth_date_arg())
        .arg(country_arg())
        .arg(
            Arg::new(ARG_WEBSITE)
                .long("website")
                .help("New website, empty to clear"),
        )
        .arg(avatar_arg().conflicts_with(ARG_REMOVE_AVATAR))
        .arg(
            Arg::new(ARG_REMOVE_AVATAR)
                .long("remove-avatar")
                .help("Remove the current avatar")
                .action(ArgAction::SetTrue),
        )
        .arg(json_arg())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("onboard")
        .about("Registration, code verification and profile management")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(register())
        .subcommand(send_code())
        .subcommand(verify())
        .subcommand(
            Command::new("signup")
                .about("Register and verify interactively, with a live code countdown"),
        )
        .subcommand(
            Command::new("profile")
                .about("Show the signed-in user")
                .arg(json_arg()),
        )
        .subcommand(update_profile())
        .subcommand(Command::new("logout").about("Sign the current user out"))
        .subcommand(
            Command::new("countries").about("List selectable countries").arg(
                Arg::new(ARG_SEARCH)
                    .short('s')
                    .long("search")
                    .help("Filter by name or code"),
            ),
        );

    let command = store::with_args(command);
    logging::with_args(command)
}

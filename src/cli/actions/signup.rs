use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::path::Path;
use tracing::debug;

use crate::cli::{
    actions::{
        input::{self, Prompt},
        render,
    },
    globals::GlobalArgs,
};
use crate::{
    countdown::Countdown,
    countries::{find_country, search_countries},
    facade::AuthFacade,
    model::{Country, RegistrationData, VerificationMethod},
    navigation::{Navigator, Screen, guest_guard},
    validate,
};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

type Rule = fn(&str) -> Result<(), validate::ValidationError>;

fn text(rule: Rule) -> impl Fn(&str) -> Result<String, String> {
    move |value| {
        rule(value)
            .map(|()| value.to_string())
            .map_err(|err| err.to_string())
    }
}

fn birth_date(value: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "Use the YYYY-MM-DD format".to_string())?;
    validate::validate_birth_date(date, input::today()).map_err(|err| err.to_string())?;
    Ok(date)
}

fn country(value: &str) -> Result<Country, String> {
    if value.is_empty() {
        return Err(validate::ValidationError::Required("country").to_string());
    }
    if let Some(country) = find_country(value) {
        return Ok(country);
    }
    match search_countries(value).as_slice() {
        [country] => Ok(country.clone()),
        [] => Err("No country matches, see `onboard countries`".to_string()),
        many => Err(format!(
            "Several countries match: {}",
            many.iter()
                .map(|country| country.code.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn method(value: &str) -> Result<VerificationMethod, String> {
    if value.is_empty() {
        return Ok(VerificationMethod::default());
    }
    value.parse()
}

async fn ask_registration(prompt: &mut Prompt) -> Result<RegistrationData> {
    println!("Create your account");
    let username = prompt
        .ask_until("Username", text(validate::validate_username))
        .await?;
    let email = prompt.ask_until("Email", text(validate::validate_email)).await?;
    let birth_date = prompt.ask_until("Birth date (YYYY-MM-DD)", birth_date).await?;
    let country = prompt.ask_until("Country (code or name)", country).await?;
    let phone = prompt
        .ask_until(&format!("Phone ({})", country.phone_code), text(validate::validate_phone))
        .await?;
    let website = prompt
        .ask_until("Website (optional)", text(validate::validate_website))
        .await?;
    let verification_method = prompt
        .ask_until("Send the code by email or phone? [email]", method)
        .await?;

    let avatar = loop {
        let path = prompt.ask("Avatar image path (optional)").await?;
        if path.is_empty() {
            break None;
        }
        match input::load_avatar(Path::new(&path)).await {
            Ok(avatar) => break Some(avatar),
            Err(err) => println!("  {err:#}"),
        }
    };

    Ok(RegistrationData {
        avatar,
        username,
        email,
        birth_date,
        country,
        phone,
        website,
        verification_method,
    })
}

/// Prompt for codes until one verifies. `new` requests another code once the
/// countdown ran out or the session can no longer be used.
async fn verify_loop(
    facade: &mut AuthFacade,
    prompt: &mut Prompt,
    user_id: uuid::Uuid,
    ttl: u64,
) -> Result<()> {
    let mut session_id = facade.send_verification_code(user_id).await?;
    let mut countdown = Countdown::start(ttl);
    let mut expiry_announced = false;
    let mut needs_new_code = false;

    loop {
        Prompt::show(&format!(
            "Code ({} left, `new` for another code)",
            countdown.formatted()
        ))?;
        let answer = tokio::select! {
            line = prompt.read_line() => line?,
            () = countdown.finished(), if !expiry_announced => {
                expiry_announced = true;
                println!("\n  Verification code expired, type `new` to request another one.");
                continue;
            }
        };

        if answer.eq_ignore_ascii_case("new") {
            if countdown.can_request_new_code() || needs_new_code {
                session_id = facade.send_verification_code(user_id).await?;
                countdown.restart(ttl);
                expiry_announced = false;
                needs_new_code = false;
            } else {
                println!("  You can request a new code in {}", countdown.formatted());
            }
            continue;
        }

        let code = validate::sanitize_code_input(&answer);
        if let Err(err) = validate::validate_code(&code) {
            println!("  {err}");
            continue;
        }

        match facade.verify_code(session_id, &code).await {
            Ok(_) => return Ok(()),
            Err(err) => {
                println!("  {err}");
                if err.requires_new_code() {
                    needs_new_code = true;
                    println!("  Type `new` to request another code.");
                }
            }
        }
    }
}

/// Interactive registration followed by verification.
/// # Errors
/// Returns an error if someone is already signed in or stdin closes early.
pub async fn execute(args: Args) -> Result<()> {
    let (mut facade, navigator) = args.globals.open(Screen::Register);
    if !guest_guard(&facade.state(), navigator.as_ref()) {
        let username = facade.profile().map(|user| user.username).unwrap_or_default();
        bail!("already signed in as {username}, run `onboard logout` first");
    }

    if !args.globals.latency.is_zero() {
        facade.on_change(|state| {
            if state.is_loading {
                eprintln!("  working...");
            }
        });
    }

    let mut prompt = Prompt::new();
    let data = loop {
        let data = ask_registration(&mut prompt).await?;
        match validate::validate_registration(&data, input::today()) {
            Ok(()) => break data,
            Err(err) => println!("  {}", input::invalid(&err)),
        }
    };

    let user_id = facade.register(data).await?;
    debug!(%user_id, "registered interactively");
    navigator.navigate(Screen::Verify);

    let ttl = u64::try_from(facade.store().config().code_ttl_seconds()).unwrap_or(0);
    verify_loop(&mut facade, &mut prompt, user_id, ttl).await?;

    if let Some(user) = facade.profile() {
        println!("Verified, welcome {}!", user.username);
        if navigator.current() == Screen::Profile {
            render::print_user(&user, false)?;
        }
    }
    Ok(())
}

use clap::{Arg, Command};

use crate::store::MAX_CODE_TTL_SECONDS;

pub const ARG_DATA_DIR: &str = "data-dir";
pub const ARG_CODE_TTL: &str = "code-ttl";
pub const ARG_MAX_ATTEMPTS: &str = "max-attempts";
pub const ARG_LATENCY_MS: &str = "latency-ms";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DATA_DIR)
                .short('d')
                .long("data-dir")
                .help("Directory holding users, verification sessions and the current user")
                .default_value(".onboard")
                .env("ONBOARD_DATA_DIR")
                .global(true),
        )
        .arg(
            Arg::new(ARG_CODE_TTL)
                .long("code-ttl")
                .help("Seconds a verification code stays valid")
                .default_value("120")
                .env("ONBOARD_CODE_TTL")
                .global(true)
                .value_parser(clap::value_parser!(i64).range(1..=MAX_CODE_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_MAX_ATTEMPTS)
                .long("max-attempts")
                .help("Verification attempts allowed per code")
                .default_value("3")
                .env("ONBOARD_MAX_ATTEMPTS")
                .global(true)
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_LATENCY_MS)
                .long("latency-ms")
                .help("Simulated latency, in milliseconds, for every store call")
                .default_value("0")
                .env("ONBOARD_LATENCY_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
}

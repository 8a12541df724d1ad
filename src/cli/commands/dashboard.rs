use crate::api::dashboard::DashboardRole;
use clap::{Arg, ArgMatches, Command, builder::PossibleValuesParser};

pub const CMD_HEALTH: &str = "health";
pub const CMD_DASHBOARD: &str = "dashboard";

const ARG_ROLE: &str = "role";

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new(CMD_HEALTH).about("Check that the API is up"),
        Command::new(CMD_DASHBOARD)
            .about("Show the dashboard summary for the signed-in user")
            .arg(
                Arg::new(ARG_ROLE)
                    .long(ARG_ROLE)
                    .help("Dashboard to show (default: from the stored profile)")
                    .value_parser(PossibleValuesParser::new(["member", "treasurer"])),
            ),
    ]
}

/// `None` defers the choice to the stored profile.
#[must_use]
pub fn parse_role(matches: &ArgMatches) -> Option<DashboardRole> {
    match matches.get_one::<String>(ARG_ROLE).map(String::as_str) {
        Some("treasurer") => Some(DashboardRole::Treasurer),
        Some("member") => Some(DashboardRole::Member),
        _ => None,
    }
}

use crate::config::Config;
use crate::prelude::{println, *};
use colored::Colorize;
use countries_core::session::Identity;

#[derive(Debug, clap::Args, Clone)]
pub struct LoginOptions {
    /// Email address identifying the session
    #[arg(short, long, env = "COUNTRIES_EMAIL")]
    pub email: String,

    /// Password (not verified)
    #[arg(short, long, env = "COUNTRIES_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub fn login(options: LoginOptions, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let mut session = config.open_session();

    let identity = session
        .login(&options.email, &options.password)
        .map_err(Error::from)?;
    let favorites = session.current_favorites().len();

    println!(
        "{} {} ({} favorite{})",
        "Logged in as".green(),
        identity.email.bright_white().bold(),
        favorites,
        if favorites == 1 { "" } else { "s" }
    );

    Ok(())
}

pub fn logout(global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let mut session = config.open_session();

    match session.identity().map(|identity| identity.email.clone()) {
        Some(email) => {
            session.logout().map_err(Error::from)?;
            println!("{} {}", "Logged out".green(), email.bright_white());
        }
        None => println!("{}", "No active session.".yellow()),
    }

    Ok(())
}

pub fn whoami(global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let session = config.open_session();

    match session.identity() {
        Some(identity) => print!("{}", format_identity(identity, session.current_favorites().len())),
        None => println!(
            "{}",
            "Not logged in. Run `countries login --email <EMAIL> --password <PASSWORD>`.".yellow()
        ),
    }

    Ok(())
}

fn format_identity(identity: &Identity, favorites: usize) -> String {
    format!(
        "{}: {}\n{}: {}\n{}: {}\n{}: {}\n",
        "Email".green(),
        identity.email.bright_white().bold(),
        "Name".green(),
        identity.name,
        "Session started".green(),
        identity
            .session_start
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black(),
        "Favorites".green(),
        favorites.to_string().bright_magenta()
    )
}

#![allow(unused)]

use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;

mod auth;
mod browse;
mod config;
mod error;
mod favorites;
mod list;
mod prelude;
mod repository;
mod show;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Browse, search and favorite countries from the REST Countries API"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// REST Countries API base URL
    #[clap(
        long,
        env = "COUNTRIES_API_BASE",
        global = true,
        default_value = crate::repository::DEFAULT_API_BASE
    )]
    api_base: String,

    /// Directory holding the session and favorites
    #[clap(long, env = "COUNTRIES_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "COUNTRIES_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List countries with search, region filter and pagination
    List(crate::list::ListOptions),

    /// Show the details of a country
    Show(crate::show::ShowOptions),

    /// List or toggle favorite countries
    Favorites(crate::favorites::App),

    /// Interactive country browser
    Browse(crate::browse::BrowseOptions),

    /// Start a session (any non-empty email and password)
    Login(crate::auth::LoginOptions),

    /// End the current session; favorites are kept
    Logout,

    /// Show the current session
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::List(options) => crate::list::run(options, app.global).await,
        SubCommands::Show(options) => crate::show::run(options, app.global).await,
        SubCommands::Favorites(sub_app) => crate::favorites::run(sub_app, app.global).await,
        SubCommands::Browse(options) => crate::browse::run(options, app.global).await,
        SubCommands::Login(options) => crate::auth::login(options, app.global),
        SubCommands::Logout => crate::auth::logout(app.global),
        SubCommands::Whoami => crate::auth::whoami(app.global),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

use crate::config::{require_login, Config};
use crate::prelude::{println, *};
use crate::repository::CountryRepository;
use colored::Colorize;
use countries_core::country::format_population;
use countries_core::favorites::FavoriteCodes;
use countries_core::listing::{build_favorites_output, FavoritesOutput};
use countries_core::session::ToggleOutcome;

#[derive(Debug, clap::Parser)]
#[command(name = "favorites")]
#[command(about = "List or toggle favorite countries")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List favorite countries of the current session
    #[clap(name = "list")]
    List(ListOptions),

    /// Add a country code to favorites, or remove it if already there
    #[clap(name = "toggle")]
    Toggle(ToggleOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ToggleOptions {
    /// Three-letter country code (e.g. USA)
    #[arg(value_name = "CODE")]
    pub code: String,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let mut session = config.open_session();
    require_login(&session)?;

    match app.command {
        Commands::List(options) => {
            let repository = config.repository()?;
            let output = favorites_data(&repository, &session.current_favorites()).await?;

            if options.json {
                let json = serde_json::to_string_pretty(&output)
                    .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
                println!("{}", json);
            } else {
                output_table(&output);
            }
        }
        Commands::Toggle(options) => {
            let code = options.code.trim().to_uppercase();
            let message = match session.toggle_favorite(&code).map_err(Error::from)? {
                ToggleOutcome::Added => f!("{} {}", "Added to favorites:".green(), code.bold()),
                ToggleOutcome::Removed => {
                    f!("{} {}", "Removed from favorites:".yellow(), code.bold())
                }
                ToggleOutcome::Ignored => "Not logged in; nothing changed.".yellow().to_string(),
            };
            println!("{}", message);
        }
    }

    Ok(())
}

/// Fetches every country and keeps the favorited ones
///
/// Skips the network entirely when there are no favorites.
pub async fn favorites_data(
    repository: &CountryRepository,
    favorites: &FavoriteCodes,
) -> Result<FavoritesOutput> {
    if favorites.is_empty() {
        return Ok(build_favorites_output(&[], favorites));
    }

    let countries = repository.all().await?;
    let output = build_favorites_output(&countries, favorites);
    if !output.missing_codes.is_empty() {
        log::debug!(
            "Favorites without a matching country: {}",
            output.missing_codes.join(", ")
        );
    }

    Ok(output)
}

fn output_table(output: &FavoritesOutput) {
    if output.items.is_empty() {
        println!("{}", "You haven't added any favorites yet.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Code", "Name", "Population", "Region", "Capital"]);
    for country in &output.items {
        table.add_row(prettytable::row![
            country.code,
            country.name,
            format_population(country.population),
            country.region,
            country.capital.as_deref().unwrap_or("N/A")
        ]);
    }
    table.printstd();

    if !output.missing_codes.is_empty() {
        println!(
            "\n{} {}",
            "No longer available:".bright_black(),
            output.missing_codes.join(", ").bright_black()
        );
    }
}

use crate::config::{require_login, Config};
use crate::prelude::{println, *};
use crate::repository::CountryRepository;
use colored::Colorize;
use countries_core::country::{build_country_detail, format_population, CountryDetail};
use countries_core::listing::shell_quote;
use countries_core::session::{SessionStore, ToggleOutcome};
use countries_core::storage::FileStore;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ShowOptions {
    /// Common name of the country (exact match)
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Add or remove this country from favorites before showing it
    #[arg(long)]
    pub toggle_favorite: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ShowOptions, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let mut session = config.open_session();
    require_login(&session)?;

    let repository = config.repository()?;
    let detail = country_detail_data(&repository, &mut session, &options).await?;

    if options.json {
        let json = serde_json::to_string_pretty(&detail)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{}", json);
    } else {
        print!("{}", format_detail_text(&detail));
    }

    Ok(())
}

/// Fetches a country by exact name and resolves its border countries
///
/// Border lookups that fail are left out; the detail is still returned.
pub async fn country_detail_data(
    repository: &CountryRepository,
    session: &mut SessionStore<FileStore>,
    options: &ShowOptions,
) -> Result<CountryDetail> {
    let country = repository.by_name(&options.name).await?;

    if options.toggle_favorite {
        match session.toggle_favorite(&country.cca3).map_err(Error::from)? {
            ToggleOutcome::Added => log::info!("Added {} to favorites", country.cca3),
            ToggleOutcome::Removed => log::info!("Removed {} from favorites", country.cca3),
            ToggleOutcome::Ignored => {}
        }
    }

    let borders = repository.border_countries(&country.borders).await;
    if borders.len() < country.borders.len() {
        log::warn!(
            "Resolved {} of {} border countries for {}",
            borders.len(),
            country.borders.len(),
            country.cca3
        );
    }

    Ok(build_country_detail(
        &country,
        &borders,
        session.is_favorite(&country.cca3),
    ))
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

/// Convert a country detail to formatted text with colors
pub fn format_detail_text(detail: &CountryDetail) -> String {
    let mut result = String::new();
    let marker = if detail.favorite { "♥" } else { "♡" };

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{} {}\n",
        format!("{} ({})", detail.name.to_uppercase(), detail.code)
            .bright_cyan()
            .bold(),
        marker.bright_red()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    let languages = if detail.languages.is_empty() {
        "N/A".to_string()
    } else {
        detail.languages.join(", ")
    };

    let rows = [
        ("Official Name", detail.official_name.clone()),
        ("Native Name", or_na(detail.native_name.as_deref()).to_string()),
        ("Population", format_population(detail.population)),
        ("Region", detail.region.clone()),
        ("Sub Region", or_na(detail.subregion.as_deref()).to_string()),
        ("Capital", or_na(detail.capital.as_deref()).to_string()),
        (
            "Top Level Domain",
            or_na(detail.top_level_domain.as_deref()).to_string(),
        ),
        ("Currencies", or_na(detail.currency.as_deref()).to_string()),
        ("Languages", languages),
        ("Flag", detail.flag_url.clone()),
    ];

    result.push('\n');
    for (label, value) in rows {
        result.push_str(&format!("{}: {}\n", label.green(), value.bright_white()));
    }

    if !detail.border_codes.is_empty() {
        result.push_str(&format!("\n{}\n", "Border Countries:".bright_yellow().bold()));
        for border in &detail.borders {
            result.push_str(&format!(
                "  - {} {}\n",
                border.name.bright_white(),
                format!("(countries show {})", shell_quote(&border.name)).cyan()
            ));
        }

        let missing = detail.border_codes.len() - detail.borders.len();
        if missing > 0 {
            result.push_str(&format!(
                "  {}\n",
                format!("{missing} border countr{} could not be loaded", if missing == 1 { "y" } else { "ies" })
                    .yellow()
            ));
        }
    }

    result.push_str(&format!(
        "\n{}:\n  {}\n",
        "To toggle this favorite".bright_white().bold(),
        format!("countries show {} --toggle-favorite", shell_quote(&detail.name)).cyan()
    ));
    result.push_str(&format!(
        "\n{}:\n  {}\n\n",
        "Back to the list".bright_white().bold(),
        "countries list".cyan()
    ));

    result
}

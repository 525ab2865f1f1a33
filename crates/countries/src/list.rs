use crate::config::{require_login, Config};
use crate::prelude::{println, *};
use crate::repository::CountryRepository;
use colored::Colorize;
use countries_core::browser::{ListEffect, ListEvent, ListView};
use countries_core::country::{format_population, CountrySummary};
use countries_core::favorites::FavoriteCodes;
use countries_core::filter::parse_region_selector;
use countries_core::listing::{build_list_output, shell_quote, ListOutput};
use countries_core::pagination::page_size_for_width;
use std::num::NonZeroUsize;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListOptions {
    /// Only show countries whose name contains this text
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Region: africa, americas, asia, europe, oceania or all
    #[arg(short, long)]
    pub region: Option<String>,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Countries per page; overrides --width
    #[arg(long)]
    pub page_size: Option<NonZeroUsize>,

    /// Viewport width used to choose the page size
    #[arg(short, long, env = "COUNTRIES_WIDTH", default_value = "640")]
    pub width: u32,

    /// Hide a country from this listing only (repeatable)
    #[arg(long, value_name = "CODE")]
    pub exclude: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListOptions {
    pub fn effective_page_size(&self) -> NonZeroUsize {
        self.page_size
            .unwrap_or_else(|| page_size_for_width(self.width))
    }
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let session = config.open_session();
    require_login(&session)?;

    let repository = config.repository()?;
    let output = list_countries_data(&repository, &session.current_favorites(), &options).await?;

    if options.json {
        output_json(&output)?;
    } else {
        print!("{}", format_list_text(&output, true));
    }

    Ok(())
}

/// Fetches, filters and paginates countries, returning the visible page
pub async fn list_countries_data(
    repository: &CountryRepository,
    favorites: &FavoriteCodes,
    options: &ListOptions,
) -> Result<ListOutput> {
    let region =
        parse_region_selector(options.region.as_deref().unwrap_or("")).map_err(|e| eyre!(e))?;

    let mut view = ListView::new(options.effective_page_size());
    let Some(ListEffect::FetchCountries { ticket, region }) =
        view.apply(ListEvent::RegionChanged(region))
    else {
        return Err(eyre!("Region change did not request a fetch"));
    };

    let countries = repository.list(region).await?;
    view.apply(ListEvent::CountriesLoaded {
        ticket,
        result: Ok(countries),
    });

    for code in &options.exclude {
        view.apply(ListEvent::CountryRemoved(code.to_uppercase()));
    }
    view.apply(ListEvent::SearchChanged(options.search.clone()));
    view.apply(ListEvent::PageRequested(options.page));

    Ok(build_list_output(&view.page(), view.filter(), favorites))
}

/// Convert list output to JSON string
fn format_list_json(output: &ListOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn output_json(output: &ListOutput) -> Result<()> {
    let json = format_list_json(output)?;
    println!("{}", json);
    Ok(())
}

/// Render one country card
pub fn format_country_card(number: usize, country: &CountrySummary) -> String {
    let marker = if country.favorite { "♥" } else { "♡" };

    let mut card = format!(
        "\n{} {} {} {}\n",
        format!("[{number}]").yellow().bold(),
        marker.bright_red(),
        country.name.white().bold(),
        format!("({})", country.code).bright_black()
    );
    card.push_str(&format!(
        "    {}: {} | {}: {} | {}: {}\n",
        "Population".green(),
        format_population(country.population).bright_yellow(),
        "Region".green(),
        country.region.bright_white(),
        "Capital".green(),
        country.capital.as_deref().unwrap_or("N/A").bright_white()
    ));
    if !country.flag_url.is_empty() {
        card.push_str(&format!(
            "    {}: {}\n",
            "Flag".green(),
            country.flag_url.cyan().underline()
        ));
    }
    card.push_str(&format!(
        "    {}: {}\n",
        "Details".green(),
        format!("countries show {}", shell_quote(&country.name)).cyan()
    ));

    card
}

/// Render the page window, highlighting the current page
pub fn format_page_window(window: &[usize], current_page: usize) -> String {
    window
        .iter()
        .map(|&page| {
            if page == current_page {
                format!("[{page}]").bright_cyan().bold().to_string()
            } else {
                page.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert list output to formatted text with colors
pub fn format_list_text(output: &ListOutput, with_commands: bool) -> String {
    let mut result = String::new();
    let pagination = &output.pagination;

    let scope = output
        .region
        .map(|r| r.as_str().to_uppercase())
        .unwrap_or_else(|| "ALL".to_string());

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!(
            "COUNTRIES: {} (Page {} of {})",
            scope, pagination.current_page, pagination.total_pages
        )
        .bright_cyan()
        .bold()
    ));
    if !output.search.is_empty() {
        result.push_str(&format!(
            "{}: {}\n",
            "Search".green(),
            output.search.bright_white()
        ));
    }
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if output.items.is_empty() {
        result.push_str(&format!(
            "\n{}\n",
            "No countries found matching your criteria.".yellow()
        ));
    } else {
        let first = (pagination.current_page - 1) * pagination.page_size + 1;
        for (idx, country) in output.items.iter().enumerate() {
            result.push_str(&format_country_card(first + idx, country));
        }
    }

    // Navigation section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!(
        "\n{} {} {} {} ({} {})\n",
        "Showing page".bright_white(),
        pagination.current_page.to_string().bright_cyan().bold(),
        "of".bright_white(),
        pagination.total_pages.to_string().bright_cyan().bold(),
        pagination.total_items.to_string().bright_cyan().bold(),
        "countries".bright_white()
    ));

    if pagination.total_items > pagination.page_size {
        result.push_str(&format!(
            "{}: {}\n",
            "Pages".green(),
            format_page_window(&pagination.page_window, pagination.current_page)
        ));
    }

    if with_commands {
        if let Some(command) = &pagination.next_page_command {
            result.push_str(&format!("  {}: {}\n", "Next page".green(), command.cyan()));
        }
        if let Some(command) = &pagination.prev_page_command {
            result.push_str(&format!(
                "  {}: {}\n",
                "Previous page".green(),
                command.cyan()
            ));
        }
        result.push_str(&format!(
            "\n{}:\n  {}\n",
            "To toggle a favorite".bright_white().bold(),
            "countries favorites toggle <CODE>".cyan()
        ));
        result.push_str(&format!(
            "\n{}:\n  {}\n",
            "To get JSON output".bright_white().bold(),
            "countries list --json".cyan()
        ));
    }

    result.push('\n');
    result
}

//! Interactive list view
//!
//! Reads commands from stdin and runs fetches as background tasks. Results
//! come back over a channel tagged with their request ticket, so a slow
//! response for a region that is no longer selected cannot overwrite the
//! current list. Detail lookups (`detail <name>`) follow the same rule.

use crate::config::{require_login, Config};
use crate::list::format_list_text;
use crate::prelude::{eprintln, println, *};
use crate::repository::CountryRepository;
use crate::show::format_detail_text;
use colored::Colorize;
use countries_core::browser::{
    DetailEffect, DetailLoader, DetailProgress, ListEffect, ListEvent, ListView,
};
use countries_core::country::{build_country_detail, Country};
use countries_core::filter::{parse_region_selector, Region};
use countries_core::listing::build_list_output;
use countries_core::pagination::page_size_for_width;
use countries_core::requests::RequestTicket;
use countries_core::session::{SessionStore, ToggleOutcome};
use countries_core::storage::KeyValueStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Background work requested by a command
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    List(ListEffect),
    Detail(DetailEffect),
}

/// Completed fetch, tagged with the ticket it was issued with
#[derive(Debug)]
enum Message {
    Countries(RequestTicket, Result<Vec<Country>, String>),
    Country(RequestTicket, Result<Country, String>),
    Borders(RequestTicket, Vec<Country>),
}

const HELP: &str = "\
Commands:
  search <text>     filter by name (empty text clears the search)
  region <name>     africa, americas, asia, europe, oceania or all
  page <n>          jump to a page
  next | prev       move one page
  width <px>        change the viewport width (page size)
  remove <CODE>     hide a country until the list is reloaded
  fav <CODE>        toggle a favorite
  detail <name>     show a country by exact name
  show              redraw the current page
  help              show this help
  quit              leave the browser";

#[derive(Debug, clap::Args, Clone)]
pub struct BrowseOptions {
    /// Region to start with
    #[arg(short, long)]
    pub region: Option<String>,

    /// Viewport width used to choose the page size
    #[arg(short, long, env = "COUNTRIES_WIDTH", default_value = "640")]
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Search(String),
    Region(Option<Region>),
    Page(usize),
    Next,
    Previous,
    Width(u32),
    Remove(String),
    Favorite(String),
    Detail(String),
    Show,
    Help,
    Quit,
}

/// Parse one line of user input
pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (name, argument) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let require = |what: &str| {
        if argument.is_empty() {
            Err(format!("Usage: {name} <{what}>"))
        } else {
            Ok(argument.to_string())
        }
    };

    match name.to_lowercase().as_str() {
        "search" | "s" => Ok(BrowseCommand::Search(argument.to_string())),
        "region" | "r" => parse_region_selector(argument).map(BrowseCommand::Region),
        "page" | "p" => require("n")?
            .parse()
            .map(BrowseCommand::Page)
            .map_err(|_| format!("Invalid page number: {argument}")),
        "next" | "n" => Ok(BrowseCommand::Next),
        "prev" | "previous" => Ok(BrowseCommand::Previous),
        "width" | "w" => require("px")?
            .parse()
            .map(BrowseCommand::Width)
            .map_err(|_| format!("Invalid width: {argument}")),
        "remove" | "rm" => Ok(BrowseCommand::Remove(require("CODE")?.to_uppercase())),
        "fav" | "favorite" => Ok(BrowseCommand::Favorite(require("CODE")?.to_uppercase())),
        "detail" | "d" => Ok(BrowseCommand::Detail(require("name")?)),
        "show" | "" => Ok(BrowseCommand::Show),
        "help" | "?" => Ok(BrowseCommand::Help),
        "quit" | "exit" | "q" => Ok(BrowseCommand::Quit),
        other => Err(format!("Unknown command: {other}. Type `help` for commands.")),
    }
}

pub async fn run(options: BrowseOptions, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let mut session = config.open_session();
    require_login(&session)?;

    let repository = config.repository()?;
    let region =
        parse_region_selector(options.region.as_deref().unwrap_or("")).map_err(|e| eyre!(e))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut view = ListView::new(page_size_for_width(options.width));
    let mut details = DetailLoader::new();

    let first_event = match region {
        Some(region) => ListEvent::RegionChanged(Some(region)),
        None => ListEvent::Mounted,
    };
    if let Some(effect) = view.apply(first_event) {
        spawn_fetch(&repository, &tx, Fetch::List(effect));
    }

    println!("{}\n", HELP.bright_black());
    println!("{}", "Loading...".bright_black());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(message) = rx.recv() => {
                let progress = match message {
                    Message::Countries(ticket, result) => {
                        let was_loading = view.is_loading();
                        view.apply(ListEvent::CountriesLoaded { ticket, result });
                        if was_loading && !view.is_loading() {
                            render(&view, &session);
                        }
                        None
                    }
                    Message::Country(ticket, result) => details.country_loaded(ticket, result),
                    Message::Borders(ticket, borders) => details.borders_loaded(ticket, borders),
                };

                match progress {
                    Some(DetailProgress::Fetch(effect)) => {
                        spawn_fetch(&repository, &tx, Fetch::Detail(effect));
                    }
                    Some(DetailProgress::Failed(message)) => {
                        eprintln!("{} {}", "Error:".red().bold(), message);
                    }
                    Some(DetailProgress::Ready { country, borders }) => {
                        let favorite = session.is_favorite(&country.cca3);
                        let detail = build_country_detail(&country, &borders, favorite);
                        print!("{}", format_detail_text(&detail));
                    }
                    None => {}
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };

                match parse_command(&line) {
                    Ok(BrowseCommand::Quit) => break,
                    Ok(command) => {
                        if let Some(fetch) =
                            handle_command(command, &mut view, &mut details, &mut session)?
                        {
                            spawn_fetch(&repository, &tx, fetch);
                        }
                    }
                    Err(message) => eprintln!("{}", message.yellow()),
                }
            }
        }
    }

    Ok(())
}

fn spawn_fetch(repository: &CountryRepository, tx: &mpsc::UnboundedSender<Message>, fetch: Fetch) {
    let repository = repository.clone();
    let tx = tx.clone();

    tokio::spawn(async move {
        let message = match fetch {
            Fetch::List(ListEffect::FetchCountries { ticket, region }) => {
                let result = repository.list(region).await.map_err(|e| e.to_string());
                Message::Countries(ticket, result)
            }
            Fetch::Detail(DetailEffect::FetchByName { ticket, name }) => {
                let result = repository.by_name(&name).await.map_err(|e| e.to_string());
                Message::Country(ticket, result)
            }
            Fetch::Detail(DetailEffect::FetchBorders { ticket, codes }) => {
                Message::Borders(ticket, repository.border_countries(&codes).await)
            }
        };

        if tx.send(message).is_err() {
            log::debug!("Browser closed before a fetch completed");
        }
    });
}

/// Apply a command to the view; returns a fetch the caller must start
pub fn handle_command<S: KeyValueStore>(
    command: BrowseCommand,
    view: &mut ListView,
    details: &mut DetailLoader,
    session: &mut SessionStore<S>,
) -> Result<Option<Fetch>> {
    let event = match command {
        BrowseCommand::Search(text) => ListEvent::SearchChanged(text),
        BrowseCommand::Region(region) => {
            let effect = view.apply(ListEvent::RegionChanged(region));
            println!("{}", "Loading...".bright_black());
            return Ok(effect.map(Fetch::List));
        }
        BrowseCommand::Page(page) => ListEvent::PageRequested(page),
        BrowseCommand::Next => ListEvent::NextPage,
        BrowseCommand::Previous => ListEvent::PreviousPage,
        BrowseCommand::Width(width) => ListEvent::ViewportResized(width),
        BrowseCommand::Remove(code) => ListEvent::CountryRemoved(code),
        BrowseCommand::Favorite(code) => {
            match session.toggle_favorite(&code).map_err(Error::from)? {
                ToggleOutcome::Added => println!("{} {}", "Added to favorites:".green(), code),
                ToggleOutcome::Removed => {
                    println!("{} {}", "Removed from favorites:".yellow(), code)
                }
                ToggleOutcome::Ignored => println!("{}", "Not logged in.".yellow()),
            }
            render(view, session);
            return Ok(None);
        }
        BrowseCommand::Detail(name) => {
            println!("{}", "Loading...".bright_black());
            return Ok(Some(Fetch::Detail(details.request(&name))));
        }
        BrowseCommand::Show => {
            render(view, session);
            return Ok(None);
        }
        BrowseCommand::Help => {
            println!("{}", HELP);
            return Ok(None);
        }
        BrowseCommand::Quit => return Ok(None),
    };

    let effect = view.apply(event);
    render(view, session);
    Ok(effect.map(Fetch::List))
}

fn render<S: KeyValueStore>(view: &ListView, session: &SessionStore<S>) {
    if view.is_loading() {
        println!("{}", "Loading...".bright_black());
        return;
    }
    if let Some(message) = view.last_error() {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    let output = build_list_output(&view.page(), view.filter(), &session.current_favorites());
    print!("{}", format_list_text(&output, false));
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::text::Line;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;

use shelf::app::App;
use shelf::catalog::{CatalogClient, FlaggedItem};
use shelf::config::Config;
use shelf::favorites::FavoritesStore;
use shelf::screens::{DetailScreen, FavoritesScreen, FeaturedScreen, HomeScreen, Screen};
use shelf::storage::{Database, DatabaseError};
use shelf::ui::{self, Settled};
use shelf::util::sanitize_line;

/// Get the config directory path (~/.config/shelf/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("shelf"))
}

#[derive(Parser, Debug)]
#[command(name = "shelf", about = "Browse a remote catalog and keep local favorites")]
struct Args {
    /// Config file (default: ~/.config/shelf/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Favorites database (default: ~/.config/shelf/shelf.db)
    #[arg(long, value_name = "FILE", global = true)]
    db: Option<PathBuf>,

    /// Run one command and exit; without one, start the interactive browser
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog items, optionally filtered by category
    Browse {
        #[arg(long)]
        category: Option<String>,
    },
    /// List the categories of the current catalog
    Categories,
    /// Featured items, most expensive first
    Featured,
    /// Show one item from the catalog or the favorites
    Show { id: Option<String> },
    /// List favorites
    Favorites,
    /// Add or remove an item from favorites
    Toggle { id: String },
    /// Remove one favorite
    Remove {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Remove every favorite
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Everything a command needs, built once at startup.
struct Backend {
    store: FavoritesStore<Database>,
    client: CatalogClient,
    refetch_on_focus: bool,
}

impl Backend {
    fn home(&self) -> HomeScreen<Database> {
        HomeScreen::new(self.store.clone(), self.client.clone(), self.refetch_on_focus)
    }

    fn favorites(&self) -> FavoritesScreen<Database> {
        FavoritesScreen::new(self.store.clone())
    }
}

/// Print and drain the screen's pending notice. Returns `false` for errors.
fn report<S: Screen + ?Sized>(screen: &mut S) -> bool {
    match screen.take_notice() {
        Some(notice) if notice.is_error() => {
            eprintln!("{}", ui::notice_line(&notice));
            false
        }
        Some(notice) => {
            println!("{}", ui::notice_line(&notice));
            true
        }
        None => true,
    }
}

fn print_lines<'a>(lines: impl IntoIterator<Item = Line<'a>>) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_rows(rows: &[FlaggedItem<'_>]) {
    print_lines(rows.iter().map(|row| ui::item_line(row, ui::NAME_WIDTH)));
}

/// Ask a y/n question and wait for a single key press.
async fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/n) ", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    enable_raw_mode().context("Confirmation needs a terminal; pass --yes to skip it")?;
    let answer = ui::read_confirmation().await;
    disable_raw_mode().context("Failed to restore terminal")?;
    println!();
    answer
}

fn interrupted(settled: Settled) -> bool {
    if settled == Settled::Interrupted {
        eprintln!("Interrupted");
        return true;
    }
    false
}

async fn run(command: Command, backend: &Backend) -> Result<bool> {
    match command {
        Command::Browse { category } => {
            let mut home = backend.home();
            if interrupted(ui::open(&mut home).await) {
                return Ok(false);
            }
            let ok = report(&mut home);
            if let Some(key) = category {
                let selected = home.select_category_by_key(&key);
                if selected.key() != key {
                    eprintln!("Unknown category '{}', showing all items", key);
                }
            }
            print_lines([ui::category_line(
                home.categories(),
                home.selected_category(),
            )]);
            print_lines(ui::load_state_line(home.load_state()));
            print_rows(&home.visible());
            Ok(ok)
        }
        Command::Categories => {
            let mut home = backend.home();
            if interrupted(ui::open(&mut home).await) {
                return Ok(false);
            }
            let ok = report(&mut home);
            for category in home.categories() {
                println!("{}", sanitize_line(category.key()));
            }
            Ok(ok)
        }
        Command::Featured => {
            let mut featured =
                FeaturedScreen::new(backend.store.clone(), backend.client.clone(), backend.refetch_on_focus);
            if interrupted(ui::open(&mut featured).await) {
                return Ok(false);
            }
            let ok = report(&mut featured);
            print_lines(ui::load_state_line(featured.load_state()));
            let rows = featured.visible();
            if rows.is_empty() {
                println!("{}", FeaturedScreen::<Database>::EMPTY_TEXT);
            }
            print_rows(&rows);
            Ok(ok)
        }
        Command::Show { id } => {
            let item = match id {
                Some(id) => {
                    let mut home = backend.home();
                    if interrupted(ui::open(&mut home).await) {
                        return Ok(false);
                    }
                    report(&mut home);
                    home.open(&id).or_else(|| home.favorites().get(&id).cloned())
                }
                None => None,
            };
            let mut detail = DetailScreen::new(backend.store.clone(), item);
            if interrupted(ui::open(&mut detail).await) {
                return Ok(false);
            }
            let ok = report(&mut detail);
            match detail.item() {
                Ok(item) => print_lines(ui::detail_lines(item, detail.is_favorite())),
                Err(_) => println!("{}", DetailScreen::<Database>::PLACEHOLDER),
            }
            Ok(ok)
        }
        Command::Favorites => {
            let mut favorites = backend.favorites();
            if interrupted(ui::open(&mut favorites).await) {
                return Ok(false);
            }
            let ok = report(&mut favorites);
            if favorites.is_empty() {
                println!("{}", FavoritesScreen::<Database>::EMPTY_TEXT);
                return Ok(ok);
            }
            let rows: Vec<FlaggedItem<'_>> = favorites
                .favorites()
                .iter()
                .map(|item| FlaggedItem {
                    item,
                    is_favorite: true,
                })
                .collect();
            print_rows(&rows);
            if favorites.shows_remove_all() {
                println!("Remove all {} with `shelf clear`", rows.len());
            }
            Ok(ok)
        }
        Command::Toggle { id } => {
            let mut home = backend.home();
            if interrupted(ui::open(&mut home).await) {
                return Ok(false);
            }
            report(&mut home);
            if home.open(&id).is_some() {
                home.toggle_favorite(&id).await;
                return Ok(report(&mut home));
            }

            // Not in the catalog (any more): a stored favorite can still be
            // toggled off.
            let item = home.favorites().get(&id).cloned();
            let mut detail = DetailScreen::new(backend.store.clone(), item);
            if interrupted(ui::open(&mut detail).await) {
                return Ok(false);
            }
            match detail.toggle_favorite().await {
                Ok(_) => Ok(report(&mut detail)),
                Err(e) => {
                    eprintln!("{}: {}", e, id);
                    Ok(false)
                }
            }
        }
        Command::Remove { id, yes } => {
            let mut favorites = backend.favorites();
            if interrupted(ui::open(&mut favorites).await) {
                return Ok(false);
            }
            if !report(&mut favorites) {
                return Ok(false);
            }
            let Some(item) = favorites.open(&id) else {
                eprintln!("'{}' is not a favorite", id);
                return Ok(false);
            };
            let prompt = format!("Remove '{}' from favorites?", sanitize_line(&item.name));
            if !yes && !confirm(&prompt).await? {
                return Ok(true);
            }
            favorites.remove(&id).await;
            Ok(report(&mut favorites))
        }
        Command::Clear { yes } => {
            let mut favorites = backend.favorites();
            if interrupted(ui::open(&mut favorites).await) {
                return Ok(false);
            }
            if !report(&mut favorites) {
                return Ok(false);
            }
            if favorites.is_empty() {
                println!("{}", FavoritesScreen::<Database>::EMPTY_TEXT);
                return Ok(true);
            }
            let count = favorites.favorites().len();
            if !yes && !confirm(&format!("Remove all {} favorites?", count)).await? {
                return Ok(true);
            }
            favorites.remove_all().await;
            Ok(report(&mut favorites))
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?
        .apply_env();
    let endpoint = config.endpoint_url()?;

    let db_path = match args.db.clone() {
        Some(path) => path,
        None => {
            std::fs::create_dir_all(&config_dir).with_context(|| {
                format!(
                    "Failed to create config directory {}",
                    config_dir.display()
                )
            })?;
            config_dir.join("shelf.db")
        }
    };
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!("Error: The favorites database is locked by another process.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };

    let client = CatalogClient::new(
        endpoint.as_str(),
        config.request_timeout(),
        config.max_retries,
    )
    .context("Failed to build HTTP client")?;

    let backend = Backend {
        store: FavoritesStore::new(db.clone()),
        client,
        refetch_on_focus: config.refetch_on_focus,
    };

    let ok = match args.command {
        Some(command) => run(command, &backend).await,
        None => {
            let mut app = App::new(
                backend.store.clone(),
                backend.client.clone(),
                backend.refetch_on_focus,
            );
            let (event_tx, event_rx) = mpsc::channel(ui::EVENT_CHANNEL_CAPACITY);
            ui::run(&mut app, event_tx, event_rx).await.map(|()| true)
        }
    };
    db.close().await;

    Ok(if ok? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

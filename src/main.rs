//! shelf-rs entry point.

use clap::Parser;
use shelf_rs::{
    AppState,
    config::{BookCommand, Cli, Command, Config, SocialCommand},
    db::Database,
    error::Result,
    library::{self, Collection, upload::PUBLIC_UPLOAD_WARNING, upload::UploadForm},
    reader::{Navigation, PageTurn, Reader, Theme},
    social::{Relation, SocialPanel, UNFRIEND_WARNING},
    state::OpenedBook,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so command output stays clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_rs=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Init writes a fresh file; never parse the one it replaces
    if let Command::Init { force } = cli.command {
        return cmd_init(force);
    }

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let mut config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    let db = Database::open(&config.storage.state_path)?;
    let mut state = AppState::new(config, db)?;

    let result = match cli.command {
        Command::Init { .. } => Ok(()),
        Command::Login { username, password } => cmd_login(&mut state, &username, password).await,
        Command::Register { username, password } => {
            cmd_register(&state, &username, password).await
        }
        Command::Logout => cmd_logout(&mut state),
        Command::Whoami => cmd_whoami(&state),
        Command::Books { action } => cmd_books(&state, action).await,
        Command::Read {
            book_id,
            next,
            prev,
            goto,
        } => {
            let nav = match (next, prev, goto) {
                (true, _, _) => Some(Navigation::Offset(1)),
                (_, true, _) => Some(Navigation::Offset(-1)),
                (_, _, Some(page)) => Some(Navigation::GoTo(page)),
                _ => None,
            };
            cmd_read(&state, book_id, nav).await
        }
        Command::Theme { theme } => cmd_theme(&state, theme),
        Command::Social { action } => cmd_social(&state, action).await,
    };

    match state.end_session_on_rejection(result) {
        Err(e) if e.is_auth_rejection() => {
            anyhow::bail!("{}. Run: shelf-rs login <username>", e)
        }
        other => Ok(other?),
    }
}

/// Write a default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("shelf-rs.toml");
    Config::write_default(&config_path, force)?;

    println!("Created config file: {}", config_path.display());
    println!("\nEdit it to point at your library API, then run: shelf-rs login <username>");

    Ok(())
}

// ============================================================================
// AUTH
// ============================================================================

async fn cmd_login(state: &mut AppState, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password: ")?,
    };

    let session = state
        .api()
        .login(username, &password)
        .await
        .map_err(|e| e.for_user("Login failed"))?;

    println!("Logged in as {}", session.username);
    state.sign_in(session)
}

async fn cmd_register(state: &AppState, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password("Choose a password: ")?,
    };

    state
        .api()
        .register(username, &password)
        .await
        .map_err(|e| e.for_user("Registration failed"))?;

    println!("Account created. Now log in with: shelf-rs login {}", username);
    Ok(())
}

fn cmd_logout(state: &mut AppState) -> Result<()> {
    if state.sign_out()? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

fn cmd_whoami(state: &AppState) -> Result<()> {
    match state.username() {
        Some(username) => println!("{} ({})", username, state.api().base_url()),
        None => println!("Not logged in."),
    }
    Ok(())
}

// ============================================================================
// LIBRARY
// ============================================================================

async fn cmd_books(state: &AppState, action: BookCommand) -> Result<()> {
    state.require_session()?;

    match action {
        BookCommand::List { search } => show_own_library(state, search.as_deref()).await,

        BookCommand::Upload {
            file,
            title,
            cover,
            public,
            yes,
        } => {
            let form = UploadForm::new(file, title, cover, public).await;
            form.validate()?;

            if form.needs_confirmation() && !yes && !confirm(PUBLIC_UPLOAD_WARNING)? {
                println!("Upload cancelled.");
                return Ok(());
            }

            println!("Uploading to Vault...");
            state
                .api()
                .upload_book(&form)
                .await
                .map_err(|e| e.for_user("Failed to upload book"))?;
            println!("Uploaded: {}\n", form.title);

            show_own_library(state, None).await
        }

        BookCommand::Delete { book_id, yes } => {
            if !yes && !confirm("Are you sure you want to delete this book?")? {
                return Ok(());
            }

            state
                .api()
                .delete_book(&book_id)
                .await
                .map_err(|e| e.for_user("Failed to delete book"))?;
            println!("Deleted book: {}\n", book_id);

            show_own_library(state, None).await
        }
    }
}

async fn show_own_library(state: &AppState, search: Option<&str>) -> Result<()> {
    let books = state
        .api()
        .list_books()
        .await
        .map_err(|e| e.for_user("Failed to load your library"))?;

    match state.username() {
        Some(username) => println!("{}'s Library", username),
        None => println!("My Library"),
    }

    print_collection(state, &Collection::own(books), search);
    Ok(())
}

fn print_collection(state: &AppState, collection: &Collection, search: Option<&str>) {
    println!("{}", collection.heading());

    if let Some(usage) = collection.storage_usage(state.config.library.quota_mb) {
        println!(
            "Storage {} {}{}",
            usage.bar(20),
            usage,
            if usage.is_critical() { " (almost full)" } else { "" }
        );
    }
    println!();

    if collection.is_empty() {
        println!("{}", collection.empty_message());
        return;
    }

    let query = search.unwrap_or("");
    let books = collection.filter(query);
    if books.is_empty() {
        println!("{}", library::no_match_message(query));
        return;
    }

    println!("{:<26} {:<32} {:<8} PROGRESS", "ID", "TITLE", "ACCESS");
    println!("{}", "-".repeat(90));
    for book in books {
        println!(
            "{:<26} {:<32} {:<8} {}",
            book.id(),
            truncate(book.title(), 32),
            book.info().visibility_label(),
            library::progress_label(book, &state.db)
        );
    }
}

// ============================================================================
// READER
// ============================================================================

async fn cmd_read(state: &AppState, book_id: Option<String>, nav: Option<Navigation>) -> Result<()> {
    state.require_session()?;

    let Some(book_id) = book_id else {
        println!("No book selected.\n");
        return show_own_library(state, None).await;
    };

    match state.open_book(&book_id, nav).await? {
        OpenedBook::Unavailable => {
            println!("Failed to load the book. It may be private or deleted.\n");
            show_own_library(state, None).await
        }
        OpenedBook::Reading { reader, turn } => {
            if turn == Some(PageTurn::Ignored) {
                println!("(page unchanged)");
            }
            print_reader(state, &reader);
            Ok(())
        }
    }
}

fn print_reader(state: &AppState, reader: &Reader) {
    let theme = state.theme();
    let book = reader.book();

    if book.is_owned() {
        println!("{}", book.title());
    } else {
        println!("{}  [Read-Only]", book.title());
    }

    let total = reader
        .total_pages()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "--".to_string());
    println!(
        "{}  Page {} of {}  {}",
        if reader.can_go_back() { "< Prev" } else { "      " },
        reader.page(),
        total,
        if reader.can_go_forward() { "Next >" } else { "" }
    );
    let palette = theme.palette();
    println!(
        "Theme: {} (text {} on {})",
        theme.label(),
        palette.text,
        palette.background
    );

    if let Some(cover) = book.info().cover_url(state.api().base_url()) {
        println!("Cover: {}", cover);
    }
    if let Some(path) = state.documents.cached(book.id()) {
        println!("Document: {}", path.display());
    }
}

fn cmd_theme(state: &AppState, theme: Option<Theme>) -> Result<()> {
    match theme {
        Some(theme) => {
            theme.save(&state.db)?;
            println!("Theme set to {}", theme.label());
        }
        None => {
            let current = state.theme();
            for theme in Theme::ALL {
                let marker = if theme == current { "*" } else { " " };
                let palette = theme.palette();
                println!(
                    "{} {:<6} {:<11} text {:<7} background {}",
                    marker,
                    theme,
                    theme.label(),
                    palette.text,
                    palette.background
                );
            }
        }
    }
    Ok(())
}

// ============================================================================
// SOCIAL
// ============================================================================

async fn cmd_social(state: &AppState, action: SocialCommand) -> Result<()> {
    state.require_session()?;
    let panel = SocialPanel::new(state.api());

    match action {
        SocialCommand::Search { query } => {
            let results = panel
                .search(&query)
                .await
                .map_err(|e| e.for_user("Search failed"))?;

            if results.is_empty() {
                println!("No users found. Try searching for a name!");
            }
            for user in &results {
                println!(
                    "{:<26} {:<24} [{}]",
                    user.id,
                    user.username,
                    Relation::of(user).label()
                );
            }
        }

        SocialCommand::Request { user_id } => {
            panel
                .send_request(&user_id)
                .await
                .map_err(|e| e.for_user("Failed to send request"))?;
            println!("Friend request sent.");
        }

        SocialCommand::Accept { user_id } => {
            let network = panel
                .accept(&user_id)
                .await
                .map_err(|e| e.for_user("Failed to accept request"))?;
            println!("Friend request accepted.\n");
            print_network(&network);
        }

        SocialCommand::Unfriend { user_id, yes } => {
            if !yes && !confirm(UNFRIEND_WARNING)? {
                return Ok(());
            }

            let network = panel
                .unfriend(&user_id)
                .await
                .map_err(|e| e.for_user("Failed to unfriend"))?;
            println!("Unfriended.\n");
            print_network(&network);
        }

        SocialCommand::Network => {
            let network = panel
                .network()
                .await
                .map_err(|e| e.for_user("Failed to load your network"))?;
            print_network(&network);
        }

        SocialCommand::Library { friend_id, search } => {
            let collection = panel
                .view_library(&friend_id)
                .await
                .map_err(|e| e.for_user("Failed to load friend's library."))?;
            print_collection(state, &collection, search.as_deref());
        }
    }

    Ok(())
}

fn print_network(network: &shelf_rs::api::Network) {
    println!("Requests");
    if network.requests.is_empty() {
        println!("  No pending friend requests.");
    }
    for user in &network.requests {
        println!("  {:<26} {}", user.id, user.username);
    }

    println!("\nFriends");
    if network.friends.is_empty() {
        println!("  You haven't added any friends yet.");
    }
    for user in &network.friends {
        println!("  {:<26} {}", user.id, user.username);
    }
}

// ============================================================================
// PROMPTS
// ============================================================================

/// Prompt for password input.
fn prompt_password(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;

    Ok(password.trim().to_string())
}

/// Ask a yes/no question, defaulting to no.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

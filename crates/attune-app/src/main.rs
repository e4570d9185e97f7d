//! Attune application binary - composition root.
//!
//! Ties the Attune crates together into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Open the SQLite context store
//! 3. Construct the Gemini backend and the chat orchestrator
//! 4. Run the interactive chat loop on stdin

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use attune_ai::GeminiBackend;
use attune_chat::{ChatError, ChatOrchestrator};
use attune_core::config::AttuneConfig;
use attune_storage::{read_document, ContextStore, Database};

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if let Some(rest) = data_dir.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = AttuneConfig::load_or_default(&config_file);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.general.log_level.clone())
            }),
        )
        .init();

    tracing::info!("Starting Attune v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    let db_path = data_dir.join("attune.db");
    let db = Arc::new(Database::new(&db_path)?);
    let store = Arc::new(ContextStore::new(db));
    tracing::info!(path = %db_path.display(), "Context store opened");

    // Backend.
    if config.backend.resolve_api_key().is_none() {
        tracing::warn!(
            "No API key configured; emotion tags and replies will degrade to fallbacks"
        );
    }
    let backend = Arc::new(GeminiBackend::from_config(&config.backend)?);

    let orchestrator = ChatOrchestrator::new(backend, Arc::clone(&store));

    run_chat_loop(orchestrator, store).await
}

/// Interactive stdin chat loop.
async fn run_chat_loop(
    orchestrator: ChatOrchestrator,
    store: Arc<ContextStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Attune is ready. Type a message, /help for commands, /quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/facts" => list_facts(&store),
            "/docs" => list_docs(&store),
            _ if input.starts_with("/fact ") => add_fact(&store, &input["/fact ".len()..]),
            _ if input.starts_with("/forget ") => {
                forget_fact(&store, input["/forget ".len()..].trim());
            }
            _ if input.starts_with("/upload ") => {
                upload_document(&store, input["/upload ".len()..].trim());
            }
            _ if input.starts_with("/drop ") => {
                drop_document(&store, input["/drop ".len()..].trim());
            }
            _ => exchange(&orchestrator, &line).await,
        }
    }

    println!("Goodbye.");
    Ok(())
}

fn print_prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("you> ");
    std::io::stdout().flush()
}

/// Run one conversation turn and print the tagged result.
async fn exchange(orchestrator: &ChatOrchestrator, line: &str) {
    match orchestrator.handle_user_input(line).await {
        Ok(exchange) => {
            if let Some(emotion) = &exchange.user.emotion {
                println!("      [{} {}]", emotion.glyph, emotion.label);
            }
            println!("attune> {}", exchange.assistant.text);
        }
        Err(ChatError::EmptyMessage) => {}
        Err(ChatError::Busy) => eprintln!("Still working on the previous message."),
    }
}

fn add_fact(store: &ContextStore, rest: &str) {
    let Some((key, value)) = rest.split_once(':') else {
        eprintln!("Usage: /fact <key>: <value>");
        return;
    };
    match store.add_personal_info(key.trim(), value.trim()) {
        Ok(item) => println!("Noted: {} = {} ({})", item.key, item.value, item.id),
        Err(e) => eprintln!("Failed to store fact: {}", e),
    }
}

fn list_facts(store: &ContextStore) {
    match store.personal_info() {
        Ok(items) if items.is_empty() => println!("No personal info added yet."),
        Ok(items) => {
            for item in items {
                println!("{}  {}: {}", item.id, item.key, item.value);
            }
        }
        Err(e) => eprintln!("Failed to read facts: {}", e),
    }
}

fn forget_fact(store: &ContextStore, id: &str) {
    match store.remove_personal_info(id) {
        Ok(true) => println!("Forgotten."),
        Ok(false) => eprintln!("No fact with id {}", id),
        Err(e) => eprintln!("Failed to remove fact: {}", e),
    }
}

fn upload_document(store: &ContextStore, path: &str) {
    let result = read_document(Path::new(path)).and_then(|doc| {
        let name = doc.name.clone();
        store.add_document(doc)?;
        Ok(name)
    });
    match result {
        Ok(name) => println!("Uploaded {}.", name),
        Err(e) => eprintln!("Failed to upload {}: {}", path, e),
    }
}

fn list_docs(store: &ContextStore) {
    match store.documents() {
        Ok(docs) if docs.is_empty() => println!("No documents uploaded yet."),
        Ok(docs) => {
            for doc in docs {
                println!("{}  {} ({})", doc.id, doc.name, doc.mime_type);
            }
        }
        Err(e) => eprintln!("Failed to read documents: {}", e),
    }
}

fn drop_document(store: &ContextStore, id: &str) {
    match store.remove_document(id) {
        Ok(true) => println!("Dropped."),
        Ok(false) => eprintln!("No document with id {}", id),
        Err(e) => eprintln!("Failed to remove document: {}", e),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /fact <key>: <value>   store a personal fact");
    println!("  /facts                 list stored facts");
    println!("  /forget <id>           remove a fact");
    println!("  /upload <path>         add a reference document");
    println!("  /docs                  list documents");
    println!("  /drop <id>             remove a document");
    println!("  /quit                  exit");
}

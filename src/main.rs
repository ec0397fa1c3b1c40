use medidesk::api::client::ApiClient;
use medidesk::app::AppConfig;
use medidesk::console::Console;
use medidesk::storage::{MemoryStorage, Persistence, SqliteStorage};
use medidesk::store::ConversationStore;
use std::io::{self, BufRead, Write};

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = AppConfig::load();
    let storage = match &config.database_path {
        Some(path) => SqliteStorage::open(path),
        None => SqliteStorage::open_default(),
    };
    match storage {
        Ok(storage) => run(storage, &config),
        Err(e) => {
            log::warn!("message database unavailable, keeping this session in memory: {}", e);
            run(MemoryStorage::new(), &config)
        }
    }
}

fn run<P: Persistence>(storage: P, config: &AppConfig) -> io::Result<()> {
    let api = match ApiClient::new(&config.api_url) {
        Ok(api) => Some(api),
        Err(e) => {
            log::warn!("API disabled: {}", e);
            None
        }
    };
    let store = ConversationStore::open(storage);
    let mut console = Console::new(store, api, config.user_name.clone(), io::stdout());
    console.handle("list")?;

    let stdin = io::stdin();
    loop {
        print!("medidesk> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if !console.handle(&line)? {
            break;
        }
    }
    Ok(())
}

use market_favorites::api::{self, EventStreamNotifier, RestGateway};
use market_favorites::config::BackendConfig;
use market_favorites::models::ServiceId;
use market_favorites::state::{Session, ToastKind};
use market_favorites::FavoritesManager;
use std::sync::Arc;

// App version and metadata
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_NAME: &str = "market-favorites";

const USAGE: &str = "usage: market-favorites <list | toggle <service-id> | services | watch>";

enum Command {
    List,
    Toggle(ServiceId),
    Services,
    Watch,
}

fn parse_command(args: &[String]) -> Option<Command> {
    match args {
        [cmd] if cmd == "list" => Some(Command::List),
        [cmd, id] if cmd == "toggle" => Some(Command::Toggle(ServiceId::from(id.as_str()))),
        [cmd] if cmd == "services" => Some(Command::Services),
        [cmd] if cmd == "watch" => Some(Command::Watch),
        _ => None,
    }
}

fn main() {
    // Set RUST_LOG=debug for verbose output, RUST_LOG=info for normal logs
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("hyper_util", log::LevelFilter::Warn)
        .init();

    log::info!("[Main] Starting {} v{}", APP_NAME, APP_VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_command(&args) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = match BackendConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("[Main] {}", e);
            std::process::exit(1);
        }
    };

    let rt = match market_favorites::utils::error_handling::create_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("[Main] {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(config, command)) {
        log::error!("[Main] {}", e);
        std::process::exit(1);
    }
}

async fn run(config: BackendConfig, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let session = resolve_session(&config).await;
    let gateway = Arc::new(RestGateway::new(config.clone())?);
    let mut favorites = FavoritesManager::new(gateway, session);

    match command {
        Command::List => {
            favorites.reload().await;
            for id in favorites.favorite_ids() {
                println!("{}", id);
            }
        }
        Command::Toggle(id) => {
            if let Ok(result) = favorites.toggle(&id).await {
                println!(
                    "{} {}",
                    result.service_id,
                    if result.is_favorite { "favorited" } else { "unfavorited" }
                );
            }
        }
        Command::Services => {
            favorites.reload().await;
            for service in favorites.favorite_services().await {
                println!("{}\t{}", service.id, service.title);
            }
        }
        Command::Watch => {
            let Some(realtime_url) = config.realtime_url.clone() else {
                return Err("BACKEND_REALTIME_URL is not set".into());
            };
            let Some(token) = favorites.session().map(|s| s.access_token.clone()) else {
                return Err("watching requires BACKEND_ACCESS_TOKEN".into());
            };

            favorites.reload().await;
            print_ids(&favorites);

            let notifier = EventStreamNotifier::new(realtime_url, &config.anon_key, token);
            favorites.watch(&notifier).await?;
            while favorites.next_change().await {
                print_ids(&favorites);
                print_toasts(&mut favorites);
            }
        }
    }

    print_toasts(&mut favorites);
    Ok(())
}

/// Session from the configured access token, asking the backend when the
/// token cannot be read locally
async fn resolve_session(config: &BackendConfig) -> Option<Session> {
    let token = config.access_token.as_deref()?;
    match Session::from_access_token(token) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("[Main] Could not read access token ({}), asking backend", e);
            match api::fetch_current_user(config, token).await {
                Ok(user_id) => Some(Session::new(user_id, token)),
                Err(e) => {
                    log::error!("[Main] Could not resolve signed-in user: {}", e);
                    None
                }
            }
        }
    }
}

fn print_ids(favorites: &FavoritesManager) {
    let ids: Vec<String> = favorites
        .favorite_ids()
        .iter()
        .map(|id| id.to_string())
        .collect();
    println!("favorites: [{}]", ids.join(", "));
}

fn print_toasts(favorites: &mut FavoritesManager) {
    for toast in favorites.toasts.drain() {
        let tag = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Info => "info",
            ToastKind::Error => "error",
        };
        eprintln!("[{}] {}", tag, toast.message);
    }
}

use chrono::Utc;
use std::process::ExitCode;
use tracing::{error, info};

use cinema_booking::config::Config;
use cinema_booking::services::catalog_service::CatalogService;
use cinema_booking::services::user_service::UserService;
use cinema_booking::store::JsonFileStorage;
use cinema_booking::utils::error::AppResult;
use cinema_booking::utils::logging;

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.rust_log);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// Load the catalog and profile store and report what the storefront would serve
fn run(config: &Config) -> AppResult<()> {
    let catalog = CatalogService::load(&config.catalog_path)?;
    let users = UserService::new(JsonFileStorage::new(&config.store_path), config.bcrypt_cost);
    let session = users.restore_session()?;

    let today = Utc::now().date_naive();
    info!(
        catalog_version = catalog.version(),
        movies = catalog.get_all_movies().len(),
        states = catalog.states().len(),
        categories = ?catalog.get_all_categories(),
        upcoming = catalog.upcoming(today, 3).len(),
        "storefront ready"
    );

    match session.profile() {
        Some(profile) => info!(
            email = %profile.email,
            bookings = profile.booking_history.len(),
            wishlist = profile.wishlist.len(),
            due_reminders = users.due_reminders(&session, Utc::now()).len(),
            "session restored"
        ),
        None => info!("no signed-in user"),
    }

    Ok(())
}

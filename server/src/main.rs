use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use todo_server::{routes, Config, SqliteStore, TodoStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load();
    let store = SqliteStore::open(&config.database_url).map_err(io::Error::other)?;
    let store: Arc<dyn TodoStore> = Arc::new(store);
    let store = web::Data::from(store);

    info!(
        "the server is running on {}:{} (store: {})",
        config.host, config.port, config.database_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

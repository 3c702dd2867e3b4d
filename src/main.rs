use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use file_converter::{routes, Config, DocumentConverter};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("🦀 Starting File & Image Converter");
    log::info!("📍 Listening on {}:{}", config.host, config.port);
    log::info!("🖨️  HTML renderer: {}", config.wkhtmltopdf_path.display());
    log::info!("📂 Temp directory: {}", config.temp_dir.display());

    let converter = web::Data::new(DocumentConverter::from_config(&config));
    let bind = config.bind_address();
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .configure(routes::configure(config.clone(), converter.clone()))
    })
    .bind(bind)?
    .run()
    .await
}

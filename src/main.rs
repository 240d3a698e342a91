mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use log::{info, warn};
use env_logger::Env;
use actix_web::middleware::Logger;
use actix_web_httpauth::middleware::HttpAuthentication;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::{json_error_handler, path_error_handler};
use crate::services::scheduler::{LogNotifier, ReminderScheduler};
use crate::utils::jwt::JwtKeys;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().unwrap_or_else(|err| panic!("Invalid configuration: {}", err));

    // Initialize the database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to the database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let keys = web::Data::new(JwtKeys::new(&config.jwt_secret, config.token_ttl_hours));

    // Reminder jobs run on this runtime; load every user's active reminders
    let scheduler = web::Data::new(ReminderScheduler::new(Arc::new(LogNotifier)));
    scheduler.start();
    let user_ids = db::users::list_ids(&pool).await.unwrap_or_else(|err| {
        warn!("Failed to list users for reminder loading: {}", err);
        Vec::new()
    });
    for user_id in user_ids {
        if let Err(err) = scheduler.load_reminders(&pool, user_id).await {
            warn!("Failed to load reminders for user {}: {}", user_id, err);
        }
    }
    info!("Scheduled {} reminders", scheduler.scheduled_count());

    info!("Starting server at {}", config.bind_address);

    // Authentication middleware
    let auth = HttpAuthentication::bearer(crate::utils::jwt::validator);

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "fittrack".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .expect("Failed to create Prometheus metrics");

    let server_scheduler = scheduler.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(web::Data::new(pool.clone()))
            .app_data(keys.clone())
            .app_data(server_scheduler.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(web::resource("/register").route(web::post().to(handlers::auth::register)))
            .service(web::resource("/login").route(web::post().to(handlers::auth::login)))
            .service(
                web::resource("/progress")
                    .wrap(auth.clone())
                    .route(web::post().to(handlers::progress::add_progress)),
            )
            .service(
                web::resource("/progress/{user_id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::progress::get_progress)),
            )
            .service(
                web::resource("/plan/{user_id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::plan::get_plan)),
            )
            .service(
                web::resource("/complete")
                    .wrap(auth.clone())
                    .route(web::post().to(handlers::gamification::complete_action)),
            )
            .service(
                web::resource("/gamification/{user_id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::gamification::get_gamification)),
            )
            .service(
                web::resource("/reminders")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::reminder::get_reminders))
                    .route(web::post().to(handlers::reminder::create_reminder)),
            )
            .service(
                web::resource("/reminders/{reminder_id}/disable")
                    .wrap(auth.clone())
                    .route(web::put().to(handlers::reminder::disable_reminder)),
            )
            .service(
                web::resource("/community/posts")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::community::get_posts))
                    .route(web::post().to(handlers::community::create_post)),
            )
            .service(
                web::resource("/community/posts/{post_id}/comments")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::community::get_comments))
                    .route(web::post().to(handlers::community::create_comment)),
            )
            .service(
                web::resource("/update")
                    .wrap(auth.clone())
                    .route(web::put().to(handlers::profile::update_profile)),
            )
            .service(
                web::resource("/users")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::profile::list_users)),
            )
    })
    .workers(num_cpus::get())
    .bind(&config.bind_address)?
    .run()
    .await?;

    scheduler.stop();
    Ok(())
}


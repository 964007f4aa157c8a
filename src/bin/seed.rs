//! Seed the database with demo accounts and books.
//!
//! Rows are keyed on email and ISBN, so running it twice is harmless.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use mylib_server::{
    config::AppConfig,
    models::{book::NewBook, user::{NewUser, Role}},
    repository::Repository,
    services::auth::hash_password,
};

const DEMO_PASSWORD: &str = "Password123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mylib_seed=info".into()),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let repository = Repository::new(pool.clone());
    let password_hash = hash_password(DEMO_PASSWORD)?;

    let users = [
        NewUser {
            full_name: "Admin User".to_string(),
            role: Role::Admin,
            email: "admin@smcii.mylib".to_string(),
            password_hash: password_hash.clone(),
            phone_number: Some("1234567890".to_string()),
            id_number: Some("ADM001".to_string()),
        },
        NewUser {
            full_name: "Librarian Jane".to_string(),
            role: Role::Librarian,
            email: "jane@smcii.mylib".to_string(),
            password_hash,
            phone_number: Some("0987654321".to_string()),
            id_number: Some("LIB002".to_string()),
        },
    ];

    for user in &users {
        let stored = repository.users.upsert_by_email(user).await?;
        tracing::info!(user_id = stored.id, email = %stored.email, role = %stored.role, "Seeded user");
    }

    let books = [
        NewBook {
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
            isbn: "9780132350884".to_string(),
            category: "Software Engineering".to_string(),
            total_copies: 5,
            available_copies: 5,
        },
        NewBook {
            title: "The Pragmatic Programmer".to_string(),
            author: "Andrew Hunt".to_string(),
            isbn: "9780201616224".to_string(),
            category: "Programming".to_string(),
            total_copies: 3,
            available_copies: 3,
        },
    ];

    for book in &books {
        let stored = repository.books.upsert_by_isbn(book).await?;
        tracing::info!(book_id = stored.id, isbn = %stored.isbn, "Seeded book");
    }

    pool.close().await;
    tracing::info!("Seeding complete");
    Ok(())
}

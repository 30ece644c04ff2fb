// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `doctor` subcommand: sanity-check configuration and storage.

use parlor_config::ParlorConfig;
use parlor_core::ParlorError;
use parlor_storage::Database;
use parlor_storage::queries::plans;

/// Open the database, run migrations, and report what the service would see
/// at startup.
pub async fn run(config: &ParlorConfig) -> Result<(), ParlorError> {
    println!("parlor doctor");
    println!("  server:   {}:{}", config.server.host, config.server.port);
    println!("  base url: {}", config.server.public_base_url);
    println!("  database: {}", config.storage.database_path);
    println!(
        "  admin:    {}",
        if config.auth.admin_token.is_some() { "token configured" } else { "NO TOKEN (admin surface disabled)" }
    );

    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode)
        .await?;
    plans::seed_default_plans(&db).await?;

    for tier in ["free", "starter", "professional", "enterprise"] {
        match plans::get_plan(&db, tier).await? {
            Some(plan) => println!(
                "  plan {tier}: {} conversations, {} messages",
                plan.max_conversations, plan.max_messages
            ),
            None => println!("  plan {tier}: MISSING"),
        }
    }

    db.close().await?;
    println!("  storage:  ok");
    Ok(())
}

use anyhow::Result;
use toxiscope_core::history::HistoryRow;
use toxiscope_core::session::{Role, UserId};

use crate::bootstrap::App;

pub async fn users(app: &App) -> Result<()> {
    let users = app.admin.list_users().await?;
    for user in &users {
        let role = match user.role {
            Role::Admin => "admin",
            Role::User => "user",
        };
        let joined = user
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<38} {:<30} {:<20} {:<5} {}", user.id.as_str(), user.email, user.name, role, joined);
    }
    println!("\n{} users", users.len());
    Ok(())
}

pub async fn history(app: &App) -> Result<()> {
    let entries = app.admin.list_history().await?;
    for entry in &entries {
        let row = HistoryRow::from_record(&entry.record);
        let owner = entry.user_email.as_deref().unwrap_or("unknown");
        println!(
            "#{:<6} {} {}  {:<30} tox {:>6}  {}",
            row.id.0, row.date, row.time, owner, row.toxicity_percent, row.preview
        );
    }
    println!("\n{} analyses", entries.len());
    Ok(())
}

pub async fn delete_user(app: &App, id: &str) -> Result<()> {
    app.admin.delete_user(&UserId::new(id)).await?;
    println!("Deleted user {}", id);
    Ok(())
}

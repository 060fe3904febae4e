use anyhow::Result;
use toxiscope_core::local_state::PreferenceStore;

use super::read_secret;
use crate::bootstrap::App;

pub async fn login(app: &App, email: &str, password: Option<String>) -> Result<()> {
    let password = read_secret(password, "Password")?;
    let session = app.session.sign_in(email, &password).await?;
    println!("Signed in as {}", session.identity.email);
    Ok(())
}

pub async fn signup(app: &App, email: &str, password: Option<String>) -> Result<()> {
    let password = read_secret(password, "Choose a password")?;
    let session = app.session.sign_up(email, &password).await?;
    println!("Account created, signed in as {}", session.identity.email);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.session.sign_out().await?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(app: &App) {
    match app.session.identity() {
        Some(identity) => {
            let role = if identity.is_admin() { " [admin]" } else { "" };
            println!("{} ({}){}", identity.email, identity.id, role);
        }
        None => match app.session.cached_identity() {
            Some(last) => println!("Not signed in (last signed in as {})", last.email),
            None => println!("Not signed in"),
        },
    }
}

pub async fn change_password(app: &App, new_password: Option<String>) -> Result<()> {
    let new_password = read_secret(new_password, "New password")?;
    app.session.update_password(&new_password).await?;
    println!("Password updated");
    Ok(())
}

/// `dark` is `None` to show the current preference.
pub fn theme(app: &App, dark: Option<bool>) -> Result<()> {
    if let Some(dark) = dark {
        app.local_state.set_dark_mode(dark).map_err(anyhow::Error::msg)?;
    }
    let current = if app.local_state.dark_mode() { "dark" } else { "light" };
    println!("Theme: {}", current);
    Ok(())
}

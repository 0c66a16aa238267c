//! `qkart login|register|logout|whoami`

use qkart_storefront::account::AccountService;
use qkart_storefront::error::{Notice, StoreError};
use secrecy::SecretString;

use super::{App, print_notice};

/// Log in and save the session for later commands.
///
/// # Errors
///
/// Returns an error if the form is invalid or the server refuses.
pub async fn login(
    app: &mut App,
    username: &str,
    password: &SecretString,
) -> Result<(), StoreError> {
    let service = AccountService::new(app.client.clone(), app.sessions.clone());
    app.session = service.login(username, password).await?;
    print_notice(&Notice::success("Logged in successfully"));
    Ok(())
}

/// Create an account.
///
/// # Errors
///
/// Returns an error if the form is invalid or the server refuses.
pub async fn register(
    app: &App,
    username: &str,
    password: &SecretString,
    confirm: &SecretString,
) -> Result<(), StoreError> {
    let service = AccountService::new(app.client.clone(), app.sessions.clone());
    service.register(username, password, confirm).await?;
    print_notice(&Notice::success("Registered successfully"));
    Ok(())
}

/// Clear the saved session.
///
/// # Errors
///
/// Returns an error if the session file cannot be written.
pub fn logout(app: &mut App) -> Result<(), StoreError> {
    let service = AccountService::new(app.client.clone(), app.sessions.clone());
    service.logout(&mut app.session)?;
    print_notice(&Notice::success("Logged out"));
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn whoami(app: &App) {
    match app.session.username() {
        Some(username) if app.session.is_authenticated() => {
            println!("{username}");
            println!("Wallet: {}", app.session.balance());
        }
        _ => println!("Not logged in"),
    }
}

//! `qkart products|search`

use qkart_storefront::api::StoreApi;
use qkart_storefront::error::{Notice, Severity, StoreError};
use qkart_storefront::notify::Notifier;
use qkart_storefront::search::SearchController;

use super::{App, print_notice, print_products};
use crate::CliError;

/// Print the full catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn products(app: &App) -> Result<(), StoreError> {
    let products = app.client.products().await?;
    print_products(&products);
    Ok(())
}

/// Search the way a search box would: the words are entered one at a time,
/// so only the final text reaches the server.
///
/// # Errors
///
/// Returns [`CliError::Reported`] once the notices of a failed search have
/// been printed.
pub async fn search(app: &App, words: &[String]) -> Result<(), CliError> {
    let (notifier, mut notices) = Notifier::channel();
    let controller =
        SearchController::new(app.client.clone(), app.config.search_debounce, notifier);

    let mut text = String::new();
    let mut pending = Vec::with_capacity(words.len());
    for word in words {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(word);
        pending.push(controller.on_input(text.clone()));
    }
    for handle in pending {
        // A panicked search task has already logged its panic.
        let _ = handle.await;
    }

    let mut failed = false;
    while let Ok(notice) = notices.try_recv() {
        failed |= notice.severity == Severity::Error;
        print_notice(&notice);
    }
    if failed {
        return Err(CliError::Reported);
    }

    let state = controller.state();
    if state.not_found {
        print_notice(&Notice::new(Severity::Info, "No products found"));
    } else {
        print_products(&state.products);
    }
    Ok(())
}

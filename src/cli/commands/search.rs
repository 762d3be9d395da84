use crate::services::SearchOutcome;
use crate::state::SharedState;

pub async fn cmd_search(shared: &SharedState, username: &str) -> anyhow::Result<()> {
    println!("Searching accounts followed by: {username}");

    let outcome = shared.search_service.search(username).await?;
    print_outcome(&outcome);

    Ok(())
}

fn print_outcome(outcome: &SearchOutcome) {
    if outcome.using_cache {
        let date = outcome.cache_date.as_deref().unwrap_or("an earlier search");
        println!("Using results cached on {date}");
        println!(
            "Run `handlefinder forget {}` to search again",
            outcome.username
        );
    }

    for error in &outcome.errors {
        println!("⚠ {error}");
    }

    if outcome.results.is_empty() {
        if outcome.errors.is_empty() {
            println!("No followed account mentions a fediverse handle");
        }
        return;
    }

    println!();
    println!("{:-<70}", "");
    for account in &outcome.results {
        println!(
            "• @{} ({}) -> {} ({})",
            account.source_username,
            account.source_name,
            account.target_handle,
            account.target_name
        );
    }
    println!("{:-<70}", "");
    println!("{} account(s) found", outcome.results.len());
}

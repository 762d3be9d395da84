use crate::state::SharedState;

pub async fn cmd_forget(shared: &SharedState, username: &str) -> anyhow::Result<()> {
    if shared.search_service.invalidate(username).await? {
        println!("✓ Forgot cached search for {username}");
    } else {
        println!("No cached search for {username}");
    }
    Ok(())
}

//! Watches a credential directory on disk and prints the current value
//! every second, so you can drop or edit a file in another terminal and
//! watch the change land without restarting the process.

use notifyctl::prelude::CredentialStore;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let dir = std::env::temp_dir().join("notifyctl-cookbook-credentials");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("slack-webhook"), "xoxb-initial\n")?;
    println!("watching {} — edit a file in it and the value below will change", dir.display());

    let (store, _watcher) = CredentialStore::watch_dir(&dir)?;

    for _ in 0..10 {
        println!("slack-webhook = {:?}", store.get("slack-webhook"));
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

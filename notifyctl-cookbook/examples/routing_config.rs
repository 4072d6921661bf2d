//! Loads a routing config from YAML, validates its credential references,
//! and shows which channels a label set resolves to.

use notifyctl::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let yaml = r#"
route:
  receiver: default-console
  routes:
    - match:
        team: ops
      receiver: ops-slack
receivers:
  - name: ops-slack
    slackConfigs:
      - channel: "#ops"
        credentialRef: slack-webhook
  - name: default-console
    consoleConfigs:
      - enabled: true
"#;

    let config = RoutingConfig::from_yaml(yaml)?;

    let credentials = CredentialStore::new(std::collections::HashMap::new());
    credentials.replace_all([("slack-webhook".to_string(), "xoxb-example".to_string())].into());
    config.validate_credentials(&credentials)?;

    let mut labels = std::collections::BTreeMap::new();
    labels.insert("team".to_string(), "ops".to_string());
    let channels = config.select_channels(&labels);
    println!("team=ops routes to: {channels:?}");

    let channels = config.select_channels(&std::collections::BTreeMap::new());
    println!("unlabeled routes to: {channels:?}");

    Ok(())
}

//! `navigator serve`: start the HTTP API server.

use navigator_config::AppConfig;

pub async fn run(
    mut config: AppConfig,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🧭 Navigator API");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Agent:     {}", display_or_unset(&config.agent.agent_id));
    println!("   Sessions:  {}", config.sessions.dir.display());

    navigator_gateway::start(config).await?;

    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

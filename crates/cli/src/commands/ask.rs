//! `navigator ask`: run one question through the agent and print the answer.

use std::sync::Arc;

use navigator_agent::{AgentGateway, QueryRequest, query};
use navigator_config::AppConfig;
use navigator_providers::AixplainRegistry;

pub async fn run(
    config: AppConfig,
    question: String,
    url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the AIXPLAIN_API_KEY environment variable, or add");
        eprintln!("  `api_key` under [agent] in your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let registry = Arc::new(AixplainRegistry::from_config(&config.agent));
    let gateway = AgentGateway::from_config(registry, &config.agent);

    let mut request = QueryRequest::new(question);
    if let Some(url) = url {
        request = request.with_url(url);
    }

    let answer = query::answer(&gateway, &request).await?;

    println!("{}", answer.user_display);
    println!();
    println!("{}", answer.response);
    if answer.is_out_of_domain {
        println!();
        println!("⚠️  This question appears to be outside the agent's policy sources.");
    }

    Ok(())
}

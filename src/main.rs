use clap::Parser;
use pixie::adapters::gateway::{GatewayClient, GatewayEvents};
use pixie::adapters::token_store::FileTokenStore;
use pixie::adapters::web;
use pixie::core::engine::{HeartbeatEngine, HeartbeatReport, ScriptedEvents};
use pixie::utils::error::exit_on_error;
use pixie::utils::{logger, validation::Validate};
use pixie::{CliConfig, KioskConfig};
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init(cli.verbose, cli.log_json);

    tracing::info!("Starting pixie");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        exit_on_error(&e);
    }
}

async fn run(cli: CliConfig) -> pixie::Result<()> {
    let mut config = KioskConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    // 驗證配置
    config.validate()?;

    if cli.serve {
        return web::run_server(config.web_config()?).await;
    }

    let report = run_heartbeat(&config).await;
    println!("Done. Final state: {:?}", report.final_state);
    Ok(())
}

async fn run_heartbeat(config: &KioskConfig) -> HeartbeatReport {
    let ticks = config.heartbeat.ticks;
    let period = Duration::from_millis(config.heartbeat.interval_ms);

    if !config.gateway.enabled {
        return HeartbeatEngine::new(ScriptedEvents, ticks, period).run().await;
    }

    let client = GatewayClient::new(
        &config.gateway.url,
        config.gateway.webhook_secret.clone(),
        FileTokenStore::new(config.gateway.token_path()),
    );
    tracing::info!(
        "gateway_url={} token_path={}",
        client.base_url(),
        client.token_location()
    );

    let events = GatewayEvents::new(
        client,
        config.gateway.every,
        config.gateway.message.clone(),
        config.gateway.pairing_code.clone(),
    );
    HeartbeatEngine::new(events, ticks, period).run().await
}

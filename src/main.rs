use stresscraft::config::ServiceConfig;
use stresscraft::host::HostProbe;
use stresscraft::models::Limit;
use stresscraft::server;
use stresscraft::util::units::format_bytes;
use stresscraft::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stresscraft=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::load()?;
    tracing::info!(
        write_dir = %config.write_dir.display(),
        log_file = %config.log_file.display(),
        progress_interval = config.progress_interval,
        "Configuration loaded"
    );

    let resources = HostProbe::new(config.cgroup_root.clone()).detect();
    let memory_limit = match resources.memory.memory_limit {
        Limit::Limited(bytes) => format_bytes(bytes),
        Limit::Unlimited => "unlimited".to_string(),
    };
    let cpu_limit = match resources.cpu.cpu_limit {
        Limit::Limited(cpus) => format!("{:.2}", cpus),
        Limit::Unlimited => "unlimited".to_string(),
    };
    tracing::info!(
        logical_cores = resources.cpu.logical_cores,
        cpu_limit = %cpu_limit,
        total_memory = %format_bytes(resources.memory.total_mem_bytes),
        memory_limit = %memory_limit,
        "Host resources detected"
    );

    server::serve(config).await
}

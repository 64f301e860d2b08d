use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tr064_client::{Device, DeviceConfig, Service, ServiceInfo};

/// Discover the DeviceInfo service of a gateway and call GetInfo.
///
/// Usage: get_info <host> <username> <password> [port]
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tr064_client=debug".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        return Err(anyhow!("usage: get_info <host> <username> <password> [port]"));
    }
    let port = args
        .get(4)
        .map(|p| p.parse::<u16>())
        .transpose()?
        .unwrap_or(49000);

    let device = Arc::new(Device::new(DeviceConfig {
        host: args[1].clone(),
        port,
        friendly_name: args[1].clone(),
        username: args[2].clone(),
        password: args[3].clone(),
        timeout: Duration::from_secs(10),
        ..DeviceConfig::default()
    })?);

    let service = Service::discover(
        Arc::clone(&device),
        ServiceInfo {
            service_type: "urn:dslforum-org:service:DeviceInfo:1".to_string(),
            control_url: "/upnp/control/deviceinfo".to_string(),
            scpd_url: "/deviceinfoSCPD.xml".to_string(),
        },
    )
    .await?;

    println!("Discovered {} actions:", service.actions_info().len());
    for action in service.actions_info() {
        println!(
            "  {} (in: {:?}, out: {:?})",
            action.name, action.in_args, action.out_args
        );
    }

    let result = service.invoke("GetInfo", &[]).await?;
    for (name, value) in &result {
        println!("{name} = {value}");
    }

    Ok(())
}

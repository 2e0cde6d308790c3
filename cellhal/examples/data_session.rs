/// Example bringing up a data session on the default profile and watching
/// packet service events.
use cellhal::{
    CellularModem, InitConfig, IpFamily, ModemEvent, ModemOptions, NetworkIpType, ProfileBuilder,
    RadioTechPreference, SimulatedModem,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> cellhal::Result<()> {
    let options = ModemOptions::new().with_network_start_timeout(Duration::from_secs(60));
    let modem = CellularModem::new(Arc::new(SimulatedModem::default()), options);

    let mut events = modem.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ModemEvent::PacketService(e) => {
                    println!("[event] {} {} {}", e.interface_name, e.ip_type, e.status)
                }
                ModemEvent::Registration(e) => println!("[event] registration {}", e.status),
                _ => {}
            }
        }
    });

    let profile = ProfileBuilder::new(1, "internet")
        .apn(std::env::var("CELL_APN").unwrap_or_else(|_| "internet".to_string()))
        .build()?;

    modem
        .init(InitConfig {
            ip_family: IpFamily::Ipv4v6,
            preferred_technology: RadioTechPreference::Lte,
            default_profile: profile,
        })
        .await?;

    let ip = modem
        .start_network(NetworkIpType::Ipv4, None)
        .await?
        .wait_timeout(modem.options().network_start_timeout)
        .await?;

    println!("Interface: {}", ip.interface_name);
    println!("Address:   {}/{}", ip.ip_address, ip.subnet_mask);
    println!("Gateway:   {}", ip.default_gateway);
    println!("DNS:       {} {}", ip.dns_primary, ip.dns_secondary);
    println!("MTU:       {}", ip.mtu);

    let stats = modem.packet_statistics().await?;
    println!("Sent {} bytes, received {}", stats.bytes_sent, stats.bytes_received);

    modem.stop_network(NetworkIpType::Ipv4).await?;
    modem.detach().await?;
    println!("Interface status: {}", modem.interface_status().await?);

    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

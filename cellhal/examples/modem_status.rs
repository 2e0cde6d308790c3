/// Example printing a modem status report: identity, SIM slots, radio and
/// registration.
use cellhal::{CellularModem, ModemOptions, SimulatedModem};
use std::sync::Arc;

#[tokio::main]
async fn main() -> cellhal::Result<()> {
    let modem = CellularModem::new(Arc::new(SimulatedModem::default()), ModemOptions::default());

    if !modem.is_modem_present().await {
        println!("No modem present");
        return Ok(());
    }

    println!("IMEI:      {}", modem.imei().await?);
    println!("IMEISV:    {}", modem.imeisv().await?);
    println!("Firmware:  {}", modem.firmware_version().await?);

    let slots = modem.total_uicc_slots().await?;
    println!("\nUICC slots: {slots}");
    for index in 0..slots {
        let slot = modem.uicc_slot_info(index).await?;
        println!(
            "  slot{}: present={} enabled={} status={} {}",
            index + 1,
            slot.card_present,
            slot.card_enabled,
            slot.status,
            slot.operator_name
        );
    }
    println!("Active card: {}", modem.active_card_status().await?);

    println!("\nSupported: {}", modem.supported_radio_technology().await?);
    println!("Current:   {}", modem.current_radio_technology().await?);

    let signal = modem.signal_info().await?;
    println!(
        "Signal:    RSSI {} dBm, RSRP {} dBm, RSRQ {} dB, SNR {} dB",
        signal.rssi, signal.rsrp, signal.rsrq, signal.snr
    );

    match modem.current_plmn_information().await {
        Ok(plmn) => println!(
            "Network:   {} ({:03}-{:02}) {}",
            plmn.network_name, plmn.mcc, plmn.mnc, plmn.registration_status
        ),
        Err(e) => println!("Network:   {e}"),
    }

    println!("\nVisible networks:");
    for network in modem.available_networks().await? {
        println!(
            "  {} ({:03}-{:02}){}",
            network.network_name,
            network.mcc,
            network.mnc,
            if network.allowed { "" } else { " [forbidden]" }
        );
    }

    Ok(())
}

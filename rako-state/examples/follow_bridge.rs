//! Follow one Rako channel and print its brightness as the bridge reports it
//!
//! ```text
//! cargo run -p rako-sdk-state --example follow_bridge -- <bridge-ip> <bridge-mac> <room> <channel>
//! ```

use std::sync::Arc;
use std::time::Duration;

use rako_protocol::Bridge;
use rako_state::{BridgeSync, LightEntity, Observer, SyncConfig};
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rako_state::init_logging_from_env()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [host, mac, room, channel] = args.as_slice() else {
        return Err("usage: follow_bridge <bridge-ip> <bridge-mac> <room> <channel>".into());
    };

    let bridge = Bridge::new(host.parse()?, "Rako Bridge", mac.as_str());
    let room: u16 = room.parse()?;
    let channel: u8 = channel.parse()?;

    println!("1. Creating synchronizer for {}...", bridge);
    let sync = BridgeSync::new(bridge.clone(), SyncConfig::default())?;

    println!("2. Registering room {} channel {}...", room, channel);
    let light = Arc::new(LightEntity::new(&bridge, room, channel, "Followed channel"));
    let observer = Observer::light(light.clone());
    sync.register_for_updates(&observer).await;
    println!("✓ Listener status: {:?}", sync.listener_status().await);

    println!("3. Watching for 60s (change the light from a keypad or app)...");
    let mut brightness = light.subscribe();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(60);

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }

        match timeout(remaining, brightness.changed()).await {
            Ok(Ok(())) => println!("  brightness: {}", *brightness.borrow_and_update()),
            Ok(Err(_)) | Err(_) => break,
        }
    }

    println!("4. Deregistering...");
    sync.deregister_for_updates(&observer).await;
    println!("✓ Listener status: {:?}", sync.listener_status().await);

    Ok(())
}

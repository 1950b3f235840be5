//! End-to-end test over a real UDP socket on localhost

use std::net::UdpSocket as StdUdpSocket;
use std::sync::Arc;
use std::time::Duration;

use rako_protocol::{encode_status_frame, Bridge};
use rako_state::{BridgeSync, LightEntity, ListenerStatus, Observer, SyncConfig};
use tokio::net::UdpSocket;

const SET_LEVEL: u8 = 0x34;

/// A port that was free a moment ago
fn free_port() -> u16 {
    let socket = StdUdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_status_datagram_reaches_light() {
    let port = free_port();
    let bridge = Bridge::new("127.0.0.1".parse().unwrap(), "Loopback", "de:ad:be:ef:00:01")
        .with_port(port);
    let sync = BridgeSync::new(bridge.clone(), SyncConfig::fast_shutdown()).unwrap();

    let lamp = Arc::new(LightEntity::new(&bridge, 12, 3, "Desk"));
    let observer = Observer::light(lamp.clone());
    sync.register_for_updates(&observer).await;

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let frame = encode_status_frame(12, 3, SET_LEVEL, &[0, 180]);
    let mut rx = lamp.subscribe();

    // The listener binds asynchronously; resend until it is there.
    let delivered = tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            sender.send_to(&frame, ("127.0.0.1", port)).await.unwrap();
            if tokio::time::timeout(Duration::from_millis(50), rx.changed()).await.is_ok() {
                break *rx.borrow_and_update();
            }
        }
    })
    .await
    .expect("status datagram never delivered");
    assert_eq!(delivered, 180);

    sync.deregister_for_updates(&observer).await;
    assert_eq!(sync.listener_status().await, ListenerStatus::Stopped);

    // The port is free again once deregistration returns.
    assert!(StdUdpSocket::bind(("0.0.0.0", port)).is_ok());
}

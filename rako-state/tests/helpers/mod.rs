//! Test helpers: a scripted bridge standing in for the UDP listener

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use rako_protocol::{
    Bridge, ChannelStatus, DecodeError, ListenerFactory, Message, MessageSource, ProtocolError,
    SceneStatus, StatusMessage,
};
use rako_state::{BridgeSync, SyncConfig};

/// Something the fake bridge delivers to its open listeners
#[derive(Debug, Clone)]
pub enum FakeEvent {
    Status(StatusMessage),
    /// Delivered only after the listener has been waiting for `Duration`
    Delayed(Duration, StatusMessage),
    /// Blocks the worker thread for `Duration`, ignoring cancellation
    Stall(Duration),
    Other,
    Garbage,
    TransportFailure,
}

/// Scripted [`ListenerFactory`]
///
/// Every `open` creates a new source; `send` fans an event out to all sources
/// still open. Counters expose how many listeners were ever opened and how many
/// are open right now.
#[derive(Clone, Default)]
pub struct FakeBridge {
    senders: Arc<Mutex<Vec<mpsc::UnboundedSender<FakeEvent>>>>,
    opened: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl FakeBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, event: FakeEvent) {
        let mut senders = self.senders.lock().unwrap();
        senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` listeners have been opened
    pub async fn wait_opened(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.opened() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("listener was never opened");
    }
}

#[async_trait]
impl ListenerFactory for FakeBridge {
    async fn open(&self, _port: u16) -> rako_protocol::Result<Box<dyn MessageSource>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(tx);
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FakeSource {
            rx,
            live: Arc::clone(&self.live),
        }))
    }
}

struct FakeSource {
    rx: mpsc::UnboundedReceiver<FakeEvent>,
    live: Arc<AtomicUsize>,
}

#[async_trait]
impl MessageSource for FakeSource {
    async fn next_message(&mut self) -> rako_protocol::Result<Option<Message>> {
        let mut event = self.rx.recv().await;
        while let Some(FakeEvent::Stall(duration)) = event {
            std::thread::sleep(duration);
            tokio::task::yield_now().await;
            event = self.rx.recv().await;
        }

        match event {
            Some(FakeEvent::Status(status)) => Ok(Some(Message::Status(status))),
            Some(FakeEvent::Delayed(delay, status)) => {
                tokio::time::sleep(delay).await;
                Ok(Some(Message::Status(status)))
            }
            Some(FakeEvent::Other) => Ok(Some(Message::Other {
                frame: b'Q',
                command: None,
            })),
            Some(FakeEvent::Garbage) => Err(DecodeError::TooShort { len: 1 }.into()),
            Some(FakeEvent::TransportFailure) => Err(ProtocolError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "socket reset",
            ))),
            Some(FakeEvent::Stall(_)) | None => Err(ProtocolError::Closed),
        }
    }
}

impl Drop for FakeSource {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn test_bridge() -> Bridge {
    Bridge::new("192.168.1.20".parse().unwrap(), "Test Bridge", "00:11:22:33:44:55")
}

/// A synchronizer wired to a fresh fake bridge
pub fn fake_sync() -> (BridgeSync, FakeBridge) {
    let fake = FakeBridge::new();
    let sync = BridgeSync::with_factory(
        test_bridge(),
        SyncConfig::fast_shutdown(),
        Arc::new(fake.clone()),
    )
    .expect("valid config");
    (sync, fake)
}

pub fn channel_status(room: u16, channel: u8, brightness: u8) -> StatusMessage {
    StatusMessage::Channel(ChannelStatus {
        room,
        channel,
        brightness,
    })
}

pub fn scene_status(room: u16, channel: u8, scene: u8) -> StatusMessage {
    StatusMessage::Scene(SceneStatus {
        room,
        channel,
        scene,
    })
}

/// Wait for a watched value to change and return it
pub async fn next_value<T: Clone>(rx: &mut watch::Receiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.changed())
        .await
        .expect("timed out waiting for state change")
        .expect("observer dropped");
    rx.borrow_and_update().clone()
}

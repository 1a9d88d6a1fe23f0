//! Broker connection tests against the in-process STOMP broker.

mod support;

use std::time::Duration;

use rps_room_client::broker::BrokerConnection;
use rps_room_client::config::BrokerConfig;
use rps_room_client::error::BrokerError;
use rps_room_client::protocol::StompCommand;

use support::{FakeBroker, Handshake, TIMEOUT};

fn broker_config(url: &str) -> BrokerConfig {
    BrokerConfig {
        url: url.to_string(),
        connect_timeout_secs: 1,
        ..BrokerConfig::default()
    }
}

#[tokio::test]
async fn test_connect_negotiates_heartbeat() {
    let broker = FakeBroker::start().await;

    let connection = BrokerConnection::connect(&broker_config(&broker.url))
        .await
        .unwrap();

    assert!(connection.is_connected());
    // The fake broker answers 0,0, which disables both directions
    assert_eq!(connection.heartbeat().send, None);
    assert_eq!(connection.heartbeat().expect, None);
}

#[tokio::test]
async fn test_error_frame_rejects_connect() {
    let broker = FakeBroker::start_with(Handshake::Reject("bad credentials".into())).await;

    let result = BrokerConnection::connect(&broker_config(&broker.url)).await;

    match result {
        Err(BrokerError::Rejected(reason)) => assert_eq!(reason, "bad credentials"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("connect should have been rejected"),
    }
}

#[tokio::test]
async fn test_silent_broker_times_out() {
    let broker = FakeBroker::start_with(Handshake::Ignore).await;

    let result = tokio::time::timeout(
        TIMEOUT,
        BrokerConnection::connect(&broker_config(&broker.url)),
    )
    .await
    .expect("connect ignored its own timeout");

    assert!(matches!(result, Err(BrokerError::Timeout(_))));
}

#[tokio::test]
async fn test_unreachable_broker_fails_fast() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = BrokerConnection::connect(&broker_config(&format!("ws://{}", addr))).await;

    assert!(matches!(result, Err(BrokerError::Connect(_))));
}

#[tokio::test]
async fn test_subscribe_and_receive() {
    let mut broker = FakeBroker::start().await;
    let connection = BrokerConnection::connect(&broker_config(&broker.url))
        .await
        .unwrap();

    let (subscription, mut messages) = connection.subscribe("/topic/lobby").unwrap();
    let frame = broker.next_frame().await;
    assert_eq!(frame.command, StompCommand::Subscribe);
    assert_eq!(frame.get_header("id"), Some(subscription.id()));

    broker.deliver("/topic/lobby", "Rock beats Scissors");
    let message = tokio::time::timeout(TIMEOUT, messages.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(message.body, "Rock beats Scissors");
    assert_eq!(message.destination, "/topic/lobby");
    assert_eq!(message.subscription, subscription.id());
    assert!(message.message_id.is_some());
}

#[tokio::test]
async fn test_unsubscribe_is_sent_once() {
    let mut broker = FakeBroker::start().await;
    let connection = BrokerConnection::connect(&broker_config(&broker.url))
        .await
        .unwrap();

    let (subscription, _messages) = connection.subscribe("/topic/a").unwrap();
    let id = subscription.id().to_string();
    subscription.unsubscribe();
    connection.publish("/rooms/a/choice", "text/plain", "marker".into()).unwrap();

    assert_eq!(broker.next_frame().await.command, StompCommand::Subscribe);
    let release = broker.next_frame().await;
    assert_eq!(release.command, StompCommand::Unsubscribe);
    assert_eq!(release.get_header("id"), Some(id.as_str()));
    // The marker proves no second UNSUBSCRIBE followed
    assert_eq!(broker.next_frame().await.body, "marker");
}

#[tokio::test]
async fn test_disconnect_sends_frame() {
    let mut broker = FakeBroker::start().await;
    let connection = BrokerConnection::connect(&broker_config(&broker.url))
        .await
        .unwrap();

    connection.disconnect().await;

    assert_eq!(broker.next_frame().await.command, StompCommand::Disconnect);
}

#[tokio::test]
async fn test_heartbeats_sent_when_broker_asks() {
    let mut broker = FakeBroker::start_with(Handshake::Heartbeat("0,100".into())).await;
    let config = BrokerConfig {
        heartbeat_send_ms: 100,
        ..broker_config(&broker.url)
    };

    let connection = BrokerConnection::connect(&config).await.unwrap();
    assert_eq!(connection.heartbeat().send, Some(Duration::from_millis(100)));

    broker.next_heartbeat().await;
    broker.next_heartbeat().await;
    assert!(connection.is_connected());
}

#[tokio::test]
async fn test_silent_broker_is_dropped() {
    let broker = FakeBroker::start_with(Handshake::Heartbeat("100,0".into())).await;
    let config = BrokerConfig {
        heartbeat_recv_ms: 100,
        ..broker_config(&broker.url)
    };

    let connection = BrokerConnection::connect(&config).await.unwrap();
    assert_eq!(connection.heartbeat().expect, Some(Duration::from_millis(100)));

    tokio::time::timeout(TIMEOUT, async {
        while connection.is_connected() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("connection stayed up without heart-beats");

    assert!(matches!(
        connection.publish("/rooms/a/choice", "text/plain", "late".into()),
        Err(BrokerError::NotConnected)
    ));
}

#![cfg(feature = "telegram")]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use url::Url;

use herald::adapter::outbound::notifier::telegram::format::{
    format_event_message, split_message, MessageFormat, MAX_MESSAGE_LEN,
};
use herald::adapter::outbound::notifier::telegram::notifier::{
    check_bot, TelegramConfig, TelegramNotifier,
};
use herald::domain::DailySummary;
use herald::port::{Event, Notifier};

const TOKEN: &str = "123456:TEST-TOKEN";
const CHAT_ID: i64 = 123;

const GET_ME: &str = r#"{"ok":true,"result":{"id":123456789,"is_bot":true,"first_name":"TestBot","username":"testbot"}}"#;
const SENT: &str = r#"{"ok":true,"result":{"message_id":1,"date":1706529600,"chat":{"id":123,"type":"private"},"text":"sent"}}"#;

fn config(server: &ServerGuard) -> TelegramConfig {
    TelegramConfig {
        bot_token: TOKEN.to_string(),
        chat_id: CHAT_ID,
        notify_blocks: true,
        notify_reorgs: true,
        notify_daily_summary: true,
        message_interval: Duration::ZERO,
        api_url: Some(Url::parse(&server.url()).unwrap()),
        format: MessageFormat::default(),
    }
}

async fn wait_until_matched(mock: &Mock) {
    for _ in 0..250 {
        if mock.matched_async().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Telegram API was not called");
}

fn send_path() -> String {
    format!("/bot{TOKEN}/sendMessage")
}

fn reorg(height: u64) -> Event {
    Event::ChainReorganized {
        height,
        hash: "00".repeat(32),
    }
}

#[tokio::test]
async fn check_bot_returns_username() {
    let mut server = Server::new_async().await;
    let _get_me = server
        .mock("POST", format!("/bot{TOKEN}/getMe").as_str())
        .with_header("content-type", "application/json")
        .with_body(GET_ME)
        .create_async()
        .await;

    let username = check_bot(&config(&server)).await.unwrap();

    assert_eq!(username, "testbot");
}

#[tokio::test]
async fn check_bot_fails_on_rejected_token() {
    let mut server = Server::new_async().await;
    let _get_me = server
        .mock("POST", format!("/bot{TOKEN}/getMe").as_str())
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#)
        .create_async()
        .await;

    assert!(check_bot(&config(&server)).await.is_err());
}

#[tokio::test]
async fn notifier_posts_html_message_to_chat() {
    let mut server = Server::new_async().await;
    let send = server
        .mock("POST", format!("/bot{TOKEN}/sendMessage").as_str())
        .match_body(Matcher::PartialJson(json!({
            "chat_id": CHAT_ID,
            "parse_mode": "HTML"
        })))
        .with_header("content-type", "application/json")
        .with_body(SENT)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(config(&server));
    notifier.notify(Event::ChainReorganized {
        height: 880_000,
        hash: "00".repeat(32),
    });

    wait_until_matched(&send).await;
}

#[tokio::test]
async fn notifier_skips_events_turned_off() {
    let mut server = Server::new_async().await;
    let send = server
        .mock("POST", format!("/bot{TOKEN}/sendMessage").as_str())
        .with_header("content-type", "application/json")
        .with_body(SENT)
        .expect(1)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(TelegramConfig {
        notify_blocks: false,
        ..config(&server)
    });
    notifier.notify(Event::BlockFallback {
        height: 880_000,
        hash: "00".repeat(32),
    });
    notifier.notify(Event::ChainReorganized {
        height: 880_000,
        hash: "00".repeat(32),
    });

    // Events are handled in order, so the skipped one is done once the second lands.
    wait_until_matched(&send).await;
    send.assert_async().await;
}

#[tokio::test]
async fn rate_limited_message_is_sent_after_retry_after() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("POST", send_path().as_str())
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 1","parameters":{"retry_after":1}}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let sent = server
        .mock("POST", send_path().as_str())
        .with_header("content-type", "application/json")
        .with_body(SENT)
        .expect(1)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(config(&server));
    let started = std::time::Instant::now();
    notifier.notify(reorg(880_000));

    wait_until_matched(&sent).await;
    assert!(started.elapsed() >= Duration::from_secs(1));
    limited.assert_async().await;
    sent.assert_async().await;
}

#[tokio::test]
async fn failing_message_is_dropped_after_three_attempts() {
    let mut server = Server::new_async().await;
    let broken = server
        .mock("POST", send_path().as_str())
        .match_body(Matcher::Regex("880001".into()))
        .with_body("<html>bad gateway</html>")
        .expect(3)
        .create_async()
        .await;
    let next = server
        .mock("POST", send_path().as_str())
        .match_body(Matcher::Regex("880002".into()))
        .with_header("content-type", "application/json")
        .with_body(SENT)
        .expect(1)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(config(&server));
    notifier.notify(reorg(880_001));
    notifier.notify(reorg(880_002));

    // The worker only reaches the second event after giving up on the first.
    wait_until_matched(&next).await;
    broken.assert_async().await;
    next.assert_async().await;
}

#[tokio::test]
async fn long_message_is_sent_in_ordered_parts() {
    let mut day = DailySummary {
        blocks: 400,
        first_height: Some(880_000),
        last_height: Some(880_399),
        ..DailySummary::default()
    };
    day.miners = (0..400)
        .map(|i| (format!("solo-miner-{i:03}"), 1))
        .collect::<BTreeMap<_, _>>();
    let event = Event::DailySummary(day);
    let expected = split_message(
        &format_event_message(&event, &MessageFormat::default()),
        MAX_MESSAGE_LEN,
    );
    assert!(expected.len() > 1);

    let received = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut server = Server::new_async().await;
    let log = received.clone();
    let _send = server
        .mock("POST", send_path().as_str())
        .with_header("content-type", "application/json")
        .with_body_from_request(move |request| {
            let body: serde_json::Value = serde_json::from_slice(request.body().unwrap()).unwrap();
            log.lock()
                .unwrap()
                .push(body["text"].as_str().unwrap().to_string());
            SENT.as_bytes().to_vec()
        })
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(config(&server));
    notifier.notify(event);

    for _ in 0..100 {
        if received.lock().unwrap().len() >= expected.len() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(*received.lock().unwrap(), expected);
}

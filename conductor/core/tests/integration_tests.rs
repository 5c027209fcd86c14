//! Integration tests for the submission flow
//!
//! These drive a `Conductor` end to end against a scripted backend:
//! submission, reply decoding, transcript appends and the word-by-word
//! reveal, including overlapping exchanges and failures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::Notify;

use picksmart_conductor::{
    ChatBackend, ChatError, ChatReply, ChatRequest, Conductor, ConductorConfig, Highlight,
    Product, RevealState, Sender, TickOutcome, DEFAULT_FALLBACK_ERROR,
};

// =============================================================================
// Scripted backend
// =============================================================================

enum Scripted {
    Reply(ChatReply),
    Fail(Option<String>),
}

/// Answers each message from a script; messages with a gate wait until the
/// test opens it.
#[derive(Default)]
struct ScriptedBackend {
    script: Mutex<HashMap<String, Scripted>>,
    gates: HashMap<String, Arc<Notify>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self::default()
    }

    fn reply(self, message: &str, reply: ChatReply) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(message.to_string(), Scripted::Reply(reply));
        self
    }

    fn fail(self, message: &str, error: Option<&str>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(message.to_string(), Scripted::Fail(error.map(String::from)));
        self
    }

    fn gated(mut self, message: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gates.insert(message.to_string(), Arc::clone(&gate));
        (self, gate)
    }

    fn requests(&self) -> Arc<Mutex<Vec<ChatRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = self.gates.get(&request.message) {
            gate.notified().await;
        }

        let scripted = self.script.lock().unwrap().remove(&request.message);
        match scripted {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(message)) => Err(ChatError::Status {
                status: 500,
                message,
            }),
            None => Err(ChatError::Status {
                status: 404,
                message: None,
            }),
        }
    }
}

fn default_reply(text: &str) -> ChatReply {
    ChatReply {
        default: Some(text.to_string()),
        ..Default::default()
    }
}

fn product(title: &str) -> Product {
    Product {
        title: title.to_string(),
        image: format!("https://img.example/{title}.jpg"),
        description: format!("The {title}"),
        url: format!("https://shop.example/{title}"),
    }
}

/// Tick until idle, recording every published prefix and commit
fn drain_reveals(conductor: &mut Conductor<ScriptedBackend>) -> Vec<(usize, String)> {
    let mut published = Vec::new();
    loop {
        match conductor.tick() {
            TickOutcome::Idle => break,
            TickOutcome::Revealed { index, .. } => {
                let visible = conductor
                    .active_reveal()
                    .map(|a| a.visible_text().to_string())
                    .unwrap_or_default();
                published.push((index, visible));
            }
            TickOutcome::Committed { index } => {
                published.push((index, "<commit>".to_string()));
            }
        }
    }
    published
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_hello_reveals_word_by_word() {
    let backend = ScriptedBackend::new().reply("hello", default_reply("hi there"));
    let requests = backend.requests();
    let mut conductor = Conductor::new(backend, ConductorConfig::default());

    conductor.submit("hello").unwrap();
    let user = conductor.transcript().get(0).unwrap();
    assert_eq!(user.sender(), Sender::User);
    assert_eq!(user.text(), Some("hello"));
    assert!(conductor.is_busy());

    conductor.next_exchange().await.unwrap();
    assert!(!conductor.is_busy());
    assert_eq!(
        *requests.lock().unwrap(),
        vec![ChatRequest::new("user", "hello")]
    );

    assert_eq!(conductor.reveal_state(), RevealState::Revealing);
    assert_eq!(conductor.transcript().get(1).unwrap().text(), Some(""));

    assert_eq!(
        drain_reveals(&mut conductor),
        vec![
            (1, "hi".to_string()),
            (1, "hi there".to_string()),
            (1, "<commit>".to_string()),
        ]
    );

    let bot = conductor.transcript().get(1).unwrap();
    assert_eq!(bot.text(), Some("hi there"));
    assert!(bot.is_final());
    assert_eq!(conductor.reveal_state(), RevealState::Idle);
    assert!(conductor.session().reveals().queue().is_empty());
}

#[tokio::test]
async fn test_products_reply_reveals_around_cards() {
    let backend = ScriptedBackend::new().reply(
        "lamps",
        ChatReply {
            initial: Some(Highlight::new("Found--these")),
            products: Some(vec![product("X")]),
            final_: Some(Highlight::new("-Done")),
            ..Default::default()
        },
    );
    let mut conductor = Conductor::new(backend, ConductorConfig::default());

    conductor.submit("lamps");
    conductor.next_exchange().await.unwrap();

    let transcript = conductor.transcript();
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript.get(2).unwrap().items(), Some(&[product("X")][..]));
    assert!(transcript.get(2).unwrap().is_final());

    assert_eq!(
        drain_reveals(&mut conductor),
        vec![
            (1, "Foundthese".to_string()),
            (1, "<commit>".to_string()),
            (3, "Done".to_string()),
            (3, "<commit>".to_string()),
        ]
    );
    assert_eq!(conductor.transcript().get(1).unwrap().text(), Some("Foundthese"));
    assert_eq!(conductor.transcript().get(3).unwrap().text(), Some("Done"));
}

#[tokio::test]
async fn test_failure_appends_one_fallback_error() {
    let backend = ScriptedBackend::new().fail("hi", None);
    let mut conductor = Conductor::new(backend, ConductorConfig::default());

    conductor.submit("hi");
    let (_, settled) = conductor.next_exchange().await.unwrap();

    assert!(settled.failed);
    assert!(!conductor.is_busy());
    assert_eq!(conductor.transcript().len(), 2);
    let error = conductor.transcript().get(1).unwrap();
    assert_eq!(error.sender(), Sender::Error);
    assert_eq!(error.text(), Some(DEFAULT_FALLBACK_ERROR));
    assert_eq!(conductor.reveal_state(), RevealState::Idle);
}

#[tokio::test]
async fn test_failure_message_and_custom_fallback() {
    let backend = ScriptedBackend::new()
        .fail("first", Some("Kafka consumer timed out"))
        .fail("second", None);
    let config = ConductorConfig {
        fallback_error: "Try again later.".to_string(),
        ..Default::default()
    };
    let mut conductor = Conductor::new(backend, config);

    conductor.submit("first");
    conductor.next_exchange().await.unwrap();
    conductor.submit("second");
    conductor.next_exchange().await.unwrap();

    let texts: Vec<_> = conductor
        .transcript()
        .iter()
        .filter(|item| item.sender() == Sender::Error)
        .filter_map(|item| item.text())
        .collect();
    assert_eq!(texts, vec!["Kafka consumer timed out", "Try again later."]);
}

#[tokio::test]
async fn test_conversation_continues_after_failure() {
    let backend = ScriptedBackend::new()
        .fail("broken", None)
        .reply("again", default_reply("working now"));
    let mut conductor = Conductor::new(backend, ConductorConfig::default());

    conductor.submit("broken");
    conductor.next_exchange().await.unwrap();
    conductor.submit("again");
    conductor.next_exchange().await.unwrap();
    drain_reveals(&mut conductor);

    let senders: Vec<_> = conductor.transcript().iter().map(|i| i.sender()).collect();
    assert_eq!(
        senders,
        vec![Sender::User, Sender::Error, Sender::User, Sender::Bot]
    );
    assert_eq!(conductor.transcript().get(3).unwrap().text(), Some("working now"));
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_reveal_order_follows_arrival_order() {
    let (backend, slow_gate) = ScriptedBackend::new()
        .reply("slow", default_reply("from slow"))
        .reply("fast", default_reply("from fast"))
        .gated("slow");
    let mut conductor = Conductor::new(backend, ConductorConfig::default());

    let slow = conductor.submit("slow").unwrap();
    let fast = conductor.submit("fast").unwrap();

    // The fast exchange lands first and starts revealing
    let (first, _) = conductor.next_exchange().await.unwrap();
    assert_eq!(first, fast);
    assert!(conductor.is_busy());
    assert_eq!(conductor.tick(), TickOutcome::Revealed { index: 2, words: 1 });

    slow_gate.notify_one();
    let (second, settled) = conductor.next_exchange().await.unwrap();
    assert_eq!(second, slow);
    assert_eq!(settled.reveals, vec![3]);
    assert!(!conductor.is_busy());

    // The slow reply queues behind the reveal already running
    assert_eq!(conductor.active_reveal().unwrap().index(), 2);
    let published = drain_reveals(&mut conductor);
    assert_eq!(
        published,
        vec![
            (2, "from fast".to_string()),
            (2, "<commit>".to_string()),
            (3, "from".to_string()),
            (3, "from slow".to_string()),
            (3, "<commit>".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_submit_while_revealing_queues_behind() {
    let backend = ScriptedBackend::new()
        .reply("one", default_reply("alpha beta gamma"))
        .reply("two", default_reply("delta"));
    let mut conductor = Conductor::new(backend, ConductorConfig::default());

    conductor.submit("one");
    conductor.next_exchange().await.unwrap();
    conductor.tick();

    conductor.submit("two");
    conductor.next_exchange().await.unwrap();

    assert_eq!(conductor.active_reveal().unwrap().index(), 1);
    assert_eq!(conductor.active_reveal().unwrap().visible_text(), "alpha");
    assert_eq!(
        conductor.session().reveals().queue().indices().collect::<Vec<_>>(),
        vec![3]
    );

    drain_reveals(&mut conductor);
    assert_eq!(conductor.transcript().get(1).unwrap().text(), Some("alpha beta gamma"));
    assert_eq!(conductor.transcript().get(3).unwrap().text(), Some("delta"));
}

// =============================================================================
// Frame-driven progress
// =============================================================================

#[tokio::test]
async fn test_advance_and_poll_drive_everything() {
    let backend = ScriptedBackend::new().reply("hello", default_reply("hi there"));
    let config = ConductorConfig {
        cadence: Duration::from_millis(10),
        ..Default::default()
    };
    let mut conductor = Conductor::new(backend, config);

    conductor.submit("hello");
    while conductor.is_busy() {
        conductor.poll_exchanges();
        tokio::task::yield_now().await;
    }

    // 25ms covers two ticks and carries 5ms
    assert_eq!(conductor.advance(Duration::from_millis(25)), 2);
    assert_eq!(conductor.active_reveal().unwrap().visible_text(), "hi there");
    assert_eq!(conductor.advance(Duration::from_millis(5)), 1);
    assert_eq!(conductor.reveal_state(), RevealState::Idle);
    assert_eq!(conductor.transcript().get(1).unwrap().text(), Some("hi there"));
}

#[tokio::test]
async fn test_empty_reply_settles_without_items() {
    let backend = ScriptedBackend::new().reply("quiet", ChatReply::default());
    let mut conductor = Conductor::new(backend, ConductorConfig::default());

    conductor.submit("quiet");
    let (_, settled) = conductor.next_exchange().await.unwrap();

    assert_eq!(settled.appended, 0);
    assert_eq!(conductor.transcript().len(), 1);
    assert!(!conductor.is_busy());
    assert_eq!(conductor.tick(), TickOutcome::Idle);
}

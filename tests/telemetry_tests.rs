use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parley::kernel::debug::{DebugRegistry, DebugSnapshot, InMemoryDebugRegistry};
use parley::kernel::presence::{ConversationState, Mood};
use parley::kernel::scheduler::Scheduler;
use parley::kernel::telemetry::{
    FanoutSink, Notification, NotificationBus, NotificationKind, NotificationSink,
    TelemetryRecorder,
};
use parley::services::types::AnswerCandidate;

fn entered(to: ConversationState) -> Notification {
    Notification::StateChanged {
        from: ConversationState::Listening,
        to,
    }
}

#[test]
fn snapshot_counts_turns_and_answers() {
    let recorder = TelemetryRecorder::new();
    recorder.record(entered(ConversationState::Thinking));
    recorder.record(Notification::AnswersAvailable {
        answers: vec![
            AnswerCandidate {
                text: "Paris".into(),
                confidence: 0.8,
            },
            AnswerCandidate {
                text: "Lyon".into(),
                confidence: 0.1,
            },
        ],
    });
    recorder.record(entered(ConversationState::DidNotUnderstand));
    recorder.record(entered(ConversationState::Error));
    recorder.record(Notification::MoodChanged { mood: Mood::Idle });
    recorder.record(Notification::MoodChanged {
        mood: Mood::Sleeping,
    });

    let snap = recorder.snapshot();
    assert_eq!(snap.turn_stats.transitions, 3);
    assert_eq!(snap.turn_stats.errors, 1);
    assert_eq!(snap.turn_stats.misunderstandings, 1);
    assert_eq!(snap.turn_stats.entries[&ConversationState::Thinking], 1);
    assert_eq!(snap.mood_stats.changes, 2);
    assert_eq!(snap.mood_stats.last, Some(Mood::Sleeping));
    assert_eq!(snap.answer_stats.delivered, 1);
    assert_eq!(snap.answer_stats.avg_candidates, 2.0);
    assert!((snap.answer_stats.avg_top_confidence - 0.8).abs() < 1e-6);

    recorder.clear();
    assert!(recorder.events().is_empty());
}

#[test]
fn fanout_reaches_every_sink() {
    let first = Arc::new(TelemetryRecorder::new());
    let second = Arc::new(TelemetryRecorder::new());
    let fanout = FanoutSink::new().with(first.clone()).with(second.clone());

    fanout.publish(&Notification::DebugMessage("hello".into()));

    assert_eq!(first.events().len(), 1);
    assert_eq!(second.events()[0].kind(), NotificationKind::DebugMessage);
}

#[tokio::test]
async fn bus_delivers_to_subscribers() {
    let bus = NotificationBus::new(8);
    // Publishing without subscribers is not an error
    bus.publish(&Notification::DebugMessage("lost".into()));

    let mut rx = bus.subscribe();
    bus.publish(&Notification::MoodChanged { mood: Mood::Shy });

    assert_eq!(
        rx.recv().await.unwrap(),
        Notification::MoodChanged { mood: Mood::Shy }
    );
}

#[test]
fn notifications_serialize_with_kind_tag() {
    let json = serde_json::to_value(Notification::MoodChanged { mood: Mood::Upset }).unwrap();
    assert_eq!(json["kind"], "MoodChanged");
    assert_eq!(json["data"]["mood"], "Upset");
}

#[test]
fn debug_registry_ignores_unregistered_owners() {
    let registry = InMemoryDebugRegistry::new();
    let snapshot = DebugSnapshot {
        state: "Listening".into(),
        mood: "Idle".into(),
        ..Default::default()
    };

    registry.publish("avatar", snapshot.clone());
    assert!(registry.latest("avatar").is_none());

    registry.register("avatar");
    assert!(registry.latest("avatar").is_none());
    registry.publish("avatar", snapshot.clone());
    assert_eq!(registry.latest("avatar"), Some(snapshot));

    registry.deregister("avatar");
    assert!(!registry.is_registered("avatar"));
}

#[tokio::test(start_paused = true)]
async fn scheduled_callback_fires_after_delay() {
    let scheduler = Scheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();

    scheduler.schedule(Duration::from_secs(5), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_callbacks_never_fire() {
    let mut scheduler = Scheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));

    let counter = fired.clone();
    let task = scheduler.schedule(Duration::from_secs(1), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    task.cancel();
    assert!(task.is_cancelled());

    let counter = fired.clone();
    let pending = scheduler.schedule(Duration::from_secs(1), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    scheduler.cancel_all();
    assert!(pending.is_cancelled());

    // Scheduling after cancel_all still works
    let counter = fired.clone();
    scheduler.schedule(Duration::from_secs(1), move || {
        counter.fetch_add(10, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 10);
}

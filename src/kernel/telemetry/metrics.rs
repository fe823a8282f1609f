use std::collections::{HashMap, VecDeque};

use super::event::Notification;
use crate::kernel::presence::{ConversationState, Mood};

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub turn_stats: TurnStats,
    pub mood_stats: MoodStats,
    pub answer_stats: AnswerStats,
}

#[derive(Debug, Clone, Default)]
pub struct TurnStats {
    pub transitions: u64,
    /// Entries per target state.
    pub entries: HashMap<ConversationState, u64>,
    pub errors: u64,
    pub misunderstandings: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MoodStats {
    pub changes: u64,
    pub last: Option<Mood>,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerStats {
    pub delivered: u64,
    pub avg_candidates: f64,
    pub avg_top_confidence: f64,
}

pub fn compute_snapshot(events: &VecDeque<Notification>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    let mut candidate_total = 0usize;
    let mut confidence_total = 0f64;

    for event in events {
        match event {
            Notification::StateChanged { to, .. } => {
                snap.turn_stats.transitions += 1;
                *snap.turn_stats.entries.entry(*to).or_insert(0) += 1;
                match to {
                    ConversationState::Error => snap.turn_stats.errors += 1,
                    ConversationState::DidNotUnderstand => snap.turn_stats.misunderstandings += 1,
                    _ => {}
                }
            }
            Notification::MoodChanged { mood } => {
                snap.mood_stats.changes += 1;
                snap.mood_stats.last = Some(*mood);
            }
            Notification::AnswersAvailable { answers } => {
                snap.answer_stats.delivered += 1;
                candidate_total += answers.len();
                if let Some(top) = answers.first() {
                    confidence_total += f64::from(top.confidence);
                }
            }
            Notification::QuestionAvailable { .. }
            | Notification::ParseAvailable { .. }
            | Notification::DebugMessage(_) => {}
        }
    }

    if snap.answer_stats.delivered > 0 {
        let n = snap.answer_stats.delivered as f64;
        snap.answer_stats.avg_candidates = candidate_total as f64 / n;
        snap.answer_stats.avg_top_confidence = confidence_total / n;
    }

    snap
}

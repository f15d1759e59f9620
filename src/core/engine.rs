use crate::core::emotion::{event_for_tick, transition};
use crate::domain::model::{EmotionState, Event, TickRecord};
use crate::domain::ports::EventSource;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// 無閘道時的事件來源
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptedEvents;

#[async_trait]
impl EventSource for ScriptedEvents {
    async fn next_event(&mut self, tick: u64) -> Event {
        event_for_tick(tick)
    }
}

/// 報告只保留最近的紀錄
pub const MAX_KEPT_RECORDS: usize = 256;

#[derive(Debug, Clone)]
pub struct HeartbeatReport {
    pub final_state: EmotionState,
    pub ticks_run: u64,
    /// Most recent records, oldest first, at most `MAX_KEPT_RECORDS`.
    pub records: Vec<TickRecord>,
}

/// Drives the emotion state machine once per interval.
pub struct HeartbeatEngine<S: EventSource> {
    source: S,
    ticks: u64,
    period: Duration,
}

impl<S: EventSource> HeartbeatEngine<S> {
    pub fn new(source: S, ticks: u64, period: Duration) -> Self {
        Self {
            source,
            ticks,
            period,
        }
    }

    pub async fn run(&mut self) -> HeartbeatReport {
        tracing::info!(
            "💓 Starting heartbeat: ticks={} interval={:?}",
            self.ticks,
            self.period
        );

        let mut state = EmotionState::Idle;
        let mut records = VecDeque::new();
        let mut ticks_run = 0;
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        for tick in 1..=self.ticks {
            ticker.tick().await;

            let event = self.source.next_event(tick).await;
            let next = transition(state, event);

            tracing::info!(
                "tick {:>3}: event={:?}, state={:?} -> {:?} ({})",
                tick,
                event,
                state,
                next,
                next.expression()
            );

            if records.len() == MAX_KEPT_RECORDS {
                records.pop_front();
            }
            records.push_back(TickRecord {
                tick,
                event,
                from: state,
                to: next,
                at: chrono::Utc::now(),
            });
            state = next;
            ticks_run = tick;
        }

        tracing::info!("✅ Heartbeat done. Final state: {:?}", state);

        HeartbeatReport {
            final_state: state,
            ticks_run,
            records: records.into(),
        }
    }
}

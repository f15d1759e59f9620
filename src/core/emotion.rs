use crate::domain::model::{EmotionState, Event};

pub fn transition(current: EmotionState, event: Event) -> EmotionState {
    match (current, event) {
        (_, Event::WorkSucceeded) => EmotionState::Success,
        (_, Event::WorkFailed) => EmotionState::Error,
        // 錯誤狀態會一直保留，直到 Reset
        (EmotionState::Error, Event::Tick) => EmotionState::Error,
        (_, Event::Tick | Event::Reset) => EmotionState::Idle,
    }
}

/// 沒有閘道時使用的模擬事件序列
pub fn event_for_tick(tick: u64) -> Event {
    if tick % 12 == 0 {
        Event::Reset
    } else if tick % 7 == 0 {
        Event::WorkFailed
    } else if tick % 4 == 0 {
        Event::WorkSucceeded
    } else {
        Event::Tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_event_sets_success_state() {
        assert_eq!(
            transition(EmotionState::Idle, Event::WorkSucceeded),
            EmotionState::Success
        );
        assert_eq!(
            transition(EmotionState::Error, Event::WorkSucceeded),
            EmotionState::Success
        );
    }

    #[test]
    fn test_failure_event_sets_error_state() {
        assert_eq!(
            transition(EmotionState::Success, Event::WorkFailed),
            EmotionState::Error
        );
    }

    #[test]
    fn test_error_state_sticks_on_tick_until_reset() {
        assert_eq!(transition(EmotionState::Error, Event::Tick), EmotionState::Error);
        assert_eq!(transition(EmotionState::Error, Event::Reset), EmotionState::Idle);
    }

    #[test]
    fn test_success_decays_to_idle_on_tick() {
        assert_eq!(transition(EmotionState::Success, Event::Tick), EmotionState::Idle);
    }

    #[test]
    fn test_scripted_events() {
        assert_eq!(event_for_tick(1), Event::Tick);
        assert_eq!(event_for_tick(4), Event::WorkSucceeded);
        assert_eq!(event_for_tick(7), Event::WorkFailed);
        assert_eq!(event_for_tick(12), Event::Reset);
        // 12 的倍數優先於 4 的倍數
        assert_eq!(event_for_tick(24), Event::Reset);
        assert_eq!(event_for_tick(28), Event::WorkFailed);
    }
}

// Consecutive-run tracking and posture score accumulation

use crate::models::pose::PostureState;
use crate::models::session::RunState;

pub const GOOD_FRAME_REWARD: i64 = 1;
pub const BAD_FRAME_PENALTY: i64 = -2;

/// Counts consecutive frames sharing the same classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTracker {
    state: RunState,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one classified frame into the run and return the new run state
    pub fn record(&mut self, posture: PostureState) -> RunState {
        self.state = Self::next(self.state, posture);
        self.state
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Pure transition: extend the run or start a new one of length 1
    pub fn next(run: RunState, posture: PostureState) -> RunState {
        if run.current_state == Some(posture) {
            RunState {
                current_state: run.current_state,
                consecutive_count: run.consecutive_count + 1,
            }
        } else {
            RunState {
                current_state: Some(posture),
                consecutive_count: 1,
            }
        }
    }
}

/// Unbounded session score: +1 per good frame, -2 per bad frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreAccumulator {
    score: i64,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, posture: PostureState) -> i64 {
        self.score = Self::next(self.score, posture);
        self.score
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn next(score: i64, posture: PostureState) -> i64 {
        match posture {
            PostureState::Good => score + GOOD_FRAME_REWARD,
            PostureState::Bad => score + BAD_FRAME_PENALTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PostureState::{Bad, Good};

    #[test]
    fn test_run_lengths() {
        let mut tracker = RunTracker::new();
        let counts: Vec<u64> = [Good, Good, Bad, Bad, Bad, Good]
            .into_iter()
            .map(|p| tracker.record(p).consecutive_count)
            .collect();

        assert_eq!(counts, vec![1, 2, 1, 2, 3, 1]);
        assert_eq!(tracker.state().current_state, Some(Good));
    }

    #[test]
    fn test_first_frame_starts_a_run() {
        let run = RunTracker::next(RunState::default(), Bad);
        assert_eq!(run.current_state, Some(Bad));
        assert_eq!(run.consecutive_count, 1);
    }

    #[test]
    fn test_score_sequence() {
        let mut score = ScoreAccumulator::new();
        let scores: Vec<i64> = [Good, Bad, Good].into_iter().map(|p| score.record(p)).collect();
        assert_eq!(scores, vec![1, -1, 0]);
    }

    #[test]
    fn test_score_goes_negative_without_floor() {
        let mut score = ScoreAccumulator::new();
        for _ in 0..10 {
            score.record(Bad);
        }
        assert_eq!(score.score(), -20);
    }
}

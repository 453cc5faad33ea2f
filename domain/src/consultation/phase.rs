//! The phase scheduler's state machine (spec §4.7).
//!
//! ```text
//! Idle → Estimating → (CostRejected | AwaitingRound1)
//! AwaitingRound1 → Round1 → (AllAgentsFailed | Round2 | Complete)
//! Round2 → Round3 → Round4 → Complete
//! Any non-terminal → Aborted (on ConsultationAborted or cancel)
//! Round1/Round2/Round3 → TimedOut (on deadline exceeded, if configured)
//! ```
//!
//! `Round1 → Complete` is Quick mode's one-round shortcut; every other path
//! to `Complete` runs the full Round2→Round3→Round4 chain.

/// One state of the phase scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Estimating,
    AwaitingRound1,
    Round1,
    Round2,
    Round3,
    Round4,
    Complete,
    AllAgentsFailed,
    CostRejected,
    Aborted,
    TimedOut,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Complete
                | Phase::AllAgentsFailed
                | Phase::CostRejected
                | Phase::Aborted
                | Phase::TimedOut
        )
    }

    /// Whether a deadline-exceeded transition to `TimedOut` is legal from
    /// this phase. Only the three dispatch phases carry a deadline race.
    pub fn can_time_out(self) -> bool {
        matches!(self, Phase::Round1 | Phase::Round2 | Phase::Round3)
    }

    /// Validate one state transition against the fixed graph above. Used by
    /// the scheduler to fail loudly on a programmer error rather than
    /// silently skip a phase.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        if self.is_terminal() {
            return false;
        }
        if next == Aborted {
            return true;
        }
        if next == TimedOut {
            return self.can_time_out();
        }
        matches!(
            (self, next),
            (Idle, Estimating)
                | (Estimating, CostRejected)
                | (Estimating, AwaitingRound1)
                | (AwaitingRound1, Round1)
                | (Round1, AllAgentsFailed)
                | (Round1, Round2)
                | (Round1, Complete)
                | (Round2, Round3)
                | (Round3, Round4)
                | (Round4, Complete)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_happy_path_is_valid() {
        let path = [
            Phase::Idle,
            Phase::Estimating,
            Phase::AwaitingRound1,
            Phase::Round1,
            Phase::Round2,
            Phase::Round3,
            Phase::Round4,
            Phase::Complete,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn complete_cannot_be_skipped_to() {
        assert!(!Phase::Round2.can_transition_to(Phase::Complete));
    }

    #[test]
    fn quick_mode_completes_straight_from_round1() {
        assert!(Phase::Round1.can_transition_to(Phase::Complete));
    }

    #[test]
    fn any_non_terminal_can_abort() {
        assert!(Phase::Round1.can_transition_to(Phase::Aborted));
        assert!(Phase::Estimating.can_transition_to(Phase::Aborted));
    }

    #[test]
    fn only_dispatch_phases_can_time_out() {
        assert!(Phase::Round1.can_transition_to(Phase::TimedOut));
        assert!(!Phase::Estimating.can_transition_to(Phase::TimedOut));
    }

    #[test]
    fn terminal_phases_accept_no_further_transitions() {
        assert!(!Phase::Complete.can_transition_to(Phase::Aborted));
        assert!(!Phase::CostRejected.can_transition_to(Phase::Estimating));
    }
}

//! Cutting boards - timed single-slot Raw -> Prepped transformation
//!
//! One state machine per board with a single deadline. The countdown shown
//! to players is derived from the deadline, so there is no second timer to
//! keep in sync or to forget to cancel.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::core::types::{ItemId, SimTime};
use crate::kitchen::zones::ZoneId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CuttingState {
    Idle,
    Cutting {
        agent: AgentId,
        item: ItemId,
        started: SimTime,
        deadline: SimTime,
    },
}

/// A cut that reached its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedCut {
    pub board: ZoneId,
    pub agent: AgentId,
    pub item: ItemId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuttingBoard {
    pub zone: ZoneId,
    state: CuttingState,
}

impl CuttingBoard {
    pub fn new(zone: ZoneId) -> Self {
        Self { zone, state: CuttingState::Idle }
    }

    pub fn state(&self) -> CuttingState {
        self.state
    }

    pub fn is_cutting(&self) -> bool {
        matches!(self.state, CuttingState::Cutting { .. })
    }

    pub fn cutter(&self) -> Option<AgentId> {
        match self.state {
            CuttingState::Cutting { agent, .. } => Some(agent),
            CuttingState::Idle => None,
        }
    }

    pub fn item(&self) -> Option<ItemId> {
        match self.state {
            CuttingState::Cutting { item, .. } => Some(item),
            CuttingState::Idle => None,
        }
    }

    /// Begin cutting `item` for `agent`. No-op (false) if already cutting.
    pub fn start(&mut self, agent: AgentId, item: ItemId, now: SimTime, duration: SimTime) -> bool {
        if self.is_cutting() {
            return false;
        }
        self.state = CuttingState::Cutting {
            agent,
            item,
            started: now,
            deadline: now + duration,
        };
        true
    }

    /// Time left on the current cut
    pub fn remaining(&self, now: SimTime) -> Option<SimTime> {
        match self.state {
            CuttingState::Cutting { deadline, .. } => Some(deadline.saturating_sub(now)),
            CuttingState::Idle => None,
        }
    }

    /// Countdown text in tenths of a second, e.g. "3.2"
    pub fn readout(&self, now: SimTime) -> Option<String> {
        self.remaining(now)
            .map(|left| format!("{:.1}", (left.as_millis() / 100) as f32 / 10.0))
    }

    /// Fraction of the cut done, 0.0 to 1.0
    pub fn progress(&self, now: SimTime) -> Option<f32> {
        match self.state {
            CuttingState::Cutting { started, deadline, .. } => {
                let total = deadline.saturating_sub(started).as_millis().max(1) as f32;
                let done = now.saturating_sub(started).as_millis() as f32;
                Some((done / total).min(1.0))
            }
            CuttingState::Idle => None,
        }
    }

    /// Finish the cut if its deadline has passed, returning to Idle
    pub fn poll(&mut self, now: SimTime) -> Option<FinishedCut> {
        match self.state {
            CuttingState::Cutting { agent, item, deadline, .. } if now >= deadline => {
                self.state = CuttingState::Idle;
                Some(FinishedCut { board: self.zone, agent, item })
            }
            _ => None,
        }
    }

    /// Abort the cut `agent` is performing.
    ///
    /// Returns the item being cut. A cut whose deadline has already passed
    /// cannot be cancelled; it completes on the next poll instead.
    pub fn cancel(&mut self, agent: AgentId, now: SimTime) -> Option<ItemId> {
        match self.state {
            CuttingState::Cutting { agent: cutter, item, deadline, .. }
                if cutter == agent && now < deadline =>
            {
                self.state = CuttingState::Idle;
                Some(item)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = CuttingState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUT: SimTime = SimTime(5000);

    #[test]
    fn test_cut_completes_at_deadline() {
        let mut board = CuttingBoard::new(ZoneId::CuttingBoard);
        let item = ItemId::new();
        assert!(board.start(AgentId::SousChef, item, SimTime(1000), CUT));

        assert_eq!(board.poll(SimTime(5900)), None);
        assert_eq!(board.remaining(SimTime(5900)), Some(SimTime(100)));

        let finished = board.poll(SimTime(6000)).unwrap();
        assert_eq!(finished.item, item);
        assert_eq!(finished.agent, AgentId::SousChef);
        assert!(!board.is_cutting());
    }

    #[test]
    fn test_start_while_cutting_is_noop() {
        let mut board = CuttingBoard::new(ZoneId::CuttingBoard);
        let first = ItemId::new();
        board.start(AgentId::SousChef, first, SimTime::ZERO, CUT);
        assert!(!board.start(AgentId::Chef, ItemId::new(), SimTime(100), CUT));
        assert_eq!(board.item(), Some(first));
        assert_eq!(board.cutter(), Some(AgentId::SousChef));
    }

    #[test]
    fn test_cancel_only_by_cutter_before_deadline() {
        let mut board = CuttingBoard::new(ZoneId::CuttingBoard);
        let item = ItemId::new();
        board.start(AgentId::SousChef, item, SimTime::ZERO, CUT);

        assert_eq!(board.cancel(AgentId::Chef, SimTime(2000)), None);
        assert_eq!(board.cancel(AgentId::SousChef, SimTime(2000)), Some(item));
        assert!(!board.is_cutting());
        assert_eq!(board.poll(SimTime(9000)), None);
    }

    #[test]
    fn test_cancel_after_deadline_does_not_abort() {
        let mut board = CuttingBoard::new(ZoneId::CuttingBoard);
        board.start(AgentId::SousChef, ItemId::new(), SimTime::ZERO, CUT);
        assert_eq!(board.cancel(AgentId::SousChef, SimTime(5000)), None);
        assert!(board.poll(SimTime(5000)).is_some());
    }

    #[test]
    fn test_readout_and_progress() {
        let mut board = CuttingBoard::new(ZoneId::LeftCuttingBoard);
        assert_eq!(board.readout(SimTime::ZERO), None);
        board.start(AgentId::Chef, ItemId::new(), SimTime::ZERO, CUT);
        assert_eq!(board.readout(SimTime(1850)).as_deref(), Some("3.1"));
        assert!((board.progress(SimTime(2500)).unwrap() - 0.5).abs() < 1e-6);
    }
}

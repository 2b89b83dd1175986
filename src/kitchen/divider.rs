//! Divider - fixed-capacity staging area between the two halves
//!
//! Items placed here expire after a timeout. Slot bookkeeping only; the
//! session pairs every occupy/release with the item move that causes it.

use serde::{Deserialize, Serialize};

use crate::core::types::{Rect, Vec2};

pub const DIVIDER_SLOT_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DividerSlot {
    pub occupied: bool,
    pub position: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividerSlots {
    slots: [DividerSlot; DIVIDER_SLOT_COUNT],
}

impl DividerSlots {
    pub fn new(divider: Rect) -> Self {
        let mut slots = Self {
            slots: [DividerSlot::default(); DIVIDER_SLOT_COUNT],
        };
        slots.reposition(divider);
        slots
    }

    /// Spread slots evenly down the divider's centre line
    pub fn reposition(&mut self, divider: Rect) {
        let x = divider.center().x;
        let step = divider.height / (DIVIDER_SLOT_COUNT as f32 + 1.0);
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.position = Vec2::new(x, divider.y + step * (i as f32 + 1.0));
        }
    }

    /// Lowest-index free slot
    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|slot| !slot.occupied)
    }

    /// Mark a slot occupied. Returns false if it was taken or out of range.
    pub fn occupy(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if !slot.occupied => {
                slot.occupied = true;
                true
            }
            _ => false,
        }
    }

    /// Free a slot. Returns false (and changes nothing) if it was not
    /// occupied, so a slot can never be released twice.
    pub fn release(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.occupied => {
                slot.occupied = false;
                true
            }
            _ => {
                tracing::warn!("divider slot {} released while free", index);
                false
            }
        }
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        self.slots.get(index).map(|slot| slot.occupied).unwrap_or(false)
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.slots.get(index).map(|slot| slot.position)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.occupied).count()
    }

    pub fn slots(&self) -> &[DividerSlot] {
        &self.slots
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.occupied = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn divider() -> DividerSlots {
        DividerSlots::new(Rect::new(620.0, 0.0, 40.0, 500.0))
    }

    #[test]
    fn test_slot_positions_follow_divider() {
        let slots = divider();
        assert_eq!(slots.position(0), Some(Vec2::new(640.0, 100.0)));
        assert_eq!(slots.position(3), Some(Vec2::new(640.0, 400.0)));
        assert_eq!(slots.position(4), None);
    }

    #[test]
    fn test_fill_all_slots() {
        let mut slots = divider();
        for expected in 0..DIVIDER_SLOT_COUNT {
            let free = slots.free_slot().unwrap();
            assert_eq!(free, expected);
            assert!(slots.occupy(free));
        }
        assert_eq!(slots.free_slot(), None);
        assert_eq!(slots.occupied_count(), 4);
    }

    #[test]
    fn test_release_reopens_lowest_slot() {
        let mut slots = divider();
        for i in 0..3 {
            slots.occupy(i);
        }
        assert!(slots.release(1));
        assert_eq!(slots.free_slot(), Some(1));
    }

    #[test]
    fn test_no_double_occupy_or_release() {
        let mut slots = divider();
        assert!(slots.occupy(2));
        assert!(!slots.occupy(2));
        assert!(slots.release(2));
        assert!(!slots.release(2));
        assert_eq!(slots.occupied_count(), 0);
        assert!(!slots.occupy(9));
    }

    #[test]
    fn test_reposition_keeps_occupancy() {
        let mut slots = divider();
        slots.occupy(0);
        slots.reposition(Rect::new(900.0, 0.0, 60.0, 1000.0));
        assert!(slots.is_occupied(0));
        assert_eq!(slots.position(0), Some(Vec2::new(930.0, 200.0)));
    }
}

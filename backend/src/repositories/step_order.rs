//! Step renumbering plans
//!
//! Steps of a recipe are numbered `1..=N` without gaps. The store has no
//! "insert at position" primitive, so moving or deleting a step is expressed
//! as at most one bulk range shift over the other steps of the same recipe
//! followed by a write of the target row.
//!
//! Moving a step from `current` to `desired` behaves like removing an element
//! from a vector and reinserting it:
//!
//! - earlier (`desired < current`): steps in `desired..=current-1` move up one
//! - later (`desired > current`): steps in `current+1..=desired` move down one
//! - same position: nothing moves

use std::ops::RangeInclusive;

/// Bulk update adding `delta` to every step numbered within `from..=to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeShift {
    pub from: i32,
    pub to: i32,
    pub delta: i32,
}

impl RangeShift {
    pub fn range(&self) -> RangeInclusive<i32> {
        self.from..=self.to
    }

    pub fn contains(&self, step_num: i32) -> bool {
        self.range().contains(&step_num)
    }

    /// New number of a step currently numbered `step_num`
    pub fn apply(&self, step_num: i32) -> i32 {
        if self.contains(step_num) {
            step_num + self.delta
        } else {
            step_num
        }
    }
}

/// Planned repositioning of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMove {
    /// Shift applied to the other steps of the recipe, if any
    pub shift: Option<RangeShift>,
    /// Final number of the moved step
    pub target: i32,
}

/// Rejected move request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    pub requested: i32,
    pub max: i32,
}

/// Plan moving the step at `current` to `desired` in a recipe whose highest
/// step number is `max`
///
/// `desired` must already be an occupied position: appending past `max`
/// is not a move.
pub fn plan_move(current: i32, desired: i32, max: i32) -> Result<StepMove, OutOfRange> {
    if desired > max || desired < 1 {
        return Err(OutOfRange {
            requested: desired,
            max,
        });
    }

    let shift = if desired < current {
        Some(RangeShift {
            from: desired,
            to: current - 1,
            delta: 1,
        })
    } else if desired > current {
        Some(RangeShift {
            from: current + 1,
            to: desired,
            delta: -1,
        })
    } else {
        None
    };

    Ok(StepMove {
        shift,
        target: desired,
    })
}

/// Plan closing the gap left by deleting the step at `removed`
pub fn plan_delete(removed: i32, max: i32) -> Option<RangeShift> {
    (removed < max).then_some(RangeShift {
        from: removed + 1,
        to: max,
        delta: -1,
    })
}

use super::item::EquipProfile;

/// Per-round action budget for one creature. Every state-changing item
/// action passes through `perform_action` before any mutation happens; a
/// refusal means the whole operation must be abandoned untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTimer {
    max_ap: i32,
    ap: i32,
}

impl ActionTimer {
    pub fn new(max_ap: i32) -> Self {
        let max_ap = max_ap.max(0);
        Self { max_ap, ap: max_ap }
    }

    /// Rebuilds a timer mid-round (save restore). The remaining budget is
    /// clamped into 0..=max.
    pub fn restore(max_ap: i32, remaining: i32) -> Self {
        let max_ap = max_ap.max(0);
        Self {
            max_ap,
            ap: remaining.clamp(0, max_ap),
        }
    }

    pub fn remaining(&self) -> i32 {
        self.ap
    }

    pub fn max_ap(&self) -> i32 {
        self.max_ap
    }

    /// Charges `cost` action points. Deducts and returns true when the
    /// budget suffices; otherwise deducts nothing and returns false.
    /// A non-positive cost always passes and charges zero.
    pub fn perform_action(&mut self, cost: i32) -> bool {
        let cost = cost.max(0);
        if cost > self.ap {
            return false;
        }
        self.ap -= cost;
        true
    }

    /// Charges the equip-time cost of the given item profile.
    pub fn perform_equip_action(&mut self, profile: EquipProfile) -> bool {
        self.perform_action(profile.equip_cost)
    }

    pub fn start_round(&mut self) {
        self.ap = self.max_ap;
    }
}

use serde::{Deserialize, Serialize};

use crate::form::SectionKey;

/// Wizard steps, numbered from 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    PersonalInfo = 1,
    TravelDetails = 2,
    Review = 3,
}

impl Step {
    pub const FIRST: Step = Step::PersonalInfo;
    pub const LAST: Step = Step::Review;

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Step> {
        match n {
            1 => Some(Step::PersonalInfo),
            2 => Some(Step::TravelDetails),
            3 => Some(Step::Review),
            _ => None,
        }
    }

    /// Form section edited on this step; the review step edits nothing.
    pub fn section(self) -> Option<SectionKey> {
        match self {
            Step::PersonalInfo => Some(SectionKey::PersonalInfo),
            Step::TravelDetails => Some(SectionKey::TravelDetails),
            Step::Review => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::PersonalInfo => "Personal Information",
            Step::TravelDetails => "Travel Details",
            Step::Review => "Review & Confirm",
        }
    }
}

/// Step cursor. Moves one step at a time and never leaves 1..=3.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    current: Step,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self { current: Step::FIRST }
    }

    pub fn current(&self) -> Step {
        self.current
    }

    pub fn next_step(&mut self) -> Step {
        if let Some(next) = Step::from_number(self.current.number() + 1) {
            self.current = next;
        }
        self.current
    }

    pub fn back(&mut self) -> Step {
        if self.current > Step::FIRST {
            if let Some(prev) = Step::from_number(self.current.number() - 1) {
                self.current = prev;
            }
        }
        self.current
    }

    pub fn is_last(&self) -> bool {
        self.current == Step::LAST
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_back() {
        let mut steps = StepSequencer::new();
        assert_eq!(steps.current(), Step::PersonalInfo);
        assert_eq!(steps.next_step(), Step::TravelDetails);
        assert_eq!(steps.next_step(), Step::Review);
        assert!(steps.is_last());
        assert_eq!(steps.back(), Step::TravelDetails);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut steps = StepSequencer::new();
        // Deterministic pseudo-random walk over next/back
        let mut seed: u32 = 0x9e37_79b9;
        for _ in 0..1_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            if seed % 2 == 0 {
                steps.next_step();
            } else {
                steps.back();
            }
            let n = steps.current().number();
            assert!((1..=3).contains(&n));
        }

        for _ in 0..10 {
            steps.next_step();
        }
        assert_eq!(steps.current(), Step::Review);
        for _ in 0..10 {
            steps.back();
        }
        assert_eq!(steps.current(), Step::PersonalInfo);
    }

    #[test]
    fn test_sections_per_step() {
        assert_eq!(Step::PersonalInfo.section(), Some(SectionKey::PersonalInfo));
        assert_eq!(Step::TravelDetails.section(), Some(SectionKey::TravelDetails));
        assert_eq!(Step::Review.section(), None);
    }
}

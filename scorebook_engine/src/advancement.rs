//! Scorebook: Runner Advancement
//!
//! Given the base occupancy before a play and the play's catalog entry,
//! compute the runner movements and RBI credits that accompany the plate
//! appearance. The batter's own placement is left to the projector; the
//! only batter entry produced here is the RBI for their own home run.
//!
//! Runners are always walked from third toward first, so a scoring runner
//! is credited before the runners behind them. Every decision reads the
//! pre-play `Bases` passed in; nothing is re-read mid-resolution, which
//! keeps a runner from being advanced twice.

use crate::catalog::ResultOption;
use crate::domain::{Base, Bases, Destination};
use crate::events::{MovementReason, Rbi, ResultCategory, RunnerMovement};

/// Movements and RBI entries to attach to a plate appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advancement {
    pub movements: Vec<RunnerMovement>,
    pub rbis: Vec<Rbi>,
}

impl Advancement {
    /// Runs by runners who were already on base.
    pub fn runs(&self) -> usize {
        self.movements
            .iter()
            .filter(|m| m.to_base == Destination::Score)
            .count()
    }

    fn push(&mut self, runner: &str, from: Base, to: Destination, reason: MovementReason) {
        self.movements.push(RunnerMovement {
            runner_id: runner.to_string(),
            from_base: from,
            to_base: to,
            reason,
        });
        if to == Destination::Score {
            self.rbis.push(Rbi {
                runner_id: runner.to_string(),
                earned: true,
            });
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Movements fully determined by the result.
    Resolved(Advancement),
    /// The outcome depends on the defense; the scorer must enter runner
    /// movements by hand.
    NeedsOperator,
}

/// Resolve forced and batted-ball advancement for a play.
pub fn resolve(bases: &Bases, batter_id: &str, result: &ResultOption) -> Resolution {
    if result.is_home_run() {
        return Resolution::Resolved(home_run(bases, batter_id));
    }
    if bases.is_empty() {
        return Resolution::Resolved(Advancement::default());
    }

    match result.category {
        ResultCategory::Walk | ResultCategory::HitByPitch | ResultCategory::Interference => {
            Resolution::Resolved(force_chain(bases))
        }
        ResultCategory::Hit => match result.hit_bases {
            Some(n @ 1..=3) => Resolution::Resolved(hit_advance(bases, n)),
            // A hit without a base count cannot be resolved from the code.
            _ => Resolution::NeedsOperator,
        },
        ResultCategory::Out
        | ResultCategory::Error
        | ResultCategory::FieldersChoice
        | ResultCategory::SacrificeBunt
        | ResultCategory::SacrificeFly => Resolution::NeedsOperator,
    }
}

/// Minimal force chain that frees first base for the batter.
fn force_chain(bases: &Bases) -> Advancement {
    let mut adv = Advancement::default();
    let Some(first) = bases.first.as_deref() else {
        return adv;
    };

    if let Some(second) = bases.second.as_deref() {
        if let Some(third) = bases.third.as_deref() {
            adv.push(third, Base::Third, Destination::Score, MovementReason::Force);
        }
        adv.push(second, Base::Second, Destination::Third, MovementReason::Force);
    }
    adv.push(first, Base::First, Destination::Second, MovementReason::Force);
    adv
}

/// Everyone on base scores, then the batter's own run is credited.
fn home_run(bases: &Bases, batter_id: &str) -> Advancement {
    let mut adv = Advancement::default();
    for (base, runner) in bases.occupied_lead_first() {
        adv.push(runner, base, Destination::Score, MovementReason::BattedBall);
    }
    adv.rbis.push(Rbi {
        runner_id: batter_id.to_string(),
        earned: true,
    });
    adv
}

/// Single, double or triple: `n` is 1–3.
fn hit_advance(bases: &Bases, n: u8) -> Advancement {
    let mut adv = Advancement::default();

    if let Some(third) = bases.third.as_deref() {
        adv.push(third, Base::Third, Destination::Score, MovementReason::BattedBall);
    }
    if let Some(second) = bases.second.as_deref() {
        let to = if n >= 2 {
            Destination::Score
        } else {
            Destination::Third
        };
        adv.push(second, Base::Second, to, MovementReason::BattedBall);
    }
    if let Some(first) = bases.first.as_deref() {
        let to = match n {
            3..=u8::MAX => Destination::Score,
            2 => Destination::Third,
            _ => Destination::Second,
        };
        adv.push(first, Base::First, to, MovementReason::BattedBall);
    }
    adv
}

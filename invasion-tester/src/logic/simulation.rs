use anyhow::{Context, Result};
use std::sync::Arc;

use invasion_game::{
    DungeonSnapshot, Encounter, InvaderCatalog, InvasionAftermath, InvasionConfig,
    InvasionEngine, InvasionHistory, InvasionOutcome, InvasionRng, PrisonerAction, Settlement,
    handle_prisoner, run_encounter,
};

/// Assertion hook run after a campaign completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// A dungeon, a treasury and a number of invasions to sit through.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub dungeon: DungeonSnapshot,
    pub config: InvasionConfig,
    pub invasions: usize,
    pub starting_gold: i32,
    pub ransom_prisoners: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(dungeon: DungeonSnapshot) -> Self {
        Self {
            dungeon,
            config: InvasionConfig::default(),
            invasions: 1,
            starting_gold: 100,
            ransom_prisoners: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_invasions(mut self, invasions: usize) -> Self {
        self.invasions = invasions;
        self
    }

    #[must_use]
    pub const fn with_config(mut self, config: InvasionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn with_starting_gold(mut self, gold: i32) -> Self {
        self.starting_gold = gold;
        self
    }

    #[must_use]
    pub const fn ransoming_prisoners(mut self) -> Self {
        self.ransom_prisoners = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// One invasion as it played out.
#[derive(Debug, Clone)]
pub struct InvasionRun {
    pub day: u32,
    pub encounter: Encounter,
    pub aftermath: InvasionAftermath,
    pub gold_after: i32,
}

/// Complete record of a simulated campaign.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub runs: Vec<InvasionRun>,
    pub history: InvasionHistory,
    pub final_gold: i32,
    pub prisoners_ransomed: usize,
}

impl SimulationSummary {
    #[must_use]
    pub fn victories(&self) -> usize {
        self.runs
            .iter()
            .filter(|run| run.aftermath.result.outcome == InvasionOutcome::Victory)
            .count()
    }

    #[must_use]
    pub fn defeats(&self) -> usize {
        self.runs.len() - self.victories()
    }

    #[must_use]
    pub fn total_turns(&self) -> u32 {
        self.runs
            .iter()
            .map(|run| run.aftermath.result.turns_taken)
            .sum()
    }

    /// Short human-readable trail of the last few invasions.
    #[must_use]
    pub fn describe_tail(&self) -> String {
        if self.runs.is_empty() {
            return "no invasions recorded".to_string();
        }
        self.runs
            .iter()
            .rev()
            .take(3)
            .map(|run| {
                format!(
                    "day {} {} on turn {} ({} of {} invaders slain)",
                    run.day,
                    run.aftermath.result.end_reason,
                    run.aftermath.result.turns_taken,
                    run.aftermath.result.invaders_killed,
                    run.aftermath.result.invader_count
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Play every invasion of `plan` from `seed`.
///
/// # Errors
///
/// Returns an error when the plan's configuration is rejected by the engine.
pub fn run_plan(plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
    let mut engine = InvasionEngine::new(InvaderCatalog::load_from_static(), plan.config)
        .context("invalid invasion config")?;
    let rngs = InvasionRng::from_user_seed(seed);
    let mut history = InvasionHistory::new();
    let mut runs = Vec::with_capacity(plan.invasions);
    let mut gold = plan.starting_gold;
    let mut prisoners_ransomed = 0;
    let mut day = 0;

    for _ in 0..plan.invasions {
        day = engine.next_invasion_day(day, &rngs);
        let planned = engine.plan_invasion(day, &plan.dungeon, &rngs);
        let encounter = run_encounter(&planned, &mut *rngs.combat());
        let aftermath = engine.conclude_invasion(&encounter, day, gold, &rngs);

        match &aftermath.settlement {
            Settlement::Rewards(rewards) => {
                gold = gold.saturating_add(rewards.gold_gain);
                if plan.ransom_prisoners {
                    for prisoner in &rewards.captured_prisoners {
                        let outcome =
                            handle_prisoner(PrisonerAction::Ransom, prisoner, &mut *rngs.prisoner());
                        gold = gold.saturating_add(outcome.gold_gain);
                        prisoners_ransomed += 1;
                    }
                }
            }
            Settlement::Penalties(penalties) => {
                gold = gold.saturating_sub(penalties.gold_lost);
            }
        }
        log::debug!(
            "seed {seed}: day {day} {} after {} turns, treasury {gold}",
            aftermath.result.end_reason,
            aftermath.result.turns_taken
        );

        history = history.push(aftermath.history_entry.clone());
        runs.push(InvasionRun {
            day,
            encounter,
            aftermath,
            gold_after: gold,
        });
    }

    Ok(SimulationSummary {
        seed,
        runs,
        history,
        final_gold: gold,
        prisoners_ransomed,
    })
}

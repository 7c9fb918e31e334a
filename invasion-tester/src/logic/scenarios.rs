use anyhow::{Result, ensure};

use invasion_game::{
    DungeonSnapshot, InvasionConfig, InvasionEndReason, InvasionOutcome, RoomRole, Settlement,
};

use super::simulation::{SimulationPlan, SimulationSummary, run_plan};

/// A named campaign plan.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const CATALOG: &[(&str, &str)] = &[
    ("smoke", "Single invasion against a lightly held keep"),
    ("campaign", "Eight scheduled invasions with prisoners ransomed"),
    ("undefended", "Empty dungeon; every raid must topple the altar"),
    ("fortress", "Six elite guardians over a long siege; the altar must never fall"),
    ("replay", "Same seed replays to the identical aftermath"),
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.to_vec()
}

#[must_use]
pub fn all_scenario_keys() -> Vec<String> {
    CATALOG.iter().map(|(key, _)| (*key).to_string()).collect()
}

fn keep() -> DungeonSnapshot {
    DungeonSnapshot::default()
        .with_room("altar-hall", RoomRole::Altar)
        .with_room("treasury", RoomRole::Vault)
        .with_room("scriptorium", RoomRole::Library)
        .with_inhabitant("gnoll", "Gnoll Guard", 1)
        .with_inhabitant("ghoul", "Ghoul", 2)
        .with_inhabitant("minotaur", "Minotaur", 3)
}

fn bare_altar() -> DungeonSnapshot {
    DungeonSnapshot::default().with_room("altar-hall", RoomRole::Altar)
}

fn fortress() -> DungeonSnapshot {
    let base = DungeonSnapshot::default()
        .with_room("altar-hall", RoomRole::Altar)
        .with_room("ley-nexus", RoomRole::LeyLine);
    (0..6).fold(base, |dungeon, idx| {
        dungeon.with_inhabitant(format!("dread-knight-{idx}"), "Dread Knight", 5)
    })
}

fn campaign_plan() -> SimulationPlan {
    SimulationPlan::new(keep())
        .with_invasions(8)
        .with_starting_gold(250)
        .ransoming_prisoners()
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let scenario = match name {
        "smoke" => TestScenario::new(
            "Smoke Test",
            SimulationPlan::new(keep()).with_expectation(smoke_expectation),
        ),
        "campaign" => TestScenario::new(
            "Campaign",
            campaign_plan().with_expectation(campaign_expectation),
        ),
        "undefended" => TestScenario::new(
            "Undefended Altar",
            SimulationPlan::new(bare_altar())
                .with_invasions(3)
                .with_expectation(undefended_expectation),
        ),
        "fortress" => TestScenario::new(
            "Fortress",
            SimulationPlan::new(fortress())
                .with_config(InvasionConfig {
                    max_turns: 40,
                    ..InvasionConfig::default()
                })
                .with_invasions(2)
                .with_expectation(fortress_expectation),
        ),
        "replay" => TestScenario::new(
            "Deterministic Replay",
            campaign_plan().with_expectation(replay_expectation),
        ),
        _ => return None,
    };
    Some(scenario)
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.runs.len() == 1, "expected one invasion, got {}", summary.runs.len());
    let run = &summary.runs[0];
    ensure!(
        run.encounter.end_reason.is_some(),
        "encounter stopped without an end reason"
    );
    ensure!(
        run.encounter.state.current_turn <= run.encounter.state.max_turns,
        "turn {} overran the limit {}",
        run.encounter.state.current_turn,
        run.encounter.state.max_turns
    );
    ensure!(run.day >= 10, "first invasion arrived on day {}", run.day);
    ensure!(summary.final_gold >= 0, "treasury went negative: {}", summary.final_gold);
    Ok(())
}

fn campaign_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.runs.len() == 8, "expected 8 invasions, got {}", summary.runs.len());
    for pair in summary.runs.windows(2) {
        ensure!(
            pair[1].day > pair[0].day,
            "invasion on day {} followed day {}",
            pair[1].day,
            pair[0].day
        );
    }
    let record = summary.history.defense_record();
    ensure!(
        record.total() == 8,
        "history recorded {} of 8 invasions",
        record.total()
    );
    ensure!(
        usize::try_from(record.victories).unwrap_or(usize::MAX) == summary.victories(),
        "history victories {} disagree with runs {}",
        record.victories,
        summary.victories()
    );
    for run in &summary.runs {
        let result = &run.aftermath.result;
        ensure!(
            result.invaders_killed <= result.invader_count,
            "killed {} of {} invaders",
            result.invaders_killed,
            result.invader_count
        );
        ensure!(
            result.defenders_lost <= result.defender_count,
            "lost {} of {} defenders",
            result.defenders_lost,
            result.defender_count
        );
        ensure!(run.gold_after >= 0, "treasury went negative on day {}", run.day);
    }
    let captured: usize = summary
        .runs
        .iter()
        .map(|run| match &run.aftermath.settlement {
            Settlement::Rewards(rewards) => rewards.captured_prisoners.len(),
            Settlement::Penalties(_) => 0,
        })
        .sum();
    ensure!(
        summary.prisoners_ransomed == captured,
        "ransomed {} of {captured} prisoners",
        summary.prisoners_ransomed
    );
    Ok(())
}

fn undefended_expectation(summary: &SimulationSummary) -> Result<()> {
    for run in &summary.runs {
        let result = &run.aftermath.result;
        ensure!(
            result.end_reason == InvasionEndReason::AltarDestroyed,
            "day {} ended with {} instead of the altar falling",
            run.day,
            result.end_reason
        );
        ensure!(
            result.outcome == InvasionOutcome::Defeat,
            "day {} counted as a victory",
            run.day
        );
        ensure!(
            matches!(run.aftermath.settlement, Settlement::Penalties(_)),
            "day {} paid rewards after a defeat",
            run.day
        );
        ensure!(
            run.aftermath.altar_rebuild_cost.is_some(),
            "day {} has no rebuild bill",
            run.day
        );
    }
    Ok(())
}

fn fortress_expectation(summary: &SimulationSummary) -> Result<()> {
    for run in &summary.runs {
        ensure!(
            run.encounter.state.altar_hp > 0,
            "altar fell on day {} despite the garrison",
            run.day
        );
        ensure!(
            run.aftermath.result.end_reason != InvasionEndReason::AltarDestroyed,
            "day {} reported the altar destroyed",
            run.day
        );
    }
    Ok(())
}

fn replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let replay = run_plan(&campaign_plan(), summary.seed)?;
    ensure!(
        replay.runs.len() == summary.runs.len(),
        "replay played {} invasions instead of {}",
        replay.runs.len(),
        summary.runs.len()
    );
    for (original, again) in summary.runs.iter().zip(&replay.runs) {
        ensure!(
            original.aftermath == again.aftermath,
            "day {} diverged on replay",
            original.day
        );
    }
    ensure!(
        replay.final_gold == summary.final_gold,
        "replayed treasury {} differs from {}",
        replay.final_gold,
        summary.final_gold
    );
    Ok(())
}

use bb_core::engine::{check_invariants, DecisionChoice, GameAction, GameSession, GameState};
use bb_core::models::{
    GameSetup, Half, OutKind, PitchType, Strategy as Approach, TeamInfo, TeamSide, LINEUP_SLOTS,
};
use bb_core::rng::Seed;
use bb_core::stats::{slot_totals, BoxScore};
use proptest::prelude::*;

fn play_game(seed: u64, manage: Option<TeamSide>, accept: bool) -> GameState {
    let mut setup = GameSetup::new(TeamInfo::new("rav", "Ravens"), TeamInfo::new("owl", "Owls"))
        .with_strategy(TeamSide::Away, Approach::Aggressive)
        .with_strategy(TeamSide::Home, Approach::Contact);
    if let Some(side) = manage {
        setup = setup.with_manager(side);
    }
    let mut session = GameSession::new(Seed::from_value(seed), setup).with_bench(true, true);
    let choice = if accept { DecisionChoice::Accept } else { DecisionChoice::Skip };
    session.play_out(50_000, |_| choice).unwrap();
    session.state().clone()
}

fn manage_strategy() -> impl Strategy<Value = Option<TeamSide>> {
    prop_oneof![Just(None), Just(Some(TeamSide::Away)), Just(Some(TeamSide::Home))]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_completed_game_stat_invariants(
        seed in any::<u64>(),
        manage in manage_strategy(),
        accept in any::<bool>(),
    ) {
        let state = play_game(seed, manage, accept);
        prop_assert!(state.game_over);
        prop_assert!(check_invariants(&state).is_empty());

        for side in [TeamSide::Away, TeamSide::Home] {
            let totals = slot_totals(&state, side);
            for slot in 0..LINEUP_SLOTS {
                let t = totals[slot];
                prop_assert!(t.strikeouts <= t.at_bats);
                prop_assert_eq!(t.plate_appearances, t.at_bats + t.walks);
                if slot + 1 < LINEUP_SLOTS {
                    let next = totals[slot + 1];
                    prop_assert!(t.at_bats + t.walks >= next.at_bats + next.walks);
                }
            }
            // The order wraps, so the leadoff hitter is at most one ahead.
            let first = totals[0].plate_appearances;
            let last = totals[LINEUP_SLOTS - 1].plate_appearances;
            prop_assert!(first - last <= 1);
        }

        let boxscore = BoxScore::from_state(&state, None);
        prop_assert_eq!(boxscore.away.runs, state.score[0]);
        prop_assert_eq!(boxscore.home.runs, state.score[1]);
        prop_assert!(state.score[0] != state.score[1]);
    }
}

#[test]
fn test_walk_shows_up_as_at_bat_gap() {
    let setup = GameSetup::new(TeamInfo::new("rav", "Ravens"), TeamInfo::new("owl", "Owls"));
    let mut session = GameSession::new(Seed::from_value(1), setup);
    let ball = GameAction::Wait { pitch: PitchType::Fastball };
    let out = GameAction::BattedOut { out: OutKind::PopOut, pitch: PitchType::Slider };
    let strike = GameAction::Strike { swinging: true, pitch: PitchType::Curveball };

    // Slot 0 walks; slots 1-3 are retired on pop-ups and a strikeout.
    for _ in 0..4 {
        session.dispatch(ball.clone()).unwrap();
    }
    session.dispatch(out.clone()).unwrap();
    for _ in 0..3 {
        session.dispatch(strike.clone()).unwrap();
    }
    session.dispatch(out).unwrap();
    assert_eq!(session.state().half, Half::Bottom);

    let totals = slot_totals(session.state(), TeamSide::Away);
    assert_eq!(totals[0].walks, 1);
    assert_eq!(totals[0].plate_appearances, totals[1].plate_appearances);
    assert_eq!(totals[1].at_bats - totals[0].at_bats, totals[0].walks);
    assert_eq!(totals[2].strikeouts, 1);
    assert!(totals[2].strikeouts <= totals[2].at_bats);
}

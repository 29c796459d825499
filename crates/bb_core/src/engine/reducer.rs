//! Game state machine.
//!
//! `GameState::apply` is the only mutation path for the live state. Each
//! transition validates first and mutates second, so a rejected action
//! leaves the state untouched.
//!
//! Terminal rules are checked after every run that scores (walk-off) and at
//! every half-inning boundary (home team ahead after a top half, or unequal
//! score after a bottom half, from the 9th inning on).

use thiserror::Error;
use tracing::info;

use super::action::GameAction;
use super::commentary;
use super::decision::DecisionClass;
use super::state::{Count, GameState};
use crate::models::{
    Base, BuntOutcome, Half, HitType, OutKind, OutLogEntry, PitchType, PlayKind, PlayLogEntry,
    REGULATION_INNINGS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    #[error("the game is over")]
    GameOver,
    #[error("a manager decision is pending")]
    DecisionPending,
    #[error("no runner in position to steal {}", .base.as_str())]
    NoRunner { base: Base },
    #[error("teams have not been set")]
    NotStarted,
}

/// Pure form of [`GameState::apply`].
pub fn reduce(state: &GameState, action: &GameAction) -> Result<GameState, ReduceError> {
    let mut next = state.clone();
    next.apply(action)?;
    Ok(next)
}

impl GameState {
    pub fn apply(&mut self, action: &GameAction) -> Result<(), ReduceError> {
        match action {
            GameAction::Reset => {
                let [away, home] = self.teams.clone();
                *self = GameState::new(away, home);
                return Ok(());
            }
            GameAction::RestoreGame(state) => {
                *self = (**state).clone();
                return Ok(());
            }
            _ => {}
        }

        if self.game_over {
            return Err(ReduceError::GameOver);
        }
        let kind = action.kind();
        if kind.is_pitch() && self.pending_decision.is_some() {
            return Err(ReduceError::DecisionPending);
        }
        if kind.advances_pitch() && !self.has_teams() {
            return Err(ReduceError::NotStarted);
        }
        match action {
            GameAction::StealAttempt { base, .. } if !self.can_steal(*base) => {
                return Err(ReduceError::NoRunner { base: *base });
            }
            GameAction::SetPendingDecision(_) if self.pending_decision.is_some() => {
                return Err(ReduceError::DecisionPending);
            }
            _ => {}
        }

        match action {
            GameAction::SetTeams { away, home } => {
                self.teams = [away.clone(), home.clone()];
                self.say(format!("{} at {}.", away.name, home.name));
            }
            GameAction::SetPendingDecision(decision) => {
                if decision.class() == DecisionClass::DefensiveShift {
                    self.shift_offered_this_half = true;
                }
                self.say(format!("Decision: {}", decision.describe()));
                self.pending_decision = Some(decision.clone());
            }
            GameAction::SkipDecision => {
                if let Some(decision) = self.pending_decision.take() {
                    self.skipped_decisions.insert(decision.class());
                    self.say(format!("Manager passes on the {}.", decision.class().as_str()));
                }
            }
            GameAction::SetOnePitchModifier(modifier) => {
                self.pending_decision = None;
                self.one_pitch_modifier = Some(*modifier);
                self.say(commentary::modifier(*modifier));
            }
            GameAction::SetPinchHitterStrategy(strategy) => {
                self.pending_decision = None;
                self.pinch_hitter_strategy = Some(*strategy);
                self.say(commentary::pinch_hitter(*strategy));
            }
            GameAction::SetDefensiveShift(on) => {
                self.pending_decision = None;
                self.defensive_shift = *on;
                self.shift_offered_this_half = true;
                self.say(commentary::shift(*on));
            }
            GameAction::StealAttempt { base, successful } => {
                self.pending_decision = None;
                self.on_steal(*base, *successful);
            }
            GameAction::BuntAttempt { outcome } => {
                self.pending_decision = None;
                self.on_bunt(*outcome);
            }
            GameAction::IntentionalWalk => {
                self.pending_decision = None;
                let batter = self.batter_label();
                self.say(commentary::walk(&batter, true));
                self.award_walk(true);
            }
            GameAction::Strike { swinging, pitch } => self.on_strike(*swinging, *pitch),
            GameAction::Foul { pitch } => self.on_foul(*pitch),
            GameAction::Wait { pitch } => self.on_ball(*pitch),
            GameAction::Hit { hit, pitch } => self.on_hit(*hit, Some(*pitch)),
            GameAction::BattedOut { out, .. } => self.on_batted_out(*out),
            GameAction::Reset | GameAction::RestoreGame(_) => {}
        }

        if kind.advances_pitch() {
            self.started = true;
            self.pitch_key += 1;
            self.one_pitch_modifier = None;
        }
        Ok(())
    }

    fn has_teams(&self) -> bool {
        self.teams.iter().all(|t| !t.id.is_empty())
    }

    fn can_steal(&self, base: Base) -> bool {
        match base {
            Base::Second => self.bases.first && !self.bases.second,
            Base::Third => self.bases.second && !self.bases.third,
        }
    }

    fn say(&mut self, text: String) {
        let line = format!("{}: {}", self.inning_label(), text);
        self.play_by_play.push(line);
    }

    fn batter_label(&self) -> String {
        format!("{} #{}", self.team_name(self.batting()), self.current_slot() + 1)
    }

    // ========================================================================
    // Pitch outcomes
    // ========================================================================

    fn on_ball(&mut self, pitch: PitchType) {
        if self.count.balls >= 3 {
            let batter = self.batter_label();
            self.say(format!("Ball 4 ({}). {}", pitch.as_str(), commentary::walk(&batter, false)));
            self.award_walk(false);
            return;
        }
        self.count.balls += 1;
        let line = commentary::ball(self.count.balls, pitch, self.count);
        self.say(line);
    }

    fn on_strike(&mut self, swinging: bool, pitch: PitchType) {
        if self.count.strikes >= 2 {
            let batter = self.batter_label();
            self.say(commentary::strikeout(&batter, swinging, pitch));
            self.strike_out();
            return;
        }
        self.count.strikes += 1;
        let line = commentary::strike(swinging, pitch, self.count);
        self.say(line);
    }

    fn on_foul(&mut self, pitch: PitchType) {
        if self.count.strikes < 2 {
            self.count.strikes += 1;
        }
        let line = commentary::foul(pitch, self.count);
        self.say(line);
    }

    fn on_hit(&mut self, hit: HitType, pitch: Option<PitchType>) {
        let batter = self.batter_label();
        self.say(commentary::hit(&batter, hit, pitch));
        let n = hit.bases();
        let runs = self.bases.advance_all(n, n);
        self.log_play(PlayKind::Hit(hit), runs);
        self.end_plate_appearance();
        self.score_runs(runs);
    }

    fn on_batted_out(&mut self, out: OutKind) {
        let batter = self.batter_label();
        self.say(commentary::batted_out(&batter, out));
        self.log_out(Some(out));
        self.end_plate_appearance();

        match out {
            OutKind::DoublePlay if self.bases.first && self.outs < 2 => {
                self.bases.first = false;
                self.retire(2, 1);
            }
            OutKind::GroundOut | OutKind::DoublePlay | OutKind::SacrificeBunt => self.retire(1, 1),
            OutKind::FlyOut => {
                if self.outs + 1 >= 3 {
                    self.add_outs(1);
                } else {
                    self.outs += 1;
                    if self.bases.third {
                        self.bases.third = false;
                        self.score_runs(1);
                    }
                }
            }
            OutKind::PopOut | OutKind::BuntPopUp => self.retire(1, 0),
        }
    }

    fn on_steal(&mut self, base: Base, safe: bool) {
        self.say(commentary::steal(base, safe));
        match base {
            Base::Second => {
                self.bases.first = false;
                self.bases.second = safe;
            }
            Base::Third => {
                self.bases.second = false;
                self.bases.third = safe;
            }
        }
        if !safe {
            self.add_outs(1);
        }
    }

    fn on_bunt(&mut self, outcome: BuntOutcome) {
        match outcome {
            BuntOutcome::Sacrifice => self.on_batted_out(OutKind::SacrificeBunt),
            BuntOutcome::Single => self.on_hit(HitType::Single, None),
            BuntOutcome::PopUp => self.on_batted_out(OutKind::BuntPopUp),
            BuntOutcome::Foul if self.count.strikes >= 2 => {
                let batter = self.batter_label();
                self.say(format!("Bunt foul with two strikes. {} strikes out.", batter));
                self.strike_out();
            }
            BuntOutcome::Foul => {
                self.count.strikes += 1;
                let line = commentary::bunt_foul(self.count);
                self.say(line);
            }
        }
    }

    // ========================================================================
    // Plate appearance / half-inning bookkeeping
    // ========================================================================

    fn strike_out(&mut self) {
        let entry = self.out_entry(None);
        let side = self.batting().index();
        self.strikeout_log[side].push(entry);
        self.end_plate_appearance();
        self.add_outs(1);
    }

    fn award_walk(&mut self, intentional: bool) {
        let runs = self.bases.force_batter_to_first();
        let kind = if intentional { PlayKind::IntentionalWalk } else { PlayKind::Walk };
        self.log_play(kind, runs);
        self.end_plate_appearance();
        self.score_runs(runs);
    }

    fn out_entry(&self, kind: Option<OutKind>) -> OutLogEntry {
        OutLogEntry { slot: self.current_slot(), inning: self.inning, half: self.half, kind }
    }

    fn log_out(&mut self, kind: Option<OutKind>) {
        let entry = self.out_entry(kind);
        let side = self.batting().index();
        self.out_log[side].push(entry);
    }

    fn log_play(&mut self, kind: PlayKind, rbi: u8) {
        let entry = PlayLogEntry {
            slot: self.current_slot(),
            inning: self.inning,
            half: self.half,
            kind,
            rbi,
        };
        let side = self.batting().index();
        self.play_log[side].push(entry);
    }

    fn end_plate_appearance(&mut self) {
        self.advance_batter();
        self.count = Count::default();
        self.pinch_hitter_strategy = None;
        self.one_pitch_modifier = None;
        self.skipped_decisions.clear();
    }

    /// Batter-side outs with runner advancement when the half continues.
    fn retire(&mut self, outs: u8, advance: u8) {
        if self.outs + outs >= 3 {
            self.add_outs(outs);
            return;
        }
        self.outs += outs;
        if advance > 0 {
            let runs = self.bases.advance_all(advance, 0);
            self.score_runs(runs);
        }
    }

    fn add_outs(&mut self, outs: u8) {
        self.outs += outs;
        if self.outs >= 3 {
            self.end_half();
        }
    }

    fn score_runs(&mut self, runs: u8) {
        if runs == 0 {
            return;
        }
        let side = self.batting().index();
        self.score[side] += runs as u16;
        match self.inning_runs[side].last_mut() {
            Some(last) => *last += runs as u16,
            None => self.inning_runs[side].push(runs as u16),
        }
        let line = commentary::runs_scored(
            runs,
            &self.teams[0].name,
            self.score[0],
            &self.teams[1].name,
            self.score[1],
        );
        self.say(line);

        if self.half == Half::Bottom
            && self.inning >= REGULATION_INNINGS
            && self.score[1] > self.score[0]
        {
            self.end_game(true);
        }
    }

    fn end_half(&mut self) {
        self.say(format!(
            "Side retired. {} {}, {} {}.",
            self.teams[0].name, self.score[0], self.teams[1].name, self.score[1]
        ));

        let late = self.inning >= REGULATION_INNINGS;
        let over = match self.half {
            Half::Top => late && self.score[1] > self.score[0],
            Half::Bottom => late && self.score[0] != self.score[1],
        };
        if over {
            self.end_game(false);
            return;
        }

        self.outs = 0;
        self.count = Count::default();
        self.bases = Default::default();
        self.pending_decision = None;
        self.one_pitch_modifier = None;
        self.pinch_hitter_strategy = None;
        self.defensive_shift = false;
        self.shift_offered_this_half = false;
        self.skipped_decisions.clear();
        match self.half {
            Half::Top => {
                self.half = Half::Bottom;
                self.inning_runs[1].push(0);
            }
            Half::Bottom => {
                self.half = Half::Top;
                self.inning += 1;
                self.inning_runs[0].push(0);
            }
        }
        info!(inning = self.inning, half = self.half.label(), "half-inning begins");
    }

    fn end_game(&mut self, walk_off: bool) {
        self.game_over = true;
        self.pending_decision = None;
        self.one_pitch_modifier = None;
        self.count = Count::default();
        let line = commentary::final_score(
            &self.teams[0].name,
            self.score[0],
            &self.teams[1].name,
            self.score[1],
            walk_off,
        );
        self.say(line);
        info!(away = self.score[0], home = self.score[1], walk_off, "game over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::decision::Decision;
    use crate::engine::state::Bases;
    use crate::models::{OnePitchModifier, Strategy, TeamInfo, TeamSide};

    const FB: PitchType = PitchType::Fastball;

    fn game() -> GameState {
        GameState::new(TeamInfo::new("rav", "Ravens"), TeamInfo::new("owl", "Owls"))
    }

    fn run(state: &mut GameState, actions: &[GameAction]) {
        for action in actions {
            state.apply(action).unwrap();
        }
    }

    #[test]
    fn test_first_ball_narration() {
        let mut state = game();
        state.apply(&GameAction::Wait { pitch: FB }).unwrap();
        assert_eq!(state.play_by_play.last().unwrap(), "Top 1st: Ball 1 (fastball). Count 1-0.");
        assert_eq!(state.pitch_key, 1);
        assert!(state.started);
    }

    #[test]
    fn test_four_balls_is_walk() {
        let mut state = game();
        run(&mut state, &vec![GameAction::Wait { pitch: FB }; 4]);
        assert!(state.bases.first);
        assert_eq!(state.count, Count::default());
        assert_eq!(state.batter_index[0], 1);
        assert_eq!(state.play_log[0].len(), 1);
        assert_eq!(state.play_log[0][0].kind, PlayKind::Walk);
    }

    #[test]
    fn test_three_strikes_is_strikeout() {
        let mut state = game();
        let pitches = vec![
            GameAction::Strike { swinging: false, pitch: FB },
            GameAction::Foul { pitch: FB },
            GameAction::Foul { pitch: FB },
            GameAction::Strike { swinging: true, pitch: FB },
        ];
        run(&mut state, &pitches);
        assert_eq!(state.outs, 1);
        assert_eq!(state.strikeout_log[0].len(), 1);
        assert_eq!(state.strikeout_log[0][0].slot, 0);
        assert_eq!(state.count, Count::default());
    }

    #[test]
    fn test_hit_credits_rbi() {
        let mut state = game();
        state.bases = Bases { first: true, second: false, third: true };
        state.apply(&GameAction::Hit { hit: HitType::Double, pitch: FB }).unwrap();
        assert_eq!(state.score, [2, 0]);
        assert_eq!(state.inning_runs[0], vec![2]);
        assert_eq!(state.bases, Bases { first: false, second: true, third: false });
        assert_eq!(state.play_log[0][0].rbi, 2);
    }

    #[test]
    fn test_bases_loaded_walk_forces_run() {
        let mut state = game();
        state.bases = Bases { first: true, second: true, third: true };
        state.count.balls = 3;
        state.apply(&GameAction::Wait { pitch: FB }).unwrap();
        assert_eq!(state.score, [1, 0]);
        assert_eq!(state.play_log[0][0].rbi, 1);
        assert!(state.bases.is_loaded());
    }

    #[test]
    fn test_ground_out_with_two_outs_scores_nothing() {
        let mut state = game();
        state.outs = 2;
        state.bases.third = true;
        state.apply(&GameAction::BattedOut { out: OutKind::GroundOut, pitch: FB }).unwrap();
        assert_eq!(state.score, [0, 0]);
        assert_eq!(state.half, Half::Bottom);
        assert!(state.bases.is_empty());
    }

    #[test]
    fn test_sacrifice_fly_scores_without_rbi() {
        let mut state = game();
        state.bases.third = true;
        state.apply(&GameAction::BattedOut { out: OutKind::FlyOut, pitch: FB }).unwrap();
        assert_eq!(state.score, [1, 0]);
        assert_eq!(state.outs, 1);
        assert_eq!(state.out_log[0].len(), 1);
        assert!(state.play_log[0].is_empty());
    }

    #[test]
    fn test_double_play_removes_runner_from_first() {
        let mut state = game();
        state.bases = Bases { first: true, second: true, third: false };
        state.apply(&GameAction::BattedOut { out: OutKind::DoublePlay, pitch: FB }).unwrap();
        assert_eq!(state.outs, 2);
        assert_eq!(state.bases, Bases { first: false, second: false, third: true });
    }

    #[test]
    fn test_third_out_flips_half_and_clears_shift() {
        let mut state = game();
        state.outs = 2;
        state.defensive_shift = true;
        state.shift_offered_this_half = true;
        state.bases.second = true;
        state.apply(&GameAction::BattedOut { out: OutKind::PopOut, pitch: FB }).unwrap();
        assert_eq!(state.half, Half::Bottom);
        assert_eq!(state.inning, 1);
        assert_eq!(state.outs, 0);
        assert!(!state.defensive_shift);
        assert!(!state.shift_offered_this_half);
        assert!(state.bases.is_empty());
        assert_eq!(state.inning_runs[1], vec![0]);
    }

    #[test]
    fn test_home_ahead_after_top_ninth_ends_game() {
        let mut state = game();
        state.inning = 9;
        state.score = [1, 2];
        state.outs = 2;
        state.apply(&GameAction::BattedOut { out: OutKind::PopOut, pitch: FB }).unwrap();
        assert!(state.game_over);
        assert_eq!(state.half, Half::Top);
        assert!(state.play_by_play.last().unwrap().contains("Final"));
    }

    #[test]
    fn test_walk_off_ends_immediately() {
        let mut state = game();
        state.inning = 9;
        state.half = Half::Bottom;
        state.score = [3, 3];
        state.bases = Bases { first: false, second: true, third: true };
        state.apply(&GameAction::Hit { hit: HitType::Single, pitch: FB }).unwrap();
        assert!(state.game_over);
        assert_eq!(state.score, [3, 5]);
        assert!(state.play_by_play.last().unwrap().ends_with("Walk-off!"));
    }

    #[test]
    fn test_sacrifice_fly_walk_off() {
        let mut state = game();
        state.inning = 9;
        state.half = Half::Bottom;
        state.score = [3, 3];
        state.bases.third = true;
        state.apply(&GameAction::BattedOut { out: OutKind::FlyOut, pitch: FB }).unwrap();
        assert!(state.game_over);
        assert_eq!(state.score, [3, 4]);
        assert_eq!(state.outs, 1);
        assert!(state.play_log[1].is_empty());
        assert!(state.play_by_play.last().unwrap().ends_with("Walk-off!"));
    }

    #[test]
    fn test_ground_out_walk_off_only_before_third_out() {
        let mut state = game();
        state.inning = 10;
        state.half = Half::Bottom;
        state.score = [5, 5];
        state.outs = 1;
        state.bases.third = true;
        state.apply(&GameAction::BattedOut { out: OutKind::GroundOut, pitch: FB }).unwrap();
        assert!(state.game_over);
        assert_eq!(state.score, [5, 6]);

        let mut state = game();
        state.inning = 10;
        state.half = Half::Bottom;
        state.score = [5, 5];
        state.outs = 2;
        state.bases.third = true;
        state.apply(&GameAction::BattedOut { out: OutKind::GroundOut, pitch: FB }).unwrap();
        assert!(!state.game_over);
        assert_eq!(state.score, [5, 5]);
        assert_eq!(state.inning, 11);
    }

    #[test]
    fn test_restore_game_replaces_finished_state() {
        let mut state = game();
        state.apply(&GameAction::Wait { pitch: FB }).unwrap();
        let earlier = state.clone();

        state.game_over = true;
        assert_eq!(state.apply(&GameAction::Wait { pitch: FB }), Err(ReduceError::GameOver));
        state.apply(&GameAction::RestoreGame(Box::new(earlier.clone()))).unwrap();
        assert_eq!(state, earlier);

        state.apply(&GameAction::Wait { pitch: FB }).unwrap();
        assert_eq!(state.count.balls, 2);
        assert_eq!(state.pitch_key, 2);
    }

    #[test]
    fn test_tie_after_nine_goes_to_extras() {
        let mut state = game();
        state.inning = 9;
        state.half = Half::Bottom;
        state.score = [2, 2];
        state.outs = 2;
        state.apply(&GameAction::Strike { swinging: true, pitch: FB }).unwrap();
        state.count.strikes = 2;
        state.apply(&GameAction::Strike { swinging: true, pitch: FB }).unwrap();
        assert!(!state.game_over);
        assert_eq!(state.inning, 10);
        assert_eq!(state.half, Half::Top);
    }

    #[test]
    fn test_terminal_rejects_everything_but_reset() {
        let mut state = game();
        state.game_over = true;
        assert_eq!(state.apply(&GameAction::Wait { pitch: FB }), Err(ReduceError::GameOver));
        assert_eq!(state.apply(&GameAction::SkipDecision), Err(ReduceError::GameOver));
        state.apply(&GameAction::Reset).unwrap();
        assert!(!state.game_over);
        assert_eq!(state.teams[1].name, "Owls");
    }

    #[test]
    fn test_pending_decision_blocks_pitches() {
        let mut state = game();
        state.apply(&GameAction::SetPendingDecision(Decision::Bunt)).unwrap();
        let before = state.clone();
        assert_eq!(
            state.apply(&GameAction::Wait { pitch: FB }),
            Err(ReduceError::DecisionPending)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_skip_latches_until_next_batter() {
        let mut state = game();
        state.apply(&GameAction::SetPendingDecision(Decision::Bunt)).unwrap();
        state.apply(&GameAction::SkipDecision).unwrap();
        assert!(state.pending_decision.is_none());
        assert!(state.skipped_decisions.contains(&DecisionClass::Bunt));

        state.apply(&GameAction::Hit { hit: HitType::Single, pitch: FB }).unwrap();
        assert!(state.skipped_decisions.is_empty());
    }

    #[test]
    fn test_modifier_lasts_one_pitch() {
        let mut state = game();
        state.apply(&GameAction::SetOnePitchModifier(OnePitchModifier::Take)).unwrap();
        assert_eq!(state.one_pitch_modifier, Some(OnePitchModifier::Take));
        state.apply(&GameAction::Wait { pitch: FB }).unwrap();
        assert_eq!(state.one_pitch_modifier, None);
    }

    #[test]
    fn test_pinch_hitter_cleared_after_plate_appearance() {
        let mut state = game();
        state.apply(&GameAction::SetPinchHitterStrategy(Strategy::Power)).unwrap();
        state.apply(&GameAction::BattedOut { out: OutKind::FlyOut, pitch: FB }).unwrap();
        assert_eq!(state.pinch_hitter_strategy, None);
    }

    #[test]
    fn test_caught_stealing_keeps_batter() {
        let mut state = game();
        state.outs = 2;
        state.bases.first = true;
        state.batter_index[0] = 4;
        state.apply(&GameAction::StealAttempt { base: Base::Second, successful: false }).unwrap();
        assert_eq!(state.half, Half::Bottom);
        // Same batter leads off the next time the away club bats.
        assert_eq!(state.batter_index[TeamSide::Away.index()], 4);
        assert!(state.out_log[0].is_empty());
    }

    #[test]
    fn test_steal_needs_runner() {
        let mut state = game();
        assert_eq!(
            state.apply(&GameAction::StealAttempt { base: Base::Second, successful: true }),
            Err(ReduceError::NoRunner { base: Base::Second })
        );
    }

    #[test]
    fn test_bunt_foul_with_two_strikes_is_strikeout() {
        let mut state = game();
        state.count.strikes = 2;
        state.apply(&GameAction::BuntAttempt { outcome: BuntOutcome::Foul }).unwrap();
        assert_eq!(state.outs, 1);
        assert_eq!(state.strikeout_log[0].len(), 1);
    }

    #[test]
    fn test_sacrifice_bunt_moves_runner() {
        let mut state = game();
        state.bases.first = true;
        state.apply(&GameAction::BuntAttempt { outcome: BuntOutcome::Sacrifice }).unwrap();
        assert_eq!(state.bases, Bases { first: false, second: true, third: false });
        assert_eq!(state.outs, 1);
    }

    #[test]
    fn test_pitch_before_teams_rejected() {
        let mut state = GameState::default();
        assert_eq!(state.apply(&GameAction::Wait { pitch: FB }), Err(ReduceError::NotStarted));
        state
            .apply(&GameAction::SetTeams {
                away: TeamInfo::new("a", "A"),
                home: TeamInfo::new("h", "H"),
            })
            .unwrap();
        assert!(state.apply(&GameAction::Wait { pitch: FB }).is_ok());
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = game();
        let next = reduce(&state, &GameAction::Wait { pitch: FB }).unwrap();
        assert_eq!(state.count.balls, 0);
        assert_eq!(next.count.balls, 1);
    }
}

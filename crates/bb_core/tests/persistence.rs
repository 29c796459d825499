use bb_core::engine::{DecisionChoice, GameSession, StepOutcome};
use bb_core::live::LiveGame;
use bb_core::models::{GameSetup, TeamSide};
use bb_core::rng::Seed;
use bb_core::roster::{InMemoryRoster, RosterProvider};
use bb_core::save::{
    export_save, import_save, load_resume, rebuild_state, FileStore, MemoryStore, ResumeSource,
    SaveError, SaveStore,
};
use bb_core::scheduler::{
    run_autoplay, AutoplayScheduler, AutoplayStop, CancelToken, ManualClock, SilentSpeech,
};
use bb_core::config::SimConfig;
use tempfile::TempDir;

fn demo_setup() -> GameSetup {
    InMemoryRoster::demo().setup("rav", "owl").unwrap()
}

fn play_until<S: SaveStore>(game: &mut LiveGame<S>, stop: impl Fn(&LiveGame<S>) -> bool) {
    while !stop(game) {
        match game.step().unwrap() {
            StepOutcome::GameOver => break,
            StepOutcome::DecisionRequired(_) | StepOutcome::Blocked(_) => {
                game.resolve_decision(DecisionChoice::Skip).unwrap();
            }
            StepOutcome::Pitched(_) => {}
        }
    }
}

#[test]
fn test_export_import_reproduces_state() {
    let seed = Seed::parse("roundtrip").unwrap();
    let session = GameSession::new(seed, demo_setup().with_manager(TeamSide::Home));
    let mut game = LiveGame::start(MemoryStore::new(), session, true);
    play_until(&mut game, |g| g.state().game_over);
    let id = game.save_id().unwrap().clone();
    let final_state = game.state().clone();

    let mut store = game.into_store();
    let json = export_save(&store, &id).unwrap();
    let roster = InMemoryRoster::demo();
    let imported = import_save(&mut store, &json, Some(&roster as &dyn RosterProvider)).unwrap();

    let doc = store.load(&imported).unwrap();
    assert_eq!(doc.snapshot.as_ref().unwrap().state, final_state);
    let rebuilt = rebuild_state(&doc).unwrap();
    assert_eq!(rebuilt.score, final_state.score);
    assert_eq!(rebuilt.count, final_state.count);
    assert_eq!(rebuilt.outs, final_state.outs);
    assert_eq!(rebuilt.bases, final_state.bases);
    assert_eq!(rebuilt.play_log, final_state.play_log);
    assert_eq!(rebuilt.play_by_play, final_state.play_by_play);
    assert!(doc.progress.game_over);
}

#[test]
fn test_import_is_rejected_without_side_effects() {
    let seed = Seed::from_value(404);
    let mut game = LiveGame::start(MemoryStore::new(), GameSession::new(seed, demo_setup()), true);
    play_until(&mut game, |g| g.state().pitch_key >= 20);
    let id = game.save_id().unwrap().clone();
    let mut store = game.into_store();
    let json = export_save(&store, &id).unwrap();

    let before = store.list_saves().unwrap();
    let no_teams = InMemoryRoster::new();
    let err = import_save(&mut store, &json, Some(&no_teams as &dyn RosterProvider)).unwrap_err();
    assert!(matches!(err, SaveError::MissingDependency(_)));

    let tampered = json.replacen("\"at\": 3", "\"at\": 4", 1);
    assert!(matches!(
        import_save(&mut store, &tampered, None),
        Err(SaveError::SignatureMismatch)
    ));
    assert_eq!(store.list_saves().unwrap(), before);
}

#[test]
fn test_resume_keeps_growing_the_log() {
    let seed = Seed::from_value(2718);
    let mut game = LiveGame::start(MemoryStore::new(), GameSession::new(seed, demo_setup()), true);
    play_until(&mut game, |g| g.state().inning >= 4 && !g.state().count.is_fresh());
    let id = game.save_id().unwrap().clone();
    let store = game.into_store();
    let logged_before = store.load(&id).unwrap().events.len();

    let mut resumed = LiveGame::resume(store, &id).unwrap();
    assert_eq!(resumed.resumed_from(), Some(&ResumeSource::OwnSnapshot));
    let restored_lines = resumed.state().play_by_play.clone();
    let truncated = resumed.store().load(&id).unwrap().events.len();
    assert!(truncated <= logged_before);

    for _ in 0..40 {
        resumed.step().unwrap();
    }
    let lines = &resumed.state().play_by_play;
    assert!(lines.len() > restored_lines.len());
    assert_eq!(&lines[..restored_lines.len()], &restored_lines[..]);

    let doc = resumed.store().load(&id).unwrap();
    assert!(doc.events.len() > truncated);
    assert!(doc.events.windows(2).all(|w| w[1].seq == w[0].seq + 1 && w[1].at >= w[0].at));
}

#[test]
fn test_resume_before_first_snapshot_keeps_log() {
    let seed = Seed::from_value(8080);
    let mut game = LiveGame::start(MemoryStore::new(), GameSession::new(seed, demo_setup()), true);
    play_until(&mut game, |g| g.state().pitch_key >= 4);
    let id = game.save_id().unwrap().clone();
    let played = game.state().clone();
    let store = game.into_store();
    let doc = store.load(&id).unwrap();
    assert!(doc.snapshot.is_none());
    let logged = doc.events.len();
    assert!(logged >= 4);

    let mut resumed = LiveGame::resume(store, &id).unwrap();
    assert_eq!(resumed.resumed_from(), Some(&ResumeSource::Replayed));
    assert_eq!(resumed.state(), &played);
    assert_eq!(resumed.store().load(&id).unwrap().events.len(), logged);

    for _ in 0..10 {
        resumed.step().unwrap();
    }
    let doc = resumed.store().load(&id).unwrap();
    assert!(doc.events.len() > logged);
    assert!(doc.events.windows(2).all(|w| w[1].seq == w[0].seq + 1));
}

#[test]
fn test_snapshot_resume_matches_uninterrupted_game() {
    let seed = Seed::from_value(99_001);
    let mut straight = GameSession::new(seed, demo_setup());
    straight.play_out(100_000, |_| DecisionChoice::Skip).unwrap();

    let mut game = LiveGame::start(MemoryStore::new(), GameSession::new(seed, demo_setup()), true);
    play_until(&mut game, |g| g.state().inning >= 5);
    let id = game.save_id().unwrap().clone();
    let mut store = game.into_store();

    let mut point = load_resume(&mut store, &id).unwrap();
    point.session.play_out(100_000, |_| DecisionChoice::Skip).unwrap();
    assert_eq!(point.session.state(), straight.state());
}

#[test]
fn test_file_store_autoplay_and_listing() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let config = SimConfig::instant();
    let session = GameSession::new(Seed::from_value(5150), demo_setup());
    let mut game = LiveGame::start(store, session, config.autosave);

    let mut scheduler = AutoplayScheduler::new(config.pacing.clone(), config.muted);
    let mut clock = ManualClock::new();
    let report = run_autoplay(
        &mut game,
        &mut clock,
        &SilentSpeech,
        &mut scheduler,
        &CancelToken::new(),
        100_000,
    )
    .unwrap();
    assert_eq!(report.stop, AutoplayStop::GameOver);
    assert!(game.state().game_over);

    let id = game.save_id().unwrap().clone();
    let listed = game.store().list_saves().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert!(listed[0].progress.game_over);
    assert!(listed[0].has_snapshot);

    // Reopening the directory sees the same save.
    let reopened = FileStore::open(dir.path()).unwrap();
    let doc = reopened.load(&id).unwrap();
    assert_eq!(doc.snapshot.unwrap().state, *game.state());
}

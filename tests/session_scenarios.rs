// tests/session_scenarios.rs
//
// End-to-end game scenarios driven through the public session API.

use courtside_events::analysis::RosterTeams;
use courtside_events::{
    BoundingBox, Config, Detection, DetectionAdapter, DetectionLog, EventDetails, EventType,
    FrameState, GameEvent, GameSession, InMemorySource, ObjectType, PlayerId, PlayerStats,
    ReboundType, ShotResult,
};
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// ============================================================================
// FRAME BUILDERS
// ============================================================================

fn ball_at(x: f32, y: f32) -> Detection {
    Detection::new(
        ObjectType::Ball,
        BoundingBox::new(x - 6.0, y - 6.0, x + 6.0, y + 6.0),
        0.9,
    )
}

fn player_at(id: PlayerId, x: f32, y: f32) -> Detection {
    Detection::player(BoundingBox::new(x - 20.0, y - 50.0, x + 20.0, y + 50.0), 0.9, id)
}

fn rim_at(x: f32, y: f32) -> Detection {
    Detection::new(
        ObjectType::Rim,
        BoundingBox::new(x - 20.0, y - 10.0, x + 20.0, y + 10.0),
        0.9,
    )
}

/// Ball in `holder`'s hands, everyone else standing well clear
fn held_by(holder: PlayerId, others: &[PlayerId]) -> FrameState {
    let mut players = vec![player_at(holder, 200.0, 400.0)];
    for (i, id) in others.iter().enumerate() {
        players.push(player_at(*id, 500.0 + 150.0 * i as f32, 400.0));
    }
    FrameState {
        balls: vec![ball_at(200.0, 400.0)],
        rims: vec![rim_at(900.0, 100.0)],
        players,
    }
}

/// Ball visible, no player detected
fn loose_ball() -> FrameState {
    FrameState {
        balls: vec![ball_at(200.0, 400.0)],
        rims: vec![rim_at(900.0, 100.0)],
        ..Default::default()
    }
}

fn feed(session: &mut GameSession, frame: &FrameState, n: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..n {
        events.extend(session.process_frame(frame));
    }
    events
}

fn without_dribbles(events: &[GameEvent]) -> Vec<GameEvent> {
    events
        .iter()
        .filter(|e| e.event_type != EventType::Dribble)
        .cloned()
        .collect()
}

fn counters(p: &PlayerStats) -> [u32; 10] {
    [
        p.points,
        p.assists,
        p.steals,
        p.turnovers,
        p.offensive_rebounds,
        p.defensive_rebounds,
        p.field_goal_attempts,
        p.field_goals_made,
        p.three_point_attempts,
        p.three_pointers_made,
    ]
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_scenario_a_pass_between_teammates() {
    let mut session = GameSession::new(&Config::default());
    let mut events = feed(&mut session, &held_by(2, &[4]), 60);
    events.extend(feed(&mut session, &held_by(4, &[2]), 60));

    let events = without_dribbles(&events);
    assert_eq!(events.len(), 1, "expected a single pass, got {:?}", events);
    assert_eq!(events[0].details, EventDetails::Pass { from: 2, to: 4 });
    assert_eq!(session.stats().get(2).unwrap().assists, 1);
    assert_eq!(session.stats().get(4).unwrap().assists, 0);
}

#[test]
fn test_scenario_a_with_window_aggregation() {
    let mut config = Config::default();
    config.video.window_size = 3;
    let mut session = GameSession::new(&config);
    let mut events = feed(&mut session, &held_by(2, &[4]), 60);
    events.extend(feed(&mut session, &held_by(4, &[2]), 60));

    let passes: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == EventType::Pass)
        .collect();
    assert_eq!(passes.len(), 1);
}

#[test]
fn test_scenario_b_made_two_pointer() {
    let rim = rim_at(500.0, 100.0);
    let holding = FrameState {
        balls: vec![ball_at(500.0, 150.0)],
        rims: vec![rim.clone()],
        players: vec![player_at(1, 500.0, 150.0)],
    };
    let in_rim = FrameState {
        balls: vec![ball_at(500.0, 100.0)],
        rims: vec![rim.clone()],
        players: vec![player_at(1, 500.0, 150.0)],
    };
    let dropped = FrameState {
        balls: vec![ball_at(500.0, 400.0)],
        rims: vec![rim],
        players: Vec::new(),
    };

    let mut session = GameSession::new(&Config::default());
    let mut events = feed(&mut session, &holding, 90);
    events.extend(feed(&mut session, &in_rim, 1));
    events.extend(feed(&mut session, &dropped, 30));

    let shots: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == EventType::Shot)
        .collect();
    assert_eq!(shots.len(), 1, "make must be counted once");
    assert_eq!(shots[0].time, 3.0);
    assert_eq!(
        shots[0].details,
        EventDetails::Shot {
            shooter: Some(1),
            result: ShotResult::Made,
            points: 2,
            three_point: false,
        }
    );
    assert!(
        !events.iter().any(|e| e.event_type == EventType::Turnover),
        "shot release is not a turnover"
    );

    let p1 = session.stats().get(1).unwrap();
    assert_eq!(p1.points, 2);
    assert_eq!(p1.field_goal_attempts, 1);
    assert_eq!(p1.field_goals_made, 1);
    assert_eq!(session.possession().previous_holder(), None);
}

#[test]
fn test_scenario_c_timeout_then_previous_expiry() {
    let mut session = GameSession::new(&Config::default());
    feed(&mut session, &held_by(2, &[4]), 60);
    feed(&mut session, &held_by(4, &[2]), 30);
    assert_eq!(session.possession().current_holder(), Some(4));
    assert_eq!(session.possession().previous_holder(), Some(2));

    // 1s without anyone: still held
    feed(&mut session, &loose_ball(), 30);
    assert_eq!(session.possession().current_holder(), Some(4));

    // 2.5s without anyone: cleared, previous survives
    feed(&mut session, &loose_ball(), 45);
    assert_eq!(session.frames_processed(), 165);
    assert_eq!(session.possession().current_holder(), None);
    assert_eq!(session.possession().previous_holder(), Some(2));

    // Past 4s after the change at 2.5s the previous holder is gone
    feed(&mut session, &loose_ball(), 40);
    assert_eq!(session.possession().previous_holder(), None);

    let turnovers: Vec<_> = session
        .events()
        .iter()
        .filter(|e| e.event_type == EventType::Turnover)
        .collect();
    assert_eq!(turnovers.len(), 1);
    assert_eq!(turnovers[0].details, EventDetails::Turnover { lost_by: 4 });
}

#[test]
fn test_scenario_d_steal_across_gap() {
    // Rosters put 1 and 3 on opposite teams
    let teams = Arc::new(RosterTeams::new(&[1], &[3]));
    let mut session = GameSession::with_teams(&Config::default(), teams);

    feed(&mut session, &held_by(1, &[]), 60);
    feed(&mut session, &loose_ball(), 18);
    let events = without_dribbles(&feed(&mut session, &held_by(3, &[]), 60));

    assert_eq!(events.len(), 2, "got {:?}", events);
    assert_eq!(events[0].details, EventDetails::Steal { gained_by: 3 });
    assert_eq!(events[1].details, EventDetails::Turnover { lost_by: 1 });
    assert_eq!(events[0].time, events[1].time);

    assert_eq!(session.stats().get(3).unwrap().steals, 1);
    assert_eq!(session.stats().get(1).unwrap().turnovers, 1);
}

#[test]
fn test_scenario_d_with_parity_teams() {
    let mut session = GameSession::new(&Config::default());
    feed(&mut session, &held_by(1, &[]), 60);
    feed(&mut session, &loose_ball(), 18);
    let events = without_dribbles(&feed(&mut session, &held_by(2, &[]), 60));

    assert_eq!(
        events.iter().map(|e| e.event_type).collect::<Vec<_>>(),
        vec![EventType::Steal, EventType::Turnover]
    );
}

#[test]
fn test_missed_three_then_defensive_rebound() {
    let rim = rim_at(500.0, 100.0);
    let holding = FrameState {
        balls: vec![ball_at(500.0, 400.0)],
        rims: vec![rim.clone()],
        players: vec![player_at(2, 500.0, 400.0)],
    };
    let at_rim = FrameState {
        balls: vec![ball_at(500.0, 130.0)],
        rims: vec![rim.clone()],
        players: vec![player_at(2, 500.0, 400.0)],
    };
    let off_rim = FrameState {
        balls: vec![ball_at(500.0, 250.0)],
        rims: vec![rim.clone()],
        players: Vec::new(),
    };
    let rebounded = FrameState {
        balls: vec![ball_at(500.0, 250.0)],
        rims: vec![rim],
        players: vec![player_at(3, 500.0, 250.0)],
    };

    let mut session = GameSession::new(&Config::default());
    let mut events = feed(&mut session, &holding, 30);
    events.extend(feed(&mut session, &at_rim, 5));
    events.extend(feed(&mut session, &off_rim, 1));
    events.extend(feed(&mut session, &rebounded, 30));

    let events = without_dribbles(&events);
    assert_eq!(events.len(), 2, "got {:?}", events);
    assert_eq!(
        events[0].details,
        EventDetails::Shot {
            shooter: Some(2),
            result: ShotResult::Miss,
            points: 0,
            three_point: true,
        }
    );
    assert_eq!(
        events[1].details,
        EventDetails::Rebound {
            player: 3,
            rebound_type: ReboundType::Defensive,
        }
    );

    let p2 = session.stats().get(2).unwrap();
    assert_eq!((p2.field_goal_attempts, p2.three_point_attempts, p2.points), (1, 1, 0));
    assert_eq!(session.stats().get(3).unwrap().defensive_rebounds, 1);
}

#[test]
fn test_missed_shot_then_offensive_rebound() {
    let rim = rim_at(500.0, 100.0);
    let holding = FrameState {
        balls: vec![ball_at(500.0, 400.0)],
        rims: vec![rim.clone()],
        players: vec![player_at(2, 500.0, 400.0), player_at(4, 800.0, 400.0)],
    };
    let at_rim = FrameState {
        balls: vec![ball_at(500.0, 130.0)],
        rims: vec![rim.clone()],
        players: vec![player_at(2, 500.0, 400.0)],
    };
    let off_rim = FrameState {
        balls: vec![ball_at(500.0, 250.0)],
        rims: vec![rim.clone()],
        players: Vec::new(),
    };
    let tipped_back = FrameState {
        balls: vec![ball_at(500.0, 250.0)],
        rims: vec![rim],
        players: vec![player_at(4, 500.0, 250.0)],
    };

    let mut session = GameSession::new(&Config::default());
    let mut events = feed(&mut session, &holding, 30);
    events.extend(feed(&mut session, &at_rim, 5));
    events.extend(feed(&mut session, &off_rim, 1));
    events.extend(feed(&mut session, &tipped_back, 30));

    let events = without_dribbles(&events);
    assert_eq!(events.len(), 2, "got {:?}", events);
    assert!(matches!(
        events[0].details,
        EventDetails::Shot {
            shooter: Some(2),
            result: ShotResult::Miss,
            ..
        }
    ));
    assert_eq!(
        events[1].details,
        EventDetails::Rebound {
            player: 4,
            rebound_type: ReboundType::Offensive,
        }
    );

    let p4 = session.stats().get(4).unwrap();
    assert_eq!((p4.offensive_rebounds, p4.defensive_rebounds), (1, 0));
    assert_eq!(session.possession().current_holder(), Some(4));
}

#[test]
fn test_shot_after_timeout_credits_the_player_who_lost_it() {
    let in_rim = FrameState {
        balls: vec![ball_at(900.0, 100.0)],
        rims: vec![rim_at(900.0, 100.0)],
        players: Vec::new(),
    };

    let mut session = GameSession::new(&Config::default());
    let mut events = feed(&mut session, &held_by(2, &[4]), 60);
    events.extend(feed(&mut session, &held_by(4, &[2]), 20));
    events.extend(feed(&mut session, &loose_ball(), 66));
    assert_eq!(session.possession().current_holder(), None);
    assert_eq!(session.possession().previous_holder(), Some(2));
    events.extend(feed(&mut session, &in_rim, 1));

    let events = without_dribbles(&events);
    assert_eq!(
        events.iter().map(|e| e.event_type).collect::<Vec<_>>(),
        vec![EventType::Pass, EventType::Turnover, EventType::Shot]
    );
    assert_eq!(events[1].details, EventDetails::Turnover { lost_by: 4 });
    match &events[2].details {
        EventDetails::Shot { shooter, result, .. } => {
            assert_eq!(*shooter, Some(4));
            assert_eq!(*result, ShotResult::Made);
        }
        other => panic!("expected shot, got {:?}", other),
    }

    let p2 = session.stats().get(2).unwrap();
    assert_eq!((p2.points, p2.field_goal_attempts), (0, 0));
    let p4 = session.stats().get(4).unwrap();
    assert_eq!((p4.field_goal_attempts, p4.field_goals_made), (1, 1));
    assert!(p4.points > 0);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_jitter_never_changes_holder() {
    let mut session = GameSession::new(&Config::default());
    feed(&mut session, &held_by(1, &[2]), 60);
    assert_eq!(session.possession().current_holder(), Some(1));

    for i in 0..240 {
        let frame = if (i / 4) % 2 == 0 {
            held_by(2, &[1])
        } else {
            held_by(1, &[2])
        };
        session.process_frame(&frame);
        assert_eq!(
            session.possession().current_holder(),
            Some(1),
            "holder changed at jitter frame {}",
            i
        );
    }

    assert!(without_dribbles(session.events()).is_empty());
}

#[test]
fn test_every_opponent_steal_has_one_turnover() {
    let mut session = GameSession::new(&Config::default());
    for holder in [2, 3, 4, 5, 6] {
        feed(&mut session, &held_by(holder, &[]), 30);
    }

    let events = session.events();
    let steals: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == EventType::Steal)
        .collect();
    assert_eq!(steals.len(), 4);
    for steal in steals {
        let matching = events
            .iter()
            .filter(|e| e.event_type == EventType::Turnover && e.time == steal.time)
            .count();
        assert_eq!(matching, 1, "steal at {:.2}s", steal.time);
    }
}

#[test]
fn test_stats_never_decrease() {
    let mut session = GameSession::new(&Config::default());
    let script: Vec<FrameState> = [2, 4, 3, 3, 5, 2]
        .iter()
        .flat_map(|id| vec![held_by(*id, &[]); 25])
        .chain(vec![loose_ball(); 80])
        .chain(vec![held_by(7, &[]); 30])
        .collect();

    let mut last: Vec<(PlayerId, [u32; 10])> = Vec::new();
    for frame in &script {
        session.process_frame(frame);
        for (id, before) in &last {
            let now = counters(session.stats().get(*id).expect("players are never removed"));
            for (a, b) in before.iter().zip(now.iter()) {
                assert!(b >= a, "counter for player {} went down", id);
            }
        }
        last = session
            .stats()
            .players()
            .map(|p| (p.player_id, counters(p)))
            .collect();
    }
    assert!(!last.is_empty());
}

#[test]
fn test_zero_frames_yield_empty_output() {
    let mut session = GameSession::new(&Config::default());
    let mut source = InMemorySource::new(Vec::new());
    session.run(&mut source, &AtomicBool::new(false)).unwrap();

    let report = session.finish("nothing");
    assert!(report.events.is_empty());
    assert!(report.stats.is_empty());
    assert!(report.team_totals.is_empty());
}

#[test]
fn test_empty_and_malformed_frames_are_absence() {
    let mut session = GameSession::new(&Config::default());
    feed(&mut session, &held_by(2, &[]), 30);
    let events = feed(&mut session, &FrameState::default(), 30);
    assert!(without_dribbles(&events).is_empty());
    assert_eq!(session.possession().current_holder(), Some(2));
}

// ============================================================================
// FILE ROUND TRIP
// ============================================================================

fn jsonl_frame(holder: PlayerId) -> String {
    serde_json::json!({
        "ball": [{"bounding_box": [194.0, 394.0, 206.0, 406.0], "confidence": 0.9}],
        "rink": [{"bounding_box": [880.0, 90.0, 920.0, 110.0], "confidence": 0.8}],
        "player": [{"bounding_box": [180.0, 350.0, 220.0, 450.0], "confidence": 0.9, "user_id": holder}]
    })
    .to_string()
}

#[test]
fn test_detection_log_to_report() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("game.jsonl");
    {
        let mut f = std::fs::File::create(&log_path).unwrap();
        for _ in 0..45 {
            writeln!(f, "{}", jsonl_frame(2)).unwrap();
        }
        for _ in 0..45 {
            writeln!(f, "{}", jsonl_frame(4)).unwrap();
        }
    }

    let config = Config::default();
    let mut log = DetectionLog::open(&log_path, DetectionAdapter::new(&config.detection)).unwrap();
    let mut session = GameSession::new(&config);
    session.run(&mut log, &AtomicBool::new(false)).unwrap();
    let report = session.finish("game.jsonl");

    assert_eq!(report.frames_processed, 90);
    assert_eq!(report.duration_secs, 3.0);
    assert_eq!(report.count_of(EventType::Pass), 1);

    let out = dir.path().join("out");
    let path = report.write_json(&out, "game").unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["stats"]["2"]["assists"], 1);
    assert_eq!(written["source"], "game.jsonl");
}

#[test]
fn test_malformed_detections_do_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("noisy.jsonl");
    let flat_holder_4 = serde_json::json!({
        "detections": [
            {"class": "ball", "bounding_box": [194.0, 394.0, 206.0, 406.0], "confidence": 0.9},
            {"class": "player", "confidence": 0.9},
            {"class": "player", "bounding_box": [180.0, 350.0, 220.0, 450.0], "player_id": "4"}
        ]
    })
    .to_string();
    {
        let mut f = std::fs::File::create(&log_path).unwrap();
        for _ in 0..45 {
            writeln!(f, "{}", jsonl_frame(2)).unwrap();
        }
        writeln!(
            f,
            r#"{{"ball": [{{"bounding_box": [194, 394, 206, 406]}}], "player": [{{"confidence": 0.9, "player_id": 1}}]}}"#
        )
        .unwrap();
        writeln!(f, r#"{{"ball": null, "player": "oops"}}"#).unwrap();
        for _ in 0..45 {
            writeln!(f, "{}", flat_holder_4).unwrap();
        }
    }

    let config = Config::default();
    let mut log = DetectionLog::open(&log_path, DetectionAdapter::new(&config.detection)).unwrap();
    let mut session = GameSession::new(&config);
    session.run(&mut log, &AtomicBool::new(false)).unwrap();

    assert_eq!(session.frames_processed(), 92);
    let passes: Vec<_> = session
        .events()
        .iter()
        .filter(|e| e.event_type == EventType::Pass)
        .collect();
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0].details, EventDetails::Pass { from: 2, to: 4 });
}

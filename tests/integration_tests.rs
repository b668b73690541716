//! Integration tests for go-record
//!
//! These drive the `Game` facade through whole editing sessions: playing
//! with a clock, restoring it from the record, editing setup and cutting
//! the tree.

use go_record::board::{Board, GoColor, Goban, Move, Point};
use go_record::clock::{Clock, ManualTimeSource};
use go_record::game::Game;
use go_record::node_util;
use go_record::time_settings::TimeSettings;
use go_record::tree::{GameInfo, GameTree};

// =============================================================================
// Helper functions
// =============================================================================

fn pt(s: &str) -> Point {
    Point::parse(s, 9).unwrap()
}

/// Play alternating moves starting with the color to move.
fn play_all(game: &mut Game, moves: &[&str]) {
    for vertex in moves {
        let mv = Move::parse(game.to_move(), vertex, game.size()).unwrap();
        game.play(mv);
    }
}

fn timed_game(settings: &str) -> (Game, ManualTimeSource) {
    let time = ManualTimeSource::new();
    let info = GameInfo {
        komi: Some(6.5),
        time_settings: Some(settings.parse::<TimeSettings>().unwrap()),
        ..GameInfo::default()
    };
    let game = Game::with_parts(
        Goban::new(9),
        GameTree::with_game_info(9, info),
        Clock::with_time_source(time.clone()),
    );
    (game, time)
}

// =============================================================================
// Playing with a clock
// =============================================================================

#[test]
fn test_play_records_time_left() {
    let (mut game, time) = timed_game("5");
    game.start_clock();
    time.advance(10_000);
    game.play(Move::play(GoColor::Black, pt("E5")));
    time.advance(4_000);
    game.play(Move::play(GoColor::White, pt("C3")));

    let white_node = game.current();
    let black_node = game.tree().node(white_node).father().unwrap();
    assert_eq!(game.tree().node(black_node).time_left(GoColor::Black), Some(290_000));
    assert_eq!(game.tree().node(white_node).time_left(GoColor::White), Some(296_000));
    // sudden death never records moves left
    assert_eq!(game.tree().node(white_node).moves_left(GoColor::White), None);
    assert_eq!(game.clock().running_color(), Some(GoColor::Black));
}

#[test]
fn test_restore_clock_after_navigation() {
    let (mut game, time) = timed_game("5");
    game.start_clock();
    for (vertex, think) in [("E5", 10_000), ("C3", 4_000), ("G7", 20_000), ("C7", 1_000)] {
        time.advance(think);
        let mv = Move::parse(game.to_move(), vertex, 9).unwrap();
        game.play(mv);
    }
    assert_eq!(game.clock().time_left(GoColor::Black), Some(270_000));

    game.backward(2);
    game.restore_clock();
    {
        let clock = game.clock();
        assert!(!clock.is_running());
        assert_eq!(clock.time_left(GoColor::Black), Some(290_000));
        assert_eq!(clock.time_left(GoColor::White), Some(296_000));
    }

    // time passing while halted is not counted
    time.advance(60_000);
    assert_eq!(game.clock().time_left(GoColor::Black), Some(290_000));
    game.start_clock();
    time.advance(5_000);
    assert_eq!(game.clock().time_left(GoColor::Black), Some(285_000));
}

#[test]
fn test_restore_clock_uses_new_time_settings() {
    let (mut game, time) = timed_game("5");
    game.start_clock();
    time.advance(10_000);
    play_all(&mut game, &["E5"]);
    game.set_time_settings(Some(TimeSettings::new(600_000)));
    game.restore_clock();
    // snapshots are remaining time and come back unchanged
    let clock = game.clock();
    assert_eq!(clock.time_settings(), Some(&TimeSettings::new(600_000)));
    assert_eq!(clock.time_left(GoColor::Black), Some(290_000));
    assert_eq!(clock.time_left(GoColor::White), Some(600_000));
}

#[test]
fn test_clock_without_settings_counts_up() {
    let time = ManualTimeSource::new();
    let mut game = Game::with_parts(
        Goban::new(9),
        GameTree::new(9),
        Clock::with_time_source(time.clone()),
    );
    game.start_clock();
    time.advance(75_000);
    assert_eq!(game.clock().time_string(GoColor::Black), "01:15");
    game.play(Move::play(GoColor::Black, pt("E5")));
    assert_eq!(game.current_node().time_left(GoColor::Black), None);
    assert!(!game.clock().lost_on_time(GoColor::Black));
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn test_setup_matching_father_is_noop() {
    let mut game = Game::new(9);
    play_all(&mut game, &["E5", "C3"]);
    game.setup(pt("E5"), GoColor::Black);
    assert!(!game.current_node().has_setup());
    game.setup(pt("G7"), GoColor::White);
    assert_eq!(game.current_node().setup(GoColor::White), &[pt("G7")]);
    assert_eq!(game.board().color(pt("G7")), GoColor::White);
}

#[test]
fn test_truncate_scenario() {
    let mut game = Game::new(9);
    play_all(&mut game, &["E5", "C3", "G7"]);
    let c = game.current();
    let b = game.tree().node(c).father().unwrap();
    let a = game.tree().node(b).father().unwrap();

    game.backward(1);
    assert_eq!(game.current(), b);
    game.forward(1);
    assert_eq!(game.current(), c);

    game.truncate();
    assert_eq!(game.current(), b);
    assert!(!game.tree().contains(c));
    assert_eq!(game.tree().node(a).children(), &[b]);
    assert_eq!(game.tree().node_count(), 3);
}

#[test]
fn test_variation_editing() {
    let mut game = Game::new(9);
    play_all(&mut game, &["E5", "C3", "G7"]);
    game.backward(2);
    play_all(&mut game, &["D4", "F6"]);
    let side = game.current();
    assert!(!node_util::is_in_main_variation(game.tree(), side));
    assert_eq!(node_util::variation_string(game.tree(), side), "2");

    game.make_main_variation();
    assert!(node_util::is_in_main_variation(game.tree(), side));
    assert_eq!(node_util::variation_string(game.tree(), side), "1");

    game.keep_only_main_variation();
    assert_eq!(game.current(), side);
    assert_eq!(game.tree().node_count(), 4);
    assert!(!game.tree().has_variations());
    assert_eq!(game.board().color(pt("C3")), GoColor::Empty);
    assert_eq!(game.board().color(pt("F6")), GoColor::Black);
}

#[test]
fn test_capture_survives_navigation() {
    let mut game = Game::new(9);
    play_all(&mut game, &["B1", "A1", "A2"]);
    assert_eq!(game.board().color(pt("A1")), GoColor::Empty);
    assert_eq!(game.board().captured(GoColor::Black), 1);
    game.backward(1);
    assert_eq!(game.board().color(pt("A1")), GoColor::White);
    game.forward(1);
    assert_eq!(game.board().color(pt("A1")), GoColor::Empty);
}

#[test]
#[should_panic(expected = "not part of this game's tree")]
fn test_goto_node_of_other_game_panics() {
    let mut first = Game::new(9);
    let mut second = Game::new(9);
    play_all(&mut second, &["E5"]);
    first.goto_node(second.current());
}

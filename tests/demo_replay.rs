use bracket_geometry::prelude::Point;
use sketchbook::{
    ecs::Outcome,
    map::{Level, Thing},
    render::ascii_board,
    scripted_input::MoveScript,
    session::PuzzleSession,
    words::Noun,
};

fn play(script: &str) -> PuzzleSession {
    let mut session = PuzzleSession::new(Level::demo()).unwrap();
    session.run_script(MoveScript::parse(script)).unwrap();
    session
}

fn find(session: &PuzzleSession, noun: Noun) -> Vec<Point> {
    session
        .world()
        .things()
        .into_iter()
        .filter(|(_, thing, _)| *thing == Thing::Object(noun))
        .map(|(point, _, _)| point)
        .collect()
}

#[test_log::test]
fn walking_around_the_wall_reaches_the_flag() {
    let session = play("# over the wall\nwww\nddddddd\nsss\n");
    assert_eq!(session.outcome(), Outcome::Won);
    assert_eq!(find(&session, Noun::Baba), vec![Point::new(10, 5)]);
}

#[test]
fn the_rock_stops_at_the_wall() {
    let session = play("ddd");
    assert_eq!(session.outcome(), Outcome::Playing);
    assert_eq!(find(&session, Noun::Baba), vec![Point::new(5, 5)]);
    assert_eq!(find(&session, Noun::Rock), vec![Point::new(6, 5)]);
}

#[test]
fn undo_walks_back_through_a_replay() {
    let session = play("dd zz");
    assert_eq!(find(&session, Noun::Baba), vec![Point::new(4, 5)]);
    assert_eq!(find(&session, Noun::Rock), vec![Point::new(5, 5)]);
}

#[test]
fn restart_resets_the_board() {
    let session = play("wwwr");
    assert_eq!(find(&session, Noun::Baba), vec![Point::new(3, 5)]);
    assert_eq!(session.world().turn(), 0);
}

#[test]
fn demo_survives_a_json_round_trip() {
    let json = Level::demo().to_json().unwrap();
    let level = Level::from_json(&json).unwrap();
    assert_eq!(level, Level::demo());
}

#[test]
fn headless_board_shows_the_moved_rock() {
    let session = play("ddd");
    let board = ascii_board(session.world());
    let row: &str = board.lines().nth(5).unwrap();
    let expected: String = ".....@o#..F.."
        .chars()
        .map(|glyph| format!("  {glyph}   "))
        .collect();
    assert_eq!(row, expected.trim_end());
}

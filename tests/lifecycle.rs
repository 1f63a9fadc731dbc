/**
 * Session lifecycle across every engine.
 *
 * Each game is driven by a script that is guaranteed to end the run, and the
 * host callback must fire exactly once with the score the session reports.
 * Unmounting must never call back, and nothing after game over reaches the
 * engine.
 */
use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use mini_arcade::sim::{Direction, Engine, GameKind, GamePhase, GridPos, InputEvent, Key, Session};

type Calls = Rc<RefCell<Vec<u64>>>;

fn mount(kind: GameKind, seed: u64) -> (Session, Calls) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let session = Session::mount(kind, seed, 8, move |score| sink.borrow_mut().push(score))
        .expect("mount");
    (session, calls)
}

/// Input that forces `kind` to finish: no dodging, one flap, a parked paddle,
/// gravity only, or cycling slides until the board locks
fn script(kind: GameKind, frame: u64) -> Vec<InputEvent> {
    match kind {
        GameKind::Runner | GameKind::Snake | GameKind::Blocks => Vec::new(),
        GameKind::Flappy if frame == 0 => vec![InputEvent::Tap],
        GameKind::Flappy => Vec::new(),
        GameKind::Paddle if frame == 0 => vec![InputEvent::KeyDown(Key::Up)],
        GameKind::Paddle => Vec::new(),
        GameKind::Merge => {
            let key = match Direction::ALL[(frame % 4) as usize] {
                Direction::Up => Key::Up,
                Direction::Down => Key::Down,
                Direction::Left => Key::Left,
                Direction::Right => Key::Right,
            };
            vec![InputEvent::KeyDown(key)]
        }
    }
}

fn frame_ms(kind: GameKind) -> f64 {
    match kind {
        // Long frames so gravity drops a row every few frames
        GameKind::Blocks => 250.0,
        _ => 16.0,
    }
}

fn play_out(kind: GameKind, seed: u64) -> (Session, Calls) {
    let (mut session, calls) = mount(kind, seed);
    let mut frame = 0;
    while session.is_running() && frame < 200_000 {
        for event in script(kind, frame) {
            session.input(event);
        }
        session.frame(frame_ms(kind));
        frame += 1;
    }
    (session, calls)
}

#[test]
fn every_game_reports_exactly_once() {
    for kind in GameKind::ALL {
        let (mut session, calls) = play_out(kind, 42);
        assert!(!session.is_running(), "{kind} never finished");
        assert_eq!(session.phase(), GamePhase::GameOver, "{kind}");

        let final_score = session.final_score().expect("final score");
        assert_eq!(*calls.borrow(), vec![final_score], "{kind}");
        assert_eq!(session.score(), final_score, "{kind}");

        // Nothing after game over reaches the engine or the callback
        let snapshot = session.snapshot();
        for frame in 0..50 {
            for event in script(kind, frame) {
                session.input(event);
            }
            session.input(InputEvent::Tap);
            assert_eq!(session.frame(1000.0), 0);
        }
        assert_eq!(session.snapshot(), snapshot, "{kind}");
        assert_eq!(calls.borrow().len(), 1, "{kind}");
        session.unmount();
        assert_eq!(calls.borrow().len(), 1, "{kind}");
    }
}

#[test]
fn unmount_mid_run_never_reports() {
    for kind in GameKind::ALL {
        let (mut session, calls) = mount(kind, 5);
        for frame in 0..30 {
            for event in script(kind, frame) {
                session.input(event);
            }
            session.frame(16.0);
        }
        if session.is_running() {
            session.unmount();
            assert!(calls.borrow().is_empty(), "{kind}");
        }
    }
}

#[test]
fn prebuilt_engine_reports_its_own_score() {
    let mut engine = Engine::new(GameKind::Snake, 3);
    if let Engine::Snake(game) = &mut engine {
        game.score = 7;
        game.direction = Direction::Up;
        // Off the straight path to the top wall
        game.food = Some(GridPos::new(0, game.height - 1));
    }
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let mut session =
        Session::with_engine(engine, 8, move |score| sink.borrow_mut().push(score)).unwrap();
    while session.is_running() {
        session.frame(200.0);
    }
    assert_eq!(*calls.borrow(), vec![7]);
}

fn any_event() -> impl Strategy<Value = InputEvent> {
    let key = prop_oneof![
        Just(Key::Up),
        Just(Key::Down),
        Just(Key::Left),
        Just(Key::Right),
        Just(Key::Space),
    ];
    prop_oneof![
        key.clone().prop_map(InputEvent::KeyDown),
        key.prop_map(InputEvent::KeyUp),
        Just(InputEvent::Tap),
    ]
}

proptest! {
    #[test]
    fn callback_fires_at_most_once(
        kind_idx in 0usize..6,
        seed in any::<u64>(),
        frames in prop::collection::vec(
            (prop::collection::vec(any_event(), 0..3), 1.0f64..400.0),
            1..300,
        ),
    ) {
        let kind = GameKind::ALL[kind_idx];
        let (mut session, calls) = mount(kind, seed);

        for (events, elapsed) in frames {
            let was_running = session.is_running();
            for event in events {
                session.input(event);
            }
            let ticks = session.frame(elapsed);
            if !was_running {
                prop_assert_eq!(ticks, 0);
            }
            prop_assert!(calls.borrow().len() <= 1);
        }

        match session.final_score() {
            Some(score) => {
                prop_assert!(!session.is_running());
                prop_assert_eq!(calls.borrow().clone(), vec![score]);
            }
            None => {
                prop_assert!(session.is_running());
                prop_assert!(calls.borrow().is_empty());
                session.unmount();
                prop_assert!(calls.borrow().is_empty());
            }
        }
    }
}

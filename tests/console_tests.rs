//! Console front end tests.
//!
//! Each test feeds a scripted sequence of replies and checks the printed
//! transcript and the resulting engine state.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use mswpr::msw_cli::Console;
use mswpr::msw_store::{WORST_TIME, parse_time};
use mswpr::{BestTimes, CellView, Config, GameSession, GameStatus, MineLayout};

fn config_in(dir: &Path) -> Config {
    Config {
        maps_dir: dir.to_path_buf(),
        ..Config::default()
    }
}

fn run_script(cfg: Config, script: &str) -> (String, Option<GameStatus>, BestTimes) {
    let mut out = Vec::new();
    let mut console = Console::new(
        Cursor::new(script.to_string()),
        &mut out,
        cfg,
        BestTimes::default(),
        StdRng::seed_from_u64(11),
    );
    console.run().unwrap();
    let status = console.game().map(|g| g.status());
    let best = console.best_times().clone();
    drop(console);
    (String::from_utf8(out).unwrap(), status, best)
}

/// The Beginner board the console deals first with the seed `run_script` uses.
fn first_beginner_layout() -> MineLayout {
    MineLayout::generate(9, 9, 10, &mut StdRng::seed_from_u64(11)).unwrap()
}

/// Moves that win `layout`: flag every mine, then declare each square that
/// is still hidden safe.
fn winning_moves(layout: &MineLayout) -> String {
    let mut game = GameSession::new(layout.clone());
    let mut script = String::new();
    for (r, c) in layout.mine_positions() {
        game.flag(r, c).unwrap();
        script += &format!("{r}\n{c}\nf\n");
    }
    for r in 0..layout.rows() {
        for c in 0..layout.cols() {
            if game.status() == GameStatus::InProgress && game.cell_view(r, c) == Ok(CellView::Hidden) {
                game.reveal(r, c).unwrap();
                script += &format!("{r}\n{c}\nd\n");
            }
        }
    }
    assert_eq!(game.status(), GameStatus::Won);
    script
}

/// Winning a preset game records and saves the tier's best time.
#[test]
fn test_preset_win_records_best_time() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());
    let path = cfg.best_times_path();
    let script = format!("n\n0\np\n{}q\n", winning_moves(&first_beginner_layout()));
    let (out, status, best) = run_script(cfg, &script);

    assert!(out.contains("New Beginner game: 9x9 with 10 mines."), "{out}");
    assert!(out.contains("Congratulations! You won!"), "{out}");
    assert!(out.contains("New best time!"), "{out}");
    assert!(best.get(0).unwrap() < WORST_TIME);
    assert_eq!(status, Some(GameStatus::InProgress));

    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4, "{text}");
    assert_eq!(parse_time(lines[0]).unwrap(), best.get(0).unwrap());
    assert_eq!(&lines[1..], ["100:00", "100:00", "100:00"]);
}

/// Replaying a lost preset board can be won but never sets a best time.
#[test]
fn test_replay_after_loss_records_no_best_time() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());
    let path = cfg.best_times_path();
    let layout = first_beginner_layout();
    let (mr, mc) = layout.mine_positions().next().unwrap();
    let script = format!("n\n0\np\n{mr}\n{mc}\nd\np\n{}q\n", winning_moves(&layout));
    let (out, status, best) = run_script(cfg, &script);

    assert!(out.contains("Oops! You hit a mine! Game over."), "{out}");
    assert!(out.contains("Congratulations! You won!"), "{out}");
    assert!(!out.contains("New best time!"), "{out}");
    assert_eq!(best.get(0), Some(WORST_TIME));
    assert_eq!(status, Some(GameStatus::InProgress));
    assert!(!path.exists());
}

/// Declaring a flagged square safe explains why nothing happened.
#[test]
fn test_declare_flagged_square_safe_is_explained() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("map4.txt"), "01\n00\n").unwrap();

    let script = "l\n4\np\n1\n1\nf\n1\n1\nd\nq\nq\n";
    let (out, status, _) = run_script(config_in(dir.path()), script);

    assert!(out.contains("Square (1,1) is flagged. Remove the flag before declaring it safe."), "{out}");
    assert!(!out.contains("Oops!"), "{out}");
    assert_eq!(status, Some(GameStatus::InProgress));
}

/// Load a map and play it to a win.
#[test]
fn test_load_map_and_win() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("map1.txt"), "01\n00\n").unwrap();

    let script = "l\n1\np\n0\n0\nd\n1\n0\nd\n1\n1\nd\n0\n1\nf\nq\n";
    let (out, status, _) = run_script(config_in(dir.path()), script);

    assert!(out.contains("Available maps: 1"), "{out}");
    assert!(out.contains("Map 1 loaded."), "{out}");
    assert!(out.contains("Congratulations! You won!"), "{out}");
    // The finished board is replaced by a fresh replay of the same map
    assert_eq!(status, Some(GameStatus::InProgress));
}

/// A missing map is reported and the menu carries on.
#[test]
fn test_missing_map_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (out, status, _) = run_script(config_in(dir.path()), "l\n7\np\nq\n");

    assert!(out.contains("map7.txt not found."), "{out}");
    assert!(out.contains("You must start a game or load a map first."), "{out}");
    assert_eq!(status, None);
}

/// Hitting a mine prints the loss message and shows the mines.
#[test]
fn test_loss_shows_mines() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("map2.txt"), "100\n000\n001\n").unwrap();

    let (out, _, _) = run_script(config_in(dir.path()), "l\n2\np\n0\n0\nd\nq\n");

    assert!(out.contains("Oops! You hit a mine! Game over."), "{out}");
    assert!(out.contains(" 0 !  \n"), "{out}");
    assert!(out.contains(" 2   *\n"), "{out}");
}

/// Bad coordinates and moves are re-prompted, engine errors are printed.
#[test]
fn test_invalid_entries_reprompt() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("map3.txt"), "01\n00\n").unwrap();

    let script = "x\nl\n3\np\n5\n0\n0\nz\nr\nq\nq\n";
    let (out, status, _) = run_script(config_in(dir.path()), script);

    assert!(out.contains("Invalid entry. Must be 'n', 'l', 'p', 'b', or 'q'."), "{out}");
    assert!(out.contains("Invalid entry. Must be in 0-1."), "{out}");
    assert!(out.contains("Invalid entry. Must be 'f', 'r', or 'd'."), "{out}");
    assert!(out.contains("only flagged cells can be unflagged"), "{out}");
    assert_eq!(status, Some(GameStatus::InProgress));
}

/// A preset game is generated with the preset size.
#[test]
fn test_new_preset_game() {
    let dir = tempfile::tempdir().unwrap();
    let (out, status, best) = run_script(config_in(dir.path()), "n\n1\nq\n");

    assert!(out.contains("New Intermediate game: 16x16 with 40 mines."), "{out}");
    assert_eq!(status, Some(GameStatus::InProgress));
    assert_eq!(best.get(1), Some(WORST_TIME));
}

/// A custom game that cannot be generated is reported, not fatal.
#[test]
fn test_invalid_custom_game_reported() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        custom_rows: 2,
        custom_cols: 2,
        custom_mines: 4,
        ..config_in(dir.path())
    };
    let (out, status, _) = run_script(cfg, "n\nc\nq\n");

    assert!(out.contains("invalid board configuration: 2x2 with 4 mines"), "{out}");
    assert_eq!(status, None);
}

/// Best times are listed per tier.
#[test]
fn test_best_times_listing() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, best) = run_script(config_in(dir.path()), "b\nq\n");

    assert!(out.contains("Beginner     100:00"), "{out}");
    assert!(out.contains("Master       100:00"), "{out}");
    assert_eq!(best.get(0), Some(WORST_TIME));
    assert!(best.get(0).unwrap() > Duration::ZERO);
}

/// End of input leaves the menu cleanly.
#[test]
fn test_end_of_input_quits() {
    let dir = tempfile::tempdir().unwrap();
    let (out, status, _) = run_script(config_in(dir.path()), "");

    assert!(out.starts_with("Welcome to Minesweeper!"), "{out}");
    assert_eq!(status, None);
}

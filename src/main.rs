//! Ball Progress entry point
//!
//! Runs a headless session against the scripted simulation:
//!
//! ```text
//! ball-progress [normal|challenge] [seed] [set.json] [settings.json]
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};

use ball_progress::audio::Jukebox;
use ball_progress::demo::FileRecorder;
use ball_progress::lang::Untranslated;
use ball_progress::sim::ScriptedSim;
use ball_progress::{Level, LevelSet, Mode, Progress, Services, Settings, Status, mode_to_str};

/// Give up after this many level attempts
const MAX_ATTEMPTS: u32 = 200;

fn main() {
    env_logger::init();
    log::info!("Ball Progress (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = args.first().and_then(|s| Mode::from_str(s)).unwrap_or_default();
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(12345);
    let set_path = args.get(2).map(PathBuf::from);
    let settings = args
        .get(3)
        .map(|p| Settings::load(Path::new(p)))
        .unwrap_or_default();

    if let Err(e) = run(mode, seed, set_path.as_deref(), &settings) {
        log::error!("Session failed: {}", e);
        std::process::exit(1);
    }
}

fn run(mode: Mode, seed: u64, set_path: Option<&Path>, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let data_dir = std::env::temp_dir().join("ball-progress");
    std::fs::create_dir_all(&data_dir)?;

    let set = match set_path {
        Some(path) => LevelSet::load(path)?,
        None => builtin_set(),
    };
    let score_file = data_dir.join(format!("scores-{}.json", set.name.to_lowercase()));
    let mut set = set.with_score_file(score_file);
    set.load_scores()?;

    let mut demo = FileRecorder::new(data_dir.join("replays"));
    let mut sim = ScriptedSim::new(seed);
    let mut music = Jukebox::new(settings.effective_music_volume());

    macro_rules! svc {
        () => {
            Services {
                store: &mut set,
                demo: &mut demo,
                sim: &mut sim,
                config: settings,
                music: &mut music,
            }
        };
    }

    println!(
        "{} - {} (seed {})",
        set.name,
        mode_to_str(mode, true, &Untranslated),
        seed
    );

    let mut progress = Progress::new(mode);
    progress.init(mode);
    let first = set.first();
    progress.play(&mut svc!(), first)?;

    for _ in 0..MAX_ATTEMPTS {
        let status = loop {
            progress.step(&mut svc!());
            if let Some(status) = sim.tick() {
                break status;
            }
        };
        progress.stat(&mut svc!(), status)?;

        let name = progress
            .level()
            .and_then(|id| set.levels.get(id.0))
            .map(|l| l.name.as_str())
            .unwrap_or("?");
        println!(
            "  {:<12} {:<5} coins {:>3}  time {:>6}  | balls {:>2}  score {:>4}{}",
            name,
            format!("{:?}", status),
            progress.coins(),
            progress.timer(),
            progress.balls(),
            progress.score(),
            if progress.lvl_high() { "  (new record)" } else { "" }
        );

        if progress.done() {
            progress.stop(&mut svc!());
            progress.exit(&mut svc!());
            println!("Set complete!{}", if progress.set_high() { " New set record!" } else { "" });
            break;
        }
        if progress.dead() {
            progress.stop(&mut svc!());
            println!("Out of balls.");
            break;
        }
        if progress.last() {
            progress.stop(&mut svc!());
            println!("Final level cleared.");
            break;
        }

        if progress.status() == Status::Goal && progress.next_avail(&set) {
            progress.next(&mut svc!())?;
        } else if progress.same_avail() {
            progress.same(&mut svc!())?;
        } else {
            progress.stop(&mut svc!());
            break;
        }
    }

    println!(
        "Score {}  Time {:.2}s  Bonus levels {}",
        progress.score(),
        progress.times() as f32 / 100.0,
        progress.bonus()
    );
    if let Some(best) = set.scores.most_coins.best() {
        println!(
            "Set record: {} with {} coins in {:.2}s",
            best.player,
            best.coins,
            best.timer as f32 / 100.0
        );
    }
    Ok(())
}

/// Small set used when no set file is given
fn builtin_set() -> LevelSet {
    LevelSet::new(
        "Demo",
        vec![
            Level::new("Warm Up", "map-demo/warmup.sol")
                .with_goal(10)
                .with_song("bgm/track1.ogg"),
            Level::new("Switchback", "map-demo/switchback.sol")
                .with_goal(20)
                .with_time(9000)
                .with_song("bgm/track2.ogg"),
            Level::new("Hidden Loop", "map-demo/loop.sol")
                .with_song("bgm/track3.ogg")
                .bonus(),
            Level::new("Corkscrew", "map-demo/corkscrew.sol")
                .with_goal(25)
                .with_song("bgm/track2.ogg"),
            Level::new("Finale", "map-demo/finale.sol")
                .with_goal(30)
                .with_time(12000)
                .with_song("bgm/track4.ogg"),
        ],
    )
}

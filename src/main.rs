use std::{
    fs::File,
    mem,
    path::PathBuf,
    time::{Duration, Instant},
};

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use chrono::Local;
use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use sketchbook::{
    SketchError,
    chem::{self, Formula},
    ecs::Outcome,
    harvest::{COLLECTION_RANGE, Field, FieldConfig, Generation, Stockpile, Vec2},
    map::{Direction, Level},
    render::{
        ascii_board, draw_banner, draw_board, draw_field, draw_loading, draw_log, draw_rules,
        WORLD_UNITS_PER_CELL, draw_stockpile, element_details, element_table, field_viewport,
        formula_details,
    },
    scripted_input::MoveScript,
    session::{Command, PuzzleSession},
};

const SCREEN_HEIGHT: i32 = 50;
const BOARD_ORIGIN: Point = Point { x: 1, y: 2 };
const LOG_PANEL_START: i32 = SCREEN_HEIGHT - 6;
const LOG_MAX_ENTRIES: usize = 8;
const FIELD_TOP: i32 = 3;
const FIXED_STEP: Duration = Duration::from_millis(100);
const PAN_CELLS: f32 = 8.0;

#[derive(Parser, Debug)]
#[command(name = "sketchbook", version, about = "Small terminal game prototypes")]
struct Cli {
    /// Where log output goes; the terminal owns stdout.
    #[arg(long, default_value = "sketchbook.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Push words around to rewrite the rules of the level.
    Puzzle {
        /// Level JSON file. Defaults to the built-in demo.
        #[arg(long)]
        level: Option<PathBuf>,
        /// Moves to replay before handing over the keyboard.
        #[arg(long)]
        script: Option<PathBuf>,
        /// Replay the script and print the result instead of opening a window.
        #[arg(long)]
        headless: bool,
    },
    /// Generate a resource field in the background, then collect from it.
    Harvest {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Fraction of the full-size field to generate.
        #[arg(long, default_value_t = 0.01)]
        scale: f32,
    },
    /// Print the element table, one element, or a formula.
    Elements {
        #[arg(long)]
        element: Option<String>,
        #[arg(long)]
        formula: Option<String>,
    },
}

fn setup_logging(cli: &Cli) -> sketchbook::Result<()> {
    let file = File::create(&cli.log_file)?;
    WriteLogger::init(
        cli.log_level,
        ConfigBuilder::new()
            .set_target_level(LevelFilter::Error)
            .build(),
        file,
    )?;
    Ok(())
}

fn timestamped(entry: impl AsRef<str>) -> String {
    format!("[{}] {}", Local::now().format("%H:%M:%S"), entry.as_ref())
}

struct PuzzleState {
    session: PuzzleSession,
    script: Option<MoveScript>,
    message_log: Vec<String>,
}

impl GameState for PuzzleState {
    fn tick(&mut self, ctx: &mut BTerm) {
        if ctx.key == Some(VirtualKeyCode::Escape) {
            info!("puzzle closed at turn {}", self.session.world().turn());
            ctx.quit();
            return;
        }
        if let Some(command) = self.next_command(ctx) {
            self.apply(command);
        }
        ctx.cls();
        self.draw_scene(ctx);
    }
}

impl PuzzleState {
    fn new(session: PuzzleSession, script: Option<MoveScript>) -> Self {
        let mut state = Self {
            session,
            script,
            message_log: Vec::new(),
        };
        let name = state.session.world().name().to_string();
        state.push_log_entry(format!("Entered {name}"));
        state.flush_world_log();
        state
    }

    fn next_command(&mut self, ctx: &BTerm) -> Option<Command> {
        if let Some(script) = self.script.as_mut() {
            if let Some(command) = script.next_command() {
                return Some(command);
            }
            self.script = None;
            self.push_log_entry("Script finished");
        }
        let key = ctx.key?;
        match key {
            VirtualKeyCode::Left | VirtualKeyCode::A | VirtualKeyCode::H => {
                Some(Command::Step(Direction::Left))
            }
            VirtualKeyCode::Right | VirtualKeyCode::D | VirtualKeyCode::L => {
                Some(Command::Step(Direction::Right))
            }
            VirtualKeyCode::Up | VirtualKeyCode::W | VirtualKeyCode::K => {
                Some(Command::Step(Direction::Up))
            }
            VirtualKeyCode::Down | VirtualKeyCode::S | VirtualKeyCode::J => {
                Some(Command::Step(Direction::Down))
            }
            VirtualKeyCode::Period => Some(Command::Wait),
            VirtualKeyCode::Z => Some(Command::Undo),
            VirtualKeyCode::R => Some(Command::Restart),
            _ => None,
        }
    }

    fn apply(&mut self, command: Command) {
        let before = self.session.outcome();
        match self.session.apply(command) {
            Ok(outcome) => {
                match command {
                    Command::Undo => self.push_log_entry("Undid a turn"),
                    Command::Restart => self.push_log_entry("Restarted the level"),
                    _ => self.flush_world_log(),
                }
                if outcome != before {
                    info!("outcome changed from {before:?} to {outcome:?}");
                    if outcome == Outcome::Lost {
                        self.push_log_entry("Nothing is YOU");
                    }
                }
            }
            Err(err) => {
                error!("failed to apply {command:?}: {err}");
                self.push_log_entry(format!("Error: {err}"));
            }
        }
    }

    fn flush_world_log(&mut self) {
        for entry in self.session.world_mut().drain_log() {
            self.push_log_entry(entry);
        }
    }

    fn push_log_entry<S: AsRef<str>>(&mut self, entry: S) {
        self.message_log.insert(0, timestamped(entry));
        self.message_log.truncate(LOG_MAX_ENTRIES);
    }

    fn draw_scene(&self, ctx: &mut BTerm) {
        let world = self.session.world();
        let header = format!("{} - Turn {}", world.name(), world.turn());
        ctx.print_color_centered(0, RGB::named(YELLOW), RGB::named(BLACK), &header);

        draw_board(ctx, world, BOARD_ORIGIN);
        let below_board = BOARD_ORIGIN.y + world.bounds().height + 1;
        draw_banner(ctx, world.outcome(), below_board);
        let rules_top = below_board + 1;
        draw_rules(
            ctx,
            &world.rules(),
            BOARD_ORIGIN.x,
            rules_top,
            LOG_PANEL_START - rules_top - 3,
        );
        draw_log(ctx, &self.message_log, LOG_PANEL_START);
    }
}

enum HarvestPhase {
    Loading(Generation),
    Playing {
        field: Field,
        center: Vec2,
        stockpile: Stockpile,
        last_fixed_update: Instant,
    },
    Finished,
}

struct HarvestState {
    phase: HarvestPhase,
}

impl GameState for HarvestState {
    fn tick(&mut self, ctx: &mut BTerm) {
        ctx.cls();
        match &mut self.phase {
            HarvestPhase::Loading(generation) => {
                if ctx.key == Some(VirtualKeyCode::Escape) {
                    warn!("world generation cancelled");
                    generation.cancel();
                    self.phase = HarvestPhase::Finished;
                    ctx.quit();
                    return;
                }
                draw_loading(ctx, generation.progress());
                if generation.is_finished() {
                    self.finish_loading(ctx);
                }
            }
            HarvestPhase::Playing {
                field,
                center,
                stockpile,
                last_fixed_update,
            } => {
                let (width, height) = ctx.get_char_size();
                let view = field_viewport(*center, width as i32, height as i32 - FIELD_TOP);

                if last_fixed_update.elapsed() >= FIXED_STEP {
                    *last_fixed_update = Instant::now();
                    let emptied = field.update_depletion(&view);
                    if emptied > 0 {
                        debug!("{emptied} patches depleted");
                    }
                }

                let pan = PAN_CELLS * WORLD_UNITS_PER_CELL;
                match ctx.key {
                    Some(VirtualKeyCode::Escape) => {
                        info!(
                            "harvest closed with {} nodes left",
                            field.remaining()
                        );
                        ctx.quit();
                        return;
                    }
                    Some(VirtualKeyCode::Left | VirtualKeyCode::A | VirtualKeyCode::H) => {
                        center.x -= pan
                    }
                    Some(VirtualKeyCode::Right | VirtualKeyCode::D | VirtualKeyCode::L) => {
                        center.x += pan
                    }
                    Some(VirtualKeyCode::Up | VirtualKeyCode::W | VirtualKeyCode::K) => {
                        center.y -= pan
                    }
                    Some(VirtualKeyCode::Down | VirtualKeyCode::S | VirtualKeyCode::J) => {
                        center.y += pan
                    }
                    Some(VirtualKeyCode::Space) => {
                        let harvest = field.collect(&view, view.center(), COLLECTION_RANGE);
                        if !harvest.is_empty() {
                            debug!("collected {} nodes", harvest.total());
                        }
                        stockpile.add(&harvest);
                    }
                    _ => {}
                }

                let view = field_viewport(*center, width as i32, height as i32 - FIELD_TOP);
                draw_stockpile(ctx, stockpile, field, &view);
                draw_field(ctx, field, &view, FIELD_TOP, COLLECTION_RANGE);
            }
            HarvestPhase::Finished => ctx.quit(),
        }
    }
}

impl HarvestState {
    fn finish_loading(&mut self, ctx: &mut BTerm) {
        let HarvestPhase::Loading(generation) = mem::replace(&mut self.phase, HarvestPhase::Finished)
        else {
            return;
        };
        match generation.join() {
            Ok(Some(field)) => {
                info!(
                    "field ready: {} patches, {} nodes",
                    field.patches.len(),
                    field.nodes.len()
                );
                let center = field
                    .patches
                    .first()
                    .map(|patch| patch.base)
                    .unwrap_or(Vec2::ZERO);
                self.phase = HarvestPhase::Playing {
                    field,
                    center,
                    stockpile: Stockpile::default(),
                    last_fixed_update: Instant::now(),
                };
            }
            Ok(None) => ctx.quit(),
            Err(err) => {
                error!("world generation failed: {err}");
                ctx.quit();
            }
        }
    }
}

fn run_headless(session: &mut PuzzleSession, script: Option<MoveScript>) -> sketchbook::Result<()> {
    let outcome = match script {
        Some(script) => session.run_script(script)?,
        None => session.outcome(),
    };
    let world = session.world();
    println!("{} after {} turns", world.name(), world.turn());
    println!("Rules:");
    for rule in world.rules() {
        println!("  {rule}");
    }
    println!("Outcome: {outcome:?}");
    print!("{}", ascii_board(world));
    Ok(())
}

fn run_puzzle(
    level: Option<PathBuf>,
    script: Option<PathBuf>,
    headless: bool,
) -> BError {
    let level = match level {
        Some(path) => Level::load(&path)?,
        None => Level::demo(),
    };
    let script = script.map(MoveScript::from_file).transpose()?;
    if !headless && !level.fits_screen() {
        warn!(
            "level is {}x{}, larger than the screen can show",
            level.width, level.height
        );
    }
    let mut session = PuzzleSession::new(level)?;

    if headless {
        run_headless(&mut session, script)?;
        return Ok(());
    }

    let context = BTermBuilder::simple80x50()
        .with_title("Sketchbook - Puzzle")
        .build()?;
    main_loop(context, PuzzleState::new(session, script))
}

fn run_harvest(seed: u64, scale: f32) -> BError {
    let config = FieldConfig::default().with_seed(seed).scaled(scale);
    info!(
        "generating field with seed {seed} at scale {scale} ({} unit half extent)",
        config.half_extent
    );
    let generation = Generation::spawn(config)?;
    let context = BTermBuilder::simple80x50()
        .with_title("Sketchbook - Harvest")
        .build()?;
    main_loop(
        context,
        HarvestState {
            phase: HarvestPhase::Loading(generation),
        },
    )
}

fn run_elements(element: Option<String>, formula: Option<String>) -> sketchbook::Result<()> {
    if let Some(element) = element {
        let z = element
            .parse::<u8>()
            .ok()
            .filter(|z| chem::element_name(*z).is_some())
            .or_else(|| chem::atomic_number(&element))
            .ok_or(SketchError::UnknownElement(element))?;
        print!("{}", element_details(z));
    }
    if let Some(formula) = formula {
        let formula: Formula = formula.parse()?;
        print!("{}", formula_details(&formula));
    }
    Ok(())
}

fn main() -> BError {
    let cli = Cli::parse();
    setup_logging(&cli)?;
    info!("starting {:?}", cli.mode);

    match cli.mode {
        Mode::Puzzle {
            level,
            script,
            headless,
        } => run_puzzle(level, script, headless),
        Mode::Harvest { seed, scale } => run_harvest(seed, scale),
        Mode::Elements { element, formula } => {
            if element.is_none() && formula.is_none() {
                print!("{}", element_table());
                return Ok(());
            }
            run_elements(element, formula)?;
            Ok(())
        }
    }
}

//! Skirmish simulation
//! One AI-controlled base fights a static enemy base in the sandbox

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use clap::Parser;
use glam::Vec3;

use warband::core::error::Result;
use warband::core::types::UnitId;
use warband::engine::DecisionContext;
use warband::sandbox::{ProductionQueue, SandboxWorld, TaskBoard};
use warband::units::{Unit, UnitCategory, UnitType};
use warband::{MilitaryAi, MilitaryConfig};

/// Skirmish simulation - watch the military AI pick targets
#[derive(Parser, Debug)]
#[command(name = "skirmish_sim")]
#[command(about = "Run the military AI against a sandbox enemy base")]
struct Args {
    /// Random seed (overrides the profile's seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Path to a military TOML profile
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print quiet ticks too
    #[arg(long, default_value_t = false)]
    verbose: bool,

    /// Emit one JSON report per line instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

const MAP_SIZE: f32 = 2048.0;
const SPAWN_INTERVAL: u64 = 20;
const FACTORY: UnitId = UnitId(1);

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.verbose { "warband=debug" } else { "warband=info" })
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => MilitaryConfig::load(path)?,
        None => MilitaryConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut ai = MilitaryAi::new(config, MAP_SIZE, MAP_SIZE)?;
    let mut world = SandboxWorld::new(MAP_SIZE, MAP_SIZE);
    let board = Rc::new(RefCell::new(TaskBoard::new()));
    ai.add_observer(board.clone());
    let mut queue = ProductionQueue::new();

    world.place_friendly(FACTORY, factory(), Vec3::new(200.0, 0.0, 200.0));
    place_enemy_base(&mut world);
    let enemies_at_start = world.enemy_count();

    let mut next_id = 1000;
    let mut assignments = 0;
    for tick in 0..args.ticks {
        if tick % SPAWN_INTERVAL == 0 {
            let category = queue.drain().first().map(|r| r.categories).unwrap_or(UnitCategory::ASSAULT);
            let unit_type = template_for(category);
            let id = UnitId(next_id);
            next_id += 1;
            world.place_friendly(id, unit_type.clone(), Vec3::new(220.0, 0.0, 220.0));
            ai.unit_created(Unit::new(id, unit_type).built_by(FACTORY));
        }

        let intel = world.intel_snapshot();
        let report = {
            let mut tasks = board.borrow_mut();
            let mut ctx = DecisionContext {
                engine: &mut world,
                intel: &intel,
                tasks: &mut *tasks,
                wishlist: &mut queue,
            };
            ai.update(tick, &mut ctx)
        };
        assignments += report.assignments.len();

        if args.json {
            if args.verbose || !report.is_quiet() {
                println!("{}", serde_json::to_string(&report)?);
            }
        } else if args.verbose || !report.is_quiet() {
            for a in &report.assignments {
                println!(
                    "[{:>5}] {:?} {} -> {} (threat {:.1})",
                    tick,
                    a.kind,
                    a.group,
                    a.target.map_or_else(|| "-".to_string(), |t| t.to_string()),
                    a.threat
                );
            }
        }

        world.clear_orders();
        let destroyed = world.step(1);
        if !destroyed.is_empty() || tick % 10 == 0 {
            board.borrow_mut().sweep(&world, ai.registry_mut());
        }
        if world.enemy_count() == 0 {
            tracing::info!("Enemy base wiped out at tick {}", tick);
            break;
        }
    }

    if !args.json {
        println!();
        println!("=== Skirmish summary ===");
        println!("Enemies destroyed: {}/{}", enemies_at_start - world.enemy_count(), enemies_at_start);
        println!("Assignments:       {}", assignments);
        println!("Tasks completed:   {}", board.borrow().completed());
        println!(
            "Groups:            {} live, {} pooled, {} free",
            ai.registry().len(),
            ai.registry().pool_len(),
            ai.registry().free_slots()
        );
        for (name, stats) in ai.profiler().report() {
            println!("  {:<10} {:>6} calls, avg {:?}", name, stats.call_count, stats.avg_time());
        }
    }
    Ok(())
}

fn factory() -> Arc<UnitType> {
    Arc::new(UnitType::new("factory", UnitCategory::STATIC | UnitCategory::FACTORY).with_cost(300.0, 150.0))
}

fn template_for(category: UnitCategory) -> Arc<UnitType> {
    let land = UnitCategory::MOBILE | UnitCategory::LAND | UnitCategory::TECH1;
    let unit_type = if category.contains(UnitCategory::SCOUTER) {
        UnitType::new("flea", land | UnitCategory::SCOUTER)
            .with_power(4.0)
            .with_speed(6.0)
            .with_ranges(60.0, 0.0, 400.0)
    } else if category.contains(UnitCategory::ARTILLERY) {
        UnitType::new("thud", land | UnitCategory::ARTILLERY)
            .with_power(12.0)
            .with_speed(2.0)
            .with_ranges(300.0, 0.0, 300.0)
    } else if category.contains(UnitCategory::ANTIAIR) {
        UnitType::new("jethro", land | UnitCategory::ANTIAIR)
            .with_power(6.0)
            .with_speed(3.0)
            .with_ranges(500.0, 0.0, 300.0)
    } else {
        UnitType::new("stumpy", land | UnitCategory::ASSAULT)
            .with_power(15.0)
            .with_speed(3.0)
            .with_ranges(120.0, 0.0, 300.0)
    };
    Arc::new(unit_type.with_cost(100.0, 50.0).with_move_type(1, 0.5))
}

fn place_enemy_base(world: &mut SandboxWorld) {
    let mex = Arc::new(UnitType::new("mex", UnitCategory::STATIC | UnitCategory::MEXTRACTOR).with_cost(50.0, 50.0));
    let solar = Arc::new(UnitType::new("solar", UnitCategory::STATIC | UnitCategory::EMAKER).with_cost(80.0, 0.0));
    let lab = Arc::new(UnitType::new("lab", UnitCategory::STATIC | UnitCategory::FACTORY).with_cost(400.0, 200.0));
    let llt = Arc::new(
        UnitType::new("llt", UnitCategory::STATIC | UnitCategory::ATTACKER)
            .with_power(30.0)
            .with_ranges(200.0, 0.0, 300.0)
            .with_cost(150.0, 80.0),
    );

    let mut id = 500;
    let mut place = |world: &mut SandboxWorld, unit_type: &Arc<UnitType>, x: f32, z: f32| {
        world.place_enemy(UnitId(id), unit_type.clone(), Vec3::new(x, 0.0, z));
        id += 1;
    };
    place(world, &mex, 900.0, 400.0);
    place(world, &mex, 400.0, 1100.0);
    place(world, &mex, 1500.0, 1500.0);
    place(world, &solar, 1650.0, 1700.0);
    place(world, &solar, 1700.0, 1650.0);
    place(world, &lab, 1800.0, 1800.0);
    place(world, &llt, 1550.0, 1550.0);
    place(world, &llt, 1750.0, 1750.0);
}

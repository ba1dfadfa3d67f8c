use std::time::{Duration, Instant};

use anyhow::{ensure, Result};
use color_cube::{Palette, Propagation, SceneConfig};
use colorcube_engine::network::HubConfig;
use colorcube_host::Simulation;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "Color cube host",
    about = "Runs several participants of the shared color cube scene in one process"
)]
struct Opt {
    /// Number of participants
    #[structopt(short, long, default_value = "2")]
    peers: usize,

    /// Frames to run
    #[structopt(short, long, default_value = "600")]
    frames: u64,

    /// Frame on which replication comes online. Never, if unset.
    #[structopt(long)]
    online_at: Option<u64>,

    /// Each participant clicks the cube every this many frames (0 disables clicking)
    #[structopt(long, default_value = "90")]
    click_every: u64,

    /// Simulated frame rate
    #[structopt(long, default_value = "60")]
    fps: f32,

    /// Pace frames in real time instead of running as fast as possible
    #[structopt(long)]
    realtime: bool,

    /// Seed for the network's ordering and losses
    #[structopt(long, default_value = "0")]
    seed: u64,

    /// Probability of losing a broadcast message
    #[structopt(long, default_value = "0")]
    drop_rate: f64,

    /// hybrid, replicated or broadcast
    #[structopt(long, default_value = "hybrid")]
    propagation: Propagation,

    /// Comma-separated hex colors, e.g. "#FF0000,#00FF00"
    #[structopt(long)]
    palette: Option<Palette>,

    /// Frames to wait for synchronization before creating a local cube
    #[structopt(long, default_value = "300")]
    fallback_after: u64,
}

fn main() -> Result<()> {
    let args = Opt::from_args();

    // Set up logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    ensure!(args.fps > 0., "Frame rate must be positive");
    ensure!(
        (0. ..=1.).contains(&args.drop_rate),
        "Drop rate must be between 0 and 1"
    );

    let mut config = SceneConfig::default()
        .with_propagation(args.propagation)
        .with_fallback_after(args.fallback_after);
    if let Some(palette) = args.palette.clone() {
        config = config.with_palette(palette);
    }
    config.validate()?;

    let hub = HubConfig {
        seed: args.seed,
        drop_probability: args.drop_rate,
        ..Default::default()
    };
    let mut sim = Simulation::new(hub).with_fps(args.fps);
    if args.online_at == Some(0) {
        sim.set_online(true);
    }

    for _ in 0..args.peers {
        sim.add_peer(config.clone())?;
    }

    let target = Duration::from_secs_f32(1. / args.fps);
    for frame in 1..=args.frames {
        let start = Instant::now();

        if args.online_at == Some(frame) {
            sim.set_online(true);
        }

        // Stagger clicks so participants don't always collide
        if args.click_every > 0 {
            for (idx, peer) in sim.peers_mut().iter_mut().enumerate() {
                if (frame + idx as u64) % args.click_every == 0 && peer.click()? {
                    log::debug!("{:?} clicked on frame {}", peer.id(), frame);
                }
            }
        }

        sim.step()?;

        if args.realtime {
            if let Some(wait_time) = target.checked_sub(start.elapsed()) {
                std::thread::sleep(wait_time);
            }
        }
    }

    for peer in sim.peers_mut() {
        let id = peer.id();
        let phase = peer.phase();
        let index = peer.color_index();
        log::debug!(
            "{:?} component storage: {} bytes, sees players {:?}, {} greetings",
            id,
            peer.engine().ecs().estimate_mem_usage(),
            peer.players(),
            peer.greetings()
        );
        match peer.cube_color()? {
            Some(color) => println!("{:?}: {:?}, index {:?}, color {}", id, phase, index, color),
            None => println!("{:?}: {:?}, no cube", id, phase),
        }
    }

    Ok(())
}

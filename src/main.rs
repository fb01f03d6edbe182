//! Headless hat try-on demo over the simulated camera and detector.

use anyhow::Result;
use clap::Parser;
use hat_tryon::config::Config;
use hat_tryon::session::{Session, SessionBackends};
use hat_tryon::simulate::{BlankCamera, NullSurface, ScriptedSource, StubLoader};
use log::info;

/// The built-in overlay catalog; the demo swaps to the second entry midway.
const HATS: &[(&str, &str)] = &[
    ("Hat 1", "models/hat1.glb"),
    ("Hat 2", "models/hat2.glb"),
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of frames to simulate
    #[arg(short = 'n', long, default_value = "240")]
    frames: u32,

    /// Camera device id (default device if omitted)
    #[arg(long)]
    device: Option<String>,

    /// Initial overlay model path
    #[arg(short, long)]
    model: Option<String>,

    /// Vertical field of view in degrees
    #[arg(long)]
    fov: Option<f64>,

    /// List available camera devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Hat Try-On - headless demo");

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(device) = args.device {
        config.session.device_id = Some(device);
    }
    if let Some(model) = args.model {
        config.session.model_path = Some(model);
    }
    if let Some(fov) = args.fov {
        config.projection.vertical_fov_deg = fov;
    }

    let camera = BlankCamera::new(1280, 720);

    if args.list_devices {
        use hat_tryon::session::CameraProvider;
        for device in camera.list_devices()? {
            println!("{}\t{}", device.id, device.label);
        }
        return Ok(());
    }

    let backends = SessionBackends {
        camera: Box::new(camera),
        source: Box::new(ScriptedSource::new()),
        loader: Box::new(StubLoader::default()),
        surface: Box::new(NullSurface),
    };
    let mut session = Session::start(&config, backends)?;

    let swap_at = args.frames / 2;
    for frame in 0..args.frames {
        session.pump();

        if frame == swap_at {
            let (name, path) = HATS[1];
            info!("switching overlay to {name}");
            session.swap_model(path);
        }

        if frame % 30 == 0 {
            let state = session.presented();
            let (roll, pitch, yaw) = state.orientation.euler_angles();
            info!(
                "frame {frame}: visible={} pos=({:.3}, {:.3}, {:.3}) rpy=({:.1}, {:.1}, {:.1}) deg scale={:.3}",
                state.visible,
                state.position.x,
                state.position.y,
                state.position.z,
                roll.to_degrees(),
                pitch.to_degrees(),
                yaw.to_degrees(),
                state.scale,
            );
        }
    }

    session.shutdown();
    Ok(())
}

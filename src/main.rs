//! Headless cloudpick demo.
//!
//! Generates a random point cloud, plays a scripted modifier + drag over an
//! off-screen surface, and logs how many points the parallel scan selected.
//!
//! ```text
//! RUST_LOG=info cloudpick --points 2000000 --workers 8 --rect 200 150 600 450
//! ```

use std::path::PathBuf;

use clap::Parser;
use cloudpick::camera::{FrameContext, OrbitCamera};
use cloudpick::error::CloudpickError;
use cloudpick::input::{InputEvent, ModifierKey, Modifiers, MouseButton};
use cloudpick::options::Options;
use cloudpick::points::PointStore;
use cloudpick::selection::executor::select_sequential;
use cloudpick::selection::{SelectionQuery, SurfaceRect};
use cloudpick::session::SelectionSession;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use web_time::Duration;

/// Rectangle selection over a random point cloud
#[derive(Parser)]
#[command(name = "cloudpick", version, long_about = None)]
struct Cli {
    /// Number of random points
    #[arg(long, default_value_t = 1_000_000)]
    points: usize,

    /// Worker threads (0 = available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// TOML options preset
    #[arg(long)]
    options: Option<PathBuf>,

    /// Seed for the point generator
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Edge length of the cube the points are spread over
    #[arg(long, default_value_t = 100.0)]
    extent: f32,

    /// Surface size in pixels
    #[arg(
        long,
        num_args = 2,
        value_names = ["W", "H"],
        default_values_t = [800.0, 600.0]
    )]
    surface: Vec<f32>,

    /// Drag from (X0, Y0) to (X1, Y1) in surface pixels
    #[arg(
        long,
        num_args = 4,
        value_names = ["X0", "Y0", "X1", "Y1"],
        default_values_t = [200.0, 150.0, 600.0, 450.0]
    )]
    rect: Vec<f32>,

    /// Cross-check the parallel result against a single-threaded scan
    #[arg(long)]
    verify: bool,
}

fn scripted_drag(modifier: ModifierKey, rect: &[f32]) -> Vec<InputEvent> {
    let (x0, y0, x1, y1) = (rect[0], rect[1], rect[2], rect[3]);
    let held = Modifiers {
        shift: modifier == ModifierKey::Shift,
        control: modifier == ModifierKey::Control,
        alt: modifier == ModifierKey::Alt,
    };
    vec![
        InputEvent::ModifiersChanged(held),
        InputEvent::CursorMoved { x: x0, y: y0 },
        InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        },
        InputEvent::CursorMoved {
            x: (x0 + x1) * 0.5,
            y: (y0 + y1) * 0.5,
        },
        InputEvent::CursorMoved { x: x1, y: y1 },
        InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: false,
        },
        InputEvent::ModifiersChanged(Modifiers::default()),
    ]
}

fn run(cli: &Cli) -> Result<(), CloudpickError> {
    let mut options = match &cli.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    if let Some(workers) = cli.workers {
        options.selection.worker_count = workers;
    }

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let store = PointStore::random(cli.points, cli.extent, &mut rng)?;
    log::info!("generated {} points", store.len());

    let surface = SurfaceRect::from_size(cli.surface[0], cli.surface[1]);
    let mut camera = OrbitCamera::new(
        Vec3::ZERO,
        cli.extent,
        surface.width / surface.height,
        &options.camera,
    )
    .looking_at(Vec3::new(cli.extent, cli.extent, 0.0), Vec3::ZERO, Vec3::Z);

    let (mut session, mut reader) =
        SelectionSession::new(store.clone(), &options)?;
    let sender = session.input_sender();
    for event in scripted_drag(options.selection.modifier, &cli.rect) {
        let _ = sender.send(event);
    }
    let frame = FrameContext::from_camera(surface, &camera);
    let transitions = session.pump(&frame, &mut camera);
    log::debug!("{} gesture transitions", transitions.len());

    let mut reports = Vec::new();
    while session.in_flight() > 0 {
        reports.extend(session.update_frame());
        std::thread::sleep(Duration::from_millis(1));
    }

    let Some(report) = reports.pop() else {
        return match session.last_error() {
            Some(e) => Err(CloudpickError::Selection(e.clone())),
            None => {
                log::warn!("drag did not produce a query");
                Ok(())
            }
        };
    };
    log::info!(
        "query {} matched {} of {} points in {:?}",
        report.generation,
        report.count(),
        session.point_count(),
        report.elapsed
    );
    log::debug!("highlight uniform: {:?}", reader.read());

    if cli.verify {
        if let Some(rect) = session.gesture().rect() {
            let query = SelectionQuery::from_rect(&rect, frame.projection_view);
            let expected = select_sequential(&store, store.len(), &query);
            if expected == report.indices {
                log::info!("sequential scan agrees");
            } else {
                log::error!(
                    "sequential scan found {} points, parallel {}",
                    expected.len(),
                    report.count()
                );
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

mod config;

use clap::{Parser, Subcommand};
use clipview_kernel::{
    ComponentConfig, Owner, Scene, SceneEvent, SceneEventKind, SectionPlane,
    SectionPlaneConfig,
};
use clipview_render::{DebugTextRenderer, FrameLoop, as_bytes, pack_section_planes};
use config::SceneFile;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clipview-cli", about = "CLI host for the clipview scene core")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Walk through the section-plane lifecycle and print each frame
    Demo,
    /// Load a JSON scene file and render it
    Load {
        /// Path to the scene file
        path: PathBuf,
        /// Flip every plane's direction after loading
        #[arg(long)]
        flip: bool,
        /// Destroy this owner (and everything it owns) after loading
        #[arg(long)]
        destroy_owner: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("clipview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", clipview_render::crate_info());
        }
        Commands::Demo => run_demo()?,
        Commands::Load {
            path,
            flip,
            destroy_owner,
        } => {
            let file = SceneFile::load(&path)?;
            let mut scene = Scene::new();
            log_section_plane_updates(&scene);
            let planes = file.build(&mut scene)?;

            let renderer = DebugTextRenderer::new();
            let mut frames = FrameLoop::new();
            draw(&mut frames, &mut scene, &renderer);

            if flip {
                for plane in &planes {
                    plane.flip_dir(&mut scene)?;
                }
                draw(&mut frames, &mut scene, &renderer);
            }

            if let Some(id) = destroy_owner {
                let owner = scene
                    .handle(&id.as_str().into())
                    .ok_or_else(|| anyhow::anyhow!("no component with id {id}"))?;
                scene.destroy(&owner)?;
                draw(&mut frames, &mut scene, &renderer);
            }

            println!(
                "frames={} recompiles={} uniform_bytes={}",
                frames.frames(),
                frames.recompiles(),
                as_bytes(&pack_section_planes(&scene)).len()
            );
        }
    }

    Ok(())
}

fn run_demo() -> anyhow::Result<()> {
    let mut scene = Scene::new();
    log_section_plane_updates(&scene);
    let renderer = DebugTextRenderer::new();
    let mut frames = FrameLoop::new();

    let model = scene.create_component(
        Owner::Scene,
        "Model",
        ComponentConfig {
            id: Some("model".into()),
        },
    )?;
    let plane = SectionPlane::new(
        &mut scene,
        &model,
        SectionPlaneConfig {
            id: Some("cut".into()),
            pos: Some([1.0, 1.0, 1.0]),
            dir: Some([-1.0, -1.0, -1.0]),
            ..Default::default()
        },
    )?;
    println!("created: dist={}", plane.dist(&scene)?);
    draw(&mut frames, &mut scene, &renderer);

    plane.flip_dir(&mut scene)?;
    println!("flipped: dir={:?} dist={}", plane.dir(&scene)?, plane.dist(&scene)?);
    draw(&mut frames, &mut scene, &renderer);

    plane.set_active(&mut scene, false)?;
    println!("deactivated: dist={}", plane.dist(&scene)?);
    draw(&mut frames, &mut scene, &renderer);

    scene.destroy(&model)?;
    println!(
        "owner destroyed: plane alive={} registered={}",
        plane.is_alive(&scene),
        scene.section_plane_count()
    );
    if let Err(err) = plane.dist(&scene) {
        println!("access after destroy: {err}");
    }
    draw(&mut frames, &mut scene, &renderer);

    println!("frames={} recompiles={}", frames.frames(), frames.recompiles());
    Ok(())
}

fn draw(frames: &mut FrameLoop, scene: &mut Scene, renderer: &DebugTextRenderer) {
    if let Some(text) = frames.tick(scene, renderer) {
        print!("{text}");
    }
}

fn log_section_plane_updates(scene: &Scene) {
    scene
        .events()
        .on(SceneEventKind::SectionPlaneUpdated, |event| {
            if let SceneEvent::SectionPlaneUpdated(snap) = event {
                tracing::debug!(id = %snap.id, dist = snap.state.dist, "section plane updated");
            }
        });
}

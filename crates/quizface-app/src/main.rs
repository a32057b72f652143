use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod flows;

use config::Config;

#[derive(Parser)]
#[command(name = "quizface", about = "Webcam face recognition quiz game")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the camera loop and quiz (default)
    Play,
    /// Print the leaderboard, sorted by total score
    Leaderboard,
    /// List enrolled faces
    Faces,
    /// List available capture devices
    Cameras,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Play => run_app(config),
        Commands::Leaderboard => {
            let store = quizface_store::LeaderboardStore::new(config.leaderboard_path());
            print!("{}", quizface_game::render_report(&store.load()));
            Ok(())
        }
        Commands::Faces => {
            let store = quizface_store::FaceStore::new(config.faces_path());
            let gallery = store.load();
            if gallery.is_empty() {
                println!("No faces enrolled");
            } else {
                for face in gallery {
                    println!("{} ({} dims)", face.name, face.embedding.values.len());
                }
            }
            Ok(())
        }
        Commands::Cameras => {
            let devices = quizface_hw::Camera::list_devices();
            if devices.is_empty() {
                println!("No capture devices found");
            } else {
                for dev in devices {
                    println!("{}  {} ({})", dev.path, dev.name, dev.driver);
                }
            }
            Ok(())
        }
    }
}

fn run_app(config: Config) -> Result<()> {
    tracing::info!("quizface starting");

    let app = app::QuizfaceApp::new(config)?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([960.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "quizface",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("gui event loop failed: {e}"))?;

    tracing::info!("quizface shutting down");
    Ok(())
}

//! The egui application: a keyboard-driven camera loop that hands the
//! window over to the quiz screen after a successful recognition.
//!
//! Modes: `Previewing` (live camera + key hints), `Enrolling` (name entry
//! for a captured frame), `Quizzing` (camera released, quiz owns the
//! window). Quitting closes the window directly. Every mode renders purely
//! from its own state each frame; nothing is mutated in place in a widget
//! tree.

use crate::config::Config;
use crate::flows::{self, EnrollOutcome};
use eframe::egui;
use quizface_core::{FaceEncoder, FirstWithinTolerance, KnownFace};
use quizface_game::{session, standard_quiz, Answer, Question, QuizSession};
use quizface_hw::{Camera, Frame};
use quizface_store::{FaceStore, Leaderboard, LeaderboardStore, SnapshotStore};
use std::path::PathBuf;

pub struct QuizfaceApp {
    config: Config,
    encoder: FaceEncoder,
    matcher: FirstWithinTolerance,
    face_store: FaceStore,
    gallery: Vec<KnownFace>,
    leaderboard_store: LeaderboardStore,
    leaderboard: Leaderboard,
    snapshots: SnapshotStore,
    camera: Option<Camera>,
    mode: Mode,
    last_frame: Option<Frame>,
    preview_texture: Option<egui::TextureHandle>,
    status: String,
}

enum Mode {
    Previewing,
    Enrolling {
        frame: Frame,
        name_input: String,
    },
    Quizzing(Box<QuizScreen>),
}

/// Everything the quiz screen renders from.
struct QuizScreen {
    session: QuizSession,
    /// Games played before this session, from the leaderboard entry.
    games_played: u32,
    /// Cumulative score before this session, from the leaderboard entry.
    total_score: u32,
    thumbnail: Thumbnail,
    selected_option: usize,
    riddle_input: String,
}

enum Thumbnail {
    /// Snapshot file exists but has not been uploaded as a texture yet.
    Pending(PathBuf),
    Loaded(egui::TextureHandle),
    /// No snapshot, or the file would not decode; shown as inline text.
    Unavailable,
}

impl QuizfaceApp {
    /// Build the app: load models and persisted state, open the camera.
    /// Any failure here is fatal to startup.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let encoder = FaceEncoder::load(
            &config.detector_model_path(),
            &config.embedder_model_path(),
        )?;

        let face_store = FaceStore::new(config.faces_path());
        let gallery = face_store.load();
        tracing::info!(enrolled = gallery.len(), "loaded face gallery");

        let leaderboard_store = LeaderboardStore::new(config.leaderboard_path());
        let leaderboard = leaderboard_store.load();
        tracing::info!(players = leaderboard.len(), "loaded leaderboard");

        let snapshots = SnapshotStore::create()?;

        let camera = Camera::open(&config.camera_device)?;
        camera.discard_warmup_frames(config.warmup_frames);

        let matcher = FirstWithinTolerance {
            tolerance: config.tolerance,
        };

        Ok(Self {
            config,
            encoder,
            matcher,
            face_store,
            gallery,
            leaderboard_store,
            leaderboard,
            snapshots,
            camera: Some(camera),
            mode: Mode::Previewing,
            last_frame: None,
            preview_texture: None,
            status: "Press E to enroll, R to recognize and play, Q to quit.".to_string(),
        })
    }

    fn update_preview(&mut self, ctx: &egui::Context) -> Mode {
        if let Some(camera) = &self.camera {
            match camera.capture_frame() {
                Ok(frame) => {
                    self.set_preview_texture(ctx, &frame);
                    self.last_frame = Some(frame);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "preview capture failed");
                    self.status = format!("Camera capture failed: {err}");
                }
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("quizface");
            if let Some(texture) = &self.preview_texture {
                ui.image((texture.id(), texture.size_vec2()));
            } else {
                ui.label("Waiting for camera…");
            }
            ui.label("E — enroll a face    R — recognize and play    Q — quit");
            ui.separator();
            ui.label(&self.status);
        });

        if ctx.input(|i| i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape)) {
            tracing::info!("quit requested");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return Mode::Previewing;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::E)) {
            if let Some(frame) = self.last_frame.clone() {
                return Mode::Enrolling {
                    frame,
                    name_input: String::new(),
                };
            }
            self.status = "No frame captured yet.".to_string();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::R)) {
            return self.try_recognize();
        }

        Mode::Previewing
    }

    /// Attempt recognition against the current frame; on success release
    /// the camera and enter the quiz.
    fn try_recognize(&mut self) -> Mode {
        let Some(frame) = self.last_frame.clone() else {
            self.status = "No frame captured yet.".to_string();
            return Mode::Previewing;
        };

        if self.gallery.is_empty() {
            self.status = "No faces enrolled yet — press E first.".to_string();
            return Mode::Previewing;
        }

        if quizface_hw::frame::is_dark_frame(&frame.data, 0.95) {
            tracing::warn!("frame too dark for recognition");
            self.status = "Frame too dark — check the lighting.".to_string();
            return Mode::Previewing;
        }

        let Some(recognized) = flows::recognize(
            &mut self.encoder,
            &self.matcher,
            &self.gallery,
            &self.snapshots,
            &frame,
        ) else {
            self.status = "Face not recognized.".to_string();
            return Mode::Previewing;
        };

        self.status = format!(
            "Recognized {} (distance {:.2}).",
            recognized.name, recognized.distance
        );

        // The quiz owns the window; release the camera for its duration.
        self.camera = None;
        self.preview_texture = None;

        let (games_played, total_score) = self
            .leaderboard
            .get(&recognized.name)
            .map(|e| (e.games_played, e.total_score))
            .unwrap_or((0, 0));

        let thumbnail = match recognized.snapshot {
            Some(path) => Thumbnail::Pending(path),
            None => Thumbnail::Unavailable,
        };

        Mode::Quizzing(Box::new(QuizScreen {
            session: QuizSession::new(recognized.name, standard_quiz()),
            games_played,
            total_score,
            thumbnail,
            selected_option: 0,
            riddle_input: String::new(),
        }))
    }

    fn update_enroll(
        &mut self,
        ctx: &egui::Context,
        frame: Frame,
        mut name_input: String,
    ) -> Mode {
        let mut confirmed = false;
        let mut cancelled = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Enroll face");
            ui.label("Name for the captured face:");
            let response = ui.text_edit_singleline(&mut name_input);
            response.request_focus();
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                confirmed = true;
            }
            ui.horizontal(|ui| {
                if ui.button("Enroll").clicked() {
                    confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    cancelled = true;
                }
            });
            ui.separator();
            ui.label(&self.status);
        });

        if cancelled || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.status = "Enrollment cancelled.".to_string();
            return Mode::Previewing;
        }

        if confirmed {
            match flows::enroll(
                &mut self.encoder,
                &mut self.gallery,
                &self.face_store,
                &self.snapshots,
                &name_input,
                &frame,
            ) {
                EnrollOutcome::Enrolled { name } => {
                    self.status = format!("Enrolled {name}.");
                    return Mode::Previewing;
                }
                EnrollOutcome::EmptyName => {
                    self.status = "Name must not be empty.".to_string();
                    // Stay in the dialog so the name can be corrected.
                    return Mode::Enrolling { frame, name_input };
                }
                EnrollOutcome::NoFaceDetected => {
                    self.status = "No face detected in the captured frame.".to_string();
                    return Mode::Previewing;
                }
            }
        }

        Mode::Enrolling { frame, name_input }
    }

    fn update_quiz(&mut self, ctx: &egui::Context, mut screen: Box<QuizScreen>) -> Mode {
        // Upload the snapshot texture on first use; a file that will not
        // decode degrades to the inline placeholder.
        if let Thumbnail::Pending(path) = &screen.thumbnail {
            screen.thumbnail = match load_thumbnail(ctx, path) {
                Some(texture) => Thumbnail::Loaded(texture),
                None => {
                    tracing::warn!(path = %path.display(), "snapshot unreadable; showing placeholder");
                    Thumbnail::Unavailable
                }
            };
        }

        let mut submitted: Option<Answer> = None;

        egui::TopBottomPanel::top("player-overlay").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &screen.thumbnail {
                    Thumbnail::Loaded(texture) => {
                        ui.add(
                            egui::Image::new((texture.id(), texture.size_vec2()))
                                .fit_to_exact_size(egui::vec2(64.0, 64.0)),
                        );
                    }
                    _ => {
                        ui.label("[no face image]");
                    }
                }
                ui.vertical(|ui| {
                    ui.strong(screen.session.player());
                    ui.label(format!(
                        "Games played: {}   Total score: {}",
                        screen.games_played, screen.total_score
                    ));
                    ui.label(format!(
                        "This round: {} / {}",
                        screen.session.score(),
                        screen.session.total()
                    ));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(question) = screen.session.current_question() else {
                return;
            };

            ui.heading(format!(
                "Question {} of {}",
                screen.session.index() + 1,
                screen.session.total()
            ));
            ui.label(question.prompt());
            ui.add_space(8.0);

            match question {
                Question::MultipleChoice { options, .. } => {
                    for (i, option) in options.iter().enumerate() {
                        ui.radio_value(&mut screen.selected_option, i, option);
                    }
                }
                Question::Riddle { .. } => {
                    ui.text_edit_singleline(&mut screen.riddle_input);
                }
            }

            ui.add_space(8.0);
            if ui.button("Submit").clicked() {
                submitted = Some(match question {
                    Question::MultipleChoice { .. } => Answer::Choice(screen.selected_option),
                    Question::Riddle { .. } => Answer::Text(screen.riddle_input.clone()),
                });
            }
        });

        if let Some(answer) = submitted {
            let result = screen.session.submit(&answer);
            screen.selected_option = 0;
            screen.riddle_input.clear();

            if result.finished {
                session::finish(
                    &screen.session,
                    &self.leaderboard_store,
                    &mut self.leaderboard,
                );
                self.status = format!(
                    "{} scored {} of {}.",
                    screen.session.player(),
                    screen.session.score(),
                    screen.session.total()
                );
                return self.reacquire_camera(ctx);
            }
        }

        Mode::Quizzing(screen)
    }

    /// Reopen the camera after a quiz. Failure here would strand the user
    /// on a dead preview, so it is fatal to the loop.
    fn reacquire_camera(&mut self, ctx: &egui::Context) -> Mode {
        match Camera::open(&self.config.camera_device) {
            Ok(camera) => {
                camera.discard_warmup_frames(self.config.warmup_frames);
                self.camera = Some(camera);
                Mode::Previewing
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to reacquire camera after quiz; exiting");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                Mode::Previewing
            }
        }
    }

    fn set_preview_texture(&mut self, ctx: &egui::Context, frame: &Frame) {
        let image = gray_color_image(&frame.data, frame.width as usize, frame.height as usize);
        match &mut self.preview_texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.preview_texture =
                    Some(ctx.load_texture("camera-preview", image, egui::TextureOptions::LINEAR));
            }
        }
    }
}

impl eframe::App for QuizfaceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mode = std::mem::replace(&mut self.mode, Mode::Previewing);
        self.mode = match mode {
            Mode::Previewing => self.update_preview(ctx),
            Mode::Enrolling { frame, name_input } => self.update_enroll(ctx, frame, name_input),
            Mode::Quizzing(screen) => self.update_quiz(ctx, screen),
        };

        // Keep the preview live without spinning the CPU.
        ctx.request_repaint_after(std::time::Duration::from_millis(33));
    }
}

/// Map a grayscale buffer into an egui color image.
fn gray_color_image(gray: &[u8], width: usize, height: usize) -> egui::ColorImage {
    let pixels = gray
        .iter()
        .map(|&v| egui::Color32::from_gray(v))
        .collect();
    egui::ColorImage {
        size: [width, height],
        pixels,
    }
}

/// Decode a snapshot PNG into a texture. `None` when the file is missing
/// or unreadable.
fn load_thumbnail(ctx: &egui::Context, path: &std::path::Path) -> Option<egui::TextureHandle> {
    let img = image::open(path)
        .map_err(|err| {
            tracing::warn!(path = %path.display(), error = %err, "failed to decode snapshot");
            err
        })
        .ok()?
        .to_luma8();
    let (width, height) = img.dimensions();
    let color = gray_color_image(img.as_raw(), width as usize, height as usize);
    Some(ctx.load_texture("face-thumbnail", color, egui::TextureOptions::LINEAR))
}

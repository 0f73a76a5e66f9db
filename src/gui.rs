//! Native viewer using egui
//!
//! Hosts the render driver in an eframe window and runs the generator on a
//! background thread for the lifetime of the window.

use eframe::egui;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::generator::{self, Generator, GeneratorError, Stopped};
use crate::lsystem::LSystem;
use crate::render::RenderDriver;
use crate::surface::{Pen, Rgb, Surface, SurfaceError};
use crate::turtle::Point;

/// Run the native viewer until the window closes
pub fn run_viewer(config: Config) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_title(&config.window.title),
        ..Default::default()
    };

    let fatal: Arc<Mutex<Option<anyhow::Error>>> = Arc::new(Mutex::new(None));
    let app_fatal = fatal.clone();

    eframe::run_native(
        &config.window.title.clone(),
        options,
        Box::new(move |cc| Ok(Box::new(TreeApp::new(cc, config, app_fatal)?))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))?;

    let error = fatal.lock().ok().and_then(|mut slot| slot.take());
    match error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn to_color(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Surface over an egui painter, with turtle coordinates relative to the
/// panel's top-left corner
struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    offset: egui::Vec2,
    pen: Pen,
}

impl PainterSurface<'_> {
    fn to_screen(&self, p: Point) -> egui::Pos2 {
        egui::pos2(p.x as f32, p.y as f32) + self.offset
    }
}

impl Surface for PainterSurface<'_> {
    fn select_pen(&mut self, pen: Pen) -> Pen {
        std::mem::replace(&mut self.pen, pen)
    }

    fn line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError> {
        let stroke = egui::Stroke::new(self.pen.width, to_color(self.pen.color));
        self.painter
            .line_segment([self.to_screen(from), self.to_screen(to)], stroke);
        Ok(())
    }
}

struct TreeApp {
    driver: RenderDriver,
    generator: Option<JoinHandle<Result<Stopped, GeneratorError>>>,
    fatal: Arc<Mutex<Option<anyhow::Error>>>,
}

impl TreeApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        fatal: Arc<Mutex<Option<anyhow::Error>>>,
    ) -> std::io::Result<Self> {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let driver = RenderDriver::new();
        let handle = Generator::new(
            LSystem::christmas_tree(),
            driver.clone(),
            Arc::new(cc.egui_ctx.clone()),
        )
        .with_origin(config.origin)
        .with_max_depth(config.max_depth)
        .spawn()?;
        info!("Generator started");

        Ok(Self {
            driver,
            generator: Some(handle),
            fatal,
        })
    }

    /// Record the first fatal error and close the window
    fn fail(&self, ctx: &egui::Context, error: anyhow::Error) {
        crate::log_error!(error);
        if let Ok(mut slot) = self.fatal.lock() {
            slot.get_or_insert(error);
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    /// Pick up a generator that ended on its own
    fn poll_generator(&mut self, ctx: &egui::Context) {
        if !self.generator.as_ref().is_some_and(|h| h.is_finished()) {
            return;
        }
        let Some(handle) = self.generator.take() else {
            return;
        };
        match generator::join(handle) {
            Ok(stopped) => info!(?stopped, "Generator finished"),
            Err(e) => self.fail(ctx, e.into()),
        }
    }
}

impl eframe::App for TreeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_generator(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(to_color(Rgb::WHITE)))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let painter = ui.painter_at(rect);
                let mut surface = PainterSurface {
                    painter: &painter,
                    offset: rect.min.to_vec2(),
                    pen: Pen::default(),
                };

                if let Err(e) = self.driver.paint(&mut surface, ctx) {
                    self.fail(ctx, e.into());
                }

                painter.text(
                    rect.left_bottom() + egui::vec2(8.0, -8.0),
                    egui::Align2::LEFT_BOTTOM,
                    format!("depth {} | {} strokes", self.driver.depth(), self.driver.len()),
                    egui::FontId::monospace(12.0),
                    to_color(Rgb(120, 120, 120)),
                );
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Window closing, shutting down generator");
        self.driver.shutdown();
        if let Some(handle) = self.generator.take() {
            match generator::join(handle) {
                Ok(stopped) => info!(?stopped, "Generator stopped"),
                Err(e) => warn!("Generator ended with error: {}", e),
            }
        }
    }
}

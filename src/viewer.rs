//! Interactive boundary viewer: an egui slider bound to the tree depth.

use egui::{ColorImage, TextureHandle, TextureOptions};
use tracing::{debug, error};

use arbor_data::Dataset;
use arbor_plot::BoundaryPlot;

/// Largest depth the slider exposes.
const MAX_SLIDER_DEPTH: u32 = 8;

/// Launch the interactive viewer window.
///
/// The slider starts at 0 (raw data only); every change re-renders the
/// boundary plot with the selected depth cap.
pub fn run(dataset: Dataset, plot: BoundaryPlot) -> Result<(), eframe::Error> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([680.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "arbor — decision boundary explorer",
        native_options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(dataset, plot)))),
    )
}

/// Application state for the viewer.
struct ViewerApp {
    dataset: Dataset,
    plot: BoundaryPlot,
    max_depth: u32,
    texture: Option<TextureHandle>,
    rendered_depth: Option<u32>,
    render_error: Option<String>,
}

impl ViewerApp {
    fn new(dataset: Dataset, plot: BoundaryPlot) -> Self {
        Self {
            dataset,
            plot,
            max_depth: 0,
            texture: None,
            rendered_depth: None,
            render_error: None,
        }
    }

    /// Re-render the plot when the slider moved (or on first frame).
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if self.rendered_depth == Some(self.max_depth) {
            return;
        }
        match self.plot.render_to_rgb(&self.dataset, self.max_depth as usize) {
            Ok((buffer, (width, height))) => {
                let image =
                    ColorImage::from_rgb([width as usize, height as usize], &buffer);
                self.texture =
                    Some(ctx.load_texture("boundary", image, TextureOptions::LINEAR));
                self.rendered_depth = Some(self.max_depth);
                self.render_error = None;
                debug!(max_depth = self.max_depth, "viewer texture refreshed");
            }
            Err(err) => {
                error!(max_depth = self.max_depth, %err, "render failed");
                self.render_error = Some(err.to_string());
                self.rendered_depth = Some(self.max_depth);
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_texture(ctx);

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("max_depth");
                ui.add(egui::Slider::new(&mut self.max_depth, 0..=MAX_SLIDER_DEPTH));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = &self.render_error {
                ui.colored_label(egui::Color32::RED, message);
            } else if let Some(texture) = &self.texture {
                ui.centered_and_justified(|ui| {
                    ui.image(texture);
                });
            }
        });
    }
}

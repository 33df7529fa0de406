//! Scene-level rendering: owns the graphics context and one
//! [`VisualRenderer`] per visual, drawn in scene order.

#[cfg(test)]
#[path = "renderer_test.rs"]
mod renderer_test;

use crate::consts::CLEAR_COLOR;
use crate::gl::{GlContext, GlError};
use crate::navigation::NavigationTransform;
use crate::scene::Scene;
use crate::visual::{RenderError, VisualRenderer};

/// Renders a whole [`Scene`] into one graphics context.
///
/// Visuals that fail to initialise are left out and reported through
/// [`SceneRenderer::notices`]; the rest still draw.
pub struct SceneRenderer<G: GlContext> {
    gl: G,
    visuals: Vec<Option<VisualRenderer<G>>>,
    width: i32,
    height: i32,
    notices: Vec<GlError>,
}

impl<G: GlContext> SceneRenderer<G> {
    /// Configure the context and build a renderer for every visual.
    pub fn init(gl: G, scene: &Scene, width: i32, height: i32) -> Self {
        gl.clear_color(CLEAR_COLOR);
        if scene.renderer_options.transparency {
            gl.enable_alpha_blending();
        }

        let mut notices = Vec::new();
        let visuals = scene
            .visuals
            .iter()
            .enumerate()
            .map(|(index, visual)| {
                let label = visual.name.clone().unwrap_or_else(|| format!("visual{index}"));
                match VisualRenderer::init(&gl, visual, label.clone()) {
                    Ok(renderer) => Some(renderer),
                    Err(e) => {
                        log::error!("{label}: {e}");
                        notices.push(e);
                        None
                    }
                }
            })
            .collect();

        gl.viewport(0, 0, width, height);
        log::debug!("scene renderer ready: {} visual(s), {width}x{height}", scene.visuals.len());
        Self { gl, visuals, width, height, notices }
    }

    /// Clear and draw every visual, first to last.
    pub fn draw(&mut self, nav: &NavigationTransform) {
        self.gl.viewport(0, 0, self.width, self.height);
        self.gl.clear();
        for visual in self.visuals.iter_mut().flatten() {
            visual.draw(&self.gl, nav);
        }
    }

    /// Stage new data for variable `name` of the visual at `index`.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownVariable`] when the visual does not exist, failed
    /// to initialise, or declares no such variable.
    pub fn set_data(&mut self, index: usize, name: &str, data: Vec<f32>) -> Result<(), RenderError> {
        match self.visuals.get_mut(index).and_then(Option::as_mut) {
            Some(visual) => visual.set_data(name, data),
            None => Err(RenderError::UnknownVariable(format!("visual{index}.{name}"))),
        }
    }

    /// Resize the drawing surface; applied at the next draw.
    pub fn set_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
    }

    // --- Queries ---

    /// Non-fatal failures collected during initialisation.
    #[must_use]
    pub fn notices(&self) -> &[GlError] {
        &self.notices
    }

    /// The renderer of the visual at `index`, if it initialised.
    #[must_use]
    pub fn visual(&self, index: usize) -> Option<&VisualRenderer<G>> {
        self.visuals.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn gl(&self) -> &G {
        &self.gl
    }

    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

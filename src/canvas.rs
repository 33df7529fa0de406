//! One independent canvas: renderer, navigation and interaction state.
//!
//! Each event handler runs the whole pipeline synchronously: page position to
//! NDC, state machine, navigation dispatch, and a redraw when the view moved.
//! Nothing is shared between canvases, so a page may mount any number of them.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use uuid::Uuid;

use crate::gl::{GlContext, GlError};
use crate::input::{Action, CanvasGeometry, InteractionState, Point};
use crate::navigation::{NavigationConfig, NavigationTransform};
use crate::renderer::SceneRenderer;
use crate::scene::Scene;
use crate::visual::RenderError;

pub struct Canvas<G: GlContext> {
    id: Uuid,
    geometry: CanvasGeometry,
    config: NavigationConfig,
    interaction: InteractionState,
    navigation: NavigationTransform,
    renderer: SceneRenderer<G>,
}

impl<G: GlContext> Canvas<G> {
    /// Mount `scene` on `gl` and draw the first frame.
    pub fn new(gl: G, scene: &Scene, geometry: CanvasGeometry, config: NavigationConfig) -> Self {
        let id = Uuid::new_v4();
        let (width, height) = geometry.viewport_size();
        let renderer = SceneRenderer::init(gl, scene, width, height);
        log::debug!("canvas {id}: mounted {} visual(s)", scene.visuals.len());

        let mut canvas = Self {
            id,
            geometry,
            config,
            interaction: InteractionState::with_threshold(config.click_threshold),
            navigation: NavigationTransform::new(),
            renderer,
        };
        canvas.draw();
        canvas
    }

    // --- Input events ---

    pub fn on_mouse_down(&mut self, page: Point, which: u8) -> Option<Action> {
        let pos = self.geometry.to_ndc(page);
        let action = self.interaction.press(pos, which);
        self.dispatch();
        action
    }

    pub fn on_mouse_move(&mut self, page: Point) -> Option<Action> {
        let pos = self.geometry.to_ndc(page);
        let action = self.interaction.move_to(pos);
        self.dispatch();
        action
    }

    pub fn on_mouse_up(&mut self, page: Point, which: u8) -> Option<Action> {
        let pos = self.geometry.to_ndc(page);
        let action = self.interaction.release(pos, which);
        self.dispatch();
        action
    }

    pub fn on_double_click(&mut self) -> Option<Action> {
        let action = self.interaction.double_click();
        self.dispatch();
        action
    }

    /// `delta` is in normalized wheel notches, positive zooms in.
    pub fn on_wheel(&mut self, delta: f64) -> Option<Action> {
        let action = self.interaction.wheel(delta);
        self.dispatch();
        action
    }

    pub fn on_key_down(&mut self, code: u32) -> Option<Action> {
        let action = self.interaction.key_down(code);
        self.dispatch();
        action
    }

    pub fn on_key_up(&mut self, code: u32) -> Option<Action> {
        let action = self.interaction.key_up(code);
        self.dispatch();
        action
    }

    pub fn on_focus_out(&mut self) -> Option<Action> {
        let action = self.interaction.focus_out();
        self.dispatch();
        action
    }

    fn dispatch(&mut self) {
        if self.navigation.process(&self.interaction, &self.config) {
            self.draw();
        }
    }

    // --- Data inputs ---

    /// Canvas resized or moved on the page.
    pub fn set_geometry(&mut self, geometry: CanvasGeometry) {
        let (width, height) = geometry.viewport_size();
        self.geometry = geometry;
        self.renderer.set_size(width, height);
        self.draw();
    }

    /// Stage new data for one variable; drawn on the next frame.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownVariable`] when no such visual or variable exists.
    pub fn set_data(&mut self, visual: usize, name: &str, data: Vec<f32>) -> Result<(), RenderError> {
        self.renderer.set_data(visual, name, data)
    }

    pub fn draw(&mut self) {
        self.renderer.draw(&self.navigation);
    }

    // --- Queries ---

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationTransform {
        &self.navigation
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    #[must_use]
    pub fn geometry(&self) -> &CanvasGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn notices(&self) -> &[GlError] {
        self.renderer.notices()
    }

    #[must_use]
    pub fn renderer(&self) -> &SceneRenderer<G> {
        &self.renderer
    }
}

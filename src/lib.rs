//! Embeddable WebGL scene renderer for notebook cells.
//!
//! This crate is compiled to WebAssembly and runs in the browser. A host page
//! hands it a serialized scene (shader pairs, typed data buffers and draw
//! bounds); the crate decodes it, builds one shader program per visual, and
//! redraws in response to pan/zoom/reset navigation. The host JavaScript layer
//! only creates the `<canvas>` element and forwards DOM events to
//! [`web::SceneCanvas`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`canvas`] | One independent canvas: event routing, navigation and redraw |
//! | [`scene`] | Scene/visual/variable model and its JSON (de)serializer |
//! | [`codec`] | Base64 payload codec for embedded numeric arrays |
//! | [`input`] | Page-to-NDC mapping and the interaction state machine |
//! | [`navigation`] | Pan/zoom transform and the action dispatcher |
//! | [`gl`] | Graphics-context trait implemented by each backend |
//! | [`uniform`] | Uniform shape classification and upload dispatch |
//! | [`visual`] | Per-visual program, buffers and draw calls |
//! | [`renderer`] | Whole-scene rendering in painter's order |
//! | [`web`] | WebGL backend and the exported `wasm-bindgen` surface |
//! | [`consts`] | Shared constants (thresholds, zoom factors, key codes) |

pub mod canvas;
pub mod codec;
pub mod consts;
pub mod gl;
pub mod input;
pub mod navigation;
pub mod renderer;
pub mod scene;
pub mod uniform;
pub mod visual;
pub mod web;

#[cfg(test)]
pub(crate) mod mock_gl;

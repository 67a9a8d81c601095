//! # Analog Watch Core Library
//!
//! This library provides the geometry, rendering and input handling for a
//! borderless, always-on-top analog clock widget. The window system is kept
//! at arm's length: everything here runs against plain values and traits, so
//! the same code drives the desktop window, the terminal preview and the
//! tests.
//!
//! ## Design Philosophy
//!
//! ### Precomputed Geometry
//! - **Unit-circle table**: 360 `(cos, sin)` pairs built once, so a frame is
//!   only multiplication and truncation
//! - **Immutable layout snapshots**: every size-derived measurement lives in a
//!   [`LayoutMetrics`] value rebuilt wholesale when the widget is resized,
//!   never patched field by field
//!
//! ### Pure Rendering
//! [`ClockRenderer::render`] is a pure function of layout, time and label
//! toggles. It returns a [`Frame`] of draw commands that can be rasterised
//! onto any embedded-graphics `DrawTarget`, serialised to JSON, or printed as
//! ASCII art.
//!
//! ### Single-Threaded Event Model
//! The host delivers a periodic tick (100 ms by default), resize, keyboard
//! and mouse events on one thread. Each becomes an [`InputEvent`] handled by
//! [`ClockController::handle`], which returns whether to redraw or exit.
//! Preference writes happen synchronously inside that call.
//!
//! ## Data Flow
//! 1. **Startup**: open the preference store, read window geometry and toggles
//! 2. **Tick / resize**: host asks the controller for a frame at the current time
//! 3. **Paint**: frame is drawn into a [`PixelCanvas`] and presented
//! 4. **Input**: key and mouse events update window, layout and preferences

pub mod canvas;
pub mod clock_time;
pub mod config;
pub mod font;
pub mod input;
pub mod layout;
pub mod preferences;
pub mod renderer;
pub mod unit_circle;

#[cfg(feature = "window")]
pub mod window;

pub use canvas::PixelCanvas;
pub use font::LabelFont;
pub use clock_time::ClockTime;
pub use input::{ClockController, InputEvent, Key, Response, WindowHost};
pub use layout::{LayoutMetrics, LayoutModel};
pub use preferences::{DisplayPreferences, PreferenceStore, WindowGeometry};
pub use renderer::{ClockRenderer, DrawCommand, Frame};
pub use unit_circle::{Pos, UnitCircleTable};

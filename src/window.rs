//! # Desktop Window Host
//!
//! Runs the widget in an undecorated winit window and presents frames through
//! a softbuffer surface. Only compiled with the `window` feature.
//!
//! ## Responsibilities
//! - **Window chrome**: no decorations, optional always-on-top level, saved
//!   position or centered on the current monitor
//! - **Event translation**: winit keyboard, mouse and resize events become
//!   [`InputEvent`]s for the controller
//! - **Timer**: the event loop wakes every tick (100 ms by default) and asks
//!   the controller whether to redraw
//! - **Painting**: frames are rasterised into a [`PixelCanvas`], clipped to
//!   the inscribed circle and copied into the surface buffer
//!
//! Portable window shaping is not available through winit, so the area outside
//! the dial is painted in a flat corner color.

use crate::{
    canvas::PixelCanvas,
    clock_time::ClockTime,
    input::{ClockController, InputEvent, Key, Response, WindowHost},
    preferences::PreferenceStore,
    unit_circle::Pos,
};
use embedded_graphics::{pixelcolor::Rgb888, prelude::RgbColor};
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key as WinitKey, NamedKey},
    window::{Window, WindowId, WindowLevel},
};

/// Color painted outside the circular dial.
const CORNER: Rgb888 = Rgb888::BLACK;

/// Errors raised by the window host.
#[derive(Error, Debug)]
pub enum HostError {
    /// Event loop could not be created or failed while running
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Window could not be created
    #[error("window creation: {0}")]
    Os(#[from] winit::error::OsError),

    /// Pixel surface could not be created, resized or presented
    #[error("surface: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),
}

/// [`WindowHost`] over a live winit window.
struct WinitHost<'a> {
    window: &'a Window,
    size: i32,
}

impl WindowHost for WinitHost<'_> {
    fn size(&self) -> i32 {
        self.size
    }

    fn set_size(&mut self, size: i32) {
        let requested = PhysicalSize::new(size as u32, size as u32);
        self.size = match self.window.request_inner_size(requested) {
            Some(applied) => applied.width as i32,
            // applied later, reported through a Resized event
            None => size,
        };
    }

    fn position(&self) -> Option<Pos> {
        // unsupported on Wayland
        self.window
            .outer_position()
            .ok()
            .map(|p| Pos::new(p.x, p.y))
    }

    fn set_position(&mut self, position: Pos) {
        self.window
            .set_outer_position(PhysicalPosition::new(position.x, position.y));
    }

    fn center_on_screen(&mut self) {
        let Some(monitor) = self.window.current_monitor() else {
            debug!("no monitor information, leaving window in place");
            return;
        };
        let screen = monitor.size();
        let origin = monitor.position();
        let x = origin.x + (screen.width as i32 - self.size) / 2;
        let y = origin.y + (screen.height as i32 - self.size) / 2;
        self.set_position(Pos::new(x, y));
    }
}

/// winit application state.
struct ClockApp<P: PreferenceStore> {
    controller: ClockController<P>,
    tick: Duration,
    next_tick: Instant,
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    /// Display connection backing `surface`; declared after it so it drops last
    _context: Option<softbuffer::Context<Rc<Window>>>,
    size: i32,
    cursor: PhysicalPosition<f64>,
    error: Option<HostError>,
}

impl<P: PreferenceStore> ClockApp<P> {
    fn new(controller: ClockController<P>, tick: Duration) -> Self {
        let size = controller.metrics().size;
        Self {
            controller,
            tick,
            next_tick: Instant::now() + tick,
            window: None,
            _context: None,
            surface: None,
            size,
            cursor: PhysicalPosition::new(0.0, 0.0),
            error: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), HostError> {
        let geometry = self.controller.geometry();
        let side = geometry.size as u32;

        let mut attributes = Window::default_attributes()
            .with_title("Analog Watch")
            .with_decorations(false)
            .with_resizable(false)
            .with_inner_size(PhysicalSize::new(side, side));
        if geometry.always_on_top {
            attributes = attributes.with_window_level(WindowLevel::AlwaysOnTop);
        }
        if let Some((x, y)) = geometry.position {
            attributes = attributes.with_position(PhysicalPosition::new(x, y));
        }

        let window = Rc::new(event_loop.create_window(attributes)?);
        let context = softbuffer::Context::new(window.clone())?;
        let surface = softbuffer::Surface::new(&context, window.clone())?;

        self.size = geometry.size;
        if geometry.position.is_none() {
            let mut host = WinitHost {
                window: &window,
                size: self.size,
            };
            host.center_on_screen();
        }

        info!(
            size = geometry.size,
            always_on_top = geometry.always_on_top,
            "window created"
        );
        window.request_redraw();
        self.window = Some(window);
        self._context = Some(context);
        self.surface = Some(surface);
        Ok(())
    }

    fn dispatch(&mut self, event_loop: &ActiveEventLoop, event: InputEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let mut host = WinitHost {
            window: &window,
            size: self.size,
        };
        let response = self.controller.handle(event, &mut host);
        self.size = host.size;

        match response {
            Response::Redraw => window.request_redraw(),
            Response::Exit => event_loop.exit(),
            Response::Ignored => {}
        }
    }

    /// Cursor position in screen coordinates.
    fn cursor_on_screen(&self) -> Pos {
        let origin = self
            .window
            .as_ref()
            .and_then(|window| window.outer_position().ok())
            .map(|p| Pos::new(p.x, p.y))
            .unwrap_or_default();
        Pos::new(
            origin.x + self.cursor.x as i32,
            origin.y + self.cursor.y as i32,
        )
    }

    fn paint(&mut self) -> Result<(), HostError> {
        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return Ok(());
        };
        let inner = window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(inner.width), NonZeroU32::new(inner.height))
        else {
            return Ok(());
        };
        surface.resize(width, height)?;

        let frame = self.controller.frame(&ClockTime::now());
        let mut canvas = PixelCanvas::new(inner.width, inner.height, CORNER);
        let Ok(()) = frame.draw(self.controller.renderer().label_font(), &mut canvas);
        canvas.apply_mask(CORNER);

        let mut buffer = surface.buffer_mut()?;
        buffer.copy_from_slice(canvas.pixels());
        window.pre_present_notify();
        buffer.present()?;
        Ok(())
    }
}

impl<P: PreferenceStore> ApplicationHandler for ClockApp<P> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            error!("failed to open clock window: {}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.size = size.width as i32;
                self.dispatch(
                    event_loop,
                    InputEvent::Resized {
                        width: size.width,
                        height: size.height,
                    },
                );
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.paint() {
                    warn!("paint failed: {}", e);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.dispatch(event_loop, InputEvent::Key(map_key(&event.logical_key)));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                let screen = self.cursor_on_screen();
                self.dispatch(event_loop, InputEvent::MouseDragged { screen });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let screen = self.cursor_on_screen();
                let popup_trigger = button == MouseButton::Right;
                let event = match state {
                    ElementState::Pressed => InputEvent::MousePressed {
                        screen,
                        popup_trigger,
                    },
                    ElementState::Released => InputEvent::MouseReleased {
                        screen,
                        popup_trigger,
                    },
                };
                self.dispatch(event_loop, event);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_tick {
            self.next_tick = now + self.tick;
            self.dispatch(event_loop, InputEvent::Tick);
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}

/// Map a winit logical key onto a widget key. Main keyboard and keypad
/// variants produce the same character and map identically.
fn map_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(NamedKey::Escape) => Key::Escape,
        WinitKey::Character(c) => match c.as_str() {
            "+" => Key::Plus,
            "-" => Key::Minus,
            "0" => Key::Zero,
            "d" | "D" => Key::D,
            "w" | "W" => Key::W,
            other => Key::Other(other.to_string()),
        },
        other => Key::Other(format!("{:?}", other)),
    }
}

/// Open the clock window and run until the user exits.
pub fn run<P: PreferenceStore>(
    controller: ClockController<P>,
    tick: Duration,
) -> Result<(), HostError> {
    let event_loop = EventLoop::new()?;
    let mut app = ClockApp::new(controller, tick);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

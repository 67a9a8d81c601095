//! # Input Dispatch
//!
//! Window-system events arrive as [`InputEvent`] values and are handled by a
//! single function, [`ClockController::handle`]. The controller owns the
//! widget state (layout, label toggles, drag anchor) and the injected
//! [`PreferenceStore`]; the window itself is reached only through the
//! [`WindowHost`] trait, so the same logic drives the desktop window and the
//! tests.
//!
//! ## Keyboard
//! | Key | Effect |
//! |---|---|
//! | `Escape` | exit |
//! | `+` | grow by 20 px (max 2048), persist size |
//! | `-` | shrink by 20 px (min 100), persist size |
//! | `0` | reset to 400 px, center on screen, forget saved position |
//! | `D` | toggle day-of-month label, persist |
//! | `W` | toggle day-of-week label, persist |
//!
//! ## Mouse
//! Dragging moves the window by the cursor delta; releasing persists the new
//! position when the window system reports one. A popup trigger (secondary
//! click) is reserved for a settings menu.

use crate::{
    clock_time::ClockTime,
    font::FontError,
    layout::{LayoutMetrics, LayoutModel},
    preferences::{
        DisplayPreferences, PreferenceError, PreferenceStore, WindowGeometry, DEFAULT_SIZE,
        KEY_DAY_OF_MONTH, KEY_DAY_OF_WEEK, KEY_SIZE, KEY_X, KEY_Y, MAX_SIZE, MIN_SIZE,
    },
    renderer::{ClockRenderer, Frame},
    unit_circle::Pos,
};
use tracing::{debug, info, warn};

/// Pixels added or removed per resize key press.
pub const SIZE_STEP: i32 = 20;

/// Keyboard commands understood by the widget. Hosts map both the main and
/// numeric keypad variants of `+`, `-` and `0` onto the same key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Plus,
    Minus,
    Zero,
    D,
    W,
    /// Any other key, named for diagnostics
    Other(String),
}

/// Events delivered by the window host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// Mouse button pressed at a screen position
    MousePressed { screen: Pos, popup_trigger: bool },
    /// Cursor moved to a screen position
    MouseDragged { screen: Pos },
    MouseReleased { screen: Pos, popup_trigger: bool },
    /// Widget surface resized; the widget is square so only `width` is used
    Resized { width: u32, height: u32 },
    /// Periodic timer tick
    Tick,
}

/// What the host should do after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    Ignored,
    Redraw,
    Exit,
}

/// Window operations the controller needs from the host.
pub trait WindowHost {
    /// Current widget size in pixels
    fn size(&self) -> i32;
    fn set_size(&mut self, size: i32);
    /// Top-left window position in screen coordinates, `None` where the
    /// window system does not expose it
    fn position(&self) -> Option<Pos>;
    fn set_position(&mut self, position: Pos);
    fn center_on_screen(&mut self);
}

/// Widget state plus the injected preference store.
pub struct ClockController<P: PreferenceStore> {
    prefs: P,
    display: DisplayPreferences,
    layout: LayoutModel,
    renderer: ClockRenderer,
    drag_anchor: Option<Pos>,
}

impl<P: PreferenceStore> ClockController<P> {
    pub fn new(prefs: P) -> Result<Self, FontError> {
        let display = DisplayPreferences::load(&prefs);
        let geometry = WindowGeometry::load(&prefs);
        Ok(Self {
            prefs,
            display,
            layout: LayoutModel::new(geometry.size),
            renderer: ClockRenderer::new()?,
            drag_anchor: None,
        })
    }

    /// Saved window placement, read at startup.
    pub fn geometry(&self) -> WindowGeometry {
        WindowGeometry::load(&self.prefs)
    }

    pub fn display_preferences(&self) -> DisplayPreferences {
        self.display
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        self.layout.metrics()
    }

    pub fn preferences(&self) -> &P {
        &self.prefs
    }

    pub fn renderer(&self) -> &ClockRenderer {
        &self.renderer
    }

    /// Build the frame for `time` with the current layout and toggles.
    pub fn frame(&self, time: &ClockTime) -> Frame {
        self.renderer.render(self.layout.metrics(), time, &self.display)
    }

    /// Handle one event.
    pub fn handle(&mut self, event: InputEvent, host: &mut dyn WindowHost) -> Response {
        match event {
            InputEvent::Key(key) => self.key_pressed(key, host),
            InputEvent::MousePressed {
                screen,
                popup_trigger,
            } => {
                self.drag_anchor = Some(screen);
                if popup_trigger {
                    self.show_settings();
                }
                Response::Ignored
            }
            InputEvent::MouseDragged { screen } => {
                if let (Some(anchor), Some(window)) = (self.drag_anchor, host.position()) {
                    host.set_position(Pos::new(
                        window.x + screen.x - anchor.x,
                        window.y + screen.y - anchor.y,
                    ));
                    self.drag_anchor = Some(screen);
                }
                Response::Ignored
            }
            InputEvent::MouseReleased { popup_trigger, .. } => {
                self.drag_anchor = None;
                match host.position() {
                    Some(position) => {
                        self.persist(|prefs| prefs.put_int(KEY_X, position.x));
                        self.persist(|prefs| prefs.put_int(KEY_Y, position.y));
                    }
                    None => debug!("window position unavailable, keeping saved placement"),
                }
                if popup_trigger {
                    self.show_settings();
                }
                Response::Ignored
            }
            InputEvent::Resized { width, .. } => {
                if self.layout.resize(width as i32) {
                    debug!(size = width, "layout recomputed");
                }
                Response::Redraw
            }
            InputEvent::Tick => Response::Redraw,
        }
    }

    fn key_pressed(&mut self, key: Key, host: &mut dyn WindowHost) -> Response {
        match key {
            Key::Escape => {
                info!("exit requested");
                Response::Exit
            }
            Key::Plus => {
                let size = (host.size() + SIZE_STEP).min(MAX_SIZE);
                self.apply_size(size, host);
                Response::Redraw
            }
            Key::Minus => {
                let size = (host.size() - SIZE_STEP).max(MIN_SIZE);
                self.apply_size(size, host);
                Response::Redraw
            }
            Key::Zero => {
                self.apply_size(DEFAULT_SIZE, host);
                host.center_on_screen();
                self.persist(|prefs| prefs.remove(KEY_X));
                self.persist(|prefs| prefs.remove(KEY_Y));
                Response::Redraw
            }
            Key::D => {
                self.display.show_day_of_month = !self.display.show_day_of_month;
                let value = self.display.show_day_of_month;
                self.persist(|prefs| prefs.put_bool(KEY_DAY_OF_MONTH, value));
                Response::Redraw
            }
            Key::W => {
                self.display.show_day_of_week = !self.display.show_day_of_week;
                let value = self.display.show_day_of_week;
                self.persist(|prefs| prefs.put_bool(KEY_DAY_OF_WEEK, value));
                Response::Redraw
            }
            Key::Other(name) => {
                debug!(key = %name, "unbound key");
                Response::Ignored
            }
        }
    }

    /// Resize the window and persist the size the host actually applied.
    fn apply_size(&mut self, size: i32, host: &mut dyn WindowHost) {
        host.set_size(size);
        let applied = host.size();
        self.layout.resize(applied);
        self.persist(|prefs| prefs.put_int(KEY_SIZE, applied));
    }

    fn persist<F>(&mut self, write: F)
    where
        F: FnOnce(&mut P) -> Result<(), PreferenceError>,
    {
        if let Err(e) = write(&mut self.prefs) {
            warn!("failed to save preference: {}", e);
        }
    }

    fn show_settings(&self) {
        // TODO: open a settings menu with the always-on-top and label toggles
        info!("settings menu requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{MemoryPreferences, UNSET_POSITION};

    /// Records window operations without a window system.
    struct FakeHost {
        size: i32,
        position: Option<Pos>,
        centered: bool,
    }

    impl FakeHost {
        fn new(size: i32) -> Self {
            Self {
                size,
                position: Some(Pos::new(300, 200)),
                centered: false,
            }
        }
    }

    impl WindowHost for FakeHost {
        fn size(&self) -> i32 {
            self.size
        }

        fn set_size(&mut self, size: i32) {
            self.size = size;
        }

        fn position(&self) -> Option<Pos> {
            self.position
        }

        fn set_position(&mut self, position: Pos) {
            if self.position.is_some() {
                self.position = Some(position);
            }
        }

        fn center_on_screen(&mut self) {
            self.centered = true;
            self.set_position(Pos::new(760, 340));
        }
    }

    fn controller() -> ClockController<MemoryPreferences> {
        ClockController::new(MemoryPreferences::new()).unwrap()
    }

    #[test]
    fn test_escape_exits() {
        let mut c = controller();
        let mut host = FakeHost::new(400);
        assert_eq!(c.handle(InputEvent::Key(Key::Escape), &mut host), Response::Exit);
    }

    #[test]
    fn test_plus_grows_and_persists() {
        let mut c = controller();
        let mut host = FakeHost::new(400);

        assert_eq!(c.handle(InputEvent::Key(Key::Plus), &mut host), Response::Redraw);
        assert_eq!(host.size, 420);
        assert_eq!(c.preferences().get_int(KEY_SIZE, 0), 420);
        assert_eq!(c.metrics().size, 420);
    }

    #[test]
    fn test_plus_caps_at_maximum() {
        let mut c = controller();
        let mut host = FakeHost::new(2040);

        c.handle(InputEvent::Key(Key::Plus), &mut host);
        assert_eq!(host.size, MAX_SIZE);
        c.handle(InputEvent::Key(Key::Plus), &mut host);
        assert_eq!(host.size, MAX_SIZE);
        assert_eq!(c.preferences().get_int(KEY_SIZE, 0), MAX_SIZE);
    }

    #[test]
    fn test_minus_floors_at_minimum() {
        let mut c = controller();
        let mut host = FakeHost::new(110);

        c.handle(InputEvent::Key(Key::Minus), &mut host);
        assert_eq!(host.size, MIN_SIZE);
        assert_eq!(c.preferences().get_int(KEY_SIZE, 0), MIN_SIZE);
    }

    #[test]
    fn test_zero_resets_size_and_position() {
        let mut prefs = MemoryPreferences::new();
        prefs.put_int(KEY_X, 5).unwrap();
        prefs.put_int(KEY_Y, 6).unwrap();
        let mut c = ClockController::new(prefs).unwrap();
        let mut host = FakeHost::new(900);

        c.handle(InputEvent::Key(Key::Zero), &mut host);
        assert_eq!(host.size, DEFAULT_SIZE);
        assert!(host.centered);
        assert_eq!(c.preferences().get_int(KEY_SIZE, 0), DEFAULT_SIZE);
        assert!(!c.preferences().contains(KEY_X));
        assert!(!c.preferences().contains(KEY_Y));
        assert_eq!(c.geometry().position, None);
    }

    #[test]
    fn test_label_toggles_are_independent() {
        let mut c = controller();
        let mut host = FakeHost::new(400);

        c.handle(InputEvent::Key(Key::D), &mut host);
        assert!(c.display_preferences().show_day_of_month);
        assert!(!c.display_preferences().show_day_of_week);
        assert!(c.preferences().get_bool(KEY_DAY_OF_MONTH, false));
        assert!(!c.preferences().contains(KEY_DAY_OF_WEEK));

        c.handle(InputEvent::Key(Key::W), &mut host);
        c.handle(InputEvent::Key(Key::D), &mut host);
        assert!(!c.display_preferences().show_day_of_month);
        assert!(c.display_preferences().show_day_of_week);
        assert!(!c.preferences().get_bool(KEY_DAY_OF_MONTH, true));
        assert!(c.preferences().get_bool(KEY_DAY_OF_WEEK, false));
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut c = controller();
        let mut host = FakeHost::new(400);
        let before = c.display_preferences();

        let response = c.handle(InputEvent::Key(Key::Other("Q".into())), &mut host);
        assert_eq!(response, Response::Ignored);
        assert_eq!(host.size, 400);
        assert_eq!(c.display_preferences(), before);
    }

    #[test]
    fn test_drag_moves_by_cursor_delta_and_persists_on_release() {
        let mut c = controller();
        let mut host = FakeHost::new(400);

        c.handle(
            InputEvent::MousePressed {
                screen: Pos::new(500, 400),
                popup_trigger: false,
            },
            &mut host,
        );
        c.handle(
            InputEvent::MouseDragged {
                screen: Pos::new(510, 395),
            },
            &mut host,
        );
        assert_eq!(host.position, Some(Pos::new(310, 195)));
        c.handle(
            InputEvent::MouseDragged {
                screen: Pos::new(530, 405),
            },
            &mut host,
        );
        assert_eq!(host.position, Some(Pos::new(330, 205)));
        assert!(!c.preferences().contains(KEY_X));

        c.handle(
            InputEvent::MouseReleased {
                screen: Pos::new(530, 405),
                popup_trigger: false,
            },
            &mut host,
        );
        assert_eq!(c.preferences().get_int(KEY_X, UNSET_POSITION), 330);
        assert_eq!(c.preferences().get_int(KEY_Y, UNSET_POSITION), 205);
    }

    #[test]
    fn test_drag_without_press_does_nothing() {
        let mut c = controller();
        let mut host = FakeHost::new(400);

        c.handle(
            InputEvent::MouseDragged {
                screen: Pos::new(999, 999),
            },
            &mut host,
        );
        assert_eq!(host.position, Some(Pos::new(300, 200)));
    }

    #[test]
    fn test_release_without_known_position_keeps_saved_placement() {
        let mut prefs = MemoryPreferences::new();
        prefs.put_int(KEY_X, 40).unwrap();
        prefs.put_int(KEY_Y, 50).unwrap();
        let mut c = ClockController::new(prefs).unwrap();
        let mut host = FakeHost::new(400);
        host.position = None;

        c.handle(
            InputEvent::MousePressed {
                screen: Pos::new(500, 400),
                popup_trigger: false,
            },
            &mut host,
        );
        c.handle(
            InputEvent::MouseDragged {
                screen: Pos::new(520, 410),
            },
            &mut host,
        );
        c.handle(
            InputEvent::MouseReleased {
                screen: Pos::new(520, 410),
                popup_trigger: false,
            },
            &mut host,
        );

        assert_eq!(c.preferences().get_int(KEY_X, UNSET_POSITION), 40);
        assert_eq!(c.preferences().get_int(KEY_Y, UNSET_POSITION), 50);
        assert_eq!(c.geometry().position, Some((40, 50)));
    }

    #[test]
    fn test_release_without_position_on_fresh_store_writes_nothing() {
        let mut c = controller();
        let mut host = FakeHost::new(400);
        host.position = None;

        c.handle(
            InputEvent::MouseReleased {
                screen: Pos::new(10, 10),
                popup_trigger: false,
            },
            &mut host,
        );
        assert!(!c.preferences().contains(KEY_X));
        assert!(!c.preferences().contains(KEY_Y));
        assert_eq!(c.geometry().position, None);
    }

    #[test]
    fn test_resize_event_rebuilds_layout() {
        let mut c = controller();
        let mut host = FakeHost::new(400);

        let response = c.handle(
            InputEvent::Resized {
                width: 403,
                height: 403,
            },
            &mut host,
        );
        assert_eq!(response, Response::Redraw);
        assert_eq!(c.metrics().radius, 200);
    }

    #[test]
    fn test_tick_requests_redraw() {
        let mut c = controller();
        let mut host = FakeHost::new(400);
        assert_eq!(c.handle(InputEvent::Tick, &mut host), Response::Redraw);
    }

    #[test]
    fn test_startup_reads_saved_preferences() {
        let mut prefs = MemoryPreferences::new();
        prefs.put_int(KEY_SIZE, 520).unwrap();
        prefs.put_bool(KEY_DAY_OF_WEEK, true).unwrap();

        let c = ClockController::new(prefs).unwrap();
        assert_eq!(c.metrics().size, 520);
        assert!(c.display_preferences().show_day_of_week);
        assert!(!c.display_preferences().show_day_of_month);
    }
}

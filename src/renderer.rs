//! # Clock Face Rendering
//!
//! Turns a [`LayoutMetrics`] snapshot, a [`ClockTime`] and the label toggles
//! into the ordered list of primitives for one frame. Building the frame is a
//! pure function; rasterising it onto a display is a separate step so frames
//! can be inspected, serialised or drawn onto any embedded-graphics target.
//!
//! ## Draw Order
//! Later commands paint over earlier ones:
//! 1. Background disc and outer ring
//! 2. 60 minute ticks (thin)
//! 3. 12 hour ticks (medium), on top of the minute ticks they coincide with
//! 4. Day-of-month label, bottom of the dial (optional)
//! 5. Day-of-week label, top of the dial (optional)
//! 6. Hour hand (thick), minute hand (medium), second hand (thin, secondary color)
//!
//! ## Development Mode
//! [`draw_ascii`] rasterises a frame into a [`PixelCanvas`] and prints it as
//! character cells, for checking the dial without a desktop session.

use crate::{
    canvas::{pack, PixelCanvas},
    clock_time::ClockTime,
    font::{FontError, LabelFont},
    layout::LayoutMetrics,
    preferences::DisplayPreferences,
    unit_circle::{Pos, UnitCircleTable, DEGREES},
};
use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle},
};
use serde::Serialize;

/// An RGB color in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for Rgb888 {
    fn from(color: Rgb) -> Self {
        Rgb888::new(color.r, color.g, color.b)
    }
}

/// Dial colors.
pub mod palette {
    use super::Rgb;

    pub const BACKGROUND: Rgb = Rgb::new(137, 194, 228);
    pub const TICKS: Rgb = Rgb::new(0, 0, 0);
    pub const HOUR_HAND: Rgb = Rgb::new(0, 0, 0);
    pub const MINUTE_HAND: Rgb = Rgb::new(0, 0, 0);
    pub const SECOND_HAND: Rgb = Rgb::new(64, 64, 64);
    pub const TEXT: Rgb = Rgb::new(64, 64, 64);
}

/// One drawing primitive. Lines always use round caps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Filled disc inscribed in the square at `origin` with side `diameter`
    Disc { origin: Pos, diameter: u32, color: Rgb },
    /// Circle outline inscribed in the square at `origin`
    Ring {
        origin: Pos,
        diameter: u32,
        stroke: u32,
        color: Rgb,
    },
    Line {
        from: Pos,
        to: Pos,
        stroke: u32,
        color: Rgb,
    },
    /// Text with its alphabetic baseline starting at `baseline`
    Label {
        text: String,
        baseline: Pos,
        font_size: u32,
        color: Rgb,
    },
}

impl DrawCommand {
    /// Rasterise this command onto `target`. Labels are set in `font`.
    pub fn draw<D>(&self, font: &LabelFont, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        match self {
            DrawCommand::Disc {
                origin,
                diameter,
                color,
            } => Circle::new(to_point(*origin), *diameter)
                .into_styled(PrimitiveStyle::with_fill((*color).into()))
                .draw(target),
            DrawCommand::Ring {
                origin,
                diameter,
                stroke,
                color,
            } => Circle::new(to_point(*origin), *diameter)
                .into_styled(PrimitiveStyle::with_stroke((*color).into(), *stroke))
                .draw(target),
            DrawCommand::Line {
                from,
                to,
                stroke,
                color,
            } => {
                let color: Rgb888 = (*color).into();
                Line::new(to_point(*from), to_point(*to))
                    .into_styled(PrimitiveStyle::with_stroke(color, *stroke))
                    .draw(target)?;
                if *stroke > 1 {
                    // round caps
                    for end in [*from, *to] {
                        Circle::with_center(to_point(end), *stroke)
                            .into_styled(PrimitiveStyle::with_fill(color))
                            .draw(target)?;
                    }
                }
                Ok(())
            }
            DrawCommand::Label {
                text,
                baseline,
                font_size,
                color,
            } => font.draw(text, to_point(*baseline), *font_size, (*color).into(), target),
        }
    }
}

fn to_point(pos: Pos) -> Point {
    Point::new(pos.x, pos.y)
}

/// The ordered primitives for one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Widget size the frame was laid out for
    pub size: i32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// Rasterise every command in order.
    pub fn draw<D>(&self, font: &LabelFont, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        for command in &self.commands {
            command.draw(font, target)?;
        }
        Ok(())
    }

    /// Labels in the frame, in draw order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Reduce a degree value into the table range. Inputs from a valid clock
/// never exceed one extra turn, so a single subtraction suffices.
fn wrap_degrees(degrees: u32) -> usize {
    let degrees = if degrees >= DEGREES as u32 {
        degrees - DEGREES as u32
    } else {
        degrees
    };
    degrees as usize
}

/// Hour hand angle; creeps half a degree per minute between hour ticks.
pub fn hour_hand_angle(hour: u32, minute: u32) -> usize {
    wrap_degrees(hour * 30 + minute / 2)
}

pub fn minute_hand_angle(minute: u32) -> usize {
    wrap_degrees(minute * 6)
}

pub fn second_hand_angle(second: u32) -> usize {
    wrap_degrees(second * 6)
}

/// Builds frames from layout metrics and the current time.
///
/// Owns the unit-circle table and the label font, both loaded once on
/// construction.
#[derive(Clone, Debug)]
pub struct ClockRenderer {
    table: UnitCircleTable,
    font: LabelFont,
}

impl ClockRenderer {
    pub fn new() -> Result<Self, FontError> {
        Ok(Self {
            table: UnitCircleTable::new(),
            font: LabelFont::builtin()?,
        })
    }

    pub fn table(&self) -> &UnitCircleTable {
        &self.table
    }

    /// Font the frame's labels are measured and drawn with.
    pub fn label_font(&self) -> &LabelFont {
        &self.font
    }

    /// Build the frame for `time` at the layout described by `metrics`.
    ///
    /// Time fields must be in their dial ranges (hour < 12, minute and
    /// second < 60). Angles more than one turn out of range index past the
    /// table and panic.
    pub fn render(
        &self,
        metrics: &LayoutMetrics,
        time: &ClockTime,
        prefs: &DisplayPreferences,
    ) -> Frame {
        let mut commands = Vec::with_capacity(80);

        self.push_face(&mut commands, metrics);
        self.push_ticks(&mut commands, metrics, 60, 6, metrics.strokes.thin);
        self.push_ticks(&mut commands, metrics, 12, 30, metrics.strokes.medium);

        let font = self.font.metrics(metrics.font_size);
        let c = metrics.center;
        let inset = metrics.tick_length + 3 * metrics.unit_scale;

        if prefs.show_day_of_month {
            let text = time.day_of_month.to_string();
            let y = c.y + metrics.radius - inset - font.descent;
            commands.push(self.label(text, c.x, y, metrics.font_size));
        }

        if prefs.show_day_of_week {
            let text = time.day_of_week.clone();
            let y = c.y - metrics.radius + inset + font.ascent;
            commands.push(self.label(text, c.x, y, metrics.font_size));
        }

        commands.push(self.hand(
            metrics,
            hour_hand_angle(time.hour, time.minute),
            metrics.hour_hand_length,
            metrics.strokes.thick,
            palette::HOUR_HAND,
        ));
        commands.push(self.hand(
            metrics,
            minute_hand_angle(time.minute),
            metrics.minute_hand_length,
            metrics.strokes.medium,
            palette::MINUTE_HAND,
        ));
        commands.push(self.hand(
            metrics,
            second_hand_angle(time.second),
            metrics.second_hand_length,
            metrics.strokes.thin,
            palette::SECOND_HAND,
        ));

        Frame {
            size: metrics.size,
            commands,
        }
    }

    fn push_face(&self, commands: &mut Vec<DrawCommand>, metrics: &LayoutMetrics) {
        let diameter = metrics.diameter as u32;
        commands.push(DrawCommand::Disc {
            origin: metrics.origin,
            diameter,
            color: palette::BACKGROUND,
        });
        commands.push(DrawCommand::Ring {
            origin: metrics.origin,
            diameter,
            stroke: metrics.strokes.thick,
            color: palette::TICKS,
        });
    }

    fn push_ticks(
        &self,
        commands: &mut Vec<DrawCommand>,
        metrics: &LayoutMetrics,
        count: usize,
        step: usize,
        stroke: u32,
    ) {
        let inner = metrics.radius - metrics.tick_length;
        for index in 0..count {
            let degree = index * step;
            commands.push(DrawCommand::Line {
                from: self.table.point(metrics.center, metrics.radius, degree),
                to: self.table.point(metrics.center, inner, degree),
                stroke,
                color: palette::TICKS,
            });
        }
    }

    fn hand(
        &self,
        metrics: &LayoutMetrics,
        degree: usize,
        length: i32,
        stroke: u32,
        color: Rgb,
    ) -> DrawCommand {
        DrawCommand::Line {
            from: metrics.center,
            to: self.table.point(metrics.center, length, degree),
            stroke,
            color,
        }
    }

    /// A label horizontally centered on `center_x`.
    fn label(&self, text: String, center_x: i32, y: i32, font_size: u32) -> DrawCommand {
        let x = center_x - self.font.string_width(&text, font_size) / 2;
        DrawCommand::Label {
            text,
            baseline: Pos::new(x, y),
            font_size,
            color: palette::TEXT,
        }
    }
}

/// Canvas fill for pixels the frame never touches.
const ASCII_BLANK: Rgb888 = Rgb888::WHITE;
/// Horizontal pixels per character cell.
const CELL_WIDTH: u32 = 2;
/// Vertical pixels per character cell (terminal cells are about twice as tall as wide).
const CELL_HEIGHT: u32 = 4;

/// Character for a cell, by the strongest pixel it contains.
fn cell_char(canvas: &PixelCanvas, cx: u32, cy: u32) -> char {
    let hand = pack(palette::HOUR_HAND.into());
    let secondary = pack(palette::SECOND_HAND.into());
    let face = pack(palette::BACKGROUND.into());

    let mut best = ' ';
    for y in cy * CELL_HEIGHT..(cy + 1) * CELL_HEIGHT {
        for x in cx * CELL_WIDTH..(cx + 1) * CELL_WIDTH {
            if !canvas.is_inside_face(x, y) {
                continue;
            }
            let rank = match canvas.pixel(x, y) {
                Some(p) if p == hand => '#',
                Some(p) if p == secondary => '+',
                Some(p) if p == face => '.',
                _ => ' ',
            };
            best = match (best, rank) {
                ('#', _) | (_, '#') => '#',
                ('+', _) | (_, '+') => '+',
                ('.', _) | (_, '.') => '.',
                _ => ' ',
            };
        }
    }
    best
}

/// Render a frame as character cells.
///
/// `#` marks ring, ticks and main hands, `+` the second hand and labels,
/// `.` the face background.
pub fn ascii_art(frame: &Frame, font: &LabelFont) -> String {
    let size = frame.size.max(0) as u32;
    let mut canvas = PixelCanvas::new(size, size, ASCII_BLANK);
    let Ok(()) = frame.draw(font, &mut canvas);

    let columns = size / CELL_WIDTH;
    let rows = size / CELL_HEIGHT;
    let mut out = String::with_capacity(((columns + 1) * rows) as usize);
    for cy in 0..rows {
        let line: String = (0..columns).map(|cx| cell_char(&canvas, cx, cy)).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Print a frame to stdout as ASCII art.
pub fn draw_ascii(frame: &Frame, font: &LabelFont) {
    print!("{}", ascii_art(frame, font));
}

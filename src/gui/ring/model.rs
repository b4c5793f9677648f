use crate::config::RingConfig;
use crate::gui::ring::{PROGRESS_BLUE, SEAM_FIX, SEAM_THRESHOLD, TAU};
use palette::{Srgb, Srgba, WithAlpha};
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Pixel dimensions of the drawing surface. Every configured geometry value is a
/// fraction of one of these.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Largest square that fits in `container`.
    pub fn square_within(container: CanvasSize) -> Self {
        let side = container.width.min(container.height).max(0.0);
        Self::new(side, side)
    }

    pub fn min_axis(&self) -> Axis {
        if self.width < self.height {
            Axis::X
        } else {
            Axis::Y
        }
    }

    pub fn rel_to_abs(&self, rel: f64, axis: Axis) -> f64 {
        match axis {
            Axis::X => rel * self.width,
            Axis::Y => rel * self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Forward,
    Backward,
    Stop,
}

impl Command {
    /// Anything other than exactly `forward` or `backward` halts the ring.
    pub fn from_direction(direction: &str) -> Self {
        direction.parse().unwrap_or(Self::Stop)
    }
}

/// Completion event payload. Exactly one is emitted per terminal transition or
/// explicit stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
#[repr(i8)]
pub enum Signal {
    Error = -1,
    Halted = 0,
    Filled = 1,
    Emptied = 2,
}

impl Signal {
    pub fn code(&self) -> i32 {
        *self as i8 as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Settled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RingError {
    #[error("sweep angle is not finite (progress {progress}, offset {offset})")]
    NonFiniteSweep { progress: f64, offset: f64 },
}

/// End angle of the progress arc in radians. Past [`SEAM_THRESHOLD`] a small overlap is
/// added so no gap shows where a full arc meets its start.
pub fn sweep_end(progress: f64, offset: f64) -> Result<f64, RingError> {
    let turns = if progress > SEAM_THRESHOLD {
        progress + offset + SEAM_FIX
    } else {
        progress + offset
    };

    let angle = turns * TAU;
    if angle.is_finite() {
        Ok(angle)
    } else {
        Err(RingError::NonFiniteSweep { progress, offset })
    }
}

/// Red fades out and green fades in as the ring fills. Blue stays fixed.
pub fn progress_color(progress: f64) -> Srgb<u8> {
    let red = (255.0 - 255.0 * progress).clamp(0.0, 255.0);
    let green = (255.0 * progress).clamp(0.0, 255.0);
    Srgb::new(red.round() as u8, green.round() as u8, PROGRESS_BLUE)
}

pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Disc {
    pub center: Point,
    pub radius: f64,
    pub fill: Srgba<f64>,
    pub border: Srgba<f64>,
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub center: Point,
    pub radius: f64,
    pub stroke: Srgba<f64>,
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
    pub stroke: Srgba<f64>,
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub center: Point,
    pub text: String,
    pub color: Srgba<f64>,
    pub font_size: f64,
    pub font_family: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Disc(Disc),
    Ring(Ring),
    Arc(Arc),
    Label(Label),
}

/// The four descriptors making up the widget, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderObjects {
    pub background: Disc,
    pub track: Ring,
    pub progress: Arc,
    pub label: Label,
}

impl RenderObjects {
    pub fn build(config: &RingConfig, canvas: CanvasSize) -> Self {
        let center = Point::new(
            canvas.rel_to_abs(config.circle_x, Axis::X),
            canvas.rel_to_abs(config.circle_y, Axis::Y),
        );
        let scaled = |rel: f64| canvas.rel_to_abs(rel, Axis::X) * config.draw_scale;
        let start = config.arc_angle_offset * TAU;

        Self {
            background: Disc {
                center,
                radius: scaled(config.outer_radius),
                fill: *config.background_fill,
                border: *config.background_border_color,
                line_width: scaled(config.outer_radius_line_width),
            },
            track: Ring {
                center,
                radius: scaled(config.inner_radius_unfilled),
                stroke: *config.unfilled_bar_color,
                line_width: scaled(config.unfilled_bar_width),
            },
            progress: Arc {
                center,
                radius: scaled(config.inner_radius_progress),
                start,
                end: start,
                stroke: progress_color(0.0).into_format::<f64>().with_alpha(1.0),
                line_width: scaled(config.progress_bar_width),
            },
            label: Label {
                center,
                text: config.hold_text.clone(),
                color: *config.hold_text_color,
                font_size: canvas.rel_to_abs(config.font_size, canvas.min_axis())
                    * config.draw_scale,
                font_family: config.font_family.clone(),
            },
        }
    }

    /// Snapshot for one frame, with the arc coloured for `progress`.
    pub fn display_list(&self, progress: f64) -> [Shape; 4] {
        let mut arc = self.progress.clone();
        arc.stroke = progress_color(progress)
            .into_format::<f64>()
            .with_alpha(1.0);

        [
            Shape::Disc(self.background.clone()),
            Shape::Ring(self.track.clone()),
            Shape::Arc(arc),
            Shape::Label(self.label.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::from_direction("forward"), Command::Forward);
        assert_eq!(Command::from_direction("backward"), Command::Backward);
        assert_eq!(Command::from_direction("stop"), Command::Stop);
        assert_eq!(Command::from_direction("Forward"), Command::Stop);
        assert_eq!(Command::from_direction(""), Command::Stop);
        assert_eq!(Command::from_direction("sideways"), Command::Stop);
    }

    #[test]
    fn test_signal_codes() {
        assert_eq!(Signal::Error.code(), -1);
        assert_eq!(Signal::Halted.code(), 0);
        assert_eq!(Signal::Filled.code(), 1);
        assert_eq!(Signal::Emptied.code(), 2);
        assert_eq!(Signal::Filled.to_string(), "filled");
    }

    #[test]
    fn test_seam_fix_applies_strictly_above_threshold() {
        let at = sweep_end(0.33, 0.75).unwrap();
        assert!(approx(at, (0.33 + 0.75) * TAU));

        let above = sweep_end(0.330_000_1, 0.75).unwrap();
        assert!(approx(above, (0.330_000_1 + 0.75 + SEAM_FIX) * TAU));

        let below = sweep_end(0.32, 0.75).unwrap();
        assert!(approx(below, (0.32 + 0.75) * TAU));
    }

    #[test]
    fn test_sweep_rejects_non_finite_angles() {
        assert!(matches!(
            sweep_end(0.5, f64::NAN),
            Err(RingError::NonFiniteSweep { .. })
        ));
        assert!(sweep_end(f64::INFINITY, 0.75).is_err());
    }

    #[test]
    fn test_progress_color_endpoints() {
        assert_eq!(progress_color(0.0), Srgb::new(255, 0, 14));
        assert_eq!(progress_color(1.0), Srgb::new(0, 255, 14));
        assert_eq!(to_hex(progress_color(0.0)), "#FF000E");
        assert_eq!(to_hex(progress_color(1.0)), "#00FF0E");
        assert_eq!(to_hex(progress_color(0.5)), "#80800E");
    }

    #[test]
    fn test_progress_color_is_clamped() {
        assert_eq!(progress_color(1.7), Srgb::new(0, 255, 14));
        assert_eq!(progress_color(-0.4), Srgb::new(255, 0, 14));
    }

    #[test]
    fn test_square_within_uses_smaller_dimension() {
        let size = CanvasSize::square_within(CanvasSize::new(640.0, 300.0));
        assert_eq!(size, CanvasSize::new(300.0, 300.0));
        assert_eq!(CanvasSize::new(200.0, 400.0).min_axis(), Axis::X);
        assert_eq!(CanvasSize::new(400.0, 400.0).min_axis(), Axis::Y);
    }

    #[test]
    fn test_build_uses_canvas_fractions() {
        let config = RingConfig::default();
        let objects = RenderObjects::build(&config, CanvasSize::new(200.0, 200.0));

        assert_eq!(objects.background.center, Point::new(100.0, 100.0));
        assert!(approx(objects.background.radius, 94.0));
        assert!(approx(objects.background.line_width, 2.0));
        assert!(approx(objects.track.radius, 80.0));
        assert!(approx(objects.track.line_width, 12.0));
        assert!(approx(objects.progress.line_width, 16.0));
        assert!(approx(objects.progress.start, 0.75 * TAU));
        assert_eq!(objects.progress.start, objects.progress.end);
        assert!(approx(objects.label.font_size, 42.0));
        assert_eq!(objects.label.text, "HOLD");
    }

    #[test]
    fn test_draw_scale_scales_radii_but_not_center() {
        let config = RingConfig {
            draw_scale: 0.5,
            ..RingConfig::default()
        };
        let objects = RenderObjects::build(&config, CanvasSize::new(200.0, 200.0));

        assert_eq!(objects.progress.center, Point::new(100.0, 100.0));
        assert!(approx(objects.progress.radius, 40.0));
        assert!(approx(objects.label.font_size, 21.0));
    }

    #[test]
    fn test_display_list_colours_arc_by_progress() {
        let objects = RenderObjects::build(&RingConfig::default(), CanvasSize::new(100.0, 100.0));
        let shapes = objects.display_list(1.0);

        assert!(matches!(shapes[0], Shape::Disc(_)));
        assert!(matches!(shapes[1], Shape::Ring(_)));
        assert!(matches!(shapes[3], Shape::Label(_)));
        match &shapes[2] {
            Shape::Arc(arc) => {
                assert!(approx(arc.stroke.red, 0.0));
                assert!(approx(arc.stroke.green, 1.0));
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }
}

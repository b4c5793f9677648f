pub mod animator;
pub mod model;
pub mod view;

pub use animator::{Animator, Clock, FrameToken, Host, MonotonicClock, Ticker};
pub use model::{
    Arc, Axis, CanvasSize, Command, Disc, Label, Phase, Point, RenderObjects, Ring, RingError,
    Shape, Signal,
};
pub use view::draw;

pub const TAU: f64 = std::f64::consts::TAU;
pub const EPSILON: f64 = 0.0001; // terminal slack in both directions
pub const SEAM_THRESHOLD: f64 = 0.33; // progress above which the seam overlap applies
pub const SEAM_FIX: f64 = 0.01; // fraction of a turn, hides the gap where the arc meets its start
pub const PROGRESS_BLUE: u8 = 14;

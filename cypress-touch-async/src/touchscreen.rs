//! Generic touchscreen abstraction: coordinate normalization and touch tracking.
//!
//! A touch driver reports raw controller coordinates per frame. This module
//! maps them onto the display (calibrate and mirror each raw axis, swap,
//! then scale) and turns successive frames into `Down` / `Contact` / `Up`
//! events per touch slot.

use embassy_time::Duration;
use heapless::Vec;

/// Maximum number of simultaneous touches reported per frame.
pub const MAX_TOUCHES: usize = 2;

/// The touches of one frame.
pub type Touches = Vec<TouchPoint, MAX_TOUCHES>;

/// Represents a touch event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// A finger touched the screen.
    Down,
    /// A finger is still on the screen.
    Contact,
    /// A finger was lifted from the screen. Coordinates are the last known ones.
    Up,
}

/// Represents a single touch point with its coordinates and state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    /// The slot of the touch point (0-1).
    pub id: u8,
    /// The type of touch event.
    pub event: TouchEvent,
    /// Normalized x-coordinate.
    pub x: u16,
    /// Normalized y-coordinate.
    pub y: u16,
    /// The x-coordinate as reported by the controller.
    pub x_raw: u16,
    /// The y-coordinate as reported by the controller.
    pub y_raw: u16,
    /// Contact pressure as reported by the controller.
    pub pressure: u8,
}

/// Raw coordinate range of each controller axis, applied before the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub x_min: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_max: u16,
}

/// Orientation of the panel relative to the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transform {
    /// Exchange the x and y axes after calibration and mirroring.
    pub swap_xy: bool,
    /// Mirror the raw x axis.
    pub mirror_x: bool,
    /// Mirror the raw y axis.
    pub mirror_y: bool,
}

/// Display geometry and orientation shared by every touchscreen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchscreenConfig {
    /// Display width in pixels. 0 reports `0..=max - min` of the axis mapped onto x.
    pub width: u16,
    /// Display height in pixels. 0 reports `0..=max - min` of the axis mapped onto y.
    pub height: u16,
    pub calibration: Calibration,
    pub transform: Transform,
    /// How long `read_touches` waits for the interrupt line before polling anyway.
    pub interrupt_timeout: Duration,
}

impl Default for TouchscreenConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            calibration: Calibration {
                x_min: 0,
                x_max: 682,
                y_min: 0,
                y_max: 1023,
            },
            transform: Transform {
                swap_xy: true,
                mirror_x: false,
                mirror_y: true,
            },
            interrupt_timeout: Duration::from_secs(1),
        }
    }
}

/// Offset of `raw` inside `min..=max`, clamped, together with the span.
#[derive(Clone, Copy)]
struct AxisPosition {
    offset: u32,
    span: u32,
}

impl AxisPosition {
    fn new(raw: u16, min: u16, max: u16, mirror: bool) -> Self {
        let span = u32::from(max.saturating_sub(min)).max(1);
        let offset = u32::from(raw.min(max).saturating_sub(min)).min(span);
        let offset = if mirror { span - offset } else { offset };
        Self { offset, span }
    }

    /// Scales onto `0..extent`, or keeps `0..=span` when `extent` is 0.
    fn scale(self, extent: u16) -> u16 {
        if extent == 0 {
            return self.offset as u16;
        }
        (self.offset * (u32::from(extent) - 1) / self.span) as u16
    }
}

impl TouchscreenConfig {
    /// Maps raw controller coordinates onto the display.
    ///
    /// Each raw axis is clamped to its calibration range and mirrored first,
    /// then the axes are swapped and scaled to the display size.
    pub fn normalize(&self, x_raw: u16, y_raw: u16) -> (u16, u16) {
        let cal = &self.calibration;
        let x = AxisPosition::new(x_raw, cal.x_min, cal.x_max, self.transform.mirror_x);
        let y = AxisPosition::new(y_raw, cal.y_min, cal.y_max, self.transform.mirror_y);
        let (x, y) = if self.transform.swap_xy { (y, x) } else { (x, y) };
        (x.scale(self.width), y.scale(self.height))
    }
}

/// Follows touch slots across frames.
#[derive(Debug, Default)]
pub struct TouchTracker {
    slots: [Option<TouchPoint>; MAX_TOUCHES],
}

impl TouchTracker {
    /// Creates a tracker with no slot held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any slot is currently held.
    pub fn is_touched(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Forgets all held slots without emitting `Up` events.
    pub fn clear(&mut self) {
        self.slots = [None; MAX_TOUCHES];
    }

    /// Feeds the contacts of a new frame and returns the resulting events.
    ///
    /// The `event` field of the input points is ignored. Points whose id does
    /// not name a slot are dropped.
    pub fn update(&mut self, frame: &[TouchPoint]) -> Touches {
        let mut current: [Option<TouchPoint>; MAX_TOUCHES] = [None; MAX_TOUCHES];
        for point in frame {
            if let Some(slot) = current.get_mut(usize::from(point.id)) {
                *slot = Some(*point);
            }
        }

        let mut touches = Touches::new();
        for (previous, now) in self.slots.iter().zip(current.iter_mut()) {
            let event = match (previous, now.as_mut()) {
                (None, Some(now)) => {
                    now.event = TouchEvent::Down;
                    *now
                }
                (Some(_), Some(now)) => {
                    now.event = TouchEvent::Contact;
                    *now
                }
                (Some(previous), None) => TouchPoint {
                    event: TouchEvent::Up,
                    ..*previous
                },
                (None, None) => continue,
            };
            // One entry per slot, so this never exceeds the capacity.
            let _ = touches.push(event);
        }
        self.slots = current;
        touches
    }
}

/// A touch input device.
#[allow(async_fn_in_trait)]
pub trait Touchscreen {
    type Error;

    /// Waits for the next frame and returns its touch events.
    async fn read_touches(&mut self) -> Result<Touches, Self::Error>;

    /// Geometry used to normalize coordinates.
    fn touchscreen_config(&self) -> &TouchscreenConfig;
}

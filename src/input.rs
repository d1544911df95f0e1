//! Host-neutral input events. The wasm layer translates DOM events into these
//! and queues them for the next frame.

/// Pixel coordinates relative to the viewport's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerMove(Point),
    PointerDown(Point),
    PointerUp,
    Click(Point),
    TouchStart(Point),
    TouchMove(Point),
    TouchEnd,
    /// `KeyboardEvent.code`, e.g. `"Space"`, `"KeyM"`, `"Digit1"`.
    KeyDown(String),
    KeyUp(String),
    /// A page control was activated, by element id.
    Button(String),
    /// A navigation item was selected; carries its `data-section` or
    /// `data-panel` value.
    Navigate(String),
    Resize { width: f32, height: f32 },
    /// Wall-clock reading, for scenes that display the time.
    WallClock { epoch_ms: f64 },
    Visibility { hidden: bool },
    ContextLost,
    ContextRestored,
}

use std::sync::Arc;

use crate::{Result, WindowError, driver::Platform, input::Router};

use super::Window;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Unit {
    /// Physical pixels.
    Px,
    /// Device independent pixels.
    Dp,
    /// Scaled pixels, following the user's font size preference.
    Sp,
}

/// A length and its unit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Value {
    pub v: f32,
    pub unit: Unit,
}

impl Value {
    pub fn px(v: f32) -> Self {
        Self { v, unit: Unit::Px }
    }

    pub fn dp(v: f32) -> Self {
        Self { v, unit: Unit::Dp }
    }

    pub fn sp(v: f32) -> Self {
        Self { v, unit: Unit::Sp }
    }
}

/// Hints for creating a window. The platform is free to ignore or adjust
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowOptions {
    pub width: Value,
    pub height: Value,
    pub title: String,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: Value::dp(800.0),
            height: Value::dp(600.0),
            title: "Lantern".to_string(),
        }
    }
}

impl WindowOptions {
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v > 0.0;
        if !positive(self.width.v) || !positive(self.height.v) {
            return Err(WindowError::InvalidSize {
                width: self.width.v,
                height: self.height.v,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct WindowBuilder {
    opts: WindowOptions,
}

impl WindowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.opts.title = title.into();
        self
    }

    pub fn with_size(mut self, width: Value, height: Value) -> Self {
        self.opts.width = width;
        self.opts.height = height;
        self
    }

    pub fn options(&self) -> &WindowOptions {
        &self.opts
    }

    pub fn build(self, platform: Arc<dyn Platform>, router: Box<dyn Router>) -> Result<Window> {
        Window::new(self.opts, platform, router)
    }
}

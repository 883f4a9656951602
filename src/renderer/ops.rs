use glam::{Vec2, Vec4};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderPrimative {
    Rectangle {
        position: Vec2,
        size: Vec2,
        color: Vec4,
    },
    Text {
        text: String,
        position: Vec2,
        color: Vec4,
        size: f32,
    },
    Line {
        start: Vec2,
        end: Vec2,
        color: Vec4,
        width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Vec4,
    },
}

/// The drawing operations of one frame.
///
/// Built by the application, then handed to [`Window::draw`](crate::Window::draw)
/// by shared reference; the window never mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ops {
    prims: Vec<RenderPrimative>,
}

impl Ops {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the list for the next frame, keeping its allocation.
    pub fn reset(&mut self) {
        self.prims.clear();
    }

    pub fn push(&mut self, prim: RenderPrimative) {
        self.prims.push(prim);
    }

    pub fn draw_rect(&mut self, position: Vec2, size: Vec2, color: Vec4) {
        self.push(RenderPrimative::Rectangle {
            position,
            size,
            color,
        });
    }

    pub fn draw_text(&mut self, text: &str, position: Vec2, color: Vec4, size: f32) {
        self.push(RenderPrimative::Text {
            text: text.to_string(),
            position,
            color,
            size,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderPrimative> {
        self.prims.iter()
    }

    pub fn len(&self) -> usize {
        self.prims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }
}

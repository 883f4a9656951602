use crate::{input::InputEvent, windowing::Event};

/// Short name of an event for log output.
pub fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Input(input) => match input {
            InputEvent::PointerDown { .. } => "PointerDown",
            InputEvent::PointerUp { .. } => "PointerUp",
            InputEvent::PointerMove { .. } => "PointerMove",
            InputEvent::PointerLeave => "PointerLeave",
            InputEvent::KeyDown { .. } => "KeyDown",
            InputEvent::KeyUp { .. } => "KeyUp",
            _ => "Input",
        },
        Event::Command(_) => "Command",
        Event::Stage(_) => "Stage",
        Event::Draw(_) => "Draw",
        Event::Destroy(_) => "Destroy",
    }
}

use boba::joypad::{self, Button};
use boba::memory_bus::MemoryBus;
use sdl2::EventPump;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use std::collections::HashSet;

/// Tracks which emulated buttons are currently held, translating SDL key
/// events into the core's host-agnostic `Button` set.
pub struct InputState {
    pressed: HashSet<Button>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            pressed: HashSet::new(),
        }
    }
}

fn map_keycode(key: Keycode) -> Option<Button> {
    match key {
        Keycode::Right | Keycode::D => Some(Button::Right),
        Keycode::Left | Keycode::A => Some(Button::Left),
        Keycode::Up | Keycode::W => Some(Button::Up),
        Keycode::Down | Keycode::S => Some(Button::Down),
        Keycode::Z => Some(Button::A),
        Keycode::X => Some(Button::B),
        Keycode::Return => Some(Button::Start),
        Keycode::Backspace => Some(Button::Select),
        _ => None,
    }
}

/// Polls SDL events, updates the held-button set, and pushes the resulting
/// input snapshot into the memory bus. Returns `true` if the quit event was
/// received, `false` otherwise.
pub fn handle_input(
    event_pump: &mut EventPump,
    input_state: &mut InputState,
    memory_bus: &mut MemoryBus,
) -> bool {
    for event in event_pump.poll_iter() {
        match event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => {
                return true; // Signal quit
            }
            Event::KeyDown {
                keycode: Some(key),
                repeat: false,
                ..
            } => {
                if let Some(button) = map_keycode(key) {
                    input_state.pressed.insert(button);
                }
            }
            Event::KeyUp {
                keycode: Some(key),
                repeat: false,
                ..
            } => {
                if let Some(button) = map_keycode(key) {
                    input_state.pressed.remove(&button);
                }
            }
            _ => {} // Ignore other events
        }
    }

    let snapshot = joypad::snapshot_from_pressed(input_state.pressed.iter().copied());
    memory_bus.set_input_snapshot(snapshot);
    false // Continue running
}

/// Bit layout of the host-supplied joypad snapshot (1 = released, 0 = pressed):
/// bit 0 right, 1 left, 2 up, 3 down, 4 A, 5 B, 6 select, 7 start.
pub const RIGHT_BIT: u8 = 0;
pub const LEFT_BIT: u8 = 1;
pub const UP_BIT: u8 = 2;
pub const DOWN_BIT: u8 = 3;
pub const A_BIT: u8 = 4;
pub const B_BIT: u8 = 5;
pub const SELECT_BIT: u8 = 6;
pub const START_BIT: u8 = 7;

/// A host-side button, used only to build an `input_snapshot` mask. The core
/// never names a physical key or a windowing-library type; a host frontend
/// constructs a mask from whichever buttons it considers pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    fn mask_bit(self) -> u8 {
        match self {
            Button::Right => RIGHT_BIT,
            Button::Left => LEFT_BIT,
            Button::Up => UP_BIT,
            Button::Down => DOWN_BIT,
            Button::A => A_BIT,
            Button::B => B_BIT,
            Button::Select => SELECT_BIT,
            Button::Start => START_BIT,
        }
    }
}

/// Builds an `input_snapshot` byte (1 = released, 0 = pressed) from the set
/// of currently-pressed buttons, starting from "everything released".
pub fn snapshot_from_pressed(pressed: impl IntoIterator<Item = Button>) -> u8 {
    let mut mask = 0xFFu8;
    for button in pressed {
        mask &= !(1 << button.mask_bit());
    }
    mask
}

/// Manages the P1 (JOYP) register's program-visible selection bits and
/// resolves them against the host-supplied 8-bit snapshot. Edge-triggered
/// joypad-interrupt detection happens at *read* time: the bus compares the
/// newly resolved low nibble against the last-resolved one and reports
/// whether the interrupt should fire (see Design Notes, "Joypad interrupt
/// edge detection").
#[derive(Clone, Debug)]
pub struct Joypad {
    p1_register_selection: u8, // bits 4,5 only
    snapshot: u8,              // raw host input_snapshot, 1 = released
    last_resolved_low_nibble: u8,
}

impl Joypad {
    pub fn new() -> Self {
        Joypad {
            p1_register_selection: 0x30,
            snapshot: 0xFF,
            last_resolved_low_nibble: 0x0F,
        }
    }

    /// Replaces the host input snapshot wholesale (one-byte atomic replacement,
    /// per the concurrency model: the bus treats each read as a snapshot).
    pub fn set_snapshot(&mut self, snapshot: u8) {
        self.snapshot = snapshot;
    }

    /// Resolves the P1 register's current value and reports whether a
    /// newly-pressed, currently-selected line should raise the joypad
    /// interrupt.
    pub fn read_p1(&mut self) -> (u8, bool) {
        let mut low_nibble = 0x0F;
        if self.p1_register_selection & 0x20 == 0 {
            // Actions: A, B, Select, Start -> snapshot bits 4..7
            low_nibble &= (self.snapshot >> 4) | 0xF0;
        }
        if self.p1_register_selection & 0x10 == 0 {
            // Directions: Right, Left, Up, Down -> snapshot bits 0..3
            low_nibble &= self.snapshot | 0xF0;
        }
        low_nibble &= 0x0F;

        let newly_pressed = self.last_resolved_low_nibble & !low_nibble;
        let interrupt = newly_pressed != 0;
        self.last_resolved_low_nibble = low_nibble;

        (low_nibble | self.p1_register_selection | 0xC0, interrupt)
    }

    /// Writes to the P1 register (only bits 4, 5 are writable by the program).
    pub fn write_p1(&mut self, value: u8) {
        self.p1_register_selection = value & 0x30;
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressing_a_selected_button_raises_interrupt_on_read() {
        let mut joypad = Joypad::new();
        joypad.write_p1(0x10); // select actions (bit 5 = 0)
        let (_, irq) = joypad.read_p1(); // establish baseline (all released)
        assert!(!irq);

        joypad.set_snapshot(snapshot_from_pressed([Button::A]));
        let (value, irq) = joypad.read_p1();
        assert!(irq);
        assert_eq!(value & 0x0F, 0b1110);
    }

    #[test]
    fn unselected_group_never_raises_interrupt() {
        let mut joypad = Joypad::new();
        joypad.write_p1(0x20); // select directions only (bit 4 = 0), actions deselected
        let (_, irq) = joypad.read_p1();
        assert!(!irq);

        joypad.set_snapshot(snapshot_from_pressed([Button::A]));
        let (_, irq) = joypad.read_p1();
        assert!(!irq);
    }
}

use crate::memory_map::*;

/// Frequency table for TIMA, indexed by `TAC & 0x3`: cycles-per-tick at each
/// of the four selectable rates (4096 Hz, 262144 Hz, 65536 Hz, 16384 Hz).
const TIMA_FREQ_TABLE: [u32; 4] = [1024, 16, 64, 256];

const DIV_CYCLES: u32 = 256;

/// The DIV/TIMA divider-and-counter pair. Advances in lockstep with the CPU,
/// driven by the same per-instruction cycle count the frame driver also
/// hands to the PPU.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    div_acc: u32,
    tima_acc: u32,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            div_acc: 0,
            tima_acc: 0,
        }
    }

    /// Advances the divider and, if enabled, the timer counter by `cycles`
    /// T-cycles, reading/writing DIV/TIMA/TMA/TAC through the bus and
    /// requesting the timer interrupt on overflow. Timers cannot fail.
    pub fn step(&mut self, cycles: u32, memory_bus: &mut crate::memory_bus::MemoryBus) {
        if memory_bus.take_div_reset_pending() {
            self.reset_div();
        }

        self.div_acc += cycles;
        while self.div_acc >= DIV_CYCLES {
            self.div_acc -= DIV_CYCLES;
            let div = memory_bus.get_io_reg(DIV_ADDR);
            memory_bus.set_io_reg_direct(DIV_ADDR, div.wrapping_add(1));
        }

        let tac = memory_bus.get_io_reg(TAC_ADDR);
        if tac & 0x04 == 0 {
            return;
        }

        let freq = TIMA_FREQ_TABLE[(tac & 0x03) as usize];
        self.tima_acc += cycles;
        while self.tima_acc >= freq {
            self.tima_acc -= freq;
            let tima = memory_bus.get_io_reg(TIMA_ADDR);
            if tima == 0xFF {
                let tma = memory_bus.get_io_reg(TMA_ADDR);
                memory_bus.set_io_reg_direct(TIMA_ADDR, tma);
                memory_bus.request_interrupt(TIMER_INTERRUPT_BIT);
            } else {
                memory_bus.set_io_reg_direct(TIMA_ADDR, tima + 1);
            }
        }
    }

    /// Resets the divider accumulator. Called when the program writes to
    /// DIV (any write resets the visible register to 0, and the internal
    /// prescaler restarts alongside it).
    pub fn reset_div(&mut self) {
        self.div_acc = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_bus::MemoryBus;

    #[test]
    fn tima_overflow_reloads_from_tma_and_raises_interrupt() {
        let mut bus = MemoryBus::new();
        bus.set_io_reg_direct(TAC_ADDR, 0b101); // enabled, freq index 1 -> period 16
        bus.set_io_reg_direct(TIMA_ADDR, 0xFE);
        bus.set_io_reg_direct(TMA_ADDR, 0x42);
        bus.set_io_reg_direct(IF_ADDR, 0x00);

        let mut timer = Timer::new();
        timer.step(32, &mut bus);

        assert_eq!(bus.get_io_reg(TIMA_ADDR), 0x42);
        assert_eq!(bus.get_io_reg(IF_ADDR) & (1 << TIMER_INTERRUPT_BIT), 1 << TIMER_INTERRUPT_BIT);
    }

    #[test]
    fn div_increments_every_256_cycles() {
        let mut bus = MemoryBus::new();
        bus.set_io_reg_direct(DIV_ADDR, 0x00);
        let mut timer = Timer::new();
        timer.step(256, &mut bus);
        assert_eq!(bus.get_io_reg(DIV_ADDR), 1);
    }

    #[test]
    fn writing_div_resets_the_internal_prescaler() {
        let mut bus = MemoryBus::new();
        let mut timer = Timer::new();
        timer.step(200, &mut bus); // div_acc = 200, short of the 256 threshold
        bus.write_byte(DIV_ADDR, 0x00); // any write resets DIV and flags a prescaler reset
        assert_eq!(bus.get_io_reg(DIV_ADDR), 0);
        timer.step(200, &mut bus); // would overflow 256 if div_acc hadn't been reset
        assert_eq!(bus.get_io_reg(DIV_ADDR), 0);
        timer.step(56, &mut bus);
        assert_eq!(bus.get_io_reg(DIV_ADDR), 1);
    }

    #[test]
    fn disabled_timer_does_not_advance_tima() {
        let mut bus = MemoryBus::new();
        bus.set_io_reg_direct(TAC_ADDR, 0b000); // disabled
        bus.set_io_reg_direct(TIMA_ADDR, 0x00);
        let mut timer = Timer::new();
        timer.step(10_000, &mut bus);
        assert_eq!(bus.get_io_reg(TIMA_ADDR), 0x00);
    }
}

//! The DIV/TIMA timer block.
//!
//! DIV ticks at 16384 Hz (every 256 T-cycles) and is cleared by any write.
//! TIMA ticks at the TAC-selected rate while TAC bit 2 is set; on overflow
//! it reloads from TMA and requests the Timer interrupt.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Timer {
    div: u8,
    tima: u8,
    tma: u8,
    tac: u8,

    div_counter: u16,
    tima_counter: u16,
}

impl Timer {
    /// Advances the timer by `cycles` T-cycles. Returns true when TIMA
    /// overflowed and the Timer interrupt should be requested.
    pub fn clock(&mut self, cycles: u8) -> bool {
        let mut interrupt = false;

        self.div_counter = self.div_counter.wrapping_add(u16::from(cycles));
        while self.div_counter >= 256 {
            self.div_counter -= 256;
            self.div = self.div.wrapping_add(1);
        }

        if self.tac & 0b100 != 0 {
            self.tima_counter += u16::from(cycles);
            let period = self.period();
            while self.tima_counter >= period {
                self.tima_counter -= period;
                let (tima, overflowed) = self.tima.overflowing_add(1);
                self.tima = if overflowed { self.tma } else { tima };
                interrupt |= overflowed;
            }
        }

        interrupt
    }

    /// T-cycles per TIMA increment for the selected TAC rate.
    const fn period(&self) -> u16 {
        match self.tac & 0b11 {
            0b00 => 1024, // 4096 Hz
            0b01 => 16,   // 262144 Hz
            0b10 => 64,   // 65536 Hz
            _ => 256,     // 16384 Hz
        }
    }

    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        match address {
            0xFF04 => self.div,
            0xFF05 => self.tima,
            0xFF06 => self.tma,
            _ => self.tac | 0xF8,
        }
    }

    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            0xFF04 => {
                // any write clears the whole divider
                self.div = 0;
                self.div_counter = 0;
            }
            0xFF05 => self.tima = value,
            0xFF06 => self.tma = value,
            _ => self.tac = value & 0x07,
        }
    }
}

//! IRQ plumbing shared by the interrupt-capable boards.

/// One board's IRQ output as seen by the processor.
///
/// `raise` produces an edge the bus takes once. `acknowledge` drops the line;
/// when it was asserted, a single cancellation is reported so a request the
/// processor has latched but not yet serviced is withdrawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrqLine {
    raised: bool,
    asserted: bool,
    cancelled: bool,
}

impl IrqLine {
    pub fn raise(&mut self) {
        self.raised = true;
        self.asserted = true;
    }

    pub fn acknowledge(&mut self) {
        if self.asserted {
            self.cancelled = true;
        }
        self.raised = false;
        self.asserted = false;
    }

    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.raised)
    }

    pub fn take_cancel(&mut self) -> bool {
        std::mem::take(&mut self.cancelled)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Derives CPU cycles from video dots (three dots per CPU cycle) for boards
/// whose counters run on the CPU clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuClock {
    dots: u8,
}

impl CpuClock {
    /// Advance one dot; true when a CPU cycle completes.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.dots += 1;
        if self.dots == 3 {
            self.dots = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.dots = 0;
    }
}

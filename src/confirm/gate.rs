#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    CountingDown,
    Ready,
    Confirmed,
    Cancelled,
}

/// Read-before-confirm gate: confirm stays disabled until the countdown
/// reaches zero. `Confirmed` and `Cancelled` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationGate {
    seconds_remaining: u32,
    state: GateState,
}

impl ConfirmationGate {
    pub fn new(countdown_secs: u32) -> Self {
        Self {
            seconds_remaining: countdown_secs,
            state: if countdown_secs == 0 {
                GateState::Ready
            } else {
                GateState::CountingDown
            },
        }
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn can_confirm(&self) -> bool {
        self.state == GateState::Ready
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, GateState::Confirmed | GateState::Cancelled)
    }

    /// One second elapsed. Returns false once the countdown is over.
    pub fn tick(&mut self) -> bool {
        if self.state != GateState::CountingDown {
            return false;
        }
        self.seconds_remaining -= 1;
        if self.seconds_remaining == 0 {
            self.state = GateState::Ready;
        }
        true
    }

    /// No-op unless the gate is `Ready`.
    pub fn confirm(&mut self) -> bool {
        if !self.can_confirm() {
            return false;
        }
        self.state = GateState::Confirmed;
        true
    }

    pub fn cancel(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = GateState::Cancelled;
        true
    }
}

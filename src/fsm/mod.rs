//! Operating-mode state machine.
//!
//! ```text
//! ┌─────────┬────────┬────────┬────────┐
//! │ current │ "heat" │ "cool" │ "stop" │
//! ├─────────┼────────┼────────┼────────┤
//! │ IDLE    │ HEAT   │ COOL   │ IDLE   │
//! │ HEAT    │ HEAT   │ COOL   │ IDLE   │
//! │ COOL    │ HEAT   │ COOL   │ IDLE   │
//! └─────────┴────────┴────────┴────────┘
//! ```
//!
//! Every mode accepts every keyword; a transition is a plain table
//! lookup with no guards.  Anything that is not one of the three
//! keywords leaves the mode untouched.

use core::fmt;

use log::info;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Commanded operating intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum OperatingMode {
    #[default]
    Idle = 0,
    Heat = 1,
    Cool = 2,
}

impl OperatingMode {
    /// Upper-case name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Heat => "HEAT",
            Self::Cool => "COOL",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Recognised inbound keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCommand {
    Heat,
    Cool,
    Stop,
}

impl ModeCommand {
    /// Parse a keyword, ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.trim();
        if token.eq_ignore_ascii_case("heat") {
            Some(Self::Heat)
        } else if token.eq_ignore_ascii_case("cool") {
            Some(Self::Cool)
        } else if token.eq_ignore_ascii_case("stop") {
            Some(Self::Stop)
        } else {
            None
        }
    }

    /// Mode this command selects.
    pub const fn target(self) -> OperatingMode {
        match self {
            Self::Heat => OperatingMode::Heat,
            Self::Cool => OperatingMode::Cool,
            Self::Stop => OperatingMode::Idle,
        }
    }
}

/// Pure transition function.
pub fn apply_command(current: OperatingMode, text: &str) -> OperatingMode {
    ModeCommand::parse(text).map_or(current, ModeCommand::target)
}

// ---------------------------------------------------------------------------
// Stateful wrapper
// ---------------------------------------------------------------------------

/// Outcome of feeding one line into [`ModeMachine::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keyword recognised and the mode changed.
    Changed { from: OperatingMode, to: OperatingMode },
    /// Keyword recognised but it selects the current mode.
    Unchanged(OperatingMode),
    /// Not a keyword; ignored.
    Ignored,
}

/// Holds the current mode.
#[derive(Debug, Default)]
pub struct ModeMachine {
    current: OperatingMode,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> OperatingMode {
        self.current
    }

    /// Apply one inbound command line.
    pub fn handle(&mut self, text: &str) -> Transition {
        let Some(cmd) = ModeCommand::parse(text) else {
            return Transition::Ignored;
        };
        let to = cmd.target();
        if to == self.current {
            return Transition::Unchanged(to);
        }
        let from = self.current;
        self.current = to;
        info!("Mode transition: {} -> {}", from, to);
        Transition::Changed { from, to }
    }
}

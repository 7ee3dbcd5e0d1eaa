#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::synth::params::ParamId;

/// Control events delivered to the engine at block start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    /// `velocity` is 0.0 - 1.0.
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    AllNotesOff,
    SetParam { id: ParamId, value: f32 },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Never yields anything. For engines driven purely by direct calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}

/// Drains a borrowed slice, e.g. a block's worth of pre-collected events.
impl MessageReceiver for std::slice::Iter<'_, SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.next().copied()
    }
}

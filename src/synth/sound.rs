/// Decides which incoming notes a voice pool responds to.
pub trait SoundFilter: Send {
    fn applies_to_note(&self, note: u8) -> bool;

    fn applies_to_channel(&self, channel: u8) -> bool;

    #[inline]
    fn applies_to(&self, channel: u8, note: u8) -> bool {
        self.applies_to_channel(channel) && self.applies_to_note(note)
    }
}

/// Accepts every note on every channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllNotes;

impl SoundFilter for AllNotes {
    #[inline]
    fn applies_to_note(&self, _note: u8) -> bool {
        true
    }

    #[inline]
    fn applies_to_channel(&self, _channel: u8) -> bool {
        true
    }
}

//! Computer-keyboard piano.
//!
//! Terminals report presses but not releases, so each key toggles its note.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Fixed note-on velocity
pub const VELOCITY: f32 = 0.8;

pub const LOWEST_NOTE: u8 = 36;
pub const HIGHEST_NOTE: u8 = 96;

/// One octave plus the next C, chromatic from `z`.
const KEY_ROW: [char; 13] = ['z', 's', 'x', 'd', 'c', 'v', 'g', 'b', 'h', 'n', 'j', 'm', ','];

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    NoteOn(u8),
    NoteOff(u8),
    /// New base note after an octave shift
    Octave(u8),
}

pub struct Keyboard {
    /// Note played by `z`
    base: u8,
    held: [bool; 128],
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            base: 48,
            held: [false; 128],
        }
    }

    pub fn base(&self) -> u8 {
        self.base
    }

    pub fn press(&mut self, key: char) -> Option<KeyboardAction> {
        match key {
            '[' => {
                self.base = self.base.saturating_sub(12).max(LOWEST_NOTE);
                Some(KeyboardAction::Octave(self.base))
            }
            ']' => {
                self.base = (self.base + 12).min(HIGHEST_NOTE - 12);
                Some(KeyboardAction::Octave(self.base))
            }
            _ => {
                let offset = KEY_ROW.iter().position(|&k| k == key)? as u8;
                let note = self.base + offset;
                if !(LOWEST_NOTE..=HIGHEST_NOTE).contains(&note) {
                    return None;
                }

                let held = &mut self.held[note as usize];
                *held = !*held;
                Some(if *held {
                    KeyboardAction::NoteOn(note)
                } else {
                    KeyboardAction::NoteOff(note)
                })
            }
        }
    }

    pub fn release_all(&mut self) {
        self.held = [false; 128];
    }

    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..128u8).filter(|&n| self.held[n as usize])
    }
}

pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

pub fn render_keyboard(frame: &mut Frame, area: Rect, keyboard: &Keyboard) {
    let block = Block::default()
        .title(format!(" Keys ({}) ", note_name(keyboard.base())))
        .borders(Borders::ALL);

    let keys: Vec<Span> = KEY_ROW
        .iter()
        .enumerate()
        .map(|(offset, &key)| {
            let note = keyboard.base() + offset as u8;
            let style = if keyboard.held[note as usize] {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD)
            } else if NOTE_NAMES[note as usize % 12].ends_with('#') {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(format!(" {key} "), style)
        })
        .collect();

    let held: Vec<String> = keyboard.held_notes().map(note_name).collect();
    let held_line = if held.is_empty() {
        Line::from(Span::styled(" (silent)", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(format!(" {}", held.join(" ")))
    };

    let paragraph = Paragraph::new(vec![Line::from(keys), Line::default(), held_line]).block(block);
    frame.render_widget(paragraph, area);
}

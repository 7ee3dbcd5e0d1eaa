//! TUI for pulse-synth
//!
//! Three faders, a toggle keyboard, and live scope/spectrum views of the
//! engine output.

mod controls;
mod keyboard;
mod spectrum;
mod waveform;

use std::{fs, path::PathBuf, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};

use pulse_synth::{patch::PatchState, synth::message::SynthMessage, ParamId};

use crate::app::{AudioHandle, VIS_BLOCK_LEN};
use controls::render_controls;
use keyboard::{render_keyboard, Keyboard, KeyboardAction};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Fader movement per arrow press, as a fraction of the range
const FADER_STEP: f32 = 0.01;
const FADER_COARSE_STEP: f32 = 0.1;

pub struct UiApp {
    audio: AudioHandle,
    patch_path: PathBuf,
    keyboard: Keyboard,
    selected: usize,
    /// Newest VIS_BLOCK_LEN samples from the engine
    vis_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    status: String,
    should_quit: bool,
}

impl UiApp {
    pub fn new(audio: AudioHandle, patch_path: PathBuf) -> Self {
        let spectrum = SpectrumAnalyzer::new(VIS_BLOCK_LEN, audio.sample_rate);
        Self {
            audio,
            patch_path,
            keyboard: Keyboard::new(),
            selected: 0,
            vis_buffer: vec![0.0; VIS_BLOCK_LEN],
            spectrum,
            status: String::from("ready"),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        // Leave the device silent on the way out
        self.audio.send(SynthMessage::AllNotesOff);
        Ok(())
    }

    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio.audio_rx.pop() {
            self.vis_buffer.push(sample);
            received = true;
        }

        if self.vis_buffer.len() > VIS_BLOCK_LEN {
            let excess = self.vis_buffer.len() - VIS_BLOCK_LEN;
            self.vis_buffer.drain(0..excess);
        }
        if received {
            self.spectrum.update(&self.vis_buffer);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.save_patch(),
                KeyCode::Char('l') => self.load_patch(),
                KeyCode::Char('c') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        let coarse = key.modifiers.contains(KeyModifiers::SHIFT);
        let step = if coarse { FADER_COARSE_STEP } else { FADER_STEP };

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(ParamId::ALL.len() - 1),
            KeyCode::Left => self.nudge(-step),
            KeyCode::Right => self.nudge(step),
            KeyCode::Char(' ') => {
                self.keyboard.release_all();
                self.send(SynthMessage::AllNotesOff);
            }
            KeyCode::Char(c) => match self.keyboard.press(c) {
                Some(KeyboardAction::NoteOn(note)) => self.send(SynthMessage::NoteOn {
                    note,
                    velocity: keyboard::VELOCITY,
                }),
                Some(KeyboardAction::NoteOff(note)) => self.send(SynthMessage::NoteOff { note }),
                Some(KeyboardAction::Octave(base)) => {
                    self.status = format!("octave base {}", keyboard::note_name(base));
                }
                None => {}
            },
            _ => {}
        }
    }

    fn send(&mut self, message: SynthMessage) {
        if !self.audio.send(message) {
            log::warn!("message ring full, dropped {message:?}");
        }
    }

    /// Move the selected fader by `delta` of its range.
    fn nudge(&mut self, delta: f32) {
        let id = ParamId::ALL[self.selected];
        let spec = id.spec();
        let position = spec.normalize(self.audio.params.get(id));
        let value = spec.denormalize(position + delta);
        self.send(SynthMessage::SetParam { id, value });
    }

    fn save_patch(&mut self) {
        let result = PatchState::capture(&self.audio.params)
            .to_bytes()
            .map_err(|err| err.to_string())
            .and_then(|bytes| fs::write(&self.patch_path, bytes).map_err(|err| err.to_string()));

        self.status = match result {
            Ok(()) => format!("saved {}", self.patch_path.display()),
            Err(err) => {
                log::error!("saving {} failed: {err}", self.patch_path.display());
                format!("save failed: {err}")
            }
        };
    }

    fn load_patch(&mut self) {
        let bytes = match fs::read(&self.patch_path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("reading {} failed: {err}", self.patch_path.display());
                self.status = format!("load failed: {err}");
                return;
            }
        };

        // Same fallback as the engine: a bad patch resets to defaults
        self.status = match PatchState::from_bytes(&bytes) {
            Ok(state) => {
                state.apply_to(&self.audio.params);
                format!("loaded {}", self.patch_path.display())
            }
            Err(err) => {
                log::warn!("rejected patch {}: {err}", self.patch_path.display());
                self.audio.params.reset_to_defaults();
                format!("bad patch, defaults restored: {err}")
            }
        };
    }

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[0]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(5)])
            .split(columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        let snapshot = self.audio.params.snapshot();
        render_controls(frame, left[0], &snapshot, self.selected, self.audio.sample_rate);
        render_keyboard(frame, left[1], &self.keyboard);
        render_waveform(frame, right[0], &self.vis_buffer);
        render_spectrum(frame, right[1], self.spectrum.data());

        let help = Paragraph::new(format!(
            " [Esc] Quit  [↑↓] Select  [←→] Adjust  [Z-M] Notes  [[ ]] Octave  [Space] Release  [^S/^L] Save/Load  | {}",
            self.status
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[1]);
    }
}

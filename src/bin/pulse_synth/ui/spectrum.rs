//! Spectrum analyser with log-spaced bands.
//!
//! Each band reports the peak power of the FFT bins it covers, which keeps
//! narrow harmonics visible at the top of the range where bands are wide.

use std::{ops::Range, sync::Arc};

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const BANDS: usize = 64;
const MIN_FREQ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin range per band
    bands: Vec<Range<usize>>,
    /// (log10 frequency, dB) per band
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(len: usize, sample_rate: f32) -> Self {
        let len = len.max(8);
        let fft = FftPlanner::new().plan_fft_forward(len);

        // Hann
        let window = (0..len)
            .map(|i| 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / len as f32).cos())
            .collect();

        let sample_rate = sample_rate.max(1.0) as f64;
        let half = len / 2;
        let max_freq = (sample_rate / 2.0).min(20_000.0).max(MIN_FREQ * 2.0);
        let hz_per_bin = sample_rate / len as f64;

        let edge = |i: usize| MIN_FREQ * (max_freq / MIN_FREQ).powf(i as f64 / BANDS as f64);
        let mut bands = Vec::with_capacity(BANDS);
        let mut spectrum = Vec::with_capacity(BANDS);
        for i in 0..BANDS {
            let lo = ((edge(i) / hz_per_bin).floor() as usize).clamp(1, half - 1);
            let hi = ((edge(i + 1) / hz_per_bin).ceil() as usize).clamp(lo + 1, half);
            bands.push(lo..hi);
            let centre = (edge(i) * edge(i + 1)).sqrt();
            spectrum.push((centre.log10(), FLOOR_DB));
        }

        Self {
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); len],
            bands,
            spectrum,
        }
    }

    /// Analyse `buffer`; ignored unless it is exactly one window long.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Hann coherent gain is 0.5
        let scale = 2.0 / (self.window.len() as f32 * 0.5);
        for (band, point) in self.bands.iter().zip(self.spectrum.iter_mut()) {
            let peak = self.scratch[band.clone()]
                .iter()
                .map(|c| c.norm() * scale)
                .fold(0.0f32, f32::max);
            point.1 = (20.0 * (peak.max(1e-6) as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default()
        .title(" Spectrum ")
        .borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let x_min = spectrum.first().map(|p| p.0).unwrap_or(MIN_FREQ.log10());
    let x_max = spectrum.last().map(|p| p.0).unwrap_or(4.3).max(x_min + 0.1);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

//! Triggered oscilloscope.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use pulse_synth::dsp::amplify::gain_to_db;

/// First rising zero crossing in the first half of the buffer, so a steady
/// tone is drawn in the same place each frame.
fn trigger_point(buffer: &[f32]) -> usize {
    let search = buffer.len() / 2;
    buffer
        .windows(2)
        .take(search)
        .position(|w| w[0] <= 0.0 && w[1] > 0.0)
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Absolute peak of the buffer in dB relative to full scale.
fn peak_dbfs(buffer: &[f32]) -> f32 {
    gain_to_db(buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs())))
}

pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let block = Block::default()
        .title(format!(" Waveform  peak {:.1} dBFS ", peak_dbfs(audio_buffer)))
        .borders(Borders::ALL);

    let start = trigger_point(audio_buffer);
    let window = &audio_buffer[start..];
    let span = (audio_buffer.len() / 2).max(1).min(window.len().max(1));

    let data: Vec<(f64, f64)> = window
        .iter()
        .take(span)
        .enumerate()
        .map(|(i, &sample)| (i as f64 / span as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

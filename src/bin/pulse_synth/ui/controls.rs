//! Fader panel for the three engine parameters.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use pulse_synth::{dsp::filter::control_to_cutoff, ParamId, ParamSnapshot};

fn format_value(id: ParamId, value: f32, sample_rate: f32) -> String {
    match id {
        ParamId::Gain => format!("{value:.1} dB"),
        ParamId::PulseWidth => format!("{:.1} %", value * 100.0),
        ParamId::FilterAmount => {
            let cutoff = control_to_cutoff(value, sample_rate as f64);
            format!("{value:.3}  ({:.0} Hz)", cutoff)
        }
    }
}

pub fn render_controls(
    frame: &mut Frame,
    area: Rect,
    params: &ParamSnapshot,
    selected: usize,
    sample_rate: f32,
) {
    let outer = Block::default()
        .title(format!(" pulse-synth  {:.1}kHz ", sample_rate / 1000.0))
        .borders(Borders::ALL);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3); 3])
        .split(inner);

    for (i, (&id, &row)) in ParamId::ALL.iter().zip(rows.iter()).enumerate() {
        let spec = id.spec();
        let value = params.get(id);
        let is_selected = i == selected;

        let title_style = if is_selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { "▶ " } else { "  " };

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(format!("{marker}{}", spec.name))
                    .title_style(title_style)
                    .borders(Borders::ALL),
            )
            .gauge_style(Style::default().fg(if is_selected {
                Color::LightYellow
            } else {
                Color::Cyan
            }))
            .ratio(spec.normalize(value).clamp(0.0, 1.0) as f64)
            .label(format_value(id, value, sample_rate));

        frame.render_widget(gauge, row);
    }
}

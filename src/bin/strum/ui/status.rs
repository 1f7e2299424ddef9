//! Status bar widget - current chord, device state, and voice count

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use strum_dsp::{
    fretboard::ChordShape,
    io::{AudioOutput, OutputState},
};

pub fn render_status(frame: &mut Frame, area: Rect, output: &AudioOutput, chord: Option<&ChordShape>) {
    let block = Block::default().title(" strum ").borders(Borders::ALL);

    let (symbol, state, color) = match output.state() {
        OutputState::Uninitialized => ("○", "Idle (pluck to start)", Color::DarkGray),
        OutputState::Suspended => ("⏸", "Suspended", Color::Yellow),
        OutputState::Running => ("▶", "Running", Color::Green),
    };

    let mut spans = vec![
        Span::styled(
            format!(" Chord: {:<6}", chord.map_or("open", |c| c.name.as_str())),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{} {}  ", symbol, state), Style::default().fg(color)),
    ];

    if let (Some(sample_rate), Some(channels)) = (output.sample_rate(), output.channels()) {
        spans.push(Span::styled(
            format!("{:.1}kHz {}ch  ", sample_rate / 1000.0, channels),
            Style::default().fg(Color::DarkGray),
        ));
    }

    spans.push(Span::styled(
        format!("Voices: {}", output.active_voices()),
        Style::default().fg(Color::Magenta),
    ));

    if output.dropped_notes() > 0 {
        spans.push(Span::styled(
            format!("  Dropped: {}", output.dropped_notes()),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

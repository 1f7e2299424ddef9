//! Fretboard widget - one row per string, high e on top like tab

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use strum_dsp::fretboard::Tuning;

/// Frets drawn on the neck
const SHOWN_FRETS: u32 = 12;

/// Render the neck with the held fret on each string.
///
/// `frets[i]` is `None` for a muted string. All slices are indexed low E first.
pub fn render_fretboard(
    frame: &mut Frame,
    area: Rect,
    tuning: &Tuning,
    frets: &[Option<u32>],
    vibrating: &[bool],
    keys: &[char],
) {
    let mut lines = Vec::with_capacity(tuning.len());

    for (string, open) in tuning.strings().iter().enumerate().rev() {
        let fret = frets.get(string).copied().flatten();
        let ringing = vibrating.get(string).copied().unwrap_or(false);

        let wire = if ringing { "~" } else { "─" };
        let wire_style = if ringing {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = vec![
            Span::styled(
                format!(" [{}] ", keys.get(string).copied().unwrap_or(' ')),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("{:<2}", open.name), Style::default().fg(Color::Cyan)),
            Span::styled(
                match fret {
                    None => " x ",
                    Some(0) => " o ",
                    Some(_) => "   ",
                },
                Style::default().fg(Color::White),
            ),
            Span::raw("║"),
        ];

        for f in 1..=SHOWN_FRETS {
            if fret == Some(f) {
                spans.push(Span::styled(wire, wire_style));
                spans.push(Span::styled("●", Style::default().fg(Color::Magenta)));
                spans.push(Span::styled(wire, wire_style));
            } else {
                spans.push(Span::styled(wire.repeat(3), wire_style));
            }
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        let status = match fret.and_then(|f| tuning.frequency(string, f)) {
            Some(freq) => format!("  {:>7.2} Hz", freq),
            None => "  muted".to_string(),
        };
        spans.push(Span::styled(status, Style::default().fg(Color::DarkGray)));

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

//! Interactive fretboard
//!
//! Keyboard in, sound out. Pick a chord with the number keys, pluck single
//! strings with the string keys, strum the whole shape with space.

mod fretboard;
mod status;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use strum_dsp::{
    fretboard::{ChordShape, STRING_COUNT},
    io::{AudioOutput, OutputState},
    Guitar,
};
use tracing::{debug, info};

use fretboard::render_fretboard;
use status::render_status;

/// How long a plucked string is drawn as vibrating
const VIBRATE_TIME: Duration = Duration::from_millis(200);

pub struct FretboardApp {
    guitar: Guitar<AudioOutput>,
    chords: Vec<ChordShape>,
    /// Index into `chords`; `None` plays open strings
    selected: Option<usize>,
    keys: [char; STRING_COUNT],
    last_plucked: [Option<Instant>; STRING_COUNT],
    should_quit: bool,
}

impl FretboardApp {
    pub fn new(
        guitar: Guitar<AudioOutput>,
        chords: Vec<ChordShape>,
        keys: [char; STRING_COUNT],
    ) -> Self {
        Self {
            guitar,
            chords,
            selected: None,
            keys,
            last_plucked: [None; STRING_COUNT],
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            // Free voices the audio thread finished with since the last frame
            self.guitar.output_mut().reclaim();
            terminal.draw(|frame| self.render(frame))?;

            // ~60fps redraw so vibrating strings settle on time
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code)
                    }
                    Event::FocusLost => self.guitar.output_mut().suspend(),
                    // Only resume a device a note already opened
                    Event::FocusGained if self.guitar.output().state() == OutputState::Suspended => {
                        self.guitar.output_mut().activate();
                    }
                    _ => {}
                }
            }
        }

        info!(
            dropped = self.guitar.output().dropped_notes(),
            "leaving fretboard"
        );
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('0') => self.select(None),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if idx < self.chords.len() {
                    self.select(Some(idx));
                }
            }
            KeyCode::Char(' ') => self.strum(),
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                if let Some(string) = self.keys.iter().position(|&k| k == c) {
                    self.pluck(string);
                }
            }
            _ => {}
        }
    }

    fn select(&mut self, chord: Option<usize>) {
        self.selected = chord;
        debug!(chord = ?self.chord().map(|c| c.name.as_str()), "chord selected");
    }

    fn chord(&self) -> Option<&ChordShape> {
        self.selected.and_then(|idx| self.chords.get(idx))
    }

    /// Fret the current shape holds on `string`; `None` if muted.
    fn fret(&self, string: usize) -> Option<u32> {
        match self.chord() {
            Some(chord) => chord.fret(string),
            None => Some(0),
        }
    }

    fn pluck(&mut self, string: usize) {
        let Some(fret) = self.fret(string) else {
            return;
        };
        self.guitar.trigger_note(string, fret);
        self.last_plucked[string] = Some(Instant::now());
    }

    fn strum(&mut self) {
        for string in 0..STRING_COUNT {
            self.pluck(string);
        }
    }

    fn vibrating(&self, string: usize) -> bool {
        self.last_plucked[string].is_some_and(|at| at.elapsed() < VIBRATE_TIME)
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Min(8),     // Fretboard
                Constraint::Length(1),  // Chord list
                Constraint::Length(1),  // Help bar
            ])
            .split(frame.area());

        render_status(frame, chunks[0], self.guitar.output(), self.chord());

        let board = Block::default().title(" Fretboard ").borders(Borders::ALL);
        let inner = board.inner(chunks[1]);
        frame.render_widget(board, chunks[1]);

        let frets: Vec<Option<u32>> = (0..STRING_COUNT).map(|s| self.fret(s)).collect();
        let vibrating: Vec<bool> = (0..STRING_COUNT).map(|s| self.vibrating(s)).collect();
        render_fretboard(
            frame,
            inner,
            self.guitar.tuning(),
            &frets,
            &vibrating,
            &self.keys,
        );

        let mut chord_list = String::from(" [0] open");
        for (i, chord) in self.chords.iter().take(9).enumerate() {
            let marker = if self.selected == Some(i) { "*" } else { "" };
            chord_list.push_str(&format!("  [{}] {}{}", i + 1, chord.name, marker));
        }
        frame.render_widget(
            Paragraph::new(chord_list).style(Style::default().fg(Color::Cyan)),
            chunks[2],
        );

        let keys: String = self.keys.iter().collect();
        let help = Paragraph::new(format!(
            " [{}] Pluck  [Space] Strum  [0-9] Chord  [Q] Quit",
            keys.to_uppercase()
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

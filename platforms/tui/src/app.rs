use action::Action;
use keymap::{Config, KeyMapConfig};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
    Frame,
};
use std::time::{Duration, Instant};
use tapewright::{
    runner::{STATUS_PAUSED, STATUS_RUNNING},
    types::BLANK_SYMBOL,
    Controls, ProgramManager, ProgramSource, RunConfig, Runner, Snapshot, Speed, Tick,
    TuringMachine,
};

const BLOCK_PADDING: Padding = Padding::new(1, 1, 0, 0);

pub struct App {
    machine: TuringMachine,
    runner: Runner,
    source: ProgramSource,
    snapshot: Snapshot,
    current_program_index: usize,
    running: bool,
    next_tick: Instant,
    show_help: bool,
    pub(crate) keymap: Config<Action>,
    // Indicates if the program was loaded from a file/stdin, disabling program switching
    program_loaded_from_source: bool,
}

impl App {
    pub fn new_default() -> Result<Self, String> {
        let source = ProgramManager::get_by_index(0)
            .map_err(|e| e.to_string())?
            .clone();
        let mut app = Self::new(source, false);
        app.machine.set_status("Press 'h' for help.");
        app.refresh();
        Ok(app)
    }

    pub fn new_from_source(source: ProgramSource) -> Self {
        let mut app = Self::new(source, true);
        app.machine
            .set_status("Program loaded from source. Press 'h' for help.");
        app.refresh();
        app
    }

    fn new(source: ProgramSource, program_loaded_from_source: bool) -> Self {
        let machine = TuringMachine::new(source.text.as_str(), source.initial_tape());
        let snapshot = Snapshot::capture(&machine);

        Self {
            machine,
            runner: Runner::new(RunConfig::default()),
            source,
            snapshot,
            current_program_index: 0,
            running: false,
            next_tick: Instant::now(),
            show_help: false,
            keymap: Action::keymap_config(),
            program_loaded_from_source,
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let margin_size = Margin::new(1, 0); // Define margin size
        let inner_area = f.area().inner(margin_size);

        // Main vertical chunks: Program Info, Middle (Source + Machine), Status
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Program info (fixed height + margin)
                Constraint::Min(0),    // Middle section (flexible height)
                Constraint::Length(3), // Status/controls (fixed height + margin)
            ])
            .split(inner_area);

        self.render_program_info(f, main_chunks[0]);

        // Middle horizontal chunks: Source Code (left), Machine (right)
        let middle_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(50), // Source code
                Constraint::Length(1),
                Constraint::Percentage(50), // Machine
            ])
            .split(main_chunks[1]);

        self.render_source_code(f, middle_chunks[0]);

        // Right vertical chunks: Machine State, Tape/Help
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Machine State
                Constraint::Min(0),    // Tape
            ])
            .split(middle_chunks[2]);

        self.render_machine_state(f, right_chunks[0]);

        if self.show_help {
            self.render_help(f, right_chunks[1]);
        } else {
            self.render_tape(f, right_chunks[1]);
        }

        self.render_status(f, main_chunks[2]);
    }

    fn render_source_code(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .source
            .text
            .lines()
            .map(|line| match line.split_once(';') {
                Some((code, comment)) => Line::from(vec![
                    Span::raw(code),
                    Span::styled(format!(";{comment}"), Style::default().fg(Color::DarkGray)),
                ]),
                None => Line::from(Span::raw(line)),
            })
            .collect();

        let paragraph = section("Source Code", lines).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_program_info(&self, f: &mut Frame, area: Rect) {
        let program = self.machine.program();

        let name = if self.program_loaded_from_source {
            format!("{} (Custom)", self.source.name)
        } else {
            format!(
                "{} ({}/{})",
                self.source.name,
                self.current_program_index + 1,
                ProgramManager::count()
            )
        };

        let text = vec![
            Line::from(vec![
                Span::styled("Program: ", Style::default().fg(Color::Yellow)),
                Span::raw(name),
            ]),
            Line::from(vec![
                Span::styled("Initial Tape: ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("\"{}\"", self.source.initial_tape())),
            ]),
            Line::from(vec![
                Span::styled("States: ", Style::default().fg(Color::Yellow)),
                Span::raw(program.states().len().to_string()),
                Span::styled(" | Rules: ", Style::default().fg(Color::Yellow)),
                Span::raw(program.len().to_string()),
                Span::styled(" | Diagnostics: ", Style::default().fg(Color::Yellow)),
                Span::raw(program.diagnostics().len().to_string()),
            ]),
        ];

        let paragraph = Paragraph::new(text)
            .block(block("Tapewright - Turing Machine Emulator").title_alignment(Alignment::Center));

        f.render_widget(paragraph, area);
    }

    fn render_tape(&self, f: &mut Frame, area: Rect) {
        let snapshot = &self.snapshot;

        // Each cell is drawn three columns wide
        let visible = (area.width.saturating_sub(4) / 3) as usize;
        let side = visible.saturating_sub(1) / 2;

        let left: Vec<char> = snapshot.left.chars().collect();
        let left = &left[left.len().saturating_sub(side)..];
        let right: Vec<char> = snapshot.right.chars().take(side).collect();

        let mut spans: Vec<Span> = left
            .iter()
            .map(|&symbol| Span::raw(format!(" {symbol} ")))
            .collect();
        spans.push(Span::styled(
            format!(" {} ", snapshot.head_symbol),
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
        spans.extend(
            right
                .iter()
                .map(|&symbol| Span::raw(format!(" {symbol} "))),
        );

        let text_lines = vec![
            Line::from(spans),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "Head at position: {} (symbol: '{}')",
                    snapshot.head, snapshot.head_symbol
                ),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                format!("Tape: {}", self.machine.tape()),
                Style::default().fg(Color::Cyan),
            )),
        ];

        let paragraph = section("Tape", text_lines).wrap(Wrap { trim: false });

        f.render_widget(paragraph, area);
    }

    fn render_machine_state(&self, f: &mut Frame, area: Rect) {
        let snapshot = &self.snapshot;

        let (status_text, status_color) = if self.machine.is_halted() {
            ("HALTED", Color::Red)
        } else if self.running {
            ("RUNNING", Color::Green)
        } else if snapshot.step_count == 0 {
            ("READY", Color::Blue)
        } else {
            ("PAUSED", Color::Magenta)
        };

        let speed = match self.runner.speed() {
            Speed::Normal => "Normal",
            Speed::Full => "Full",
        };

        let text = vec![
            Line::from(vec![
                Span::styled("Current State: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snapshot.state.as_str(),
                    Style::default()
                        .fg(status_color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" | Steps: ", Style::default().fg(Color::Yellow)),
                Span::raw(snapshot.step_count.to_string()),
                Span::styled(" | Status: ", Style::default().fg(Color::Yellow)),
                Span::styled(status_text, Style::default().fg(status_color)),
            ]),
            Line::from(vec![
                Span::styled("Speed: ", Style::default().fg(Color::Cyan)),
                Span::raw(speed),
            ]),
        ];

        let paragraph = section("Machine State", text);

        f.render_widget(paragraph, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = vec![
            Line::from("Controls:"),
            Line::from("  Space - Step forward"),
            Line::from("  p - Run / pause"),
            Line::from("  f - Toggle full speed"),
            Line::from("  r - Reset machine"),
            Line::from(if self.program_loaded_from_source {
                "  ← → - Program switching disabled (loaded from file/stdin)"
            } else {
                "  ← → - Switch programs"
            }),
            Line::from("  h - Toggle this help"),
            Line::from("  q - Quit"),
            Line::from(""),
            Line::from(format!("  '{BLANK_SYMBOL}' is the blank symbol, '*' matches any symbol or state")),
            Line::from("  A state without a matching rule halts the machine"),
        ];

        let paragraph = section("Help", help_text);

        f.render_widget(paragraph, area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let outer = block("Status");
        let inner = outer.inner(area);
        let controls = self.controls();
        let hints = [
            ("step", controls.step),
            ("run", controls.run),
            ("pause", controls.stop),
            ("reset", controls.reset),
        ]
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" ");

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(hints.len() as u16),
            ])
            .split(inner);

        let status = Line::from(vec![Span::raw(self.machine.status())]);
        let hints = Text::from(
            Line::from(Span::styled(hints, Style::default().fg(Color::Yellow))).right_aligned(),
        );

        f.render_widget(outer, area);
        f.render_widget(status, chunks[0]);
        f.render_widget(hints, chunks[1]);
    }

    fn controls(&self) -> Controls {
        Controls::for_machine(&self.machine, self.running)
    }

    fn refresh(&mut self) {
        self.snapshot = Snapshot::capture(&self.machine);
    }

    /// Time left until the next scheduled tick, if running.
    pub fn time_until_tick(&self) -> Option<Duration> {
        self.running
            .then(|| self.next_tick.saturating_duration_since(Instant::now()))
    }

    /// Runs a tick if one is due.
    pub fn on_timer(&mut self) {
        if !self.running || Instant::now() < self.next_tick {
            return;
        }

        match self.runner.tick(&mut self.machine, &mut self.snapshot) {
            Tick::Continue(delay) => self.next_tick = Instant::now() + delay,
            Tick::Halted => self.running = false,
        }
    }

    pub fn step_machine(&mut self) {
        if !self.controls().step {
            self.reject("step");
            return;
        }

        self.machine.set_status(" ");
        if self.machine.step().is_continue() {
            self.machine
                .set_status(format!("Step {} completed", self.machine.step_count()));
        }
        self.refresh();
    }

    pub fn toggle_run(&mut self) {
        let controls = self.controls();
        if self.running && controls.stop {
            self.running = false;
            self.machine.set_status(STATUS_PAUSED);
        } else if !self.running && controls.run {
            self.running = true;
            self.next_tick = Instant::now();
            self.machine.set_status(STATUS_RUNNING);
        } else {
            self.reject("run");
        }
        self.refresh();
    }

    pub fn toggle_speed(&mut self) {
        if !self.controls().speed {
            self.reject("change speed");
            return;
        }
        self.runner.toggle_speed();
    }

    pub fn reset_machine(&mut self) {
        if !self.controls().reset {
            self.reject("reset");
            return;
        }

        self.machine.reset(self.source.initial_tape());
        self.refresh();
    }

    pub fn next_program(&mut self) {
        if let Some(message) = self.switch_blocked() {
            self.machine.set_status(message);
            return;
        }
        let count = ProgramManager::count();
        self.current_program_index = (self.current_program_index + 1) % count;
        self.load_current_program();
    }

    pub fn previous_program(&mut self) {
        if let Some(message) = self.switch_blocked() {
            self.machine.set_status(message);
            return;
        }
        let count = ProgramManager::count();
        self.current_program_index = if self.current_program_index == 0 {
            count - 1
        } else {
            self.current_program_index - 1
        };
        self.load_current_program();
    }

    fn switch_blocked(&self) -> Option<&'static str> {
        if self.program_loaded_from_source {
            Some("Cannot switch programs when loaded from file/stdin.")
        } else if self.running {
            Some("Pause the machine before switching programs.")
        } else {
            None
        }
    }

    fn load_current_program(&mut self) {
        let source = match ProgramManager::get_by_index(self.current_program_index) {
            Ok(source) => source.clone(),
            Err(e) => {
                self.machine.set_status(e.to_string());
                return;
            }
        };

        self.machine.load(source.text.as_str());
        self.machine.reset(source.initial_tape());
        if self.machine.program().diagnostics().is_empty() {
            self.machine.set_status(format!("Loaded program: {}", source.name));
        }
        self.source = source;
        self.refresh();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    fn reject(&mut self, request: &str) {
        let reason = if self.running {
            "the machine is running"
        } else {
            "the machine is halted; press 'r' to reset"
        };
        self.machine
            .set_status(format!("Cannot {request}: {reason}."));
        self.refresh();
    }
}

fn section<'a>(title: &'a str, content: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(content).block(block(title))
}

fn block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .padding(BLOCK_PADDING)
}

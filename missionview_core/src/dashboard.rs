//! MissionView TUI Dashboard Module
//! =================================
//!
//! Real-time terminal mission-control view.
//! Uses Ratatui for rendering and Crossbeam for frame delivery and commands.
//!
//! Enable with the `dashboard` feature flag.
//!
//! Features:
//! - Mission progress and battery gauges, landing status
//! - Headline readouts and per-motor table
//! - Phase timeline with done/active/pending markers
//! - Altitude sparkline (last 200 frames)
//! - Navigation, docking, safety, feature detection and sortie checklist panes
//! - Subsystem and telemetry log panels
//!
//! Keys: `s` play, `space`/`p` pause toggle, `r` reset, `q`/`Esc` quit.
//! Terminal resizes are forwarded as viewport commands.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender, TryRecvError};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use missionview_env::PlaybackCommand;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Row, Sparkline, Table},
    Frame, Terminal,
};

use crate::animator::Frame as MissionFrame;
use crate::panels::{self, FlightStatus, HealthState, LogLevel, RowState, Verdict};
use crate::phase::{PhaseTable, Rgb};

const HISTORY_LEN: usize = 200;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Command(PlaybackCommand),
    Quit,
    Nothing,
}

/// Map a key to its dashboard action.
pub fn key_action(code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('s') => KeyAction::Command(PlaybackCommand::Play),
        KeyCode::Char(' ') | KeyCode::Char('p') => KeyAction::Command(PlaybackCommand::Toggle),
        KeyCode::Char('r') => KeyAction::Command(PlaybackCommand::Reset),
        _ => KeyAction::Nothing,
    }
}

fn tint_color(tint: Rgb) -> Color {
    Color::Rgb(tint.r, tint.g, tint.b)
}

fn health_color(state: HealthState) -> Color {
    match state {
        HealthState::Active | HealthState::Normal => Color::Green,
        HealthState::Warning => Color::Yellow,
        HealthState::Critical => Color::Red,
    }
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

// =============================================================================
// FIXTURE PANES
// =============================================================================

fn navigation_lines() -> Vec<Line<'static>> {
    let fix = &panels::NAVIGATION_FIX;
    let dock = &panels::DOCKING_STATUS;
    vec![
        Line::from(vec![label("Position   "), Span::raw(panels::format_coords(&fix.position))]),
        Line::from(vec![label("Confidence "), Span::raw(format!("{}%", fix.confidence_percent))]),
        Line::from(vec![label("Drift      "), Span::raw(format!("{:.2}m", fix.drift_m))]),
        Line::from(vec![
            label("Dock       "),
            Span::styled(dock.stage.to_string(), Style::default().fg(Color::Green)),
            Span::raw(if dock.charging { " · charging" } else { "" }),
        ]),
        Line::from(vec![label("Dock error "), Span::raw(format!("{:.1}cm", dock.last_accuracy_cm))]),
    ]
}

fn safety_lines() -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        label("Mode "),
        Span::styled(panels::SAFETY_MODE, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
    ])];
    lines.extend(panels::SAFETY_PARAMETERS.iter().map(|p| {
        Line::from(vec![
            Span::styled("● ", Style::default().fg(health_color(p.state))),
            Span::raw(format!("{}: {}", p.name, p.value)),
        ])
    }));
    lines.extend(panels::FAILSAFE_LOG.iter().map(|e| {
        Line::from(vec![
            label(e.time),
            Span::raw(format!(" {} ", e.event)),
            Span::styled(format!("→ {}", e.action), Style::default().fg(Color::Yellow)),
        ])
    }));
    lines
}

fn detection_rows() -> Vec<Row<'static>> {
    panels::FEATURE_DETECTIONS
        .iter()
        .map(|d| {
            let color = match d.verdict {
                Verdict::Verified => Color::Green,
                Verdict::Pending => Color::Yellow,
                Verdict::Rejected => Color::Red,
            };
            Row::new(vec![
                Span::raw(d.id),
                Span::raw(d.kind),
                Span::raw(format!("{}%", d.confidence_percent)),
                Span::styled(d.verdict.to_string(), Style::default().fg(color)),
            ])
        })
        .collect()
}

fn sortie_lines() -> Vec<Line<'static>> {
    panels::SORTIE_STAGES
        .iter()
        .map(|(stage, done)| {
            let (marker, color) = if *done { ("✓ ", Color::Green) } else { ("○ ", Color::DarkGray) };
            Line::from(vec![Span::styled(marker, Style::default().fg(color)), Span::raw(*stage)])
        })
        .collect()
}

// =============================================================================
// MISSION DASHBOARD
// =============================================================================

/// TUI Dashboard for a live playback.
pub struct MissionDashboard {
    rx: Receiver<MissionFrame>,
    commands: Sender<PlaybackCommand>,
    table: PhaseTable,
    latest: Option<MissionFrame>,
    altitude_history: VecDeque<u64>,
    feed_closed: bool,
    frames_received: usize,
}

impl MissionDashboard {
    /// Create a dashboard reading frames from `rx` and sending commands on `commands`.
    pub fn new(rx: Receiver<MissionFrame>, commands: Sender<PlaybackCommand>, table: PhaseTable) -> Self {
        Self {
            rx,
            commands,
            table,
            latest: None,
            altitude_history: VecDeque::with_capacity(HISTORY_LEN),
            feed_closed: false,
            frames_received: 0,
        }
    }

    /// Fold one frame into the view state.
    pub fn ingest(&mut self, frame: MissionFrame) {
        // A reset starts a fresh trace
        if frame.elapsed_secs == 0.0 {
            self.altitude_history.clear();
        }
        self.altitude_history.push_back(frame.telemetry.altitude.max(0.0).round() as u64);
        if self.altitude_history.len() > HISTORY_LEN {
            self.altitude_history.pop_front();
        }
        self.latest = Some(frame);
        self.frames_received += 1;
    }

    /// Drain every frame currently queued.
    pub fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(frame) => self.ingest(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.feed_closed = true;
                    break;
                }
            }
        }
    }

    fn send(&mut self, command: PlaybackCommand) {
        if self.commands.send(command).is_err() {
            self.feed_closed = true;
        }
    }

    pub fn latest(&self) -> Option<&MissionFrame> {
        self.latest.as_ref()
    }

    /// Run the TUI main loop (blocks until 'q' pressed)
    pub fn run(&mut self) -> io::Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        self.send(PlaybackCommand::Resize {
            width: size.width as u32,
            height: size.height as u32,
        });

        loop {
            self.drain();

            terminal.draw(|f| self.ui(f))?;

            // Handle input (non-blocking with 50ms timeout)
            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => match key_action(key.code) {
                        KeyAction::Quit => break,
                        KeyAction::Command(command) => self.send(command),
                        KeyAction::Nothing => {}
                    },
                    Event::Resize(width, height) => self.send(PlaybackCommand::Resize {
                        width: width as u32,
                        height: height as u32,
                    }),
                    _ => {}
                }
            }
        }

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Render the UI
    fn ui(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),  // Header
                Constraint::Length(3),  // Gauges
                Constraint::Min(12),    // Readouts / timeline / components
                Constraint::Length(6),  // Altitude sparkline
                Constraint::Length(10), // Navigation / safety / detections / sortie
                Constraint::Length(9),  // Subsystems and log
                Constraint::Length(1),  // Footer
            ])
            .split(f.area());

        let Some(frame) = self.latest.as_ref() else {
            let waiting = Paragraph::new("Waiting for mission frames...")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title("MissionView").borders(Borders::ALL));
            f.render_widget(waiting, chunks[2]);
            return;
        };
        let t = &frame.telemetry;
        let status = panels::flight_status(t);

        // === HEADER ===
        let mut header_spans = vec![
            Span::styled("🛰 MissionView Control", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  |  "),
            Span::styled(
                frame.current_phase_name.clone(),
                Style::default().fg(tint_color(frame.scene.tint)),
            ),
            Span::raw("  |  "),
            Span::styled(format!("t={:.2}s", frame.elapsed_secs), Style::default().fg(Color::Cyan)),
        ];
        if status == FlightStatus::Landed {
            header_spans.push(Span::raw("  |  "));
            header_spans.push(Span::styled(
                "✓ MARS LANDING SUCCESSFUL",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ));
        }
        let header = Paragraph::new(Line::from(header_spans)).block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(header, chunks[0]);

        // === GAUGES ===
        let gauge_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(50),
                Constraint::Percentage(30),
                Constraint::Percentage(20),
            ])
            .split(chunks[1]);

        let progress = Gauge::default()
            .block(Block::default().title("Mission").borders(Borders::ALL))
            .gauge_style(Style::default().fg(tint_color(frame.scene.tint)))
            .percent(frame.mission_progress_percent().clamp(0.0, 100.0) as u16)
            .label(panels::progress_caption(frame));
        f.render_widget(progress, gauge_chunks[0]);

        let battery_color = if t.battery_percent > 50.0 {
            Color::Green
        } else if t.battery_percent > 20.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        let battery = Gauge::default()
            .block(Block::default().title("Battery").borders(Borders::ALL))
            .gauge_style(Style::default().fg(battery_color))
            .percent(t.battery_percent.clamp(0.0, 100.0) as u16)
            .label(format!("{:.0}% · {:.2}V", t.battery_percent, t.battery.voltage_v));
        f.render_widget(battery, gauge_chunks[1]);

        let status_color = match status {
            FlightStatus::Flight => Color::Cyan,
            FlightStatus::Lock => Color::Yellow,
            FlightStatus::Landed => Color::Green,
        };
        let landing = Paragraph::new(format!("■ {}", status))
            .style(Style::default().fg(status_color).add_modifier(Modifier::BOLD))
            .block(Block::default().title("Landing").borders(Borders::ALL));
        f.render_widget(landing, gauge_chunks[2]);

        // === MIDDLE ===
        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(chunks[2]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(4)])
            .split(middle[0]);

        let readout_lines: Vec<Line> = panels::readouts(frame)
            .into_iter()
            .map(|r| {
                Line::from(vec![
                    Span::styled(format!("{:<13}", r.label), Style::default().fg(Color::DarkGray)),
                    Span::styled(r.value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                ])
            })
            .collect();
        let readouts = Paragraph::new(readout_lines).block(Block::default().title("Flight").borders(Borders::ALL));
        f.render_widget(readouts, left[0]);

        let motor_rows: Vec<Row> = panels::motor_rows(t)
            .into_iter()
            .map(|(label, rpm, temp)| {
                Row::new(vec![
                    Span::raw(label),
                    Span::styled(rpm, Style::default().fg(Color::LightRed)),
                    Span::styled(temp, Style::default().fg(Color::Red)),
                ])
            })
            .collect();
        let motors = Table::new(
            motor_rows,
            [Constraint::Length(12), Constraint::Length(10), Constraint::Length(6)],
        )
        .block(Block::default().title("Motors").borders(Borders::ALL));
        f.render_widget(motors, left[1]);

        let phase_rows: Vec<Row> = panels::phase_rows(&self.table, &frame.cursor)
            .into_iter()
            .map(|row| {
                let (marker, style) = match row.state {
                    RowState::Done => ("✓", Style::default().fg(Color::DarkGray)),
                    RowState::Active => (
                        "▶",
                        Style::default().fg(tint_color(row.tint)).add_modifier(Modifier::BOLD),
                    ),
                    RowState::Pending => ("·", Style::default().fg(Color::Gray)),
                };
                Row::new(vec![
                    Span::styled(marker, style),
                    Span::styled(row.name, style),
                    Span::styled(format!("{:.0}s", row.duration_secs), style),
                ])
            })
            .collect();
        let timeline = Table::new(
            phase_rows,
            [Constraint::Length(2), Constraint::Min(16), Constraint::Length(4)],
        )
        .block(Block::default().title("Mission Phases").borders(Borders::ALL));
        f.render_widget(timeline, middle[1]);

        let header_cells = ["Sensor", "Reading"]
            .iter()
            .map(|h| Span::styled(*h, Style::default().add_modifier(Modifier::BOLD)));
        let component_rows = vec![
            Row::new(vec![
                Span::raw("IMU"),
                Span::raw(format!("{} · yaw {:.0}°", t.imu.status, t.imu.yaw_deg)),
            ]),
            Row::new(vec![
                Span::raw("GNSS"),
                if t.gnss.locked {
                    Span::styled(
                        format!("LOCK {} sats · {:.1}m", t.gnss.satellites, t.gnss.accuracy_m),
                        Style::default().fg(Color::Green),
                    )
                } else {
                    Span::styled("DENIED", Style::default().fg(Color::Yellow))
                },
            ]),
            Row::new(vec![
                Span::raw("Camera"),
                Span::raw(format!(
                    "{} {}fps{}",
                    t.camera.resolution,
                    t.camera.fps,
                    if t.camera.recording { " ● REC" } else { "" }
                )),
            ]),
            Row::new(vec![
                Span::raw("LiDAR"),
                Span::raw(format!("{} · {:.0}m · {}", t.lidar.points, t.lidar.range_m, t.lidar.status)),
            ]),
            Row::new(vec![
                Span::raw("Processor"),
                Span::raw(format!(
                    "CPU {:.0}% · MEM {:.0}% · {:.0}°C",
                    t.processor.cpu_percent, t.processor.memory_percent, t.processor.temp_c
                )),
            ]),
            Row::new(vec![
                Span::raw("Distance"),
                Span::raw(format!("{:.1}m", t.distance_traveled)),
            ]),
        ];
        let components = Table::new(component_rows, [Constraint::Length(10), Constraint::Min(20)])
            .header(Row::new(header_cells).height(1))
            .block(Block::default().title("Components").borders(Borders::ALL));
        f.render_widget(components, middle[2]);

        // === ALTITUDE SPARKLINE ===
        let altitude_data: Vec<u64> = self.altitude_history.iter().cloned().collect();
        let sparkline = Sparkline::default()
            .block(Block::default().title("Altitude (last 200 frames)").borders(Borders::ALL))
            .data(&altitude_data)
            .style(Style::default().fg(Color::Cyan));
        f.render_widget(sparkline, chunks[3]);

        // === OPERATIONS ===
        let ops = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(22),
                Constraint::Percentage(38),
                Constraint::Percentage(25),
                Constraint::Percentage(15),
            ])
            .split(chunks[4]);

        let navigation = Paragraph::new(navigation_lines())
            .block(Block::default().title("Navigation & Docking").borders(Borders::ALL));
        f.render_widget(navigation, ops[0]);

        let safety = Paragraph::new(safety_lines()).block(Block::default().title("Safety").borders(Borders::ALL));
        f.render_widget(safety, ops[1]);

        let detections = Table::new(
            detection_rows(),
            [Constraint::Length(7), Constraint::Min(10), Constraint::Length(4), Constraint::Length(9)],
        )
        .block(Block::default().title("Feature Detections").borders(Borders::ALL));
        f.render_widget(detections, ops[2]);

        let sortie = Paragraph::new(sortie_lines()).block(Block::default().title("Sortie").borders(Borders::ALL));
        f.render_widget(sortie, ops[3]);

        // === SUBSYSTEMS / LOG ===
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[5]);

        let subsystem_lines: Vec<Line> = panels::SUBSYSTEMS
            .iter()
            .map(|s| {
                Line::from(vec![
                    Span::styled("● ", Style::default().fg(Color::Green)),
                    Span::styled(s.name, Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", s.description), Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();
        let subsystems = Paragraph::new(subsystem_lines)
            .block(Block::default().title("Architecture").borders(Borders::ALL));
        f.render_widget(subsystems, bottom[0]);

        let log_lines: Vec<Line> = panels::TELEMETRY_LOG
            .iter()
            .map(|entry| {
                let color = match entry.level {
                    LogLevel::Info => Color::Cyan,
                    LogLevel::Success => Color::Green,
                    LogLevel::Warning => Color::Yellow,
                };
                Line::from(vec![
                    Span::styled(entry.time, Style::default().fg(Color::DarkGray)),
                    Span::raw(" "),
                    Span::styled(format!("[{}]", entry.category), Style::default().fg(color)),
                    Span::raw(format!(" {}", entry.message)),
                ])
            })
            .collect();
        let log = Paragraph::new(log_lines).block(Block::default().title("Telemetry Log").borders(Borders::ALL));
        f.render_widget(log, bottom[1]);

        // === FOOTER ===
        let footer_text = if self.feed_closed {
            "Playback stopped · 'q' quit"
        } else {
            "'s' play · space pause · 'r' reset · 'q' quit"
        };
        let footer = Paragraph::new(footer_text).style(Style::default().fg(Color::DarkGray));
        f.render_widget(footer, chunks[6]);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::MissionAnimator;
    use crate::config::MissionConfig;

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_action(KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(key_action(KeyCode::Esc), KeyAction::Quit);
        assert_eq!(key_action(KeyCode::Char('s')), KeyAction::Command(PlaybackCommand::Play));
        assert_eq!(key_action(KeyCode::Char(' ')), KeyAction::Command(PlaybackCommand::Toggle));
        assert_eq!(key_action(KeyCode::Char('r')), KeyAction::Command(PlaybackCommand::Reset));
        assert_eq!(key_action(KeyCode::Char('x')), KeyAction::Nothing);
    }

    #[test]
    fn test_fixture_panes_cover_every_entry() {
        assert_eq!(navigation_lines().len(), 5);
        assert_eq!(
            safety_lines().len(),
            1 + panels::SAFETY_PARAMETERS.len() + panels::FAILSAFE_LOG.len()
        );
        assert_eq!(detection_rows().len(), panels::FEATURE_DETECTIONS.len());
        assert_eq!(sortie_lines().len(), panels::SORTIE_STAGES.len());

        let dock = navigation_lines()[3].to_string();
        assert!(dock.contains("Docked"));
        assert!(dock.contains("charging"));
        assert!(safety_lines()[0].to_string().contains(panels::SAFETY_MODE));
    }

    #[test]
    fn test_drain_and_history() {
        let animator = MissionAnimator::new(MissionConfig::default());
        let (frame_tx, frame_rx) = crossbeam::channel::unbounded();
        let (cmd_tx, _cmd_rx) = crossbeam::channel::unbounded();
        let mut dashboard = MissionDashboard::new(frame_rx, cmd_tx, animator.plan().table().clone());

        for i in 1..=300 {
            frame_tx.send(animator.update(i as f64 * 0.1, None)).unwrap();
        }
        dashboard.drain();
        assert_eq!(dashboard.frames_received, 300);
        assert_eq!(dashboard.altitude_history.len(), HISTORY_LEN);
        assert!(!dashboard.feed_closed);

        drop(frame_tx);
        dashboard.drain();
        assert!(dashboard.feed_closed);
        assert!(dashboard.latest().is_some());
    }

    #[test]
    fn test_send_marks_closed_when_loop_gone() {
        let (_frame_tx, frame_rx) = crossbeam::channel::unbounded();
        let (cmd_tx, cmd_rx) = crossbeam::channel::unbounded();
        let mut dashboard = MissionDashboard::new(frame_rx, cmd_tx, PhaseTable::mars_sortie());

        dashboard.send(PlaybackCommand::Play);
        assert_eq!(cmd_rx.try_recv().ok(), Some(PlaybackCommand::Play));

        drop(cmd_rx);
        dashboard.send(PlaybackCommand::Reset);
        assert!(dashboard.feed_closed);
    }
}

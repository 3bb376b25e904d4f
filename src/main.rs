use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::info;

use bolastats::config::AppConfig;
use bolastats::dashboard::{
    Dashboard, FixtureTrends, NO_ROUND_MESSAGE, NO_TRENDS_MESSAGE, UNAVAILABLE_MESSAGE,
    format_kickoff,
};
use bolastats::logging;

const MAX_LOGS: usize = 200;
const FOOTER_LOG_LINES: usize = 2;

struct App {
    config: AppConfig,
    dashboard: Dashboard,
    selected: usize,
    help_overlay: bool,
    should_quit: bool,
    logs: VecDeque<String>,
    last_refresh: Instant,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let mut app = Self {
            config,
            dashboard: Dashboard::NoCurrentRound,
            selected: 0,
            help_overlay: false,
            should_quit: false,
            logs: VecDeque::new(),
            last_refresh: Instant::now(),
        };
        app.reload();
        app
    }

    fn reload(&mut self) {
        let today = Local::now().date_naive();
        self.dashboard = Dashboard::load(&self.config, today);
        self.last_refresh = Instant::now();
        let msg = match &self.dashboard {
            Dashboard::Ready(week) => format!(
                "[INFO] Gameweek {} loaded ({} fixtures)",
                week.round,
                week.fixtures.len()
            ),
            Dashboard::NoCurrentRound => "[WARN] No current round in fixtures".to_string(),
            Dashboard::Unavailable(reason) => format!("[WARN] Data unavailable: {reason}"),
        };
        info!("{msg}");
        self.push_log(msg);
        let count = self.fixtures().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    fn maybe_refresh(&mut self) {
        if self.last_refresh.elapsed() >= self.config.refresh {
            self.reload();
        }
    }

    fn fixtures(&self) -> &[FixtureTrends] {
        self.dashboard
            .gameweek()
            .map(|w| w.fixtures.as_slice())
            .unwrap_or(&[])
    }

    fn push_log(&mut self, msg: impl Into<String>) {
        push_capped(&mut self.logs, msg.into(), MAX_LOGS);
    }

    fn select_next(&mut self) {
        let count = self.fixtures().len();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.push_log("[INFO] Reloading sheets");
                self.reload();
            }
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            KeyCode::Esc => self.help_overlay = false,
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let _log_guard = logging::init_file_logging();

    let config = AppConfig::from_env();
    info!(profile = config.profile.label(), "starting dashboard");
    let mut app = App::new(config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.maybe_refresh();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            // Border, key hints, then the newest log lines.
            Constraint::Length(2 + FOOTER_LOG_LINES as u16),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.dashboard {
        Dashboard::Ready(_) => render_gameweek(frame, chunks[1], app),
        Dashboard::NoCurrentRound => render_notice(frame, chunks[1], NO_ROUND_MESSAGE, Color::Yellow),
        Dashboard::Unavailable(reason) => {
            let text = format!("{UNAVAILABLE_MESSAGE}\n\n{reason}");
            render_notice(frame, chunks[1], &text, Color::Red);
        }
    }

    let footer = Paragraph::new(footer_text(app)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let round = match &app.dashboard {
        Dashboard::Ready(week) => format!("Gameweek {} Predictions", week.round),
        Dashboard::NoCurrentRound => "No current round".to_string(),
        Dashboard::Unavailable(_) => "Data unavailable".to_string(),
    };
    let line1 = format!(" BOLASTATS | {} | Profile: {}", round, app.config.profile.label());
    let line2 = " Quick stats for quick thinking".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(app: &App) -> String {
    let mut lines = vec!["j/k/↑/↓ Move | r Reload | ? Help | q Quit".to_string()];
    lines.extend(recent_logs(&app.logs, FOOTER_LOG_LINES).map(|l| format!(" {l}")));
    lines.join("\n")
}

fn push_capped(logs: &mut VecDeque<String>, msg: String, cap: usize) {
    logs.push_back(msg);
    while logs.len() > cap {
        logs.pop_front();
    }
}

/// The newest `n` entries, oldest first.
fn recent_logs(logs: &VecDeque<String>, n: usize) -> impl Iterator<Item = &String> {
    logs.iter().skip(logs.len().saturating_sub(n))
}

fn render_notice(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let notice = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    frame.render_widget(notice, area);
}

fn render_gameweek(frame: &mut Frame, area: Rect, app: &App) {
    let fixtures = app.fixtures();
    if fixtures.is_empty() {
        render_notice(frame, area, "No fixtures in this round", Color::DarkGray);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let list_area = cols[0];
    if list_area.height == 0 {
        return;
    }
    let visible = list_area.height as usize;
    let (start, end) = visible_range(app.selected, fixtures.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let f = &fixtures[idx];
        let style = if idx == app.selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else if f.trends.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let marker = if f.trends.is_empty() { ' ' } else { '*' };
        let text = format!(
            "{marker} {:<16} {} vs {}",
            format_kickoff(f.date),
            f.home,
            f.away
        );
        frame.render_widget(Paragraph::new(text).style(style), row_area);
    }

    let Some(f) = fixtures.get(app.selected) else {
        return;
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} vs {}", f.home, f.away),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if f.trends.is_empty() {
        lines.push(Line::from(Span::styled(
            NO_TRENDS_MESSAGE,
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for t in &f.trends {
            lines.push(Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::Green)),
                Span::raw(t.clone()),
            ]));
        }
    }
    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::LEFT).title(" Trends "))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, cols[1]);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "BolaStats - Help",
        "",
        "  j/k or ↑/↓   Move between fixtures",
        "  r            Reload sheets",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Trends use the most recent head-to-head meetings.",
        "Fixtures marked * have at least one strong trend.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::{push_capped, recent_logs, visible_range};

    #[test]
    fn visible_range_centers_selection() {
        assert_eq!(visible_range(0, 0, 5), (0, 0));
        assert_eq!(visible_range(2, 4, 10), (0, 4));
        assert_eq!(visible_range(10, 20, 6), (7, 13));
        assert_eq!(visible_range(19, 20, 6), (14, 20));
    }

    #[test]
    fn log_buffer_drops_oldest_past_cap() {
        let mut logs = VecDeque::new();
        for i in 0..205 {
            push_capped(&mut logs, format!("line {i}"), 200);
        }
        assert_eq!(logs.len(), 200);
        assert_eq!(logs.front().map(String::as_str), Some("line 5"));
        assert_eq!(logs.back().map(String::as_str), Some("line 204"));
    }

    #[test]
    fn footer_shows_newest_lines_in_order() {
        let mut logs = VecDeque::new();
        assert_eq!(recent_logs(&logs, 2).count(), 0);
        push_capped(&mut logs, "first".to_string(), 200);
        assert_eq!(recent_logs(&logs, 2).collect::<Vec<_>>(), ["first"]);
        push_capped(&mut logs, "second".to_string(), 200);
        push_capped(&mut logs, "third".to_string(), 200);
        assert_eq!(recent_logs(&logs, 2).collect::<Vec<_>>(), ["second", "third"]);
    }
}

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use scrib::progress;
use scrib::registry;
use scrib::sprint::Mode;
use scrib::util::format_time;

use crate::{App, View};

const HORIZONTAL_MARGIN: u16 = 3;

fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for c in s.chars() {
        if out.width() + 1 >= max {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(1)
            .constraints([
                Constraint::Length(1), // tabs
                Constraint::Length(1), // padding
                Constraint::Min(1),    // body
                Constraint::Length(1), // key hints
            ])
            .split(area);

        let tabs: Vec<Span> = View::ALL
            .iter()
            .flat_map(|v| {
                let style = if *v == self.view {
                    bold.fg(Color::Magenta)
                } else {
                    dim
                };
                [Span::styled(v.label(), style), Span::raw("  ")]
            })
            .collect();
        Paragraph::new(Line::from(tabs)).render(chunks[0], buf);

        match self.view {
            View::Sprint => self.render_sprint(chunks[2], buf),
            View::Boards => self.render_boards(chunks[2], buf),
            View::Progress => self.render_progress(chunks[2], buf),
            View::Notes => self.render_notes(chunks[2], buf),
        }

        let hints = "tab views  enter start/pause  ^r reset  ^w save sprint  ^a attach  ^k clear editor  esc quit";
        Paragraph::new(Span::styled(hints, dim))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

impl App {
    fn render_sprint(&self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let timer = &self.workspace.timer;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // timer block
                Constraint::Length(1), // gauge
                Constraint::Length(1), // padding
                Constraint::Min(1),    // editor + history
            ])
            .split(area);

        let mode_style = match timer.mode {
            Mode::Work => bold.fg(Color::Magenta),
            Mode::Break => bold.fg(Color::Green),
        };
        let status = if timer.running { "running" } else { "paused" };
        let mut lines = vec![
            Line::from(vec![
                Span::styled(timer.mode.to_string().to_uppercase(), mode_style),
                Span::raw("  "),
                Span::styled(format_time(timer.remaining_sec), bold),
                Span::raw("  "),
                Span::styled(status, dim),
            ]),
            Line::from(Span::styled(
                format!(
                    "length {}m  short break {}m  long break {}m  target {}w",
                    timer.length_min, timer.short_break_min, timer.long_break_min, timer.target_words
                ),
                dim,
            )),
            Line::from(Span::styled(
                format!("attach: {}", self.attach_target_label()),
                dim,
            )),
        ];
        if !timer.title.is_empty() {
            lines.push(Line::from(Span::styled(timer.title.clone(), bold)));
        }
        Paragraph::new(lines).render(chunks[0], buf);

        let total = match timer.mode {
            Mode::Work => timer.length_min * 60,
            Mode::Break => timer.short_break_min * 60,
        }
        .max(1);
        let elapsed = total.saturating_sub(timer.remaining_sec);
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(f64::from(elapsed) / f64::from(total))
            .label(Span::raw(""))
            .render(chunks[1], buf);

        let mut body = vec![Line::from(Span::styled(
            format!("Words: {}", self.workspace.editor_word_count()),
            bold,
        ))];
        // Tail of the editor text; full snapshots live in the history log.
        let tail: String = self
            .workspace
            .editor_text
            .chars()
            .rev()
            .take(400)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        body.push(Line::from(Span::raw(tail)));
        body.push(Line::from(Span::raw("")));
        body.push(Line::from(Span::styled("Recent sessions", bold)));
        for entry in self.workspace.history.entries().iter().take(5) {
            let title = if entry.title.is_empty() {
                String::new()
            } else {
                format!("{} — ", entry.title)
            };
            body.push(Line::from(Span::styled(
                format!(
                    "{}  {}{} {}m — {}w (remaining {})",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    title,
                    entry.mode,
                    entry.length_min,
                    entry.words,
                    format_time(entry.remaining_sec),
                ),
                dim,
            )));
        }
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .render(chunks[3], buf);
    }

    fn render_boards(&self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let width = area.width.saturating_sub(6) as usize;

        let mut lines: Vec<Line> = Vec::new();
        if self.workspace.boards.boards.is_empty() {
            lines.push(Line::from(Span::styled("No boards yet.", dim)));
        }
        for board in &self.workspace.boards.boards {
            let goal = if board.word_goal > 0 {
                format!("  goal {}w", board.word_goal)
            } else {
                String::new()
            };
            lines.push(Line::from(vec![
                Span::styled(board.title.clone(), bold.fg(Color::Magenta)),
                Span::styled(format!("  {}w{}", board.word_count, goal), dim),
            ]));
            for list in &board.lists {
                if list.collapsed {
                    lines.push(Line::from(Span::styled(
                        format!("  {} (collapsed, {} cards)", list.title, list.cards.len()),
                        dim,
                    )));
                    continue;
                }
                lines.push(Line::from(Span::styled(
                    format!("  {} ({})", list.title, list.cards.len()),
                    bold,
                )));
                for card in &list.cards {
                    let mut meta = format!("{}w", card.word_count);
                    if let Some(goal) = card.goal_label() {
                        meta.push_str("  ");
                        meta.push_str(&goal);
                    }
                    if card.priority != scrib::board::Priority::None {
                        meta.push_str("  ");
                        meta.push_str(&card.priority.to_string());
                    }
                    lines.push(Line::from(vec![
                        Span::raw(format!("    {}  ", truncate(&card.title, width))),
                        Span::styled(meta, dim),
                    ]));
                }
            }
            lines.push(Line::from(Span::raw("")));
        }
        Paragraph::new(lines).render(area, buf);
    }

    fn render_progress(&self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let ws = &self.workspace;

        let today = ws.today_words();
        let goal = ws.progress.daily_goal as u64;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1), // gauge
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(area);

        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(format!("Today: {}w", today), bold.fg(Color::Magenta)),
                Span::styled(
                    format!("  goal {}w  until goal {}w", goal, ws.until_goal()),
                    dim,
                ),
            ]),
            Line::from(Span::styled(
                format!("All-time total: {}w", ws.total_words()),
                dim,
            )),
        ])
        .render(chunks[0], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .ratio((today as f64 / goal.max(1) as f64).clamp(0.0, 1.0))
            .label(Span::raw(""))
            .render(chunks[1], buf);

        let mut lines = vec![Line::from(Span::styled("Projects", bold))];
        for (title, words) in progress::board_breakdown(&ws.boards) {
            lines.push(Line::from(Span::raw(format!("  {} — {}w", title, words))));
        }
        for (title, words) in progress::card_breakdown(&ws.boards) {
            lines.push(Line::from(Span::styled(
                format!("    {} — {}w", title, words),
                dim,
            )));
        }
        lines.push(Line::from(Span::raw("")));
        lines.push(Line::from(Span::styled("Recent days", bold)));
        for (date, words) in progress::daily_totals(&ws.history).into_iter().take(7) {
            lines.push(Line::from(Span::raw(format!("  {} — {}w", date, words))));
        }
        Paragraph::new(lines).render(chunks[3], buf);
    }

    fn render_notes(&self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let ws = &self.workspace;

        let mut lines = vec![Line::from(Span::styled("Characters", bold))];
        if ws.characters.items.is_empty() {
            lines.push(Line::from(Span::styled("  none", dim)));
        }
        // Grouped by project, boards first, then orphaned and unassigned.
        let mut groups: Vec<(String, Vec<&scrib::registry::Character>)> = ws
            .boards
            .boards
            .iter()
            .map(|b| (b.title.clone(), Vec::new()))
            .collect();
        groups.push(("Unknown".to_string(), Vec::new()));
        groups.push(("Unassigned".to_string(), Vec::new()));
        for ch in &ws.characters.items {
            let label = registry::board_display(ch, &ws.boards);
            if let Some((_, members)) = groups.iter_mut().find(|(title, _)| *title == label) {
                members.push(ch);
            }
        }
        for (title, members) in groups.iter().filter(|(_, m)| !m.is_empty()) {
            lines.push(Line::from(Span::styled(format!("  {}", title), dim)));
            for ch in members {
                let role = if ch.role.is_empty() {
                    String::new()
                } else {
                    format!(" — {}", ch.role)
                };
                lines.push(Line::from(Span::raw(format!("    {}{}", ch.name, role))));
            }
        }

        lines.push(Line::from(Span::raw("")));
        lines.push(Line::from(Span::styled("Scenes", bold)));
        if ws.scenes.items.is_empty() {
            lines.push(Line::from(Span::styled("  none", dim)));
        }
        for scene in &ws.scenes.items {
            lines.push(Line::from(vec![
                Span::raw(format!("  {}  ", scene.title)),
                Span::styled(
                    format!(
                        "POV: {} — {}",
                        registry::pov_display(scene, &ws.characters),
                        scene.status
                    ),
                    dim,
                ),
            ]));
        }
        Paragraph::new(lines).render(area, buf);
    }
}

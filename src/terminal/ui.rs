use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::decoders::{body_text, normalize_snippet};
use crate::screens::register::RegisterPhase;
use crate::terminal::state::{App, ComposeForm, InboxView, Pane, Screen, TextForm};

const SNIPPET_CHARS: usize = 80;

pub fn render(f: &mut Frame, app: &App) {
    let [main, footer] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(f.area());

    match &app.screen {
        Screen::Login(form) => {
            let title = if form.ctl.is_submitting() {
                " Sign in (signing in...) "
            } else {
                " Sign in "
            };
            render_form(f, centered(main, 60, 8), title, form, None);
        }
        Screen::Register(form) => {
            let title = match form.ctl.phase() {
                RegisterPhase::Submitting => " Create account (creating...) ",
                RegisterPhase::Registered { .. } => " Create account (done) ",
                RegisterPhase::Idle => " Create account ",
            };
            render_form(f, centered(main, 60, 14), title, form, None);
        }
        Screen::Inbox(view) => render_inbox(f, main, view),
    }

    f.render_widget(status_line(app), footer);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn border(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Draws a bordered form; `multiline` names the field that takes the remaining height.
fn render_form(f: &mut Frame, area: Rect, title: &str, form: &dyn TextForm, multiline: Option<usize>) {
    let outer = Block::default().title(title).borders(Borders::ALL);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let fields = form.fields();
    let constraints = (0..fields.len()).map(|i| {
        if Some(i) == multiline {
            Constraint::Min(3)
        } else {
            Constraint::Length(3)
        }
    });
    let rows = Layout::vertical(constraints).split(inner);

    for (i, (label, value, secret)) in fields.into_iter().enumerate() {
        let shown = if secret {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let active = i == form.active();
        let mut text = shown;
        if active {
            text.push('▏');
        }
        let p = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!(" {label} "))
                    .borders(Borders::ALL)
                    .border_style(border(active)),
            );
        f.render_widget(p, rows[i]);
    }
}

fn render_inbox(f: &mut Frame, area: Rect, view: &InboxView) {
    let [folders, list, body] = Layout::horizontal([
        Constraint::Length(22),
        Constraint::Percentage(40),
        Constraint::Min(0),
    ])
    .areas(area);

    render_folders(f, folders, view);
    render_messages(f, list, view);
    render_body(f, body, view);

    if let Some(compose) = &view.compose {
        let popup = centered(area, area.width.saturating_sub(10).min(90), area.height.saturating_sub(4).min(24));
        f.render_widget(Clear, popup);
        let title = if compose.ctl.is_sending() {
            " New message (sending...) "
        } else {
            " New message "
        };
        render_form(f, popup, title, compose, Some(ComposeForm::BODY));
    }
}

fn render_folders(f: &mut Frame, area: Rect, view: &InboxView) {
    let ctl = &view.ctl;
    let current = ctl.current_folder().id;
    let items: Vec<ListItem> = ctl
        .folders()
        .iter()
        .map(|folder| {
            let label = match folder.unread {
                Some(n) if n > 0 => format!("{} ({n})", folder.label),
                _ => folder.label.to_string(),
            };
            let style = if folder.id == current {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(label, style))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" {} ", ctl.account()))
                .borders(Borders::ALL)
                .border_style(border(view.pane == Pane::Folders)),
        )
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));

    let mut state = ListState::default();
    state.select(Some(view.folder_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_messages(f: &mut Frame, area: Rect, view: &InboxView) {
    let ctl = &view.ctl;
    let visible = ctl.visible();
    let selected_id = ctl.selected_message().map(|m| m.id);

    let items: Vec<ListItem> = visible
        .iter()
        .map(|m| {
            let mut from_style = Style::default();
            if !m.is_read {
                from_style = from_style.add_modifier(Modifier::BOLD);
            }
            let mut head = vec![
                Span::raw(if m.is_starred { "★ " } else { "  " }),
                Span::styled(m.from.clone(), from_style),
                Span::styled(format!("  {}", m.date), Style::default().fg(Color::DarkGray)),
            ];
            if m.has_attachment {
                head.push(Span::raw(" 📎"));
            }
            let subj = Span::styled(m.subject.clone(), from_style);
            let snip = Span::styled(
                normalize_snippet(&m.preview, SNIPPET_CHARS),
                Style::default().fg(Color::Gray),
            );
            ListItem::new(Text::from(vec![Line::from(head), Line::from(subj), Line::from(snip)]))
        })
        .collect();

    let mut title = format!(" {} ", ctl.current_folder().label);
    if ctl.is_loading() {
        title.push_str("(loading...) ");
    }
    if view.searching || !ctl.search().is_empty() {
        title.push_str(&format!("/{} ", ctl.search()));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border(view.pane == Pane::Messages)),
        )
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));

    let mut state = ListState::default();
    state.select(selected_id.and_then(|id| visible.iter().position(|m| m.id == id)));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_body(f: &mut Frame, area: Rect, view: &InboxView) {
    let block = Block::default()
        .title(" Message ")
        .borders(Borders::ALL)
        .border_style(border(view.pane == Pane::Body));

    let text = match view.ctl.selected_message() {
        Some(m) => {
            let content = if m.content.trim().is_empty() {
                &m.preview
            } else {
                &m.content
            };
            let bold = Style::default().add_modifier(Modifier::BOLD);
            let mut lines = vec![
                Line::from(vec![Span::styled("From: ", bold), Span::raw(m.from.clone())]),
                Line::from(vec![Span::styled("Date: ", bold), Span::raw(m.date.clone())]),
                Line::from(vec![Span::styled("Subject: ", bold), Span::raw(m.subject.clone())]),
                Line::default(),
            ];
            lines.extend(body_text(content).lines().map(|l| Line::from(l.to_string())));
            Text::from(lines)
        }
        None if view.ctl.is_loading() => Text::from("Loading..."),
        None => Text::from("No message selected."),
    };

    let p = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((view.body_scroll, 0));
    f.render_widget(p, area);
}

fn status_line(app: &App) -> Paragraph<'static> {
    if let Some((notice, _)) = &app.notice {
        let color = if notice.is_error() { Color::Red } else { Color::Green };
        return Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{}: ", notice.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(notice.message.clone(), Style::default().fg(color)),
        ]));
    }

    let keys: &[(&'static str, &'static str)] = match &app.screen {
        Screen::Login(_) => &[("Tab", "field"), ("Enter", "sign in"), ("Ctrl-R", "register"), ("Esc", "quit")],
        Screen::Register(_) => &[("Tab", "field"), ("Enter", "create"), ("Esc", "back")],
        Screen::Inbox(v) if v.compose.is_some() => &[("Tab", "field"), ("Ctrl-S", "send"), ("Esc", "discard")],
        Screen::Inbox(v) if v.searching => &[("Enter", "done"), ("Esc", "clear")],
        Screen::Inbox(_) => &[
            ("j/k", "move"),
            ("Tab", "pane"),
            ("Enter", "open"),
            ("c", "compose"),
            ("r", "reply"),
            ("s", "star"),
            ("/", "search"),
            ("g", "refresh"),
            ("L", "logout"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, what) in keys {
        spans.push(Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(format!(" {what}  ")));
    }
    Paragraph::new(Line::from(spans))
}

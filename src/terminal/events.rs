use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::screens::compose::ComposeController;
use crate::terminal::state::{App, ComposeForm, InboxView, Pane, Screen, TextForm};
use crate::terminal::worker::Job;

/// Applies one key press; returns a remote call to start, if the key triggered one.
pub fn handle_key(key: KeyEvent, app: &mut App) -> Option<Job> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return None;
    }
    let job = match app.screen {
        Screen::Login(_) => handle_login(key, app),
        Screen::Register(_) => handle_register(key, app),
        Screen::Inbox(_) => handle_inbox(key, app),
    };
    app.collect_notice();
    job
}

/// Shared text editing: typing, backspace, field navigation.
fn edit_form(key: KeyEvent, form: &mut dyn TextForm) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Backspace => {
            form.input_mut().pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.input_mut().push(c);
        }
        _ => {}
    }
}

fn handle_login(key: KeyEvent, app: &mut App) -> Option<Job> {
    let Screen::Login(form) = &mut app.screen else {
        return None;
    };
    match key.code {
        KeyCode::Esc => app.quit = true,
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if !form.ctl.is_submitting() {
                app.show_register();
            }
        }
        KeyCode::Enter => return form.ctl.begin().map(Job::Authenticate),
        _ if form.ctl.is_submitting() => {}
        _ => edit_form(key, form),
    }
    None
}

fn handle_register(key: KeyEvent, app: &mut App) -> Option<Job> {
    let Screen::Register(form) = &mut app.screen else {
        return None;
    };
    // a pending or finished request owns the form until its reply lands
    if !form.ctl.is_idle() {
        return None;
    }
    match key.code {
        KeyCode::Esc => app.show_login(None),
        KeyCode::Enter => return form.ctl.begin().map(Job::Register),
        _ => edit_form(key, form),
    }
    None
}

fn handle_inbox(key: KeyEvent, app: &mut App) -> Option<Job> {
    let Screen::Inbox(view) = &mut app.screen else {
        return None;
    };

    if let Some(sending) = view.compose.as_ref().map(|c| c.ctl.is_sending()) {
        return handle_compose(key, view, sending);
    }

    if view.searching {
        handle_search(key, view);
        return None;
    }

    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Char('L') => app.logout(),
        KeyCode::Tab => view.cycle_pane(),
        KeyCode::Char('/') => view.searching = true,
        KeyCode::Char('g') => return Some(Job::Fetch(view.ctl.refresh())),
        KeyCode::Char('s') => {
            view.ctl.toggle_star();
        }
        KeyCode::Char('c') => {
            if let Some(ctl) = ComposeController::new(&app.session) {
                view.compose = Some(ComposeForm::new(ctl));
            }
        }
        KeyCode::Char('r') => {
            let reply = view
                .ctl
                .selected_message()
                .and_then(|m| ComposeController::reply_to(&app.session, m));
            if let Some(ctl) = reply {
                view.compose = Some(ComposeForm::new(ctl));
            }
        }
        _ => return handle_pane_keys(key, view),
    }
    None
}

fn handle_pane_keys(key: KeyEvent, view: &mut InboxView) -> Option<Job> {
    match (view.pane, key.code) {
        (Pane::Folders, KeyCode::Down | KeyCode::Char('j')) => {
            view.folder_cursor = (view.folder_cursor + 1).min(view.ctl.folders().len() - 1);
        }
        (Pane::Folders, KeyCode::Up | KeyCode::Char('k')) => {
            view.folder_cursor = view.folder_cursor.saturating_sub(1);
        }
        (Pane::Folders, KeyCode::Enter) => {
            let id = view.ctl.folders()[view.folder_cursor].id;
            let ticket = view.ctl.select_folder(id)?;
            view.pane = Pane::Messages;
            return Some(Job::Fetch(ticket));
        }
        (Pane::Messages, KeyCode::Down | KeyCode::Char('j')) => {
            view.ctl.move_selection(1);
            view.body_scroll = 0;
        }
        (Pane::Messages, KeyCode::Up | KeyCode::Char('k')) => {
            view.ctl.move_selection(-1);
            view.body_scroll = 0;
        }
        (Pane::Messages, KeyCode::Enter) => {
            if view.ctl.open_selected().is_some() {
                view.pane = Pane::Body;
            }
        }
        (Pane::Body, KeyCode::Down | KeyCode::Char('j')) => view.scroll_body(1),
        (Pane::Body, KeyCode::Up | KeyCode::Char('k')) => view.scroll_body(-1),
        (Pane::Body, KeyCode::PageDown) => view.scroll_body(10),
        (Pane::Body, KeyCode::PageUp) => view.scroll_body(-10),
        (Pane::Body, KeyCode::Esc) => view.pane = Pane::Messages,
        _ => {}
    }
    None
}

fn handle_search(key: KeyEvent, view: &mut InboxView) {
    let mut query = view.ctl.search().to_string();
    match key.code {
        KeyCode::Esc => {
            query.clear();
            view.searching = false;
        }
        KeyCode::Enter => view.searching = false,
        KeyCode::Backspace => {
            query.pop();
        }
        KeyCode::Char(c) => query.push(c),
        _ => return,
    }
    view.ctl.set_search(query);
}

fn handle_compose(key: KeyEvent, view: &mut InboxView, sending: bool) -> Option<Job> {
    let compose = view.compose.as_mut()?;
    let send_chord = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s');
    match key.code {
        KeyCode::Esc if !sending => view.compose = None,
        _ if sending => {}
        _ if send_chord => return compose.ctl.begin().map(Job::Send),
        KeyCode::Enter if compose.field == ComposeForm::BODY => compose.ctl.body.push('\n'),
        KeyCode::Enter => return compose.ctl.begin().map(Job::Send),
        _ => edit_form(key, compose),
    }
    None
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{
    App, AppState, AuthField, AuthMode, EmployeeForm, EmployeeFormField, ReviewForm,
    ReviewFormField, Tab,
};
use crate::models::rating_label;

use super::styles;
use super::tabs::{admin, dashboard, employees, reviews};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::Authenticating => render_auth_overlay(frame, app),
        AppState::EditingEmployee => {
            if let Some(ref form) = app.employee_form {
                render_employee_form_overlay(frame, app, form);
            }
        }
        AppState::EditingReview => {
            if let Some(ref form) = app.review_form {
                render_review_form_overlay(frame, app, form);
            }
        }
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Perfdeck";
    let user_hint = match app.auth.user() {
        Some(user) => {
            let role = if app.auth.is_admin() { " (admin)" } else { "" };
            format!("{}{}  [?] Help", user.display_name(), role)
        }
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + user_hint.len() + 4),
        )),
        Span::styled(user_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in app.visible_tabs().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    if matches!(app.state, AppState::Searching) {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("Search: {}▌", app.search_query),
            styles::search_style(),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Employees => employees::render(frame, app, area),
        Tab::Reviews => reviews::render(frame, app, area),
        Tab::Admin => admin::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.loading {
        " Loading... ".to_string()
    } else {
        String::from(" Ready ")
    };

    let shortcuts = if app.auth.is_authenticated() {
        "[u]pdate | [L]ogout | [q]uit"
    } else {
        "[q]uit"
    };
    let right_text = format!(" {} ", shortcuts);

    let padding = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

/// Input field line for overlay forms
fn field_line(label: &str, value: &str, focused: bool, mask: bool) -> Line<'static> {
    // Long values show their tail so the cursor position stays visible
    let display: String = if mask {
        "*".repeat(value.chars().count().min(24))
    } else {
        let count = value.chars().count();
        value.chars().skip(count.saturating_sub(24)).collect()
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}[", label), styles::muted_style()),
        Span::styled(format!("{:<24}{}", display, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool, busy: bool) -> Line<'static> {
    let text = if busy {
        "  Saving...  ".to_string()
    } else if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_auth_overlay(frame: &mut Frame, app: &App) {
    let is_signup = app.auth_mode == AuthMode::Signup;
    let mut height = if is_signup { 16 } else { 12 };
    if app.auth_error.is_some() {
        height += 2;
    }
    let area = centered_rect_fixed(48, height, frame.area());
    frame.render_widget(Clear, area);

    let heading = if is_signup {
        "Create an account"
    } else {
        "Sign in to Perfdeck"
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("   {}", heading),
            styles::title_style(),
        )),
        Line::from(""),
        field_line(
            "Username:",
            &app.auth_username,
            app.auth_focus == AuthField::Username,
            false,
        ),
    ];

    if is_signup {
        lines.push(field_line(
            "Email:",
            &app.auth_email,
            app.auth_focus == AuthField::Email,
            false,
        ));
    }

    lines.push(field_line(
        "Password:",
        &app.auth_password,
        app.auth_focus == AuthField::Password,
        true,
    ));

    if is_signup {
        lines.push(field_line(
            "First name:",
            &app.auth_first_name,
            app.auth_focus == AuthField::FirstName,
            false,
        ));
        lines.push(field_line(
            "Last name:",
            &app.auth_last_name,
            app.auth_focus == AuthField::LastName,
            false,
        ));
    }

    lines.push(Line::from(""));
    lines.push(button_line(
        if is_signup { "Sign up" } else { "Login" },
        app.auth_focus == AuthField::Submit,
        app.submitting,
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if is_signup {
            "  [F2] back to login"
        } else {
            "  [F2] create an account"
        },
        styles::muted_style(),
    )));

    if let Some(ref error) = app.auth_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_employee_form_overlay(frame: &mut Frame, app: &App, form: &EmployeeForm) {
    let height = if form.error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(52, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("   {}", form.title()),
            styles::title_style(),
        )),
        Line::from(""),
        field_line(
            "First name:",
            &form.first_name,
            form.focus == EmployeeFormField::FirstName,
            false,
        ),
        field_line(
            "Last name:",
            &form.last_name,
            form.focus == EmployeeFormField::LastName,
            false,
        ),
        field_line(
            "Email:",
            &form.email,
            form.focus == EmployeeFormField::Email,
            false,
        ),
        field_line(
            "Department:",
            &form.department,
            form.focus == EmployeeFormField::Department,
            false,
        ),
        field_line(
            "Joined:",
            &form.date_of_joining,
            form.focus == EmployeeFormField::JoinDate,
            false,
        ),
        Line::from(""),
        button_line(
            "Save",
            form.focus == EmployeeFormField::Submit,
            app.submitting,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "  [Tab] next field  [Esc] cancel",
            styles::muted_style(),
        )),
    ];

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_review_form_overlay(frame: &mut Frame, app: &App, form: &ReviewForm) {
    let height = if form.error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(52, height, frame.area());
    frame.render_widget(Clear, area);

    let employee_name = app
        .employees
        .get(form.employee_index)
        .map(|e| e.full_name())
        .unwrap_or_else(|| "(no employees)".to_string());

    let employee_focused = form.focus == ReviewFormField::Employee;
    let employee_style = if employee_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };

    let rating_focused = form.focus == ReviewFormField::Rating;
    let rating_style = if rating_focused {
        styles::selected_style()
    } else {
        styles::rating_style(form.rating)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("   {}", form.title()),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<12}", "Employee:"), styles::muted_style()),
            Span::styled(format!("◂ {:<24} ▸", employee_name), employee_style),
        ]),
        field_line(
            "Period:",
            &form.review_period,
            form.focus == ReviewFormField::Period,
            false,
        ),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<12}", "Rating:"), styles::muted_style()),
            Span::styled(
                format!("◂ {}/5 {:<14} ▸", form.rating, rating_label(form.rating)),
                rating_style,
            ),
        ]),
        field_line(
            "Feedback:",
            &form.feedback,
            form.focus == ReviewFormField::Feedback,
            false,
        ),
        field_line(
            "Date:",
            &form.review_date,
            form.focus == ReviewFormField::ReviewDate,
            false,
        ),
        Line::from(""),
        button_line("Save", form.focus == ReviewFormField::Submit, app.submitting),
        Line::from(""),
        Line::from(Span::styled(
            "  [Tab] next  [◂/▸] change value  [Esc] cancel",
            styles::muted_style(),
        )),
    ];

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(52, 8, frame.area());
    frame.render_widget(Clear, area);

    let description = app
        .delete_target
        .as_ref()
        .map(|t| t.description())
        .unwrap_or_else(|| "this record".to_string());

    let lines = vec![
        Line::from(Span::styled("   Confirm delete", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!("   Delete {}?", description),
            styles::highlight_style(),
        )),
        Line::from(Span::styled(
            "   This cannot be undone.",
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::error_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = styles::help_key_style;
    let desc = styles::help_desc_style;

    let help_text = vec![
        Line::from(Span::styled("   Perfdeck", styles::title_style())),
        Line::from(Span::styled(
            format!("   version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-4       ", key()),
            Span::styled("Switch tabs (Admin for staff only)", desc()),
        ]),
        Line::from(vec![
            Span::styled("  ←/→       ", key()),
            Span::styled("Prev/next tab", desc()),
        ]),
        Line::from(vec![
            Span::styled("  Tab       ", key()),
            Span::styled("Switch focus (list ↔ detail)", desc()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓       ", key()),
            Span::styled("Navigate list", desc()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  /         ", key()),
            Span::styled("Search employees", desc()),
        ]),
        Line::from(vec![
            Span::styled("  f         ", key()),
            Span::styled("Cycle department/period filter", desc()),
        ]),
        Line::from(vec![
            Span::styled("  n/d/j/r/a ", key()),
            Span::styled("Sort employees by column", desc()),
        ]),
        Line::from(vec![
            Span::styled("  u         ", key()),
            Span::styled("Refresh data from the server", desc()),
        ]),
        Line::from(vec![
            Span::styled("  L         ", key()),
            Span::styled("Log out", desc()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", key()),
            Span::styled("Quit", desc()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Admin tab", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  e/r a ⏎ x ", key()),
            Span::styled("Sub-view, add, edit, delete", desc()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", key()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", key()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled("   Perfdeck", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    AdminView, App, AppState, AuthField, DeleteTarget, EmployeeFormField, Focus, ReviewFormField,
    Tab, MAX_RATING, MIN_RATING, PAGE_SCROLL_SIZE,
};
use crate::models::EmployeeSortColumn;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::Authenticating => return handle_auth_input(app, key).await,
        AppState::EditingEmployee => return handle_employee_form_input(app, key).await,
        AppState::EditingReview => return handle_review_form_input(app, key).await,
        AppState::Searching => return handle_search_input(app, key),
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.confirm_delete().await;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.cancel_delete();
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('u') => {
            app.refresh_all_background();
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout().await;
            return Ok(false);
        }
        KeyCode::Char('1') => app.select_tab(Tab::Dashboard),
        KeyCode::Char('2') => app.select_tab(Tab::Employees),
        KeyCode::Char('3') => app.select_tab(Tab::Reviews),
        KeyCode::Char('4') => app.select_tab(Tab::Admin),
        KeyCode::Left => app.prev_tab(),
        KeyCode::Right => app.next_tab(),
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        _ => {}
    }

    // Tab-specific keys
    match app.current_tab {
        Tab::Employees => handle_employees_input(app, key),
        Tab::Reviews => handle_reviews_input(app, key),
        Tab::Admin => handle_admin_input(app, key),
        Tab::Dashboard => {}
    }

    Ok(false)
}

fn handle_employees_input(app: &mut App, key: KeyEvent) {
    let count = app.filtered_employees().len();
    match key.code {
        KeyCode::Up => {
            app.employee_selection = app.employee_selection.saturating_sub(1);
        }
        KeyCode::Down => {
            if count > 0 && app.employee_selection + 1 < count {
                app.employee_selection += 1;
            }
        }
        KeyCode::PageUp => {
            app.employee_selection = app.employee_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            if count > 0 {
                app.employee_selection = (app.employee_selection + PAGE_SCROLL_SIZE).min(count - 1);
            }
        }
        KeyCode::Enter => {
            // Pull a fresh record and its reviews into the detail panel
            if let Some(id) = app.selected_employee().map(|e| e.id) {
                app.fetch_employee_detail(id);
                app.focus = Focus::Detail;
            }
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('f') => app.cycle_department_filter(),
        KeyCode::Char('n') => app.toggle_employee_sort(EmployeeSortColumn::Name),
        KeyCode::Char('d') => app.toggle_employee_sort(EmployeeSortColumn::Department),
        KeyCode::Char('j') => app.toggle_employee_sort(EmployeeSortColumn::JoinDate),
        KeyCode::Char('r') => app.toggle_employee_sort(EmployeeSortColumn::Reviews),
        KeyCode::Char('a') => app.toggle_employee_sort(EmployeeSortColumn::Rating),
        _ => {}
    }
}

fn handle_reviews_input(app: &mut App, key: KeyEvent) {
    let count = app.filtered_reviews().len();
    match key.code {
        KeyCode::Up => {
            app.review_selection = app.review_selection.saturating_sub(1);
        }
        KeyCode::Down => {
            if count > 0 && app.review_selection + 1 < count {
                app.review_selection += 1;
            }
        }
        KeyCode::PageUp => {
            app.review_selection = app.review_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            if count > 0 {
                app.review_selection = (app.review_selection + PAGE_SCROLL_SIZE).min(count - 1);
            }
        }
        KeyCode::Enter => {
            if let Some(id) = app.selected_review().map(|r| r.id) {
                app.fetch_review_detail(id);
                app.focus = Focus::Detail;
            }
        }
        KeyCode::Char('f') => app.cycle_period_filter(),
        _ => {}
    }
}

fn handle_admin_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => app.admin_view = AdminView::Employees,
        KeyCode::Char('r') => app.admin_view = AdminView::Reviews,
        _ => {}
    }

    match app.admin_view {
        AdminView::Employees => {
            let count = app.employees.len();
            match key.code {
                KeyCode::Up => {
                    app.admin_employee_selection = app.admin_employee_selection.saturating_sub(1);
                }
                KeyCode::Down => {
                    if count > 0 && app.admin_employee_selection + 1 < count {
                        app.admin_employee_selection += 1;
                    }
                }
                KeyCode::Char('a') => app.open_employee_form(None),
                KeyCode::Enter => {
                    let employee = app.employees.get(app.admin_employee_selection).cloned();
                    if let Some(ref e) = employee {
                        app.open_employee_form(Some(e));
                    }
                }
                KeyCode::Char('x') | KeyCode::Delete => {
                    if let Some(e) = app.employees.get(app.admin_employee_selection) {
                        let target = DeleteTarget::Employee {
                            id: e.id,
                            name: e.full_name(),
                        };
                        app.request_delete(target);
                    }
                }
                _ => {}
            }
        }
        AdminView::Reviews => {
            let count = app.reviews.len();
            match key.code {
                KeyCode::Up => {
                    app.admin_review_selection = app.admin_review_selection.saturating_sub(1);
                }
                KeyCode::Down => {
                    if count > 0 && app.admin_review_selection + 1 < count {
                        app.admin_review_selection += 1;
                    }
                }
                KeyCode::Char('a') => app.open_review_form(None),
                KeyCode::Enter => {
                    let review = app.reviews.get(app.admin_review_selection).cloned();
                    if let Some(ref r) = review {
                        app.open_review_form(Some(r));
                    }
                }
                KeyCode::Char('x') | KeyCode::Delete => {
                    if let Some(r) = app.reviews.get(app.admin_review_selection) {
                        let target = DeleteTarget::Review {
                            id: r.id,
                            label: format!("{} {}", r.employee_display(), r.review_period),
                        };
                        app.request_delete(target);
                    }
                }
                _ => {}
            }
        }
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.employee_selection = 0;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.employee_selection = 0;
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.employee_selection = 0;
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_auth_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::F(2) => app.toggle_auth_mode(),
        KeyCode::Tab | KeyCode::Down => {
            app.auth_focus = app.auth_focus.next(app.auth_mode);
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.auth_focus = app.auth_focus.prev(app.auth_mode);
        }
        KeyCode::Enter => {
            if app.auth_focus == AuthField::Submit {
                app.submit_auth().await;
            } else {
                app.auth_focus = app.auth_focus.next(app.auth_mode);
            }
        }
        KeyCode::Backspace => app.pop_auth_char(),
        KeyCode::Char(c) => app.push_auth_char(c),
        _ => {}
    }
    Ok(false)
}

async fn handle_employee_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let Some(focus) = app.employee_form.as_ref().map(|f| f.focus) else {
        app.state = AppState::Normal;
        return Ok(false);
    };

    match key.code {
        KeyCode::Esc => app.close_forms(),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(ref mut form) = app.employee_form {
                form.focus = form.focus.next();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(ref mut form) = app.employee_form {
                form.focus = form.focus.prev();
            }
        }
        KeyCode::Enter => {
            if focus == EmployeeFormField::Submit {
                app.submit_employee_form().await;
            } else if let Some(ref mut form) = app.employee_form {
                form.focus = form.focus.next();
            }
        }
        KeyCode::Backspace => app.pop_form_char(),
        KeyCode::Char(c) => app.push_form_char(c),
        _ => {}
    }
    Ok(false)
}

async fn handle_review_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let Some(focus) = app.review_form.as_ref().map(|f| f.focus) else {
        app.state = AppState::Normal;
        return Ok(false);
    };

    match key.code {
        KeyCode::Esc => app.close_forms(),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(ref mut form) = app.review_form {
                form.focus = form.focus.next();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(ref mut form) = app.review_form {
                form.focus = form.focus.prev();
            }
        }
        KeyCode::Left => {
            if let Some(ref mut form) = app.review_form {
                match focus {
                    ReviewFormField::Employee => {
                        form.employee_index = form.employee_index.saturating_sub(1);
                    }
                    ReviewFormField::Rating => {
                        form.rating = (form.rating - 1).max(MIN_RATING);
                    }
                    _ => {}
                }
            }
        }
        KeyCode::Right => {
            let employee_count = app.employees.len();
            if let Some(ref mut form) = app.review_form {
                match focus {
                    ReviewFormField::Employee => {
                        if employee_count > 0 && form.employee_index + 1 < employee_count {
                            form.employee_index += 1;
                        }
                    }
                    ReviewFormField::Rating => {
                        form.rating = (form.rating + 1).min(MAX_RATING);
                    }
                    _ => {}
                }
            }
        }
        KeyCode::Enter => {
            if focus == ReviewFormField::Submit {
                app.submit_review_form().await;
            } else if let Some(ref mut form) = app.review_form {
                form.focus = form.focus.next();
            }
        }
        KeyCode::Backspace => app.pop_form_char(),
        KeyCode::Char(c) => app.push_form_char(c),
        _ => {}
    }
    Ok(false)
}

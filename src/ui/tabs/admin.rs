use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::{AdminView, App};
use crate::ui::styles;

/// Render the Admin tab: management tables for employees and reviews.
/// Only reachable when the session user is staff or superuser.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.admin_view {
        AdminView::Employees => render_employee_management(frame, app, area),
        AdminView::Reviews => render_review_management(frame, app, area),
    }
}

fn admin_title(app: &App, entity: &str, count: usize) -> String {
    let view = match app.admin_view {
        AdminView::Employees => "[e]mployees*",
        AdminView::Reviews => "[e]mployees",
    };
    let other = match app.admin_view {
        AdminView::Employees => "[r]eviews",
        AdminView::Reviews => "[r]eviews*",
    };
    format!(
        " Manage {} ({}) - {} {} | [a]dd [Enter] edit [x] delete ",
        entity, count, view, other
    )
}

fn render_employee_management(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Email"),
        Cell::from("Department"),
        Cell::from("Join Date"),
        Cell::from("Reviews"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .employees
        .iter()
        .map(|employee| {
            Row::new(vec![
                Cell::from(employee.full_name()),
                Cell::from(employee.email.clone()),
                Cell::from(employee.department.clone()),
                Cell::from(employee.joined_display()),
                Cell::from(format!("{:>4}", employee.reviews_count)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(24),
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(13),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(admin_title(app, "Employees", app.employees.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.admin_employee_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_review_management(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Employee"),
        Cell::from("Period"),
        Cell::from("Rating"),
        Cell::from("Date"),
        Cell::from("Feedback"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .reviews
        .iter()
        .map(|review| {
            let feedback = review.feedback.as_deref().unwrap_or("-");
            Row::new(vec![
                Cell::from(review.employee_display()),
                Cell::from(review.review_period.clone()),
                Cell::from(Span::styled(
                    format!("{}/5", review.rating),
                    styles::rating_style(review.rating),
                )),
                Cell::from(review.date_display()),
                Cell::from(Line::from(Span::styled(
                    feedback.to_string(),
                    styles::muted_style(),
                ))),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(24),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Length(13),
        Constraint::Fill(3),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(admin_title(app, "Reviews", app.reviews.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.admin_review_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::EmployeeSortColumn;
use crate::ui::styles;
use crate::utils::{format::format_optional, truncate};

/// Render the Employees tab - sortable table with a detail panel
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    render_employee_table(frame, app, chunks[0]);
    render_employee_detail(frame, app, chunks[1]);
}

fn render_employee_table(frame: &mut Frame, app: &App, area: Rect) {
    let employees = app.filtered_employees();
    let focused = matches!(app.focus, Focus::List);

    let sort_indicator = |col: EmployeeSortColumn| {
        if app.employee_sort_column == col {
            if app.employee_sort_ascending {
                " ▲"
            } else {
                " ▼"
            }
        } else {
            ""
        }
    };

    let header_cells = [
        Cell::from(format!("Name{}", sort_indicator(EmployeeSortColumn::Name))),
        Cell::from(format!(
            "Department{}",
            sort_indicator(EmployeeSortColumn::Department)
        )),
        Cell::from(format!(
            "Joined{}",
            sort_indicator(EmployeeSortColumn::JoinDate)
        )),
        Cell::from(format!(
            "Rev{}",
            sort_indicator(EmployeeSortColumn::Reviews)
        )),
        Cell::from(format!("Avg{}", sort_indicator(EmployeeSortColumn::Rating))),
    ];
    let header = Row::new(header_cells).style(styles::title_style()).height(1);

    let rows: Vec<Row> = employees
        .iter()
        .map(|employee| {
            Row::new(vec![
                Cell::from(employee.display_name()),
                Cell::from(employee.department.clone()),
                Cell::from(employee.joined_display()),
                Cell::from(format!("{:>3}", employee.reviews_count)),
                Cell::from(format!("{:>4}", employee.rating_display())),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(34),
        Constraint::Fill(2),
        Constraint::Length(13),
        Constraint::Length(4),
        Constraint::Length(5),
    ];

    let filter_label = match app.department_filter {
        Some(ref dept) => format!(" [{}]", dept),
        None => String::new(),
    };
    let search_label = if app.search_query.is_empty() {
        String::new()
    } else {
        format!(" /{}", app.search_query)
    };
    let title = format!(
        " Employees ({}){}{} - [n/d/j/r/a] sort [f]ilter [/] search ",
        employees.len(),
        filter_label,
        search_label
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.employee_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_employee_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let placeholder = "-";

    let content = match app.selected_employee() {
        Some(employee) => {
            let mut lines = vec![];

            lines.push(Line::from(Span::styled(
                employee.full_name(),
                styles::title_style(),
            )));
            lines.push(Line::from(""));

            lines.push(Line::from(vec![
                Span::styled("Email:      ", styles::muted_style()),
                Span::raw(truncate(&employee.email, 30)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Department: ", styles::muted_style()),
                Span::raw(employee.department.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Joined:     ", styles::muted_style()),
                Span::raw(employee.joined_display()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Reviews:    ", styles::muted_style()),
                Span::raw(employee.reviews_count.to_string()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Avg rating: ", styles::muted_style()),
                Span::raw(employee.rating_display()),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Performance Reviews",
                styles::highlight_style(),
            )));

            // Detail fetches land in the per-employee map; the nested list
            // from a detail response works as a fallback
            let reviews = app
                .employee_reviews
                .get(&employee.id)
                .unwrap_or(&employee.performance_reviews);

            if reviews.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No reviews yet",
                    styles::muted_style(),
                )));
            } else {
                for review in reviews {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{:<9}", review.review_period), styles::list_item_style()),
                        Span::styled(
                            format!("{}/5 {}", review.rating, review.rating_label()),
                            styles::rating_style(review.rating),
                        ),
                    ]));
                    let feedback = format_optional(&review.feedback, placeholder);
                    lines.push(Line::from(Span::styled(
                        format!("  {}", truncate(&feedback, 36)),
                        styles::muted_style(),
                    )));
                }
            }

            lines
        }
        None => vec![Line::from(Span::styled(
            "No employee selected",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Detail ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));
    frame.render_widget(Paragraph::new(content).block(block), area);
}

//! Plain-text rendering of user records.

use userdesk_core::UserRecord;

/// Widest a table cell may get before it is truncated
const MAX_CELL_WIDTH: usize = 32;

const TABLE_HEADERS: [&str; 5] = ["ID", "NAME", "EMAIL", "COMPANY", "CITY"];

/// Truncate a string to a maximum length, adding ellipsis if needed
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Dashboard table: one row per user.
pub fn user_table(users: &[UserRecord]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let rows: Vec<[String; 5]> = users
        .iter()
        .map(|u| {
            [&u.id, &u.name, &u.email, &u.company, &u.address.city]
                .map(|cell| truncate_string(cell, MAX_CELL_WIDTH))
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(&TABLE_HEADERS)];
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_row(&cells));
    }
    lines.join("\n")
}

/// Details view: contact, company and address sections.
pub fn user_detail(user: &UserRecord) -> String {
    let mut lines = vec![
        user.name.clone(),
        user.email.clone(),
        String::new(),
        "Contact Information".to_string(),
        format!("  Email:    {}", user.email),
        format!("  Phone:    {}", user.phone),
    ];
    if let Some(website) = &user.website {
        lines.push(format!("  Website:  {}", website));
    }
    lines.push(String::new());
    lines.push("Company".to_string());
    lines.push(format!("  {}", user.company));
    lines.push(String::new());
    lines.push("Address & Location".to_string());
    lines.push(format!("  {}", user.street_line()));
    lines.push(format!("  {}", user.city_line()));
    lines.push(format!(
        "  Lat {}  Lng {}",
        user.address.geo.lat, user.address.geo.lng
    ));
    lines.push(String::new());
    lines.push(format!("ID: {}", user.id));
    lines.join("\n")
}

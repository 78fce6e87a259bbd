//! Terminal output formatting.

use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};
use fila_core::{Ticket, TicketStatus};
use unicode_width::UnicodeWidthStr;

/// Print a single ticket.
pub fn print_ticket(ticket: &Ticket) {
    println!(
        "{} {}",
        ticket.display_code.cyan().bold(),
        format!("({})", ticket.id).dimmed()
    );
    println!();
    println!("{}: {}", "Name".bold(), ticket.subject_name);
    println!("{}: {}", "Specialty".bold(), ticket.specialty);
    println!("{}: {}", "Priority".bold(), if ticket.priority { "yes" } else { "no" });
    println!("{}: {}", "Status".bold(), status_colored(ticket.status));
    if let Some(room) = &ticket.assigned_room {
        println!("{}: {}", "Room".bold(), room.yellow());
    }
    println!("{}: {}", "Issued".bold(), local_time(&ticket.created_at));
    if let Some(called_at) = &ticket.called_at {
        println!("{}: {}", "Called".bold(), local_time(called_at));
    }
}

/// Print tickets as a table.
pub fn print_tickets_table(tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("{}", "No tickets found.".dimmed());
        return;
    }

    println!("{}", table_header());
    println!("{}", "─".repeat(86));

    for ticket in tickets {
        println!("{}", table_row(ticket));
    }
}

fn table_header() -> String {
    format!(
        "{:<6} {:<24} {:<20} {:<9} {:<16} {:<8}",
        "Code", "Name", "Specialty", "Status", "Room", "Issued"
    )
}

/// One table line. Colored strings carry escape codes, so every column is
/// padded as plain text before it is colored.
fn table_row(ticket: &Ticket) -> String {
    let code = pad_right(&ticket.display_code, 6);
    let code = if ticket.priority {
        code.red().bold()
    } else {
        code.normal()
    };
    format!(
        "{} {} {} {} {} {}",
        code,
        pad_right(&truncate_visual(&ticket.subject_name, 24), 24),
        pad_right(&truncate_visual(&ticket.specialty, 20), 20),
        status_colored(ticket.status),
        pad_right(
            &truncate_visual(ticket.assigned_room.as_deref().unwrap_or("-"), 16),
            16
        ),
        ticket.created_at.with_timezone(&Local).format("%H:%M:%S")
    )
}

fn status_colored(status: TicketStatus) -> ColoredString {
    let label = format!("{:<9}", status.as_str());
    match status {
        TicketStatus::Waiting => label.yellow(),
        TicketStatus::Called => label.green(),
    }
}

fn local_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Pad a string to a visual width.
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}

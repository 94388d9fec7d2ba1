use std::fmt::Write;

use super::layout::{Align, Block, Document, Table};

/// Text width of a rendered page
const PAGE_WIDTH: usize = 100;

/// Deterministic UTF-8 rendering of a laid-out document. Page breaks and
/// table boundaries follow the document exactly.
pub fn to_text(document: &Document) -> String {
    let mut out = String::new();
    let total = document.page_count();

    for page in &document.pages {
        for block in &page.blocks {
            match block {
                Block::Line(line) => {
                    let width = line.text.chars().count();
                    let pad = match line.align {
                        Align::Left => 0,
                        Align::Center => PAGE_WIDTH.saturating_sub(width) / 2,
                        Align::Right => PAGE_WIDTH.saturating_sub(width),
                    };
                    let _ = writeln!(out, "{}{}", " ".repeat(pad), line.text);
                }
                Block::Gap { .. } => out.push('\n'),
                Block::Rule => {
                    let _ = writeln!(out, "{}", "-".repeat(PAGE_WIDTH));
                }
                Block::Table(table) => write_table(&mut out, table),
            }
        }
        let _ = writeln!(out, "--- Page {} of {} ---", page.number, total);
    }
    out
}

fn write_table(out: &mut String, table: &Table) {
    let widths = column_widths(table);
    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line
    };

    if let Some(title) = &table.title {
        let _ = writeln!(out, "{}", title);
    }
    let _ = writeln!(out, "{}", border);
    write_row(out, &table.head, &widths);
    let _ = writeln!(out, "{}", border);
    for row in &table.rows {
        write_row(out, row, &widths);
    }
    if let Some(total) = &table.total {
        let _ = writeln!(out, "{}", border);
        write_row(out, total, &widths);
    }
    let _ = writeln!(out, "{}", border);
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let pad = width.saturating_sub(cell.chars().count());
        let _ = write!(out, " {}{} |", cell, " ".repeat(pad));
    }
    out.push('\n');
}

fn column_widths(table: &Table) -> Vec<usize> {
    let mut widths: Vec<usize> = table.head.iter().map(|h| h.chars().count()).collect();
    let body = table.rows.iter().chain(table.total.iter());
    for row in body {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

//! Terminal rendering

use discipline_core::{Discipline, Project};

const DESCRIPTION_WIDTH: usize = 40;

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

pub fn discipline_table(records: &[&Discipline]) -> String {
    if records.is_empty() {
        return "No disciplines found.\n".to_string();
    }

    let name_width = records
        .iter()
        .map(|d| d.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = format!(
        "{:<10} {:<name_width$} {:<7} {:<14} {}\n",
        "CODE", "NAME", "ACTIVE", "PROJECT", "DESCRIPTION"
    );
    for d in records {
        out.push_str(&format!(
            "{:<10} {:<name_width$} {:<7} {:<14} {}\n",
            d.code,
            d.name,
            if d.is_active { "yes" } else { "no" },
            clip(d.project_label().unwrap_or("-"), 14),
            clip(&d.description, DESCRIPTION_WIDTH),
        ));
    }
    out.push_str(&format!("\n{} record(s)\n", records.len()));
    out
}

pub fn discipline_detail(d: &Discipline) -> String {
    let mut out = String::new();
    out.push_str(&format!("ID:          {}\n", d.id));
    out.push_str(&format!("Code:        {}\n", d.code));
    out.push_str(&format!("Name:        {}\n", d.name));
    out.push_str(&format!("Description: {}\n", d.description));
    out.push_str(&format!("Active:      {}\n", if d.is_active { "yes" } else { "no" }));
    out.push_str(&format!("Project:     {}\n", d.project_label().unwrap_or("-")));
    if let Some(order) = d.sort_order {
        out.push_str(&format!("Sort order:  {order}\n"));
    }
    out
}

pub fn project_table(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects available.\n".to_string();
    }
    let id_width = projects.iter().map(|p| p.id.len()).max().unwrap_or(0).max(2);

    let mut out = format!("{:<id_width$}  {}\n", "ID", "NAME");
    for p in projects {
        out.push_str(&format!("{:<id_width$}  {}\n", p.id, p.name));
    }
    out
}

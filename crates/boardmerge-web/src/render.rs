//! HTML rendering for the form and the merged board table

use boardmerge_core::{Board, BoardCatalog};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use crate::config::ScanConfig;

/// Values shown in the scan form
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub path: String,
    pub recursive: bool,
    pub depth: usize,
    pub logging: bool,
}

impl FormValues {
    pub fn defaults(scan: &ScanConfig) -> Self {
        Self {
            path: String::new(),
            recursive: scan.default_recursive,
            depth: scan.default_depth,
            logging: false,
        }
    }
}

/// Full page holding the form and, after a submission, its outcome
pub fn page(form: &FormValues, outcome: Option<&Result<BoardCatalog, String>>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Board Merge</title>\n");
    html.push_str("<link rel=\"stylesheet\" href=\"/static/style.css\">\n");
    html.push_str("</head>\n<body>\n<h1>Board Merge</h1>\n");
    html.push_str(&scan_form(form));
    if let Some(outcome) = outcome {
        html.push_str(&result_fragment(outcome));
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn scan_form(form: &FormValues) -> String {
    let checked = |on: bool| if on { " checked" } else { "" };
    format!(
        concat!(
            "<form method=\"post\" action=\"/processPath\">\n",
            "<label>Directory <input type=\"text\" name=\"path\" value=\"{path}\" required></label>\n",
            "<label><input type=\"checkbox\" name=\"recursive\"{recursive}> Recursive</label>\n",
            "<label>Depth <input type=\"number\" name=\"depth\" min=\"0\" value=\"{depth}\"></label>\n",
            "<label><input type=\"checkbox\" name=\"logging\"{logging}> Logging</label>\n",
            "<button type=\"submit\">Merge</button>\n",
            "</form>\n",
        ),
        path = encode_double_quoted_attribute(&form.path),
        recursive = checked(form.recursive),
        depth = form.depth,
        logging = checked(form.logging),
    )
}

/// Error paragraph or board table for one pipeline run
pub fn result_fragment(outcome: &Result<BoardCatalog, String>) -> String {
    match outcome {
        Ok(catalog) => boards_table(catalog),
        Err(message) => format!("<p class=\"error\">{}</p>\n", encode_text(message)),
    }
}

fn boards_table(catalog: &BoardCatalog) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<p class=\"summary\">{} boards from {} vendors</p>",
        catalog.metadata.total_boards, catalog.metadata.unique_vendors
    );
    html.push_str("<table>\n<thead>\n<tr><th>Vendor</th><th>Name</th><th>Core</th><th>Has WiFi</th><th>Extra</th></tr>\n</thead>\n<tbody>\n");
    for board in &catalog.boards {
        html.push_str(&board_row(board));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn board_row(board: &Board) -> String {
    let wifi = match board.has_wifi.as_bool() {
        Some(true) => "yes",
        Some(false) => "no",
        None => "",
    };

    let mut extra = String::new();
    for (key, value) in &board.extra {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let _ = write!(
            extra,
            "<div><span class=\"key\">{}</span>: {}</div>",
            encode_text(key),
            encode_text(&value)
        );
    }

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        encode_text(&board.vendor),
        encode_text(&board.name),
        encode_text(board.core.as_deref().unwrap_or("")),
        wifi,
        extra
    )
}

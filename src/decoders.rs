/// Width used when flattening HTML bodies; the reading pane re-wraps anyway.
const HTML_WIDTH: usize = 100;

/// Plain-text rendering of a message body. HTML is converted, anything else passes through.
pub fn body_text(content: &str) -> String {
    if !looks_like_html(content) {
        return content.to_string();
    }
    match html2text::from_read(content.as_bytes(), HTML_WIDTH) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("html2text failed, showing raw body: {e}");
            content.to_string()
        }
    }
}

fn looks_like_html(s: &str) -> bool {
    let t = s.trim_start();
    t.starts_with('<') && t.contains("</")
}

/// Collapses a body or preview into a single line of at most `max_chars` characters.
pub fn normalize_snippet(s: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
        if out.chars().count() >= max_chars {
            break;
        }
    }
    out.chars().take(max_chars).collect()
}

//! Server-rendered HTML for the upload form and the results page.

use crate::archive::ARCHIVE_FILE_NAME;
use crate::converter::truncate_chars;
use crate::output::BatchOutput;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Error(String),
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { font-size: 1.6rem; }
fieldset { border: 1px solid #ccc; border-radius: 6px; margin-bottom: 1rem; padding: 1rem; }
input[type=text] { width: 100%; padding: .4rem; box-sizing: border-box; }
button { padding: .5rem 1.2rem; font-size: 1rem; cursor: pointer; }
.notice { padding: .6rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.warning { background: #fff6d6; border: 1px solid #e8c95a; }
.error { background: #fde2e2; border: 1px solid #e08080; }
.hint { color: #666; font-size: .9rem; }
.summary { font-weight: bold; }
.file-status { list-style: none; padding-left: 0; }
.failed { color: #a00; }
pre { background: #f6f6f6; padding: .6rem; overflow-x: auto; white-space: pre-wrap; }
"#;

/// Escape text for inclusion in HTML content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Longest Markdown preview shown per file on the results page.
const PREVIEW_CHARS: usize = 5_000;

/// Render the full page: optional notice, then the conversion form.
pub fn render_page(notice: Option<&Notice>) -> String {
    let notice_html = match notice {
        Some(Notice::Warning(msg)) => {
            format!(r#"<div class="notice warning">{}</div>"#, escape_html(msg))
        }
        Some(Notice::Error(msg)) => {
            format!(r#"<div class="notice error">{}</div>"#, escape_html(msg))
        }
        None => String::new(),
    };
    layout(&notice_html, "")
}

/// Render the outcome of a batch: `k/n` summary, a download link carrying
/// the archive inline, one status line per file and a Markdown preview for
/// each success. The form follows so another batch can be started.
pub fn render_results(output: &BatchOutput, archive: &[u8]) -> String {
    let mut html = String::new();
    html.push_str("<section class=\"results\">\n<h2>Results</h2>\n");
    html.push_str(&format!(
        "<p class=\"summary\">Files converted: {}/{}</p>\n",
        output.stats.converted_files, output.stats.total_files
    ));
    html.push_str(&format!(
        "<p><a class=\"download\" href=\"data:application/zip;base64,{}\" download=\"{}\">Download {}</a></p>\n",
        STANDARD.encode(archive),
        ARCHIVE_FILE_NAME,
        ARCHIVE_FILE_NAME
    ));

    html.push_str("<ul class=\"file-status\">\n");
    for result in &output.results {
        match &result.error {
            None => html.push_str(&format!(
                "<li class=\"ok\">\u{2705} {}</li>\n",
                escape_html(&result.name)
            )),
            Some(e) => html.push_str(&format!(
                "<li class=\"failed\">\u{274C} {}: {}</li>\n",
                escape_html(&result.name),
                escape_html(&e.to_string())
            )),
        }
    }
    html.push_str("</ul>\n");

    for result in output.successes() {
        html.push_str(&format!(
            "<details><summary>Preview: {}</summary><pre>{}</pre></details>\n",
            escape_html(&result.name),
            escape_html(&truncate_chars(&result.markdown, PREVIEW_CHARS))
        ));
    }
    html.push_str("</section>\n");

    layout("", &html)
}

fn layout(notice_html: &str, results_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>MarkItDown - Batch Converter</title>
<style>{STYLE}</style>
</head>
<body>
<h1>MarkItDown &mdash; Batch converter</h1>
{notice_html}
{results_html}
<form action="/results" method="post" enctype="multipart/form-data">
  <fieldset>
    <legend>Upload files</legend>
    <input type="file" name="files" multiple>
  </fieldset>
  <fieldset>
    <legend>Or provide a folder path (server-side)</legend>
    <input type="text" name="folder" placeholder="/path/to/documents">
    <p><label><input type="checkbox" name="recursive" value="on" checked> Recurse into subfolders</label></p>
  </fieldset>
  <button type="submit">Convert uploaded / folder files</button>
  <p class="hint">The converted Markdown files are offered as a single zip archive.
  Files that fail to convert are listed in <code>conversion_errors.txt</code> inside it.
  Scripts can POST the same form to <code>/convert</code> to receive the zip directly.</p>
</form>
</body>
</html>
"#
    )
}

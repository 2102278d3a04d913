//! Placeholder substitution over a template's paragraphs.
//!
//! Scope is every `w:p` directly under `w:body` plus every `w:p` in a table
//! cell, recursing into tables nested in cells. A token is replaced only
//! inside a run whose own text contains all of it; tokens split across runs
//! are left as they are.

use claimdoc_engine::PlaceholderMap;

use crate::docx::{DocxTemplate, RenderedDocument};
use crate::xml_tree::{XmlDocument, XmlElement, XmlNode};

/// Fill a fresh copy of `template`. The template itself is untouched.
pub fn render(template: &DocxTemplate, map: &PlaceholderMap) -> RenderedDocument {
    let mut rendered = template.instantiate();

    let mut rewritten = 0;
    if let Some(body) = body_mut(&mut rendered.document) {
        let mut paragraphs = Vec::new();
        collect_paragraphs_mut(body, &mut paragraphs);
        for paragraph in paragraphs {
            rewritten += fill_paragraph(paragraph, map);
        }
    }

    log::debug!(
        "rendered {}: {rewritten} run(s) rewritten",
        template.path().display()
    );
    rendered
}

/// Which of `tokens` occur in the template's paragraph text.
pub fn tokens_present<'t>(template: &DocxTemplate, tokens: &[&'t str]) -> Vec<&'t str> {
    let mut texts = Vec::new();
    if let Some(body) = body(template.document()) {
        let mut paragraphs = Vec::new();
        collect_paragraphs(body, &mut paragraphs);
        texts = paragraphs.into_iter().map(paragraph_text).collect();
    }
    tokens
        .iter()
        .copied()
        .filter(|token| texts.iter().any(|text: &String| text.contains(token)))
        .collect()
}

fn body(doc: &XmlDocument) -> Option<&XmlElement> {
    doc.root()?.child_elements().find(|e| e.is("body"))
}

fn body_mut(doc: &mut XmlDocument) -> Option<&mut XmlElement> {
    doc.root_mut()?.child_elements_mut().find(|e| e.is("body"))
}

// Containers are the body and table cells.
fn collect_paragraphs<'a>(container: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in container.child_elements() {
        if child.is("p") {
            out.push(child);
        } else if child.is("tbl") {
            for row in child.child_elements().filter(|e| e.is("tr")) {
                for cell in row.child_elements().filter(|e| e.is("tc")) {
                    collect_paragraphs(cell, out);
                }
            }
        }
    }
}

fn collect_paragraphs_mut<'a>(container: &'a mut XmlElement, out: &mut Vec<&'a mut XmlElement>) {
    for child in container.child_elements_mut() {
        if child.is("p") {
            out.push(child);
        } else if child.is("tbl") {
            for row in child.child_elements_mut().filter(|e| e.is("tr")) {
                for cell in row.child_elements_mut().filter(|e| e.is("tc")) {
                    collect_paragraphs_mut(cell, out);
                }
            }
        }
    }
}

fn paragraph_text(paragraph: &XmlElement) -> String {
    paragraph
        .child_elements()
        .filter(|e| e.is("r"))
        .map(run_text)
        .collect()
}

fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.child_elements() {
        match child.local_name().as_ref() {
            "t" => text.push_str(&child.text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Returns the number of runs rewritten.
fn fill_paragraph(paragraph: &mut XmlElement, map: &PlaceholderMap) -> usize {
    let mut rewritten = 0;
    for (token, replacement) in map.iter() {
        if token.is_empty() || !paragraph_text(paragraph).contains(token) {
            continue;
        }
        for run in paragraph.child_elements_mut().filter(|e| e.is("r")) {
            let text = run_text(run);
            if text.contains(token) {
                set_run_text(run, &text.replace(token, replacement));
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// Replace a run's content with `text`, keeping its `rPr`.
fn set_run_text(run: &mut XmlElement, text: &str) {
    let prefix = run.prefix();
    run.children
        .retain(|c| matches!(c, XmlNode::Element(e) if e.is("rPr")));

    let mut pending = String::new();
    for ch in text.chars() {
        let special = match ch {
            '\t' => "tab",
            '\n' => "br",
            _ => {
                pending.push(ch);
                continue;
            }
        };
        push_text(run, &prefix, &mut pending);
        run.children
            .push(XmlNode::Element(XmlElement::new(&format!("{prefix}{special}"))));
    }
    push_text(run, &prefix, &mut pending);
    run.self_closing = false;
}

fn push_text(run: &mut XmlElement, prefix: &str, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let t = XmlElement::new(&format!("{prefix}t"))
        .with_attribute("xml:space", "preserve")
        .with_text(std::mem::take(pending));
    run.children.push(XmlNode::Element(t));
}

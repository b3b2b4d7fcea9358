//! Text save format.
//!
//! ```text
//! "entityName" : "textValue"
//! "alias" : @"/path/to/entityName"
//! "childNamespaceName" : {
//!     "nestedEntity" : "textValue"
//! }
//! ```
//!
//! One item per line, indented one unit per depth level. Indentation is
//! cosmetic. Blank lines and `//` comments are ignored. Inside quotes `\"`,
//! `\\` and `\n` stand for a quote, a backslash and a newline.
//!
//! Link lines are only written when `preserve_links` is set; otherwise a
//! shared entity is written once per slot and comes back as independent
//! copies.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::rc::Rc;

use log::{debug, warn};

use super::codec::{Loader, Saver};
use super::liberator::Liberator;
use super::tree::{FakeFs, NodeId};
use crate::error::FsError;


/// What a `load` did, including every line it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub entities: usize,
    pub links: usize,
    pub namespaces: usize,
    pub skipped: Vec<SkippedLine>,
    /// Namespaces still open at end of input.
    pub unclosed: usize,
}

impl LoadReport {
    /// No line was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based.
    pub line: usize,
    pub reason: String,
}


/// Pending work for the save walk.
enum Step {
    /// Entity lines of `node`, then its children.
    Body { node: NodeId, depth: usize },
    /// `"name" : {` for `node`, written at its parent's depth.
    Open { node: NodeId, depth: usize },
    Close { depth: usize },
}


/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Entity { key: String, value: String },
    Link { key: String, target: String },
    Open { key: String },
    Close,
    Ignored,
}


impl<T, L: Liberator<T>> FakeFs<T, L> {
    // -------------------------------------------------------------------
    // Save
    // -------------------------------------------------------------------

    /// Write the whole tree.
    pub fn save<W: Write, S: Saver<T>>(&self, out: &mut W, saver: S) -> Result<(), FsError> {
        self.save_node(self.root, out, saver)
    }

    /// Write the subtree at `path`; its contents become the top level.
    pub fn save_namespace<W: Write, S: Saver<T>>(
        &self,
        path: &str,
        out: &mut W,
        saver: S,
    ) -> Result<(), FsError> {
        let res = self.resolve(path)?;
        if !res.is_complete() {
            return Err(FsError::NotFound(path.to_string()));
        }
        self.save_node(res.node, out, saver)
    }

    pub fn save_to_string<S: Saver<T>>(&self, saver: S) -> String {
        let mut out = String::new();
        let mut saver = saver;
        self.render(self.root, &mut out, &mut saver, &mut HashMap::new());
        out
    }

    pub fn save_file<S: Saver<T>>(&self, path: &Path, saver: S) -> Result<(), FsError> {
        let mut file = File::create(path)?;
        self.save(&mut file, saver)?;
        file.flush()?;
        Ok(())
    }

    fn save_node<W: Write, S: Saver<T>>(&self, node: NodeId, out: &mut W, saver: S) -> Result<(), FsError> {
        let mut text = String::new();
        let mut saver = saver;
        self.render(node, &mut text, &mut saver, &mut HashMap::new());
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Depth-first walk with an explicit stack. `seen` maps shared boxes
    /// to the path (relative to `start`) they were first written under.
    fn render<S: Saver<T>>(
        &self,
        start: NodeId,
        out: &mut String,
        saver: &mut S,
        seen: &mut HashMap<*const (), String>,
    ) {
        let sep = self.settings.separator;
        let mut work = vec![Step::Body { node: start, depth: 0 }];

        while let Some(step) = work.pop() {
            match step {
                Step::Body { node, depth } => {
                    let indent = self.settings.indent.repeat(depth);
                    let n = self.node(node);
                    for (name, slot) in &n.entities {
                        out.push_str(&indent);
                        if self.settings.preserve_links && Rc::strong_count(slot) > 1 {
                            let key = Rc::as_ptr(slot) as *const ();
                            if let Some(first) = seen.get(&key) {
                                out.push_str(&format!("\"{}\" : @\"{}\"\n", escape(name), escape(first)));
                                continue;
                            }
                            let path = format!("{}{}{}", self.relative_path(node, start), sep, name);
                            seen.insert(key, path);
                        }
                        let text = saver.save(&slot.borrow());
                        out.push_str(&format!("\"{}\" : \"{}\"\n", escape(name), escape(&text)));
                    }
                    // Reversed so the first child is popped first.
                    for &child in n.children.iter().rev() {
                        work.push(Step::Open { node: child, depth });
                    }
                }
                Step::Open { node, depth } => {
                    let name = &self.node(node).name;
                    let indent = self.settings.indent.repeat(depth);
                    out.push_str(&format!("{}\"{}\" : {{\n", indent, escape(name)));
                    work.push(Step::Close { depth });
                    work.push(Step::Body { node, depth: depth + 1 });
                }
                Step::Close { depth } => {
                    out.push_str(&self.settings.indent.repeat(depth));
                    out.push_str("}\n");
                }
            }
        }
    }

    /// Path of `node` below `start`, separator-prefixed; empty for `start`.
    fn relative_path(&self, node: NodeId, start: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = node;
        while current != start {
            let n = self.node(current);
            names.push(n.name.as_str());
            match n.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        let sep = self.settings.separator;
        let mut out = String::new();
        for name in names.iter().rev() {
            out.push(sep);
            out.push_str(name);
        }
        out
    }

    // -------------------------------------------------------------------
    // Load
    // -------------------------------------------------------------------

    /// Replace the tree with the contents of `input`.
    ///
    /// Unparseable lines (and values the loader rejects) are logged and
    /// skipped unless `strict_load` is set, in which case the first one
    /// aborts with `Malformed`, leaving whatever was loaded so far. Input
    /// ending inside open namespaces is accepted. A line that is not valid
    /// UTF-8 is malformed like any other. Only I/O errors fail a lenient
    /// load.
    pub fn load<R: BufRead, Ld: Loader<T>>(&mut self, input: R, loader: Ld) -> Result<LoadReport, FsError> {
        self.clear();
        let mut input = input;
        let mut loader = loader;
        let mut report = LoadReport::default();
        // `None` marks a block being skipped.
        let mut stack: Vec<Option<NodeId>> = Vec::new();
        let mut raw = Vec::new();
        let mut lineno = 0;

        loop {
            raw.clear();
            if input.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            lineno += 1;
            let current = match stack.last() {
                Some(top) => *top,
                None => Some(self.root),
            };

            let line = std::str::from_utf8(&raw)
                .map_err(|e| format!("invalid UTF-8: {}", e))
                .and_then(parse_line);
            let outcome = match line {
                Err(reason) => Err(reason),
                Ok(Line::Ignored) => Ok(()),
                Ok(Line::Close) => {
                    if stack.pop().is_some() {
                        Ok(())
                    } else {
                        Err("unbalanced '}'".to_string())
                    }
                }
                Ok(Line::Open { key }) => match current {
                    None => {
                        stack.push(None);
                        Ok(())
                    }
                    Some(node) => match self.open_child(node, &key) {
                        Ok((child, created)) => {
                            if created {
                                report.namespaces += 1;
                            }
                            stack.push(Some(child));
                            Ok(())
                        }
                        Err(e) => {
                            stack.push(None);
                            Err(format!("skipping namespace block: {}", e))
                        }
                    },
                },
                Ok(Line::Entity { key, value }) => match current {
                    None => Ok(()),
                    Some(node) => loader
                        .load(&value)
                        .and_then(|v| self.create_entity_in(node, &key, v).map_err(|e| e.to_string()))
                        .map(|()| report.entities += 1),
                },
                Ok(Line::Link { key, target }) => match current {
                    None => Ok(()),
                    Some(node) => self
                        .link_in(node, &key, &target)
                        .map(|()| report.links += 1)
                        .map_err(|e| format!("cannot link: {}", e)),
                },
            };

            if let Err(reason) = outcome {
                if self.settings.strict_load {
                    return Err(FsError::Malformed { line: lineno, reason });
                }
                warn!("load: skipping line {}: {}", lineno, reason);
                report.skipped.push(SkippedLine { line: lineno, reason });
            }
        }

        report.unclosed = stack.len();
        debug!(
            "load: {} entities, {} links, {} namespaces, {} skipped, {} unclosed",
            report.entities,
            report.links,
            report.namespaces,
            report.skipped.len(),
            report.unclosed
        );
        Ok(report)
    }

    pub fn load_str<Ld: Loader<T>>(&mut self, text: &str, loader: Ld) -> Result<LoadReport, FsError> {
        self.load(text.as_bytes(), loader)
    }

    /// Fails if the file cannot be opened, before touching the tree.
    pub fn load_file<Ld: Loader<T>>(&mut self, path: &Path, loader: Ld) -> Result<LoadReport, FsError> {
        let file = File::open(path)?;
        self.load(BufReader::new(file), loader)
    }

    /// Existing child `key` (merged into) or a new one. Bool: created.
    fn open_child(&mut self, node: NodeId, key: &str) -> Result<(NodeId, bool), FsError> {
        self.check_name(key)?;
        if let Some(child) = self.child(node, key) {
            return Ok((child, false));
        }
        if self.node(node).entities.contains_key(key) {
            return Err(FsError::AlreadyExists(key.to_string()));
        }
        Ok((self.create_child(node, key.to_string()), true))
    }
}


// ---------------------------------------------------------------------------
// Line scanning
// ---------------------------------------------------------------------------

fn parse_line(line: &str) -> Result<Line, String> {
    let t = line.trim();
    if t.is_empty() || t.starts_with("//") {
        return Ok(Line::Ignored);
    }
    if t == "}" {
        return Ok(Line::Close);
    }
    if !t.starts_with('"') {
        return Err(format!("unrecognised line '{}'", t));
    }

    let (key, rest) = take_quoted(t)?;
    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix(':')
        .ok_or_else(|| format!("expected ':' after \"{}\"", key))?
        .trim_start();

    if rest.starts_with('"') {
        let (value, tail) = take_quoted(rest)?;
        expect_end(tail)?;
        return Ok(Line::Entity { key, value });
    }
    if let Some(target) = rest.strip_prefix('@') {
        let (target, tail) = take_quoted(target.trim_start())?;
        expect_end(tail)?;
        return Ok(Line::Link { key, target });
    }
    if let Some(tail) = rest.strip_prefix('{') {
        expect_end(tail)?;
        return Ok(Line::Open { key });
    }
    Err(format!("expected a value or '{{' after \"{}\" :", key))
}

/// Read one quoted string from the front of `s`, returning the unescaped
/// text and the remainder after the closing quote.
fn take_quoted(s: &str) -> Result<(String, &str), String> {
    let body = s.strip_prefix('"').ok_or("expected '\"'")?;
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, &body[i + 1..])),
            '\\' => match chars.next() {
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, 'n')) => out.push('\n'),
                Some((_, other)) => return Err(format!("unknown escape '\\{}'", other)),
                None => return Err("unterminated escape".into()),
            },
            _ => out.push(c),
        }
    }
    Err("unterminated quote".into())
}

fn expect_end(tail: &str) -> Result<(), String> {
    if tail.trim().is_empty() {
        Ok(())
    } else {
        Err(format!("trailing text '{}'", tail.trim()))
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

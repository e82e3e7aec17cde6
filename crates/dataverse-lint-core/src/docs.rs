//! Structure of `///` documentation comments.
//!
//! Doc comments are parsed on demand into a small tree of tagged blocks.
//! This is a tolerant tag scanner rather than an XML parser: it recognises
//! start, end and empty tags, attributes, comments and the five predefined
//! entities, and closes anything left open at the end of the comment.

use crate::syntax::{SyntaxNode, Trivia, TriviaKind};

/// One element of a documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    /// Tag name, as written.
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<(String, String)>,
    /// Concatenated text directly inside this element (not in children).
    pub text: String,
    /// Nested elements.
    pub children: Vec<DocBlock>,
    /// Written as `<name/>`.
    pub is_empty_element: bool,
}

impl DocBlock {
    /// Value of the attribute `name`, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// True when the element is written as an empty `<name/>` tag.
    #[must_use]
    pub fn is_empty_tag(&self) -> bool {
        self.is_empty_element
    }
}

/// Parsed documentation attached to one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Top-level blocks of every doc comment in the node's leading trivia.
    pub blocks: Vec<DocBlock>,
}

impl DocComment {
    /// Parses the doc comments in `node`'s leading trivia.
    #[must_use]
    pub fn of(node: &SyntaxNode) -> Self {
        Self::from_trivia(node.leading_trivia())
    }

    /// Parses the doc comments in a trivia list. Consecutive `///` lines form
    /// one comment; any other comment in between starts a new one.
    #[must_use]
    pub fn from_trivia(trivia: &[Trivia]) -> Self {
        let mut blocks = Vec::new();
        let mut lines: Vec<&str> = Vec::new();
        for piece in trivia {
            match piece.kind {
                TriviaKind::DocComment => {
                    lines.push(piece.text.strip_prefix("///").unwrap_or(&piece.text));
                }
                TriviaKind::Whitespace | TriviaKind::EndOfLine => {}
                _ => {
                    if !lines.is_empty() {
                        blocks.extend(parse_doc_text(&lines.join("\n")));
                        lines.clear();
                    }
                }
            }
        }
        if !lines.is_empty() {
            blocks.extend(parse_doc_text(&lines.join("\n")));
        }
        Self { blocks }
    }

    /// True when there is no documentation at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every block, nested ones included, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.blocks.iter().rev().collect(),
        }
    }

    /// Blocks at any depth with the given tag name.
    pub fn blocks_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocBlock> + 'a {
        self.descendants().filter(move |b| b.name == name)
    }

    /// True if any block is an empty `<inheritdoc/>` tag, whatever its attributes.
    #[must_use]
    pub fn has_inherit_tag(&self) -> bool {
        self.blocks_named("inheritdoc").any(DocBlock::is_empty_tag)
    }

    /// True if any `<summary>` has direct text that is not blank.
    #[must_use]
    pub fn has_non_empty_summary(&self) -> bool {
        self.blocks_named("summary")
            .any(|b| !b.text.trim().is_empty())
    }

    /// Documented means a non-empty summary or an inheritdoc tag.
    #[must_use]
    pub fn is_documented(&self) -> bool {
        self.has_inherit_tag() || self.has_non_empty_summary()
    }
}

/// Pre-order walk over doc blocks.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a DocBlock>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DocBlock;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.stack.pop()?;
        self.stack.extend(block.children.iter().rev());
        Some(block)
    }
}

/// True if `node` carries an `<inheritdoc/>` tag.
#[must_use]
pub fn has_inherit_tag(node: &SyntaxNode) -> bool {
    DocComment::of(node).has_inherit_tag()
}

/// True if `node` carries a `<summary>` with non-blank text.
#[must_use]
pub fn has_non_empty_summary(node: &SyntaxNode) -> bool {
    DocComment::of(node).has_non_empty_summary()
}

/// Parses the body of a doc comment (with the `///` markers removed).
#[must_use]
pub fn parse_doc_text(text: &str) -> Vec<DocBlock> {
    let mut scanner = Scanner { rest: text };
    let mut roots: Vec<DocBlock> = Vec::new();
    let mut open: Vec<DocBlock> = Vec::new();

    while !scanner.rest.is_empty() {
        if scanner.eat("<!--") {
            scanner.skip_past("-->");
        } else if scanner.eat("<![CDATA[") {
            let data = scanner.take_until("]]>");
            if let Some(top) = open.last_mut() {
                top.text.push_str(data);
            }
        } else if scanner.rest.starts_with("</") && scanner.name_after(2).is_some() {
            scanner.advance(2);
            let name = scanner.take_name();
            scanner.skip_past(">");
            if let Some(pos) = open.iter().rposition(|b| b.name == name) {
                while open.len() > pos {
                    close(&mut open, &mut roots);
                }
            }
        } else if scanner.rest.starts_with('<') && scanner.name_after(1).is_some() {
            scanner.advance(1);
            let mut block = DocBlock {
                name: scanner.take_name().to_string(),
                ..DocBlock::default()
            };
            let self_closing = scanner.take_attributes(&mut block.attributes);
            if self_closing {
                block.is_empty_element = true;
                attach(block, &mut open, &mut roots);
            } else {
                open.push(block);
            }
        } else {
            let raw = scanner.take_text();
            if let Some(top) = open.last_mut() {
                top.text.push_str(&decode_entities(raw));
            }
        }
    }

    while !open.is_empty() {
        close(&mut open, &mut roots);
    }
    roots
}

fn attach(block: DocBlock, open: &mut [DocBlock], roots: &mut Vec<DocBlock>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(block),
        None => roots.push(block),
    }
}

fn close(open: &mut Vec<DocBlock>, roots: &mut Vec<DocBlock>) {
    if let Some(block) = open.pop() {
        attach(block, open, roots);
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn advance(&mut self, n: usize) {
        self.rest = &self.rest[n..];
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest.starts_with(prefix) {
            self.advance(prefix.len());
            true
        } else {
            false
        }
    }

    fn skip_past(&mut self, marker: &str) {
        match self.rest.find(marker) {
            Some(i) => self.advance(i + marker.len()),
            None => self.rest = "",
        }
    }

    fn take_until(&mut self, marker: &str) -> &'a str {
        let end = self.rest.find(marker).unwrap_or(self.rest.len());
        let taken = &self.rest[..end];
        self.rest = &self.rest[end..];
        self.eat(marker);
        taken
    }

    fn name_after(&self, skip: usize) -> Option<char> {
        self.rest[skip..].chars().next().filter(|&c| is_name_start(c))
    }

    fn take_name(&mut self) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .find(|&(_, c)| !is_name_char(c))
            .map_or(self.rest.len(), |(i, _)| i);
        let name = &self.rest[..end];
        self.rest = &self.rest[end..];
        name
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Reads attributes up to the closing `>` or `/>`. Returns true for `/>`.
    fn take_attributes(&mut self, attributes: &mut Vec<(String, String)>) -> bool {
        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                return true;
            }
            if self.eat(">") || self.rest.is_empty() {
                return false;
            }
            let Some(c) = self.rest.chars().next() else {
                return false;
            };
            if !is_name_start(c) {
                self.advance(c.len_utf8());
                continue;
            }
            let key = self.take_name().to_string();
            self.skip_whitespace();
            let mut value = String::new();
            if self.eat("=") {
                self.skip_whitespace();
                if let Some(quote) = self.rest.chars().next().filter(|c| matches!(c, '"' | '\'')) {
                    self.advance(1);
                    value = decode_entities(self.take_until(if quote == '"' { "\"" } else { "'" }));
                } else {
                    let end = self
                        .rest
                        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                        .unwrap_or(self.rest.len());
                    value = self.rest[..end].to_string();
                    self.advance(end);
                }
            }
            attributes.push((key, value));
        }
    }

    fn take_text(&mut self) -> &'a str {
        // A lone '<' that does not start a tag is text.
        let start = usize::from(self.rest.starts_with('<'));
        let end = self.rest[start..]
            .find('<')
            .map_or(self.rest.len(), |i| i + start);
        let text = &self.rest[..end];
        self.rest = &self.rest[end..];
        text
    }
}

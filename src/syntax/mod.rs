//! Owned syntax tree for generated model modules.
//!
//! The tree keeps the original source text and an editable view of every
//! class definition. Re-serialisation splices the edited parts of each class
//! back into the original text, so everything the rewriter did not touch
//! (imports, `Table(...)` definitions, comments, column declarations) is
//! emitted byte for byte.

pub mod literal;

pub use literal::{StringLiteral, clean_docstring, render_docstring};

use crate::error::{ModelgenError, Result};
use crate::lang::{Language, Python};
use literal::{LiteralKind, decode_token};
use std::ops::Range;
use std::path::Path;
use tree_sitter::Node;

/// Indentation added below a class header written on a single line.
const INDENT_UNIT: &str = "    ";

/// A base-class reference expression from a class header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRef {
    expr: String,
    span: Option<Range<usize>>,
}

impl BaseRef {
    /// Creates a plain name reference, e.g. `OMOPCDMModelBase`.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            expr: name.into(),
            span: None,
        }
    }

    /// The expression text as written (or to be written).
    pub fn expr(&self) -> &str {
        &self.expr
    }
}

/// What a body statement is, as far as the rewriter cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// A bare string-literal expression statement.
    String(StringLiteral),
    /// Any other statement, with its source text.
    Other(String),
}

/// A statement in a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    span: Option<Range<usize>>,
}

impl Statement {
    pub fn kind(&self) -> &StatementKind {
        &self.kind
    }

    /// The string literal, if this is a bare string expression.
    pub fn string_literal(&self) -> Option<&StringLiteral> {
        match &self.kind {
            StatementKind::String(literal) => Some(literal),
            StatementKind::Other(_) => None,
        }
    }

    pub fn string_literal_mut(&mut self) -> Option<&mut StringLiteral> {
        match &mut self.kind {
            StatementKind::String(literal) => Some(literal),
            StatementKind::Other(_) => None,
        }
    }
}

/// Source positions needed to write a class back.
#[derive(Debug, Clone)]
struct ClassLayout {
    original_name: String,
    name_span: Range<usize>,
    base_spans: Vec<Range<usize>>,
    keywords: Vec<String>,
    /// Text between the parentheses of the base list.
    arguments: Option<Range<usize>>,
    /// Where a base list is added when the class had none.
    header_end: usize,
    colon_end: usize,
    inline_body: bool,
    body_indent: String,
}

/// A class definition.
#[derive(Debug, Clone)]
pub struct ClassNode {
    pub name: String,
    pub bases: Vec<BaseRef>,
    body: Vec<Statement>,
    layout: ClassLayout,
}

impl ClassNode {
    /// The body statements in order.
    pub fn body(&self) -> &[Statement] {
        &self.body
    }

    /// Mutable access to existing statements; the body cannot shrink.
    pub fn body_mut(&mut self) -> &mut [Statement] {
        &mut self.body
    }

    /// Inserts a bare string-literal statement at `index`, shifting the rest down.
    pub fn insert_string(&mut self, index: usize, literal: StringLiteral) {
        self.body.insert(
            index,
            Statement {
                kind: StatementKind::String(literal),
                span: None,
            },
        );
    }

    /// The first body statement's literal, if it is a bare string expression.
    pub fn leading_string(&self) -> Option<&StringLiteral> {
        self.body.first().and_then(Statement::string_literal)
    }

    /// Indentation of the class body.
    pub fn body_indent(&self) -> &str {
        &self.layout.body_indent
    }

    /// Collects the text edits that turn the original class into this one.
    fn edits(&self, newline: &str, edits: &mut Vec<Edit>) {
        let layout = &self.layout;

        if self.name != layout.original_name {
            edits.push(Edit::replace(layout.name_span.clone(), &self.name));
        }
        self.base_edits(edits);
        self.body_edits(newline, edits);
    }

    fn base_edits(&self, edits: &mut Vec<Edit>) {
        let layout = &self.layout;

        if self.bases.len() == layout.base_spans.len() {
            for (base, span) in self.bases.iter().zip(&layout.base_spans) {
                if base.span.as_ref() != Some(span) {
                    edits.push(Edit::replace(span.clone(), &base.expr));
                }
            }
            return;
        }

        let mut arguments: Vec<&str> = self.bases.iter().map(|b| b.expr.as_str()).collect();
        arguments.extend(layout.keywords.iter().map(String::as_str));
        let joined = arguments.join(", ");

        match &layout.arguments {
            Some(inner) => edits.push(Edit::replace(inner.clone(), joined)),
            None => edits.push(Edit::insert(layout.header_end, format!("({joined})"))),
        }
    }

    fn body_edits(&self, newline: &str, edits: &mut Vec<Edit>) {
        let layout = &self.layout;
        let indent = layout.body_indent.as_str();
        let separator = format!("{newline}{indent}");
        let mut pending: Vec<String> = Vec::new();
        let mut first_original = true;
        let mut last_end = None;

        for statement in &self.body {
            let Some(span) = &statement.span else {
                if let StatementKind::String(literal) = &statement.kind {
                    pending.push(render_docstring(literal.value(), indent, newline));
                }
                continue;
            };

            let mut text: String = pending
                .drain(..)
                .map(|rendered| format!("{rendered}{separator}"))
                .collect();
            let start = if first_original && layout.inline_body && !text.is_empty() {
                // `class A: pass` becomes an indented block
                text.insert_str(0, &separator);
                layout.colon_end
            } else {
                span.start
            };

            match &statement.kind {
                StatementKind::String(literal) if literal.is_modified() => {
                    text.push_str(&render_docstring(literal.value(), indent, newline));
                    edits.push(Edit::replace(start..span.end, text));
                }
                _ if !text.is_empty() => edits.push(Edit::replace(start..span.start, text)),
                _ => {}
            }

            first_original = false;
            last_end = Some(span.end);
        }

        if !pending.is_empty() {
            let at = last_end.unwrap_or(layout.colon_end);
            edits.push(Edit::insert(at, format!("{separator}{}", pending.join(&separator))));
        }
    }
}

/// A text replacement in the original source.
#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    text: String,
}

impl Edit {
    fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }
}

/// A parsed module: the original text plus its class definitions.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    newline: &'static str,
    classes: Vec<ClassNode>,
}

impl SyntaxTree {
    /// Parses Python source text.
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with_path(source, Path::new("<source>"))
    }

    /// Parses Python source text, reporting errors against `path`.
    pub fn parse_with_path(source: &str, path: &Path) -> Result<Self> {
        let tree = Python.parse(source, path)?;
        let mut classes = Vec::new();
        collect_classes(tree.root_node(), source, path, &mut classes)?;

        Ok(Self {
            source: source.to_string(),
            newline: line_ending(source),
            classes,
        })
    }

    /// The line ending used for inserted text, taken from the first line
    /// break in the source.
    pub fn newline(&self) -> &str {
        self.newline
    }

    /// Class definitions in document order.
    pub fn classes(&self) -> &[ClassNode] {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut [ClassNode] {
        &mut self.classes
    }

    /// Writes the tree back to source text.
    pub fn to_source(&self) -> String {
        let mut edits = Vec::new();
        for class in &self.classes {
            class.edits(self.newline, &mut edits);
        }

        // Apply back to front; at equal starts the wider range goes first so
        // that an insertion lands in front of a replacement.
        edits.sort_by(|a, b| {
            b.range
                .start
                .cmp(&a.range.start)
                .then(b.range.end.cmp(&a.range.end))
        });

        let mut result = self.source.clone();
        for edit in edits {
            result.replace_range(edit.range, &edit.text);
        }
        result
    }
}

/// Walks the tree in document order. Classes nested in a class body are not
/// collected; classes under other compound statements are.
fn collect_classes(
    node: Node<'_>,
    source: &str,
    path: &Path,
    classes: &mut Vec<ClassNode>,
) -> Result<()> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "class_definition" {
            classes.push(class_node(child, source, path)?);
        } else {
            collect_classes(child, source, path, classes)?;
        }
    }
    Ok(())
}

fn class_node(node: Node<'_>, source: &str, path: &Path) -> Result<ClassNode> {
    let text = |n: Node<'_>| source[n.byte_range()].to_string();
    let malformed = |message: String| ModelgenError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let name_node = node
        .child_by_field_name("name")
        .ok_or_else(|| malformed("class definition without a name".to_string()))?;
    let name = text(name_node);

    let mut bases = Vec::new();
    let mut keywords = Vec::new();
    let mut arguments = None;
    if let Some(list) = node.child_by_field_name("superclasses") {
        arguments = Some(list.start_byte() + 1..list.end_byte() - 1);
        let mut cursor = list.walk();
        for arg in list.named_children(&mut cursor) {
            match arg.kind() {
                "comment" => {}
                "keyword_argument" | "dictionary_splat" => keywords.push(text(arg)),
                _ => bases.push(BaseRef {
                    expr: text(arg),
                    span: Some(arg.byte_range()),
                }),
            }
        }
    }

    let header_end = node
        .child_by_field_name("type_parameters")
        .unwrap_or(name_node)
        .end_byte();

    let mut cursor = node.walk();
    let colon = node
        .children(&mut cursor)
        .find(|c| c.kind() == ":")
        .ok_or_else(|| malformed(format!("class {name} has no ':' after its header")))?;

    let block = node
        .child_by_field_name("body")
        .ok_or_else(|| malformed(format!("class {name} has no body")))?;
    let mut body = Vec::new();
    let mut cursor = block.walk();
    for stmt in block.named_children(&mut cursor) {
        if stmt.kind() == "comment" {
            continue;
        }
        let kind = match string_expression(stmt, source) {
            Some(value) => StatementKind::String(StringLiteral::parsed(value)),
            None => StatementKind::Other(text(stmt)),
        };
        body.push(Statement {
            kind,
            span: Some(stmt.byte_range()),
        });
    }

    let first_start = body
        .first()
        .and_then(|s| s.span.as_ref())
        .map(|span| span.start);
    let inline_body = first_start.is_none_or(|start| !source[colon.end_byte()..start].contains('\n'));
    let body_indent = match first_start {
        Some(start) if !inline_body => leading_whitespace(source, start).to_string(),
        _ => format!("{}{INDENT_UNIT}", leading_whitespace(source, node.start_byte())),
    };

    Ok(ClassNode {
        layout: ClassLayout {
            original_name: name.clone(),
            name_span: name_node.byte_range(),
            base_spans: bases.iter().filter_map(|b| b.span.clone()).collect(),
            keywords,
            arguments,
            header_end,
            colon_end: colon.end_byte(),
            inline_body,
            body_indent,
        },
        name,
        bases,
        body,
    })
}

/// Decodes a bare string-literal expression statement.
fn string_expression(stmt: Node<'_>, source: &str) -> Option<String> {
    if stmt.kind() != "expression_statement" || stmt.named_child_count() != 1 {
        return None;
    }
    let expr = stmt.named_child(0)?;
    match expr.kind() {
        "string" => text_literal(expr, source),
        "concatenated_string" => {
            let mut cursor = expr.walk();
            let parts: Option<Vec<String>> = expr
                .named_children(&mut cursor)
                .filter(|part| part.kind() != "comment")
                .map(|part| text_literal(part, source))
                .collect();
            parts.map(|parts| parts.concat())
        }
        _ => None,
    }
}

fn text_literal(node: Node<'_>, source: &str) -> Option<String> {
    match decode_token(&source[node.byte_range()]) {
        LiteralKind::Text(value) => Some(value),
        LiteralKind::Other => None,
    }
}

fn line_ending(source: &str) -> &'static str {
    match source.find('\n') {
        Some(i) if source[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// The whitespace between the start of the line containing `at` and the
/// first non-blank character of that line.
fn leading_whitespace(source: &str, at: usize) -> &str {
    let line_start = source[..at].rfind('\n').map_or(0, |i| i + 1);
    let line = &source[line_start..];
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"from sqlalchemy.orm import DeclarativeBase, Mapped, mapped_column

class Base(DeclarativeBase):
    pass


class Cohort(Base):
    __tablename__ = 'cohort'

    subject_id: Mapped[int] = mapped_column(Integer, primary_key=True)
"#;

    #[test]
    fn test_parse_collects_classes() {
        let tree = SyntaxTree::parse(MODEL).unwrap();
        let classes = tree.classes();

        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].name, "Base");
        assert_eq!(classes[0].bases[0].expr(), "DeclarativeBase");
        assert_eq!(classes[1].name, "Cohort");
        assert_eq!(classes[1].body().len(), 2);
        assert_eq!(
            classes[1].body()[0].kind(),
            &StatementKind::Other("__tablename__ = 'cohort'".to_string())
        );
        assert_eq!(classes[1].body_indent(), "    ");
    }

    #[test]
    fn test_unchanged_tree_round_trips() {
        let tree = SyntaxTree::parse(MODEL).unwrap();
        assert_eq!(tree.to_source(), MODEL);
    }

    #[test]
    fn test_leading_string_is_decoded() {
        let source = "class A(B):\n    '''Doc\n    text.'''\n    x = 1\n";
        let tree = SyntaxTree::parse(source).unwrap();
        let literal = tree.classes()[0].leading_string().unwrap();
        assert_eq!(literal.value(), "Doc\n    text.");
        assert!(!literal.is_modified());
    }

    #[test]
    fn test_concatenated_leading_string() {
        let source = "class A:\n    'one ' \"two\"\n";
        let tree = SyntaxTree::parse(source).unwrap();
        assert_eq!(tree.classes()[0].leading_string().unwrap().value(), "one two");
    }

    #[test]
    fn test_fstring_is_not_a_leading_string() {
        let source = "class A:\n    f'{x}'\n";
        let tree = SyntaxTree::parse(source).unwrap();
        assert!(tree.classes()[0].leading_string().is_none());
    }

    #[test]
    fn test_rename_and_replace_base() {
        let mut tree = SyntaxTree::parse(MODEL).unwrap();
        let classes = tree.classes_mut();
        classes[0].name = "ModelBase".to_string();
        classes[1].bases[0] = BaseRef::name("ModelBase");

        let out = tree.to_source();
        assert!(out.contains("class ModelBase(DeclarativeBase):\n    pass\n"));
        assert!(out.contains("class Cohort(ModelBase):\n    __tablename__"));
    }

    #[test]
    fn test_only_first_base_is_replaced() {
        let source = "class A(Base, Mixin, metaclass=Meta):\n    x = 1\n";
        let mut tree = SyntaxTree::parse(source).unwrap();
        tree.classes_mut()[0].bases[0] = BaseRef::name("M");

        assert_eq!(
            tree.to_source(),
            "class A(M, Mixin, metaclass=Meta):\n    x = 1\n"
        );
    }

    #[test]
    fn test_adding_a_base_list() {
        let source = "class A:\n    x = 1\n";
        let mut tree = SyntaxTree::parse(source).unwrap();
        tree.classes_mut()[0].bases.push(BaseRef::name("M"));

        assert_eq!(tree.to_source(), "class A(M):\n    x = 1\n");
    }

    #[test]
    fn test_insert_docstring_in_block() {
        let mut tree = SyntaxTree::parse(MODEL).unwrap();
        tree.classes_mut()[1].insert_string(0, StringLiteral::new("\nCohorts.\n"));

        let out = tree.to_source();
        assert!(out.contains(
            "class Cohort(Base):\n    \"\"\"\n    Cohorts.\n    \"\"\"\n    __tablename__ = 'cohort'\n"
        ));
    }

    #[test]
    fn test_insert_docstring_expands_inline_body() {
        let source = "class Base(DeclarativeBase): pass\n";
        let mut tree = SyntaxTree::parse(source).unwrap();
        tree.classes_mut()[0].insert_string(0, StringLiteral::new("\nBase.\n"));

        assert_eq!(
            tree.to_source(),
            "class Base(DeclarativeBase):\n    \"\"\"\n    Base.\n    \"\"\"\n    pass\n"
        );
    }

    #[test]
    fn test_replace_existing_docstring() {
        let source = "class A(B):\n    \"\"\"Old.\"\"\"\n\n    x = 1\n";
        let mut tree = SyntaxTree::parse(source).unwrap();
        tree.classes_mut()[0].body_mut()[0]
            .string_literal_mut()
            .unwrap()
            .set_value("\nNew.\n");

        assert_eq!(
            tree.to_source(),
            "class A(B):\n    \"\"\"\n    New.\n    \"\"\"\n\n    x = 1\n"
        );
    }

    #[test]
    fn test_nested_and_decorated_classes() {
        let source = "@dataclass\nclass A:\n    class Inner:\n        pass\n\nif True:\n    class B(A):\n        pass\n";
        let tree = SyntaxTree::parse(source).unwrap();
        let names: Vec<&str> = tree.classes().iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(tree.classes()[1].body_indent(), "        ");
    }

    #[test]
    fn test_invalid_source_is_rejected() {
        let err = SyntaxTree::parse("class A(:\n    pass\n").unwrap_err();
        assert!(matches!(err, ModelgenError::Parse { .. }));
    }

    #[test]
    fn test_class_without_indented_body_is_rejected() {
        let err = SyntaxTree::parse("class A(Base):\nx = 1\n").unwrap_err();
        match err {
            ModelgenError::Parse { message, .. } => {
                assert!(message.contains("indented block"), "{message}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inserted_text_follows_crlf_line_endings() {
        let source = "class Base(DeclarativeBase):\r\n    pass\r\n\r\n\r\nclass A(Base): pass\r\n";
        let mut tree = SyntaxTree::parse(source).unwrap();
        assert_eq!(tree.newline(), "\r\n");

        tree.classes_mut()[0].insert_string(0, StringLiteral::new("\nBase.\n"));
        tree.classes_mut()[1].insert_string(0, StringLiteral::new("\nA desc.\n"));
        let out = tree.to_source();

        assert_eq!(
            out,
            "class Base(DeclarativeBase):\r\n    \"\"\"\r\n    Base.\r\n    \"\"\"\r\n    pass\r\n\r\n\r\n\
             class A(Base):\r\n    \"\"\"\r\n    A desc.\r\n    \"\"\"\r\n    pass\r\n"
        );
        assert!(!out.replace("\r\n", "").contains('\n'));

        let reparsed = SyntaxTree::parse(&out).unwrap();
        assert_eq!(reparsed.classes()[1].leading_string().unwrap().value(), "\n    A desc.\n    ");
    }

    #[test]
    fn test_plain_newlines_by_default() {
        assert_eq!(SyntaxTree::parse(MODEL).unwrap().newline(), "\n");
        assert_eq!(SyntaxTree::parse("x = 1").unwrap().newline(), "\n");
    }
}

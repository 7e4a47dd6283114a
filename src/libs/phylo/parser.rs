use super::error::TreeError;
use super::node::NodeId;
use super::tree::Tree;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{cut, map, map_res, opt, recognize},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};

// ================================================================================================
// Error Handling Structures
// ================================================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

/// A custom error type for nom that accumulates context and error kinds.
/// This allows for more informative error messages when parsing fails.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailedError<'a> {
    pub errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for DetailedError<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: E) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }
}

// ================================================================================================
// Intermediate Structure
// ================================================================================================

/// `ParsedNode` is a temporary recursive structure used during parsing.
/// After parsing is complete, it is converted into the flat, arena-based `Tree`
/// via the `to_tree` method.
#[derive(Debug)]
struct ParsedNode {
    name: Option<String>,
    length: Option<f64>,
    /// Carries the `@` marker
    ancestor: bool,
    children: Vec<ParsedNode>,
}

/// Bookkeeping while moving parsed nodes into the arena.
#[derive(Default)]
struct Conversion {
    /// Counter for generated `IN<k>` names, in closing-parenthesis order
    unnamed: usize,
    ancestor: Option<NodeId>,
}

impl ParsedNode {
    fn new() -> Self {
        Self {
            name: None,
            length: None,
            ancestor: false,
            children: Vec::new(),
        }
    }

    /// Converts this recursive `ParsedNode` into nodes in the provided `Tree` arena.
    /// Returns the `NodeId` of the created node in the arena.
    ///
    /// Children are converted before the parent is named, so internal nodes
    /// without a label are numbered in the order their closing parentheses appear.
    fn to_tree(self, tree: &mut Tree, conv: &mut Conversion) -> Result<NodeId, TreeError> {
        let id = tree.add_node();
        if self.children.len() > 2 {
            return Err(TreeError::NotBinary {
                node: self.name.unwrap_or_else(|| "(unnamed)".to_string()),
                children: self.children.len(),
            });
        }

        let is_leaf = self.children.is_empty();
        for child in self.children {
            let child_id = child.to_tree(tree, conv)?;
            tree.add_child(id, child_id)?;
        }

        let name = match self.name {
            Some(name) => name,
            None if is_leaf => {
                return Err(TreeError::Topology("Leaf node without a name".to_string()))
            }
            None => {
                conv.unnamed += 1;
                format!("IN{}", conv.unnamed)
            }
        };

        if self.ancestor {
            if conv.ancestor.is_some() {
                return Err(TreeError::Topology(
                    "More than one ancestral marker '@'".to_string(),
                ));
            }
            conv.ancestor = Some(id);
        }

        if let Some(node) = tree.get_node_mut(id) {
            node.set_name(name);
            node.length = self.length;
        }
        Ok(id)
    }
}

// ================================================================================================
// Parsers
// ================================================================================================

// 1. Whitespace eater
// This parser wraps another parser and ignores surrounding whitespace (spaces, tabs, newlines).
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// 2. Label
// Parses a node label/name.
// Supports:
// - Unquoted strings (stops at reserved chars: "():;,[]@")
// - Single quoted strings ('example name') - internal single quotes can be escaped as ''
// - Double quoted strings ("example name") - internal double quotes can be escaped as ""
fn parse_label(input: &str) -> IResult<&str, String, DetailedError<'_>> {
    let unquoted = map(
        take_while(|c: char| !"():;,[]@".contains(c)),
        |s: &str| s.trim().to_string(),
    );

    let single_quoted = delimited(
        char('\''),
        map(is_not("'"), |s: &str| s.replace("''", "'")),
        char('\''),
    );

    let double_quoted = delimited(
        char('"'),
        map(is_not("\""), |s: &str| s.replace("\"\"", "\"")),
        char('"'),
    );

    context("label", alt((single_quoted, double_quoted, unquoted))).parse(input)
}

// 3. Length
// Parses the branch length, which follows a colon (e.g., ":0.123").
// Supports standard floating point formats including scientific notation.
fn parse_length(input: &str) -> IResult<&str, f64, DetailedError<'_>> {
    context(
        "length",
        preceded(
            ws(char(':')),
            // `cut` stops backtracking once a ':' was seen
            cut(map_res(
                recognize((
                    opt(char('-')),
                    // `1.`, `1.5` and `.5`
                    alt((
                        recognize((digit1, opt((char('.'), digit0)))),
                        recognize((char('.'), digit1)),
                    )),
                    opt((
                        alt((char('e'), char('E'))),
                        opt(alt((char('+'), char('-')))),
                        digit1,
                    )),
                )),
                |s: &str| s.parse::<f64>(),
            )),
        ),
    )
    .parse(input)
}

// 4. Node body
// (child1:len, child2:len)@Label
// The `@` ancestral marker is only accepted right after a closing parenthesis.
fn parse_body(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    let (input, children) = context(
        "children",
        opt(delimited(
            ws(char('(')),
            separated_list1(ws(char(',')), parse_child),
            context("closing parenthesis", cut(ws(char(')')))),
        )),
    )
    .parse(input)?;

    let (input, ancestor) = if children.is_some() {
        map(opt(ws(char('@'))), |m| m.is_some()).parse(input)?
    } else {
        (input, false)
    };

    let (input, label) = opt(parse_label).parse(input)?;

    let mut node = ParsedNode::new();
    if let Some(c) = children {
        node.children = c;
    }
    if let Some(l) = label {
        if !l.is_empty() {
            node.name = Some(l);
        }
    }
    node.ancestor = ancestor;

    Ok((input, node))
}

// 5. Child subtree
// Every node below the root must carry a branch length.
fn parse_child(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    let (input, mut node) = parse_body(input)?;
    let (input, length) = context("branch length", cut(parse_length)).parse(input)?;
    node.length = Some(length);
    Ok((input, node))
}

// 6. Root subtree, the length is optional
fn parse_root(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    let (input, mut node) = parse_body(input)?;
    let (input, length) = opt(parse_length).parse(input)?;
    node.length = length;
    Ok((input, node))
}

// ================================================================================================
// Entry Points
// ================================================================================================

/// Parses a single Newick tree string with an optional `@` ancestral marker.
/// Expects the tree to end with a semicolon ';'.
///
/// Without a marker, the structural root is taken as the ancestor.
pub fn parse_newick(input: &str) -> Result<Tree, TreeError> {
    let mut parser = (ws(parse_root), context("terminator", ws(char(';'))));

    match parser.parse(input) {
        Ok((_, (root_node, _))) => {
            let mut tree = Tree::new();
            let mut conv = Conversion::default();
            let root_id = root_node.to_tree(&mut tree, &mut conv)?;
            tree.set_root(root_id);
            match conv.ancestor {
                Some(id) => tree.set_ancestor(id),
                None => {
                    log::warn!("No ancestral marker '@' in the tree, using the root");
                    tree.set_ancestor(root_id);
                }
            }
            Ok(tree)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_tree_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(TreeError::ParseError {
            message: "Incomplete input".to_string(),
            line: 0,
            column: 0,
            snippet: "".to_string(),
        }),
    }
}

// Helper to convert nom errors into friendly TreeError
fn make_tree_error(input: &str, e: DetailedError) -> TreeError {
    let remaining = e.errors.first().map(|(r, _)| *r).unwrap_or(input);
    let offset = input.offset(remaining);

    // Calculate line/col
    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    let mut msg = String::new();
    for (_, kind) in e.errors.iter().rev() {
        match kind {
            DetailedErrorKind::Context(ctx) => {
                msg.push_str(&format!("while parsing {}:\n", ctx));
            }
            DetailedErrorKind::Nom(k) => {
                msg.push_str(&format!("  error: {:?}\n", k));
            }
        }
    }

    TreeError::ParseError {
        message: msg,
        line,
        column,
        snippet: remaining.chars().take(50).collect(),
    }
}

impl Tree {
    /// Parse a Newick string into a Tree.
    ///
    /// # Example
    /// ```
    /// use ancar::libs::phylo::tree::Tree;
    ///
    /// let tree = Tree::from_newick("(A:0.1,(B:0.2,C:0.3)@:0.05);").unwrap();
    /// assert_eq!(tree.len(), 5);
    ///
    /// let anc = tree.get_ancestor().unwrap();
    /// assert_eq!(tree.get_node(anc).unwrap().name.as_deref(), Some("IN1"));
    ///
    /// // Error handling
    /// assert!(Tree::from_newick("(A,B:invalid)C;").is_err());
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, TreeError> {
        parse_newick(input)
    }

    /// Read the tree from a file, which may span several lines.
    pub fn from_file(infile: &str) -> anyhow::Result<Self> {
        use std::io::Read;

        let mut reader = crate::reader(infile)?;
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        if content.trim().is_empty() {
            return Err(anyhow::anyhow!("No tree found in {}", infile));
        }

        Tree::from_newick(&content).map_err(|e| anyhow::anyhow!("Bad tree in {}: {}", infile, e))
    }
}

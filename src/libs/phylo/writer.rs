use super::node::NodeId;
use super::tree::Tree;

/// Serialize the tree to a Newick string (compact format).
/// The ancestral node carries the `@` marker when it is an internal node,
/// so the output parses back to the same tree.
///
/// # Example
/// ```
/// use ancar::libs::phylo::tree::Tree;
/// use ancar::libs::phylo::writer;
/// let tree = Tree::from_newick("(A:0.1,(B:0.2,C:0.3)@:0.05);").unwrap();
/// assert_eq!(writer::write_newick(&tree), "(A:0.1,(B:0.2,C:0.3)@IN1:0.05)IN2;");
/// ```
pub fn write_newick(tree: &Tree) -> String {
    write_newick_with_format(tree, "")
}

/// Serialize the tree to a Newick string with optional indentation.
///
/// # Arguments
/// * `indent` - The string to use for indentation (e.g., "  ", "\t").
///              If empty, output will be compact (no whitespace).
pub fn write_newick_with_format(tree: &Tree, indent: &str) -> String {
    if let Some(root) = tree.get_root() {
        let mut s = to_newick_recursive(tree, root, indent, 0);
        s.push(';');
        s
    } else {
        ";".to_string()
    }
}

fn to_newick_recursive(tree: &Tree, node_id: NodeId, indent: &str, depth: usize) -> String {
    let node = match tree.get_node(node_id) {
        Some(node) => node,
        None => return String::new(),
    };
    let is_pretty = !indent.is_empty();

    let my_indent = if is_pretty {
        indent.repeat(depth)
    } else {
        String::new()
    };

    // Format node info: Label + Length
    let mut node_info = String::new();

    if let Some(name) = &node.name {
        node_info.push_str(&quote_label(name));
    }

    if let Some(len) = node.length {
        node_info.push_str(&format!(":{}", len));
    }

    if node.children.is_empty() {
        format!("{}{}", my_indent, node_info)
    } else {
        let marker = if tree.get_ancestor() == Some(node_id) {
            "@"
        } else {
            ""
        };
        let children_strs: Vec<String> = node
            .children
            .iter()
            .map(|&child| to_newick_recursive(tree, child, indent, depth + 1))
            .collect();

        if is_pretty {
            format!(
                "{}(\n{}\n{}){}{}",
                my_indent,
                children_strs.join(",\n"),
                my_indent,
                marker,
                node_info
            )
        } else {
            format!("({}){}{}", children_strs.join(","), marker, node_info)
        }
    }
}

/// Quote a label if it contains reserved characters.
fn quote_label(label: &str) -> String {
    if label.chars().any(|c| "():;,[]@' \t".contains(c)) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

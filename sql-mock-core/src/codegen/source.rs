//! Line-oriented source tree shared by the generators.

const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Line(String),
    Blank,
    /// Lines nested one level deeper than their parent.
    Indent(Vec<Node>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    nodes: Vec<Node>,
}

impl Source {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.nodes.push(Node::Line(line.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.nodes.push(Node::Blank);
        self
    }

    pub fn indent(&mut self, body: Source) -> &mut Self {
        self.nodes.push(Node::Indent(body.nodes));
        self
    }

    pub fn render(&self) -> String {
        self.render_with_indent(INDENT)
    }

    pub fn render_with_indent(&self, indent: &str) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, indent, 0, &mut out);
        out
    }
}

fn render_nodes(nodes: &[Node], indent: &str, depth: usize, out: &mut String) {
    for node in nodes {
        match node {
            Node::Line(line) => {
                out.push_str(&indent.repeat(depth));
                out.push_str(line);
                out.push('\n');
            }
            Node::Blank => out.push('\n'),
            Node::Indent(body) => render_nodes(body, indent, depth + 1, out),
        }
    }
}

//! Rendered output of components.
use std::fmt;

/// A node of rendered markup: an element with attributes and children, or
/// some text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Html {
    Element {
        tag: &'static str,
        attributes: Vec<(&'static str, String)>,
        children: Vec<Html>,
    },
    Text(String),
}

impl Html {
    pub fn element(tag: &'static str) -> Self {
        Html::Element {
            tag,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Html::Text(text.into())
    }

    /// Adds an attribute. Has no effect on text nodes.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Html::Element { attributes, .. } = &mut self {
            attributes.push((name, value.into()));
        }
        self
    }

    /// Appends a child. Has no effect on text nodes.
    pub fn child(mut self, child: Html) -> Self {
        if let Html::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Returns the first element with the given tag, depth first, starting
    /// with this node.
    pub fn find(&self, name: &str) -> Option<&Html> {
        match self {
            Html::Element { tag, children, .. } => {
                if *tag == name {
                    Some(self)
                } else {
                    children.iter().find_map(|child| child.find(name))
                }
            }
            Html::Text(_) => None,
        }
    }

    /// Concatenation of all the text below this node.
    pub fn text_content(&self) -> String {
        match self {
            Html::Element { children, .. } => {
                children.iter().map(|child| child.text_content()).collect()
            }
            Html::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for Html {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Html::Element {
                tag,
                attributes,
                children,
            } => {
                write!(fmt, "<{tag}")?;
                for (name, value) in attributes {
                    write!(fmt, " {name}=\"{}\"", escape(value))?;
                }
                write!(fmt, ">")?;
                for child in children {
                    write!(fmt, "{child}")?;
                }
                write!(fmt, "</{tag}>")
            }
            Html::Text(text) => write!(fmt, "{}", escape(text)),
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

//! CSS selector subset for the headless document.
//!
//! Supports what the control's selector tables use: type, `.class`, `#id`,
//! `*`, attribute filters (`[a]`, `[a=v]`, `[a*=v]`, `[a^=v]`, `[a$=v]`,
//! `[a~=v]`), the descendant combinator, and comma-separated lists.

use slotmap::SlotMap;

use super::{Node, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Contains,
    Prefix,
    Suffix,
    Word,
}

#[derive(Clone, Debug, PartialEq)]
struct AttrFilter {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrFilter {
    fn matches(&self, node: &Node) -> bool {
        let Some(actual) = node.attribute(&self.name) else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::Word => actual.split_whitespace().any(|word| word == self.value),
        }
    }
}

/// A compound selector such as `button.view-action[aria-label*="x"]`
#[derive(Clone, Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrFilter>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class| node.classes.iter().any(|c| c == class))
            && self.attrs.iter().all(|filter| filter.matches(node))
    }
}

/// A parsed, comma-separated selector list
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SelectorList {
    /// Each entry is a chain of compounds joined by descendant combinators
    selectors: Vec<Vec<Compound>>,
}

impl SelectorList {
    pub(crate) fn parse(input: &str) -> Result<Self, String> {
        let mut selectors = Vec::new();
        let mut chain: Vec<Compound> = Vec::new();
        let mut current = Compound::default();
        let mut universal = false;
        let mut chars = input.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                c if c.is_whitespace() => {
                    if !current.is_empty() || universal {
                        chain.push(std::mem::take(&mut current));
                        universal = false;
                    }
                }
                ',' => {
                    if !current.is_empty() || universal {
                        chain.push(std::mem::take(&mut current));
                        universal = false;
                    }
                    if chain.is_empty() {
                        return Err(format!("empty selector in `{input}`"));
                    }
                    selectors.push(std::mem::take(&mut chain));
                }
                '*' => universal = true,
                '.' => current.classes.push(read_ident(&mut chars, input)?),
                '#' => current.attrs.push(AttrFilter {
                    name: "id".to_string(),
                    op: AttrOp::Equals,
                    value: read_ident(&mut chars, input)?,
                }),
                '[' => current.attrs.push(read_attr(&mut chars, input)?),
                c if is_ident_char(c) => {
                    let mut tag = String::from(c);
                    tag.push_str(&read_ident_tail(&mut chars));
                    current.tag = Some(tag);
                }
                other => return Err(format!("unsupported `{other}` in `{input}`")),
            }
        }

        if !current.is_empty() || universal {
            chain.push(current);
        }
        if chain.is_empty() {
            return Err(format!("empty selector in `{input}`"));
        }
        selectors.push(chain);

        Ok(Self { selectors })
    }

    pub(crate) fn matches(&self, nodes: &SlotMap<NodeId, Node>, id: NodeId) -> bool {
        let Some(node) = nodes.get(id) else {
            return false;
        };
        self.selectors.iter().any(|chain| {
            let Some((last, rest)) = chain.split_last() else {
                return false;
            };
            last.matches(node) && matches_ancestors(rest, nodes, node.parent)
        })
    }
}

fn matches_ancestors(
    chain: &[Compound],
    nodes: &SlotMap<NodeId, Node>,
    mut cursor: Option<NodeId>,
) -> bool {
    let Some((last, rest)) = chain.split_last() else {
        return true;
    };
    while let Some(id) = cursor {
        let Some(node) = nodes.get(id) else {
            return false;
        };
        if last.matches(node) && matches_ancestors(rest, nodes, node.parent) {
            return true;
        }
        cursor = node.parent;
    }
    false
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident_tail(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

fn read_ident(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    input: &str,
) -> Result<String, String> {
    let ident = read_ident_tail(chars);
    if ident.is_empty() {
        return Err(format!("expected identifier in `{input}`"));
    }
    Ok(ident)
}

fn read_attr(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    input: &str,
) -> Result<AttrFilter, String> {
    let mut body = String::new();
    let mut quote: Option<char> = None;
    loop {
        let Some(c) = chars.next() else {
            return Err(format!("unterminated attribute filter in `{input}`"));
        };
        match (quote, c) {
            (None, ']') => break,
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
        body.push(c);
    }

    let operators = [
        ("*=", AttrOp::Contains),
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("~=", AttrOp::Word),
        ("=", AttrOp::Equals),
    ];
    for (token, op) in operators {
        if let Some((name, value)) = body.split_once(token) {
            let name = name.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(format!("bad attribute name in `{input}`"));
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            return Ok(AttrFilter {
                name: name.to_string(),
                op,
                value: value.to_string(),
            });
        }
    }

    let name = body.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(format!("bad attribute name in `{input}`"));
    }
    Ok(AttrFilter {
        name: name.to_string(),
        op: AttrOp::Exists,
        value: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_companion_selector() {
        let list =
            SelectorList::parse(r#".view-actions .view-action[aria-label*="Current view"]"#)
                .unwrap();
        assert_eq!(list.selectors.len(), 1);

        let chain = &list.selectors[0];
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].classes, vec!["view-actions"]);
        assert_eq!(chain[1].classes, vec!["view-action"]);
        assert_eq!(
            chain[1].attrs,
            vec![AttrFilter {
                name: "aria-label".to_string(),
                op: AttrOp::Contains,
                value: "Current view".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_list_and_tags() {
        let list = SelectorList::parse("button.clickable-icon, .mobile-toolbar svg").unwrap();
        assert_eq!(list.selectors.len(), 2);
        assert_eq!(list.selectors[0][0].tag.as_deref(), Some("button"));
        assert_eq!(list.selectors[1][1].tag.as_deref(), Some("svg"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse(".a > .b").is_err());
        assert!(SelectorList::parse("[aria-label").is_err());
        assert!(SelectorList::parse(".").is_err());
    }
}

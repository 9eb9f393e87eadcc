use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::model::cache::ElementCache;

/// Element categories in a CIT.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Scope,
    Variable,
    Import,
}

/// Scope flavors. A file root is itself a scope with the `Blob` ilk.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ilk {
    Blob,
    Function,
    Class,
    Interface,
}

impl Ilk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ilk::Blob => "blob",
            Ilk::Function => "function",
            Ilk::Class => "class",
            Ilk::Interface => "interface",
        }
    }
}

/// Element attributes as the PHP parser emits them. Absence of
/// public/protected/private means public. `NotYetDefined` marks a variable
/// the parser created before its type assignment was seen.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Public,
    Protected,
    Private,
    Static,
    #[serde(rename = "__not_yet_defined__")]
    NotYetDefined,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Public => "public",
            Attribute::Protected => "protected",
            Attribute::Private => "private",
            Attribute::Static => "static",
            Attribute::NotYetDefined => "__not_yet_defined__",
        }
    }

    /// Parse a space-delimited attribute list. Unknown words are dropped.
    pub fn parse_list(s: &str) -> Vec<Attribute> {
        s.split_whitespace()
            .filter_map(|word| match word {
                "public" => Some(Attribute::Public),
                "protected" => Some(Attribute::Protected),
                "private" => Some(Attribute::Private),
                "static" => Some(Attribute::Static),
                "__not_yet_defined__" => Some(Attribute::NotYetDefined),
                _ => None,
            })
            .collect()
    }
}

/// A node in a CIT: a scope (blob, function, class, interface), a variable,
/// or an import directive. Children are kept in declaration order; name
/// lookups go through the per-element cache. Identity is pointer identity
/// (`Rc::ptr_eq`), matching the tree's read-shared ownership model.
#[derive(Debug, Serialize, Deserialize)]
pub struct Element {
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ilk: Option<Ilk>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Calltip signature, verbatim from the parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Declared or inferred type of a variable, as a CITDL expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citdl: Option<String>,
    /// Return type of a function, as a CITDL expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    /// Superclass names of a class, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classrefs: Vec<String>,
    /// Import module spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Named import symbol, or `*`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Import rename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Rc<Element>>,
    #[serde(skip)]
    pub(crate) cache: RefCell<ElementCache>,
}

impl Element {
    fn new(tag: Tag, ilk: Option<Ilk>, name: impl Into<String>) -> Self {
        Self {
            tag,
            ilk,
            name: name.into(),
            attributes: vec![],
            signature: None,
            doc: None,
            citdl: None,
            returns: None,
            classrefs: vec![],
            module: None,
            symbol: None,
            alias: None,
            children: vec![],
            cache: RefCell::new(ElementCache::default()),
        }
    }

    pub fn blob(name: impl Into<String>) -> Self {
        Self::new(Tag::Scope, Some(Ilk::Blob), name)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(Tag::Scope, Some(Ilk::Function), name)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(Tag::Scope, Some(Ilk::Class), name)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(Tag::Scope, Some(Ilk::Interface), name)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(Tag::Variable, None, name)
    }

    pub fn import(module: impl Into<String>) -> Self {
        let mut elem = Self::new(Tag::Import, None, "");
        elem.module = Some(module.into());
        elem
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_citdl(mut self, citdl: impl Into<String>) -> Self {
        self.citdl = Some(citdl.into());
        self
    }

    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = Some(returns.into());
        self
    }

    pub fn with_classrefs(mut self, classrefs: Vec<String>) -> Self {
        self.classrefs = classrefs;
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Rc::new(child));
        self
    }

    pub fn has_attribute(&self, attr: Attribute) -> bool {
        self.attributes.contains(&attr)
    }

    pub fn not_yet_defined(&self) -> bool {
        self.has_attribute(Attribute::NotYetDefined)
    }

    pub fn is_class(&self) -> bool {
        self.ilk == Some(Ilk::Class)
    }

    pub fn is_blob(&self) -> bool {
        self.ilk == Some(Ilk::Blob)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Tag::Scope => {
                let ilk = self.ilk.map(|i| i.as_str()).unwrap_or("scope");
                write!(f, "<{} '{}'>", ilk, self.name)
            }
            Tag::Variable => write!(f, "<variable '{}'>", self.name),
            Tag::Import => {
                write!(f, "<import '{}'>", self.module.as_deref().unwrap_or(""))
            }
        }
    }
}

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{ChildKind, Element, Hit, Ilk, Tag};

/// The kind label attached to a completion item.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Blob,
    Class,
    Function,
    Interface,
    Module,
    Variable,
}

impl CompletionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionKind::Blob => "blob",
            CompletionKind::Class => "class",
            CompletionKind::Function => "function",
            CompletionKind::Interface => "interface",
            CompletionKind::Module => "module",
            CompletionKind::Variable => "variable",
        }
    }

    /// The ilk of a scope, or its tag otherwise.
    pub fn from_element(elem: &Element) -> CompletionKind {
        match (elem.tag, elem.ilk) {
            (_, Some(Ilk::Blob)) => CompletionKind::Blob,
            (_, Some(Ilk::Class)) => CompletionKind::Class,
            (_, Some(Ilk::Function)) => CompletionKind::Function,
            (_, Some(Ilk::Interface)) => CompletionKind::Interface,
            (Tag::Variable, None) => CompletionKind::Variable,
            (Tag::Import, None) => CompletionKind::Module,
            (Tag::Scope, None) => CompletionKind::Blob,
        }
    }
}

impl From<ChildKind> for CompletionKind {
    fn from(kind: ChildKind) -> Self {
        match kind {
            ChildKind::Variable => CompletionKind::Variable,
            ChildKind::Function => CompletionKind::Function,
            ChildKind::Class => CompletionKind::Class,
            ChildKind::Interface => CompletionKind::Interface,
        }
    }
}

/// One completion item. Ordered by (kind, name) so enumeration sets come
/// out sorted and de-duplicated.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub kind: CompletionKind,
    pub name: String,
}

impl Completion {
    pub fn new(kind: CompletionKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl Ord for Completion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .as_str()
            .cmp(other.kind.as_str())
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Completion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A definition location extracted from a hit: the owning blob and the
/// name path of the element within it, plus calltip material for the UI.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub kind: CompletionKind,
    pub blob: String,
    pub lpath: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl Definition {
    pub fn from_hit(hit: &Hit) -> Self {
        let mut lpath = hit.scope.lpath.clone();
        if lpath.last().map(String::as_str) != Some(hit.elem.name.as_str()) {
            lpath.push(hit.elem.name.clone());
        }
        Self {
            name: hit.elem.name.clone(),
            kind: CompletionKind::from_element(&hit.elem),
            blob: hit.scope.blob.name.clone(),
            lpath,
            signature: hit.elem.signature.clone(),
            doc: hit.elem.doc.clone(),
        }
    }
}

/// The evaluator's answer for one trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    Completions(Vec<Completion>),
    Calltips(Vec<String>),
    Definitions(Vec<Definition>),
}

impl Reply {
    pub fn is_empty(&self) -> bool {
        match self {
            Reply::Completions(items) => items.is_empty(),
            Reply::Calltips(items) => items.is_empty(),
            Reply::Definitions(items) => items.is_empty(),
        }
    }
}

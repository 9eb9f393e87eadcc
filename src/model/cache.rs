use std::collections::HashMap;
use std::rc::Rc;

use crate::model::element::{Element, Ilk, Tag};

/// Child filters used by membership enumeration and the completion surface.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChildKind {
    Variable,
    Function,
    Class,
    Interface,
}

impl ChildKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildKind::Variable => "variable",
            ChildKind::Function => "function",
            ChildKind::Class => "class",
            ChildKind::Interface => "interface",
        }
    }

    pub fn matches(&self, elem: &Element) -> bool {
        match self {
            ChildKind::Variable => elem.tag == Tag::Variable,
            ChildKind::Function => elem.tag == Tag::Scope && elem.ilk == Some(Ilk::Function),
            ChildKind::Class => elem.tag == Tag::Scope && elem.ilk == Some(Ilk::Class),
            ChildKind::Interface => elem.tag == Tag::Scope && elem.ilk == Some(Ilk::Interface),
        }
    }
}

/// Prefix to full-name lists, used to serve completions under a minimum
/// trigger length.
pub type ShortNameIndex = HashMap<String, Vec<String>>;

/// Build a short-name index over `names`. Keys are the first `length`
/// characters of each name; value lists are sorted.
pub fn make_short_name_index(names: &[String], length: usize) -> ShortNameIndex {
    let mut index = ShortNameIndex::new();
    for name in names {
        let key: String = name.chars().take(length).collect();
        index.entry(key).or_default().push(name.clone());
    }
    for values in index.values_mut() {
        values.sort();
    }
    index
}

/// Memoized per-element views. Entries are computed on first access and
/// never invalidated; the element tree is immutable once parsed. Lookups
/// are keyed by a fixed vocabulary (`ChildKind` plus the short-name
/// length), so growth is bounded. Single-threaded interior mutability; a
/// parallel host must guard this per blob.
#[derive(Debug, Default)]
pub struct ElementCache {
    by_name: Option<Rc<HashMap<String, usize>>>,
    names: HashMap<ChildKind, Rc<Vec<String>>>,
    short_names: HashMap<(ChildKind, usize), Rc<ShortNameIndex>>,
}

impl Element {
    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<Rc<Element>> {
        let index = {
            let mut cache = self.cache.borrow_mut();
            if cache.by_name.is_none() {
                let mut by_name = HashMap::with_capacity(self.children.len());
                for (i, child) in self.children.iter().enumerate() {
                    by_name.entry(child.name.clone()).or_insert(i);
                }
                cache.by_name = Some(Rc::new(by_name));
            }
            Rc::clone(cache.by_name.as_ref().unwrap())
        };
        index.get(name).map(|&i| Rc::clone(&self.children[i]))
    }

    /// Names of direct children matching `kind`, in declaration order.
    pub fn child_names(&self, kind: ChildKind) -> Rc<Vec<String>> {
        if let Some(names) = self.cache.borrow().names.get(&kind) {
            return Rc::clone(names);
        }
        let names: Rc<Vec<String>> = Rc::new(
            self.children
                .iter()
                .filter(|child| kind.matches(child))
                .map(|child| child.name.clone())
                .collect(),
        );
        self.cache
            .borrow_mut()
            .names
            .insert(kind, Rc::clone(&names));
        names
    }

    /// Short-name index over the `kind` children, keyed by `length`-char
    /// prefixes.
    pub fn short_names(&self, kind: ChildKind, length: usize) -> Rc<ShortNameIndex> {
        if let Some(index) = self.cache.borrow().short_names.get(&(kind, length)) {
            return Rc::clone(index);
        }
        let names = self.child_names(kind);
        let index = Rc::new(make_short_name_index(&names, length));
        self.cache
            .borrow_mut()
            .short_names
            .insert((kind, length), Rc::clone(&index));
        index
    }
}

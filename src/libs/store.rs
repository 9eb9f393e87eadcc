use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::errors::{EvalError, Result};
use crate::eval::reply::Completion;
use crate::libs::{Controller, ImportHandler, Library};
use crate::model::{ChildKind, Element, Hit, ScopeRef};

/// Descend `blob` along `lpath`. The hit's scope is the path of the
/// containing element, so follow-up getattrs start from the right place.
fn hit_in_blob(blob: &Rc<Element>, lpath: &[String]) -> Option<Hit> {
    if lpath.is_empty() {
        return None;
    }
    let mut elem = Rc::clone(blob);
    for name in lpath {
        elem = elem.child(name)?;
    }
    let scope = ScopeRef::new(Rc::clone(blob), lpath[..lpath.len() - 1].to_vec());
    Some(Hit::new(elem, scope))
}

fn completions_in_blob(
    blob: &Element,
    prefix: Option<&str>,
    kind: ChildKind,
    out: &mut Vec<Completion>,
) {
    for name in blob.child_names(kind).iter() {
        if let Some(prefix) = prefix {
            if !name.starts_with(prefix) {
                continue;
            }
        }
        out.push(Completion::new(kind.into(), name.clone()));
    }
}

/// The standard library: a single pre-parsed blob of builtins, exposed
/// both as a library and directly as the terminal scope of the outward
/// scope walk.
pub struct Stdlib {
    blob: Rc<Element>,
}

impl Stdlib {
    pub fn new(blob: Rc<Element>) -> Self {
        Self { blob }
    }

    /// An empty stdlib, for embedders that do not ship builtins.
    pub fn empty() -> Self {
        Self::new(Rc::new(Element::blob("*")))
    }

    pub fn blob(&self) -> &Rc<Element> {
        &self.blob
    }
}

impl Library for Stdlib {
    fn name(&self) -> &str {
        "stdlib"
    }

    fn toplevel_completions(&self, prefix: Option<&str>, kind: ChildKind) -> Vec<Completion> {
        let mut out = Vec::new();
        completions_in_blob(&self.blob, prefix, kind, &mut out);
        out
    }

    fn hits_from_lpath(
        &self,
        lpath: &[String],
        ctlr: &dyn Controller,
        _current_blob: &Rc<Element>,
    ) -> Vec<Hit> {
        if ctlr.is_cancelled() {
            return Vec::new();
        }
        hit_in_blob(&self.blob, lpath).into_iter().collect()
    }
}

/// An in-memory federation member and import handler over a set of parsed
/// blobs. Blobs are looked up by module spec for imports and swept in
/// insertion order for lpath hits.
pub struct BlobStore {
    name: String,
    blobs: Vec<Rc<Element>>,
    by_module: HashMap<String, usize>,
}

impl BlobStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blobs: Vec::new(),
            by_module: HashMap::new(),
        }
    }

    /// Add a blob, registered under its own name as the module spec.
    pub fn add_blob(&mut self, blob: Rc<Element>) {
        self.by_module.insert(blob.name.clone(), self.blobs.len());
        self.blobs.push(blob);
    }

    /// Register an extra module spec for an already-added blob.
    pub fn alias_module(&mut self, module: impl Into<String>, blob_name: &str) -> bool {
        match self.blobs.iter().position(|b| b.name == blob_name) {
            Some(idx) => {
                self.by_module.insert(module.into(), idx);
                true
            }
            None => false,
        }
    }

    pub fn blob(&self, name: &str) -> Option<Rc<Element>> {
        self.blobs.iter().find(|b| b.name == name).map(Rc::clone)
    }
}

impl Library for BlobStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn toplevel_completions(&self, prefix: Option<&str>, kind: ChildKind) -> Vec<Completion> {
        let mut out = Vec::new();
        for blob in &self.blobs {
            completions_in_blob(blob, prefix, kind, &mut out);
        }
        out
    }

    fn hits_from_lpath(
        &self,
        lpath: &[String],
        ctlr: &dyn Controller,
        current_blob: &Rc<Element>,
    ) -> Vec<Hit> {
        let mut hits = Vec::new();
        for blob in &self.blobs {
            if ctlr.is_cancelled() {
                break;
            }
            // The current buffer's own tree is searched directly by the
            // scope walk.
            if Rc::ptr_eq(blob, current_blob) {
                continue;
            }
            if let Some(hit) = hit_in_blob(blob, lpath) {
                hits.push(hit);
            }
        }
        hits
    }
}

impl ImportHandler for BlobStore {
    fn import_blob(&self, module: &str, _ctlr: &dyn Controller) -> Result<Rc<Element>> {
        match self.by_module.get(module) {
            Some(&idx) => Ok(Rc::clone(&self.blobs[idx])),
            None => {
                debug!("no blob registered for module spec '{module}'");
                Err(EvalError::ImportFailed(module.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::NullController;

    fn pkg_blob() -> Rc<Element> {
        Rc::new(
            Element::blob("pkglib").with_child(
                Element::class("Pkg")
                    .with_child(Element::class("Sub").with_child(Element::function("f"))),
            ),
        )
    }

    #[test]
    fn test_hits_from_lpath_descends_and_scopes() {
        let mut store = BlobStore::new("workspace");
        store.add_blob(pkg_blob());
        let current = Rc::new(Element::blob("buf"));
        let lpath: Vec<String> = ["Pkg", "Sub", "f"].iter().map(|s| s.to_string()).collect();
        let hits = store.hits_from_lpath(&lpath, &NullController, &current);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].elem.name, "f");
        assert_eq!(hits[0].scope.lpath, vec!["Pkg", "Sub"]);
        assert_eq!(hits[0].scope.blob.name, "pkglib");
    }

    #[test]
    fn test_hits_skip_the_current_buffer() {
        let blob = pkg_blob();
        let mut store = BlobStore::new("workspace");
        store.add_blob(Rc::clone(&blob));
        let lpath: Vec<String> = ["Pkg"].iter().map(|s| s.to_string()).collect();
        let hits = store.hits_from_lpath(&lpath, &NullController, &blob);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_import_blob_by_module_spec() {
        let mut store = BlobStore::new("workspace");
        store.add_blob(pkg_blob());
        assert!(store.alias_module("/include/pkglib", "pkglib"));
        let blob = store
            .import_blob("/include/pkglib", &NullController)
            .unwrap();
        assert_eq!(blob.name, "pkglib");
        assert!(store.import_blob("missing.php", &NullController).is_err());
    }

    #[test]
    fn test_stdlib_toplevel_completions_filter_by_prefix() {
        let stdlib = Stdlib::new(Rc::new(
            Element::blob("*")
                .with_child(Element::function("strpos"))
                .with_child(Element::function("strlen"))
                .with_child(Element::function("array_map")),
        ));
        let mut names: Vec<String> = stdlib
            .toplevel_completions(Some("str"), ChildKind::Function)
            .into_iter()
            .map(|c| c.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["strlen", "strpos"]);
    }
}

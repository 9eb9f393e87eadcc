use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use log::{debug, trace};

use crate::errors::Result;
use crate::eval::evaluator::Evaluator;
use crate::eval::reply::Completion;
use crate::libs::{ImportHandler, Library};
use crate::model::{ChildKind, Element, ScopeRef, Tag};

/// Where an enumeration draws its names from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ScopeSource {
    Locals,
    Globals,
    Builtins,
    Imports,
}

fn prefix_of(expr: &str, len: usize) -> String {
    expr.chars().take(len).collect()
}

impl Evaluator<'_> {
    /// Variable names visible from `scoperef` that start with the typed
    /// prefix.
    pub(crate) fn variables_from_scope(
        &self,
        expr: &str,
        scoperef: &ScopeRef,
    ) -> Result<Vec<Completion>> {
        // The current scope determines what is visible: inside a function
        // or class body globals are not in scope.
        let sources: &[ScopeSource] = if scoperef.lpath.is_empty() {
            &[
                ScopeSource::Locals,
                ScopeSource::Globals,
                ScopeSource::Imports,
            ]
        } else {
            &[ScopeSource::Locals, ScopeSource::Builtins]
        };
        let names = self.names_from_scope(None, ChildKind::Variable, sources, scoperef)?;
        let key = prefix_of(expr, self.config.variable_trigger_len);
        Ok(names
            .into_iter()
            .filter(|c| c.name.starts_with(&key))
            .collect())
    }

    /// Function names, served through the short-name index.
    pub(crate) fn functions_from_scope(
        &self,
        expr: &str,
        scoperef: &ScopeRef,
    ) -> Result<Vec<Completion>> {
        let key = prefix_of(expr, self.config.function_trigger_len);
        self.names_from_scope(
            Some(&key),
            ChildKind::Function,
            &[
                ScopeSource::Locals,
                ScopeSource::Globals,
                ScopeSource::Imports,
            ],
            scoperef,
        )
    }

    pub(crate) fn classes_from_scope(&self, scoperef: &ScopeRef) -> Result<Vec<Completion>> {
        self.names_from_scope(
            None,
            ChildKind::Class,
            &[
                ScopeSource::Locals,
                ScopeSource::Globals,
                ScopeSource::Imports,
            ],
            scoperef,
        )
    }

    /// Interfaces are declared at the top level only, so locals are not
    /// consulted.
    pub(crate) fn interfaces_from_scope(
        &self,
        expr: &str,
        scoperef: &ScopeRef,
    ) -> Result<Vec<Completion>> {
        self.names_from_scope(
            Some(expr),
            ChildKind::Interface,
            &[ScopeSource::Globals, ScopeSource::Imports],
            scoperef,
        )
    }

    /// Gather `kind` names across the given sources, sorted and
    /// de-duplicated by (kind, name).
    fn names_from_scope(
        &self,
        prefix: Option<&str>,
        kind: ChildKind,
        sources: &[ScopeSource],
        scoperef: &ScopeRef,
    ) -> Result<Vec<Completion>> {
        trace!("{} names from {scoperef} via {sources:?}", kind.as_str());
        let buf = self.buf;
        let global_blob = Rc::clone(&scoperef.blob);
        let mut all: BTreeSet<Completion> = BTreeSet::new();
        for source in sources {
            let mut elems: Vec<Rc<Element>> = Vec::new();
            match source {
                ScopeSource::Locals => elems.push(scoperef.resolve()?),
                ScopeSource::Globals => elems.push(Rc::clone(&global_blob)),
                ScopeSource::Builtins => {
                    all.extend(buf.stdlib().toplevel_completions(prefix, kind));
                }
                ScopeSource::Imports => {
                    // Include everything any federation member indexes,
                    // then the blobs reachable through import directives.
                    for lib in buf.libs() {
                        all.extend(lib.toplevel_completions(prefix, kind));
                    }
                    elems.extend(self.all_import_blobs(&global_blob));
                }
            }
            for elem in elems {
                for name in self.names_from_elem(&elem, kind, prefix) {
                    all.insert(Completion::new(kind.into(), name));
                }
            }
        }
        Ok(all.into_iter().collect())
    }

    /// Matching child names of one element. Functions and variables go
    /// through the short-name index; classes and interfaces are listed in
    /// full.
    fn names_from_elem(&self, elem: &Element, kind: ChildKind, prefix: Option<&str>) -> Vec<String> {
        match (kind, prefix) {
            (ChildKind::Function, Some(key)) if !key.is_empty() => elem
                .short_names(kind, self.config.function_trigger_len)
                .get(key)
                .cloned()
                .unwrap_or_default(),
            (ChildKind::Variable, Some(key)) if !key.is_empty() => elem
                .short_names(kind, self.config.variable_trigger_len)
                .get(key)
                .cloned()
                .unwrap_or_default(),
            _ => elem.child_names(kind).to_vec(),
        }
    }

    /// All blobs reachable through the import directives of `elem`,
    /// transitively. Each module spec is loaded at most once.
    pub(crate) fn all_import_blobs(&self, elem: &Rc<Element>) -> Vec<Rc<Element>> {
        let mut seen = HashSet::new();
        let mut blobs = Vec::new();
        self.collect_import_blobs(elem, &mut seen, &mut blobs);
        blobs
    }

    fn collect_import_blobs(
        &self,
        elem: &Element,
        seen: &mut HashSet<String>,
        blobs: &mut Vec<Rc<Element>>,
    ) {
        for imp in elem.children.iter().filter(|c| c.tag == Tag::Import) {
            let Some(module) = imp.module.as_deref() else {
                continue;
            };
            if module.is_empty() || !seen.insert(module.to_string()) {
                trace!("already collected import '{module}'");
                continue;
            }
            match self.buf.imports().import_blob(module, self.ctlr) {
                Ok(blob) => {
                    blobs.push(Rc::clone(&blob));
                    // foo imports bar, bar imports baz: baz is visible too.
                    self.collect_import_blobs(&blob, seen, blobs);
                }
                Err(err) => {
                    debug!("skipping import '{module}' during enumeration: {err}");
                }
            }
        }
    }
}

use std::fmt;
use std::rc::Rc;

use crate::errors::{EvalError, Result};
use crate::model::element::Element;

/// A borrowed address into a CIT: the owning blob plus an ordered name
/// path descending from it. The empty path is the blob itself (the global
/// scope of that compilation unit).
#[derive(Clone)]
pub struct ScopeRef {
    pub blob: Rc<Element>,
    pub lpath: Vec<String>,
}

impl ScopeRef {
    pub fn new(blob: Rc<Element>, lpath: Vec<String>) -> Self {
        Self { blob, lpath }
    }

    /// The global scope of the same blob.
    pub fn global(&self) -> ScopeRef {
        ScopeRef::new(Rc::clone(&self.blob), Vec::new())
    }

    /// A reference one name deeper.
    pub fn join(&self, name: &str) -> ScopeRef {
        let mut lpath = self.lpath.clone();
        lpath.push(name.to_string());
        ScopeRef::new(Rc::clone(&self.blob), lpath)
    }

    /// The enclosing reference, dropping the trailing path segment.
    pub fn up(&self) -> ScopeRef {
        let mut lpath = self.lpath.clone();
        lpath.pop();
        ScopeRef::new(Rc::clone(&self.blob), lpath)
    }

    /// Walk the blob down the path to the referenced element.
    pub fn resolve(&self) -> Result<Rc<Element>> {
        let mut elem = Rc::clone(&self.blob);
        for name in &self.lpath {
            let child = elem
                .child(name)
                .ok_or_else(|| EvalError::NotFound(name.clone()))?;
            elem = child;
        }
        Ok(elem)
    }
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', [{}])", self.blob.name, self.lpath.join("."))
    }
}

/// The resolver's currency: a resolved element together with the scope it
/// was found in.
#[derive(Clone)]
pub struct Hit {
    pub elem: Rc<Element>,
    pub scope: ScopeRef,
}

impl Hit {
    pub fn new(elem: Rc<Element>, scope: ScopeRef) -> Self {
        Self { elem, scope }
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.elem, self.scope)
    }
}

// External collaborator seams - library federation, import handling,
// cancellation, and the buffer adapter the evaluator works against.

pub mod store;

use std::cell::Cell;
use std::rc::Rc;

use crate::errors::Result;
use crate::eval::reply::Completion;
use crate::model::{ChildKind, Element, Hit};

// Re-export main types for easy access
pub use store::{BlobStore, Stdlib};

/// Cancellation query for the request that owns this evaluation.
/// Cancellation is cooperative: the evaluator observes it between major
/// steps and abandons with an empty reply.
pub trait Controller {
    fn is_cancelled(&self) -> bool;
}

/// Controller for callers that never cancel.
pub struct NullController;

impl Controller for NullController {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Controller backed by a flag the owner can raise at any point.
#[derive(Default)]
pub struct FlagController {
    cancelled: Cell<bool>,
}

impl FlagController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }
}

impl Controller for FlagController {
    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// One member of the library federation: a set of indexed files the
/// evaluator can query for top-level completions and for hits on a dotted
/// name path.
pub trait Library {
    fn name(&self) -> &str;

    /// Top-level symbols of the given kind, optionally filtered by a name
    /// prefix.
    fn toplevel_completions(&self, prefix: Option<&str>, kind: ChildKind) -> Vec<Completion>;

    /// Hits for `lpath` across this library's files. `current_blob` is the
    /// buffer being evaluated, so a library indexing it can skip it.
    fn hits_from_lpath(
        &self,
        lpath: &[String],
        ctlr: &dyn Controller,
        current_blob: &Rc<Element>,
    ) -> Vec<Hit>;
}

/// Resolves an import module spec to a parsed blob.
pub trait ImportHandler {
    fn import_blob(&self, module: &str, ctlr: &dyn Controller) -> Result<Rc<Element>>;
}

/// The buffer adapter: the current buffer's blob plus the libraries and
/// import handler visible from it.
pub struct Buffer {
    blob: Rc<Element>,
    libs: Vec<Rc<dyn Library>>,
    stdlib: Rc<Stdlib>,
    imports: Rc<dyn ImportHandler>,
}

impl Buffer {
    pub fn new(blob: Rc<Element>, stdlib: Rc<Stdlib>, imports: Rc<dyn ImportHandler>) -> Self {
        Self {
            blob,
            libs: Vec::new(),
            stdlib,
            imports,
        }
    }

    pub fn with_lib(mut self, lib: Rc<dyn Library>) -> Self {
        self.libs.push(lib);
        self
    }

    pub fn add_lib(&mut self, lib: Rc<dyn Library>) {
        self.libs.push(lib);
    }

    pub fn blob(&self) -> &Rc<Element> {
        &self.blob
    }

    pub fn libs(&self) -> &[Rc<dyn Library>] {
        &self.libs
    }

    pub fn stdlib(&self) -> &Stdlib {
        &self.stdlib
    }

    pub fn stdlib_blob(&self) -> &Rc<Element> {
        self.stdlib.blob()
    }

    pub fn imports(&self) -> &dyn ImportHandler {
        self.imports.as_ref()
    }
}

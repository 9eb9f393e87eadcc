use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::{debug, trace};

use crate::citdl::{self, CALL_TOKEN};
use crate::config::EvalConfig;
use crate::errors::{EvalError, Result};
use crate::eval::reply::{Completion, Definition, Reply};
use crate::eval::trigger::{Trigger, TriggerKind};
use crate::libs::{Buffer, Controller, ImportHandler, Library};
use crate::model::{Element, Hit, Ilk, ScopeRef, Tag};

/// One evaluation of one trigger: resolves CITDL expressions against the
/// buffer's tree, its imports, and the library federation. Per-evaluation
/// state (the imported-blob set and the recursion counters) is born with
/// the evaluator and dies with its reply.
pub struct Evaluator<'a> {
    pub(crate) buf: &'a Buffer,
    pub(crate) ctlr: &'a dyn Controller,
    pub(crate) trg: Trigger,
    pub(crate) start_scope: ScopeRef,
    pub(crate) config: EvalConfig,
    imported_blobs: HashSet<String>,
    eval_counts: HashMap<String, u32>,
}

impl<'a> Evaluator<'a> {
    pub fn new(buf: &'a Buffer, ctlr: &'a dyn Controller, trg: Trigger, start_scope: ScopeRef) -> Self {
        Self {
            buf,
            ctlr,
            trg,
            start_scope,
            config: EvalConfig::default(),
            imported_blobs: HashSet::new(),
            eval_counts: HashMap::new(),
        }
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluate the trigger. Resolution failures become an empty reply;
    /// a broken scope reference or malformed tree propagates.
    pub fn run(mut self) -> Result<Reply> {
        debug!(
            "eval {} '{}' at {}",
            self.trg.kind, self.trg.expr, self.start_scope
        );
        match self.trg.kind {
            TriggerKind::Calltip => match self.eval_calltips() {
                Ok(calltips) => Ok(Reply::Calltips(calltips)),
                Err(err) if err.is_resolution_failure() => {
                    debug!("no calltips: {err}");
                    Ok(Reply::Calltips(Vec::new()))
                }
                Err(err) => Err(err),
            },
            TriggerKind::Defn => match self.eval_defns() {
                Ok(defns) => Ok(Reply::Definitions(defns)),
                Err(err) if err.is_resolution_failure() => {
                    debug!("no definition: {err}");
                    Ok(Reply::Definitions(Vec::new()))
                }
                Err(err) => Err(err),
            },
            _ => match self.eval_completions() {
                Ok(completions) => Ok(Reply::Completions(completions)),
                Err(err) if err.is_resolution_failure() => {
                    debug!("no completions: {err}");
                    Ok(Reply::Completions(Vec::new()))
                }
                Err(err) => Err(err),
            },
        }
    }

    /// Completion enumeration for the trigger kinds that produce one.
    pub fn eval_completions(&mut self) -> Result<Vec<Completion>> {
        if self.ctlr.is_cancelled() {
            return Ok(Vec::new());
        }
        let expr = self.trg.expr.clone();
        let scoperef = self.start_scope.clone();
        match self.trg.kind {
            TriggerKind::Variables => self.variables_from_scope(&expr, &scoperef),
            TriggerKind::Functions => self.functions_from_scope(&expr, &scoperef),
            TriggerKind::Classes => self.classes_from_scope(&scoperef),
            TriggerKind::Interfaces => self.interfaces_from_scope(&expr, &scoperef),
            TriggerKind::Members | TriggerKind::StaticMembers => {
                let hit = self.hit_from_citdl(&expr, scoperef, false)?;
                // Explicit visibility for parent accesses: protected is
                // reachable, private never crosses the class boundary.
                let (allow_protected, allow_private) =
                    if expr == "parent" || expr.starts_with("parent.") {
                        trace!("allowing protected parent members");
                        (Some(true), Some(false))
                    } else {
                        (None, None)
                    };
                let members = self.members_from_hit(&hit, allow_protected, allow_private)?;
                Ok(members.into_iter().collect())
            }
            TriggerKind::Calltip | TriggerKind::Defn => Err(EvalError::UnexpectedShape(format!(
                "trigger '{}' does not produce completions",
                self.trg.kind
            ))),
        }
    }

    /// Calltip strings for the expression, or nothing for the keywords
    /// that syntactically mimic calls.
    pub fn eval_calltips(&mut self) -> Result<Vec<String>> {
        if self.ctlr.is_cancelled() {
            return Ok(Vec::new());
        }
        let expr = self.trg.expr.clone();
        if crate::eval::calltips::IGNORED_CALLTIP_EXPRESSIONS.contains(&expr.as_str()) {
            trace!("ignored calltip expression '{expr}'");
            return Ok(Vec::new());
        }
        let scoperef = self.start_scope.clone();
        let hit = self.hit_from_citdl(&expr, scoperef, false)?;
        self.calltips_from_hit(&hit)
    }

    /// Definition records for the expression. The trailing variable hop is
    /// suppressed so a jump on a typed variable lands on the variable.
    pub fn eval_defns(&mut self) -> Result<Vec<Definition>> {
        if self.ctlr.is_cancelled() {
            return Ok(Vec::new());
        }
        let expr = self.trg.expr.clone();
        let scoperef = self.start_scope.clone();
        let hit = self.hit_from_citdl(&expr, scoperef, true)?;
        Ok(vec![Definition::from_hit(&hit)])
    }

    // ---- hit engine ----

    /// Resolve a CITDL expression starting at `scoperef` down to a
    /// non-import, non-variable hit (unless `defn_only`).
    pub(crate) fn hit_from_citdl(
        &mut self,
        expr: &str,
        scoperef: ScopeRef,
        defn_only: bool,
    ) -> Result<Hit> {
        let mut scoperef = scoperef;
        if self.check_recursion(expr) {
            // Most often a class variable shadowing the class's own name.
            // Retry from the parent scope rather than aborting outright.
            match self.parent_scope(&scoperef) {
                Some(parent) => {
                    debug!("recursion on '{expr}', retrying from parent scope {parent}");
                    scoperef = parent;
                }
                None => return Err(EvalError::Recursion(expr.to_string())),
            }
        }

        let tokens = citdl::tokenize(expr);
        trace!("hit_from_citdl: '{expr}' tokens {tokens:?} at {scoperef}");

        let (mut hit, nconsumed) = self
            .hit_from_first_part(&tokens, scoperef)?
            .ok_or_else(|| EvalError::UnresolvedFirstPart(expr.to_string()))?;

        let mut remaining = &tokens[nconsumed..];
        while !remaining.is_empty() {
            trace!("resolve {remaining:?} on {hit}");
            if remaining[0] == CALL_TOKEN {
                hit = self.hit_from_call(&hit)?;
                remaining = &remaining[1..];
            } else {
                let (next, nconsumed) = self.hit_from_getattr(remaining, &hit)?;
                hit = next;
                remaining = &remaining[nconsumed..];
            }
        }

        if hit.elem.tag == Tag::Variable && !defn_only {
            hit = self.hit_from_variable_type_inference(&hit)?;
        }

        if !self.accept_hit(&hit.elem) {
            return Err(EvalError::Unresolved(format!("'{expr}' (not yet defined)")));
        }
        debug!("hit_from_citdl: '{expr}' => {hit}");
        Ok(hit)
    }

    /// Seed the walk with the leading tokens. Returns the hit and the
    /// number of tokens consumed, or `None` when nothing in scope, the
    /// imports, or the federation matches.
    fn hit_from_first_part(
        &mut self,
        tokens: &[String],
        scoperef: ScopeRef,
    ) -> Result<Option<(Hit, usize)>> {
        let mut scoperef = scoperef;
        let mut tokens_vec: Vec<String>;
        let mut tokens = tokens;
        let first = tokens[0].as_str();

        if matches!(first, "this" | "self" | "parent") {
            trace!("first part: class accessor '{first}'");
            let mut elem = scoperef.resolve()?;
            while elem.ilk != Some(Ilk::Class) {
                if scoperef.lpath.is_empty() {
                    return Ok(None);
                }
                scoperef = scoperef.up();
                elem = scoperef.resolve()?;
            }
            if first == "parent" {
                let classref = match elem.classrefs.first() {
                    Some(classref) => classref.clone(),
                    None => return Ok(None),
                };
                trace!("first part: parent resolves via classref '{classref}'");
                tokens_vec = Vec::with_capacity(tokens.len());
                tokens_vec.push(classref);
                tokens_vec.extend(tokens[1..].iter().cloned());
                tokens = &tokens_vec;
                // The superclass name lives in the class hierarchy, not in
                // the current scope.
                scoperef = scoperef.global();
            } else if self.accept_hit(&elem) {
                return Ok(Some((Hit::new(elem, scoperef), 1)));
            }
        }

        let first = tokens[0].clone();
        loop {
            let elem = scoperef.resolve()?;
            if let Some(child) = elem.child(&first) {
                if self.accept_hit(&child) {
                    trace!("first part: '{first}' found at {scoperef}");
                    return Ok(Some((Hit::new(child, scoperef), 1)));
                }
            }
            if scoperef.lpath.is_empty() {
                // Global scope missed. Fall back to the imports and the
                // federation.
                let hit = self.hit_from_elem_imports(tokens, &elem)?;
                if let Some((hit, nconsumed)) = hit {
                    if self.accept_hit(&hit.elem) {
                        trace!(
                            "first part: '{}' imported",
                            citdl::join(&tokens[..nconsumed])
                        );
                        return Ok(Some((hit, nconsumed)));
                    }
                }
                return Ok(None);
            }
            // PHP visibility is two-level: the enclosing scope, then global.
            scoperef = scoperef.global();
        }
    }

    /// Try the imports declared on `elem`, then the include-everything
    /// federated lookup. Returns the hit and the number of tokens it
    /// consumed.
    pub(crate) fn hit_from_elem_imports(
        &mut self,
        tokens: &[String],
        elem: &Element,
    ) -> Result<Option<(Hit, usize)>> {
        let buf = self.buf;
        for imp in elem.children.iter().filter(|c| c.tag == Tag::Import) {
            let Some(module) = imp.module.as_deref() else {
                continue;
            };
            let mut candidates = vec![module.to_string()];
            // Absolute include paths frequently carry a base-directory
            // prefix; retry without it.
            if let Some(stripped) = module.strip_prefix('/') {
                candidates.push(stripped.to_string());
            }
            for module_name in candidates {
                if self.ctlr.is_cancelled() {
                    return Ok(None);
                }
                if self.imported_blobs.contains(&module_name) {
                    trace!("already imported '{module_name}'");
                    continue;
                }
                let blob = match buf.imports().import_blob(&module_name, self.ctlr) {
                    Ok(blob) => blob,
                    Err(err) => {
                        debug!("import failed, may not be ours: {err}");
                        continue;
                    }
                };
                self.imported_blobs.insert(module_name);
                let scope = ScopeRef::new(Rc::clone(&blob), Vec::new());
                match self.hit_from_getattr(tokens, &Hit::new(Rc::clone(&blob), scope)) {
                    Ok((hit, nconsumed)) => return Ok(Some((hit, nconsumed))),
                    Err(err) => {
                        debug!("getattr on imported blob '{}' missed: {err}", blob.name);
                    }
                }
            }
        }

        // Include-everything: any top-level symbol of any indexed file may
        // be visible. Longest prefix first.
        trace!("include-everything lookup for {tokens:?}");
        for nconsumed in (1..=tokens.len()).rev() {
            let lpath = &tokens[..nconsumed];
            for lib in buf.libs() {
                if self.ctlr.is_cancelled() {
                    return Ok(None);
                }
                for hit in lib.hits_from_lpath(lpath, self.ctlr, buf.blob()) {
                    let key = format!("{}#{}", hit.scope.blob.name, lpath.join("."));
                    if self.imported_blobs.contains(&key) {
                        trace!("already imported '{key}'");
                        continue;
                    }
                    self.imported_blobs.insert(key);
                    if self.accept_hit(&hit.elem) {
                        return Ok(Some((hit, nconsumed)));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Resolve `tokens[0]` as an attribute of the hit element. Multi-token
    /// consumption happens when a blob's imports match a longer prefix.
    pub(crate) fn hit_from_getattr(
        &mut self,
        tokens: &[String],
        hit: &Hit,
    ) -> Result<(Hit, usize)> {
        let first = tokens[0].clone();
        trace!("getattr: '{first}' on {hit}");

        let mut elem = Rc::clone(&hit.elem);
        let mut scoperef = hit.scope.clone();
        if elem.tag == Tag::Variable {
            let hopped = self.hit_from_variable_type_inference(&Hit::new(elem, scoperef))?;
            elem = hopped.elem;
            scoperef = hopped.scope;
        }
        if elem.tag != Tag::Scope {
            return Err(EvalError::UnexpectedShape(format!(
                "getattr target {elem} is not a scope"
            )));
        }

        match elem.ilk {
            Some(Ilk::Function) => {
                // Function internals do not resolve, and PHP functions
                // expose no attributes to completion.
            }
            Some(Ilk::Class) | Some(Ilk::Interface) => {
                if let Some(attr) = elem.child(&first) {
                    trace!("getattr: '{first}' is {attr} in {elem}");
                    let class_scoperef =
                        if scoperef.lpath.last().map(String::as_str) != Some(elem.name.as_str()) {
                            scoperef.join(&elem.name)
                        } else {
                            scoperef
                        };
                    return Ok((Hit::new(attr, class_scoperef), 1));
                }
                for classref in &elem.classrefs {
                    trace!("getattr: is '{first}' available on superclass '{classref}'?");
                    let base = match self.hit_from_citdl(classref, scoperef.clone(), false) {
                        Ok(base) => base,
                        Err(err) => {
                            debug!("superclass '{classref}' did not resolve: {err}");
                            continue;
                        }
                    };
                    if base.elem.ilk != Some(Ilk::Class) {
                        continue;
                    }
                    match self.hit_from_getattr(tokens, &base) {
                        Ok((hit, nconsumed)) if self.accept_hit(&hit.elem) => {
                            return Ok((hit, nconsumed));
                        }
                        Ok(_) => {}
                        Err(err) => {
                            debug!("superclass '{classref}' missed '{first}': {err}");
                        }
                    }
                }
            }
            Some(Ilk::Blob) => {
                if let Some(attr) = elem.child(&first) {
                    trace!("getattr: '{first}' is {attr} in {elem}");
                    return Ok((Hit::new(attr, scoperef), 1));
                }
                if let Some((hit, nconsumed)) = self.hit_from_elem_imports(tokens, &elem)? {
                    return Ok((hit, nconsumed));
                }
            }
            None => {
                return Err(EvalError::UnexpectedShape(format!(
                    "unexpected scope ilk on {elem}"
                )));
            }
        }
        Err(EvalError::Unresolved(format!(
            "'{first}' getattr on {elem} in {scoperef}"
        )))
    }

    /// Follow a function's declared return type.
    pub(crate) fn hit_from_call(&mut self, hit: &Hit) -> Result<Hit> {
        let citdl = hit
            .elem
            .returns
            .clone()
            .ok_or_else(|| EvalError::NoTypeInfo(format!("call on {}", hit.elem)))?;
        trace!("call hop: '{citdl}' for {}", hit.elem);
        // Return-type references may be relative to the function body.
        let func_scoperef = hit.scope.join(&hit.elem.name);
        self.hit_from_citdl(&citdl, func_scoperef, false)
    }

    /// Follow a variable's declared CITDL type.
    pub(crate) fn hit_from_variable_type_inference(&mut self, hit: &Hit) -> Result<Hit> {
        let citdl = hit
            .elem
            .citdl
            .clone()
            .ok_or_else(|| EvalError::NoTypeInfo(format!("{}", hit.elem)))?;
        trace!("variable hop: '{citdl}' for {}", hit.elem);
        self.hit_from_citdl(&citdl, hit.scope.clone(), false)
    }

    // ---- shared guards ----

    /// The "not yet defined" gate: the parser emits placeholder variables
    /// before their type assignment is seen, and those never surface.
    pub(crate) fn accept_hit(&self, elem: &Element) -> bool {
        if elem.not_yet_defined() {
            trace!("hit {elem} is not yet defined, ignoring");
            return false;
        }
        true
    }

    /// Count an evaluation of `expr`; true once the per-expression budget
    /// is exhausted.
    fn check_recursion(&mut self, expr: &str) -> bool {
        let next = self.eval_counts.get(expr).copied().unwrap_or(0) + 1;
        if next >= self.config.max_eval_count {
            return true;
        }
        self.eval_counts.insert(expr.to_string(), next);
        false
    }

    /// The scope visible past `scoperef`: the global scope while inside a
    /// nested path, the stdlib from global, nothing past the stdlib.
    pub(crate) fn parent_scope(&self, scoperef: &ScopeRef) -> Option<ScopeRef> {
        if Rc::ptr_eq(&scoperef.blob, self.buf.stdlib_blob()) {
            None
        } else if !scoperef.lpath.is_empty() {
            Some(scoperef.global())
        } else {
            Some(ScopeRef::new(Rc::clone(self.buf.stdlib_blob()), Vec::new()))
        }
    }

    /// Is `elem` one of the scopes the evaluation started inside of? Used
    /// to decide protected/private visibility.
    pub(crate) fn is_elem_inside_start_scope(&self, elem: &Rc<Element>) -> bool {
        let scoperef = &self.start_scope;
        for i in 0..scoperef.lpath.len() {
            if scoperef.lpath[i] == elem.name {
                let check = ScopeRef::new(
                    Rc::clone(&scoperef.blob),
                    scoperef.lpath[..=i].to_vec(),
                );
                if let Ok(check_elem) = check.resolve() {
                    if Rc::ptr_eq(&check_elem, elem) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

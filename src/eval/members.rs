use std::collections::BTreeSet;
use std::rc::Rc;

use log::{debug, warn};

use crate::errors::Result;
use crate::eval::evaluator::Evaluator;
use crate::eval::reply::{Completion, CompletionKind};
use crate::eval::trigger::TriggerKind;
use crate::libs::ImportHandler;
use crate::model::{Attribute, Element, Hit, Ilk, Tag};

impl Evaluator<'_> {
    /// Enumerate the members of a resolved hit, applying PHP visibility
    /// rules on behalf of the trigger position.
    ///
    /// `allow_protected` and `allow_private` are tri-state: `None` means
    /// undecided, and the containment check that decides them only runs
    /// once a protected or private member is actually encountered.
    pub(crate) fn members_from_hit(
        &mut self,
        hit: &Hit,
        mut allow_protected: Option<bool>,
        mut allow_private: Option<bool>,
    ) -> Result<BTreeSet<Completion>> {
        let elem = &hit.elem;
        let static_cplns = self.trg.kind == TriggerKind::StaticMembers;
        let mut members = BTreeSet::new();

        for child in &elem.children {
            // Used to add "$" for static variable names.
            let mut name_prefix = "";
            if allow_protected != Some(true) && child.has_attribute(Attribute::Protected) {
                if allow_protected.is_none() {
                    allow_protected = Some(self.is_elem_inside_start_scope(elem));
                }
                if allow_protected != Some(true) {
                    // Outside the class scope protected is out, and so is
                    // private.
                    allow_private = Some(false);
                    debug!(
                        "member '{}.{}' is protected, not including",
                        elem.name, child.name
                    );
                    continue;
                }
            }
            if allow_private != Some(true) && child.has_attribute(Attribute::Private) {
                if allow_private.is_none() {
                    allow_private = Some(self.is_elem_inside_start_scope(elem));
                }
                if allow_private != Some(true) {
                    debug!(
                        "member '{}.{}' is private, not including",
                        elem.name, child.name
                    );
                    continue;
                }
            }
            if child.tag == Tag::Variable {
                if static_cplns {
                    if !child.has_attribute(Attribute::Static) {
                        continue;
                    }
                    name_prefix = "$";
                } else if child.has_attribute(Attribute::Static) {
                    continue;
                }
            }
            self.members_from_elem(child, name_prefix, &mut members);
        }

        if elem.ilk == Some(Ilk::Class) {
            for classref in &elem.classrefs {
                debug!("members for inherited class '{classref}'");
                match self.hit_from_citdl(classref, hit.scope.clone(), false) {
                    Ok(subhit) => {
                        if allow_protected.is_none() {
                            allow_protected = Some(self.is_elem_inside_start_scope(elem));
                        }
                        // Private members never cross the superclass
                        // boundary.
                        let inherited =
                            self.members_from_hit(&subhit, allow_protected, Some(false))?;
                        members.extend(inherited);
                    }
                    Err(err) => {
                        // Continue with what does resolve.
                        warn!("{err}");
                    }
                }
            }
        }
        Ok(members)
    }

    /// Completions contributed by a single child. Usually one item; import
    /// children can expand to several.
    pub(crate) fn members_from_elem(
        &self,
        elem: &Rc<Element>,
        name_prefix: &str,
        members: &mut BTreeSet<Completion>,
    ) {
        if elem.tag != Tag::Import {
            members.insert(Completion::new(
                CompletionKind::from_element(elem),
                format!("{name_prefix}{}", elem.name),
            ));
            return;
        }
        let Some(module) = elem.module.as_deref() else {
            return;
        };
        match elem.symbol.as_deref() {
            Some(symbol) => match self.buf.imports().import_blob(module, self.ctlr) {
                Ok(blob) => {
                    if symbol == "*" {
                        for child in &blob.children {
                            members.insert(Completion::new(
                                CompletionKind::from_element(child),
                                child.name.clone(),
                            ));
                        }
                    } else if let Some(symbol_elem) = blob.child(symbol) {
                        let display = elem.alias.as_deref().unwrap_or(symbol);
                        members.insert(Completion::new(
                            CompletionKind::from_element(&symbol_elem),
                            display,
                        ));
                    }
                }
                Err(err) => {
                    debug!("skipping import '{module}' during membership: {err}");
                }
            },
            None => {
                let display = elem
                    .alias
                    .as_deref()
                    .unwrap_or_else(|| module.split('.').next().unwrap_or(module));
                members.insert(Completion::new(CompletionKind::Module, display));
            }
        }
    }
}

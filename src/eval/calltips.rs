use log::trace;

use crate::errors::{EvalError, Result};
use crate::eval::evaluator::Evaluator;
use crate::model::{Element, Hit, Ilk, Tag};

/// Keywords that syntactically mimic call sites and never get a calltip.
pub(crate) const IGNORED_CALLTIP_EXPRESSIONS: [&str; 6] =
    ["if", "elseif", "for", "foreach", "while", "switch"];

impl Evaluator<'_> {
    pub(crate) fn calltips_from_hit(&mut self, hit: &Hit) -> Result<Vec<String>> {
        match hit.elem.tag {
            // A closure-valued variable: follow its declared type first.
            Tag::Variable => {
                let hopped = self.hit_from_variable_type_inference(hit)?;
                self.calltips_from_hit(&hopped)
            }
            Tag::Scope => match hit.elem.ilk {
                Some(Ilk::Function) => Ok(vec![self.calltip_from_func(&hit.elem)]),
                Some(Ilk::Class) => Ok(vec![self.calltip_from_class(&hit.elem)]),
                _ => Err(EvalError::UnexpectedShape(format!(
                    "unexpected scope ilk for calltip hit: {}",
                    hit.elem
                ))),
            },
            Tag::Import => Err(EvalError::UnexpectedShape(format!(
                "unexpected element for calltip hit: {}",
                hit.elem
            ))),
        }
    }

    /// Signature lines, or `name(...)` without one, padded with doc lines
    /// up to the configured limit.
    pub(crate) fn calltip_from_func(&self, elem: &Element) -> String {
        let mut lines: Vec<String> = match elem.signature.as_deref() {
            Some(signature) if !signature.is_empty() => {
                signature.lines().map(str::to_string).collect()
            }
            _ => vec![format!("{}(...)", elem.name)],
        };
        if let Some(doc) = elem.doc.as_deref() {
            let budget = self.config.calltip_line_limit.saturating_sub(lines.len());
            lines.extend(doc.lines().take(budget).map(str::to_string));
        }
        lines.join("\n")
    }

    /// Class calltips come from the class signature when the parser found
    /// one. PHP does not inherit constructors, so otherwise only the
    /// class's own `__construct` is consulted.
    pub(crate) fn calltip_from_class(&self, elem: &Element) -> String {
        if let Some(signature) = elem.signature.as_deref() {
            if !signature.is_empty() {
                let mut lines: Vec<String> = signature.lines().map(str::to_string).collect();
                if let Some(doc) = elem.doc.as_deref() {
                    let budget = self.config.calltip_line_limit.saturating_sub(lines.len());
                    lines.extend(doc.lines().take(budget).map(str::to_string));
                }
                return lines.join("\n");
            }
        }
        match elem.child("__construct") {
            Some(ctor) => {
                trace!("calltip from constructor of '{}'", elem.name);
                self.calltip_from_func(&ctor)
            }
            None => {
                trace!("no constructor in class '{}'", elem.name);
                format!("{}()", elem.name)
            }
        }
    }
}

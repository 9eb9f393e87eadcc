use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::model::{Element, Tag};

/// Print an indented symbol outline of a CIT blob.
pub fn execute(input: PathBuf) -> Result<()> {
    let text = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read CIT blob: {}", input.display()))?;
    let blob: Element = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse CIT blob: {}", input.display()))?;
    print_outline(&blob, 0);
    Ok(())
}

fn print_outline(elem: &Element, depth: usize) {
    let indent = "  ".repeat(depth);
    match elem.tag {
        Tag::Scope => {
            let ilk = elem.ilk.map(|i| i.as_str()).unwrap_or("scope");
            match elem.signature.as_deref() {
                Some(signature) => println!("{indent}{ilk} {}  [{signature}]", elem.name),
                None => println!("{indent}{ilk} {}", elem.name),
            }
        }
        Tag::Variable => match elem.citdl.as_deref() {
            Some(citdl) => println!("{indent}variable {}: {citdl}", elem.name),
            None => println!("{indent}variable {}", elem.name),
        },
        Tag::Import => {
            let module = elem.module.as_deref().unwrap_or("");
            match elem.symbol.as_deref() {
                Some(symbol) => println!("{indent}import {symbol} from {module}"),
                None => println!("{indent}import {module}"),
            }
        }
    }
    for child in &elem.children {
        print_outline(child, depth + 1);
    }
}

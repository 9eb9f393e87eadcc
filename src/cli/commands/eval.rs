use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};

use crate::config::EvalConfig;
use crate::eval::{Evaluator, Trigger, TriggerKind};
use crate::libs::{BlobStore, Buffer, ImportHandler, Library, NullController, Stdlib};
use crate::model::{Element, ScopeRef};

fn load_blob(path: &Path) -> Result<Rc<Element>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CIT blob: {}", path.display()))?;
    let elem: Element = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse CIT blob: {}", path.display()))?;
    Ok(Rc::new(elem))
}

fn load_config(path: &Path) -> Result<EvalConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let config = if ext == "toml" {
        toml::from_str(&text).map_err(|e| anyhow!(e))?
    } else {
        serde_json::from_str(&text).map_err(|e| anyhow!(e))?
    };
    Ok(config)
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    input: PathBuf,
    trigger: String,
    expr: String,
    scope: Option<String>,
    stdlib: Option<PathBuf>,
    libs: Vec<PathBuf>,
    config: Option<PathBuf>,
    format: String,
) -> Result<()> {
    let blob = load_blob(&input)?;

    let config = match &config {
        Some(path) => load_config(path)?,
        None => EvalConfig::default(),
    };

    let stdlib = match &stdlib {
        Some(path) => Rc::new(Stdlib::new(load_blob(path)?)),
        None => Rc::new(Stdlib::empty()),
    };

    let mut store = BlobStore::new("workspace");
    for path in &libs {
        store.add_blob(load_blob(path)?);
    }
    let store = Rc::new(store);

    let mut buffer = Buffer::new(
        Rc::clone(&blob),
        Rc::clone(&stdlib),
        Rc::clone(&store) as Rc<dyn ImportHandler>,
    );
    buffer.add_lib(Rc::clone(&store) as Rc<dyn Library>);
    buffer.add_lib(stdlib as Rc<dyn Library>);

    let kind: TriggerKind = trigger
        .parse()
        .map_err(|err: String| anyhow!("{err}"))?;
    let lpath: Vec<String> = match &scope {
        Some(path) => path.split('.').map(str::to_string).collect(),
        None => Vec::new(),
    };
    let start_scope = ScopeRef::new(blob, lpath);

    let ctlr = NullController;
    let evaluator =
        Evaluator::new(&buffer, &ctlr, Trigger::new(kind, expr), start_scope).with_config(config);
    let reply = evaluator.run()?;

    let rendered = if format == "json" {
        serde_json::to_string(&reply)?
    } else {
        serde_json::to_string_pretty(&reply)?
    };
    println!("{rendered}");
    Ok(())
}

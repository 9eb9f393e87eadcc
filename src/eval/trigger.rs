use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the trigger detector decided the cursor position wants.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    Variables,
    Functions,
    Classes,
    Interfaces,
    Members,
    StaticMembers,
    Calltip,
    Defn,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Variables => "variables",
            TriggerKind::Functions => "functions",
            TriggerKind::Classes => "classes",
            TriggerKind::Interfaces => "interfaces",
            TriggerKind::Members => "members",
            TriggerKind::StaticMembers => "static-members",
            TriggerKind::Calltip => "calltip",
            TriggerKind::Defn => "defn",
        }
    }
}

impl FromStr for TriggerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variables" => Ok(TriggerKind::Variables),
            "functions" => Ok(TriggerKind::Functions),
            "classes" => Ok(TriggerKind::Classes),
            "interfaces" => Ok(TriggerKind::Interfaces),
            "members" => Ok(TriggerKind::Members),
            "static-members" => Ok(TriggerKind::StaticMembers),
            "calltip" => Ok(TriggerKind::Calltip),
            "defn" => Ok(TriggerKind::Defn),
            other => Err(format!("unknown trigger kind: {other}")),
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trigger delivered by the detector: the kind plus the textual prefix
/// under the cursor (e.g. `parent.foo`, `strp`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub expr: String,
}

impl Trigger {
    pub fn new(kind: TriggerKind, expr: impl Into<String>) -> Self {
        Self {
            kind,
            expr: expr.into(),
        }
    }
}

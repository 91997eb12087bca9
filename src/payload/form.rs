//! Editor state for payloads.
//!
//! A form keeps one draft per payload kind so switching between kinds never
//! loses what was typed for the others. Only the active draft is formatted.

use std::collections::HashMap;

use super::{PayloadConfig, PayloadKind};

/// Payload editor with per-kind drafts.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadForm {
    active: PayloadKind,
    drafts: HashMap<PayloadKind, PayloadConfig>,
}

impl Default for PayloadForm {
    fn default() -> Self {
        Self::new(PayloadConfig::default())
    }
}

impl PayloadForm {
    /// Start a form with `initial` as the active draft.
    pub fn new(initial: PayloadConfig) -> Self {
        let active = initial.kind();
        let mut drafts = HashMap::new();
        drafts.insert(active, initial);
        Self { active, drafts }
    }

    pub fn active_kind(&self) -> PayloadKind {
        self.active
    }

    /// Switch kinds. A kind selected for the first time starts from
    /// [`PayloadConfig::starter`]; an existing draft is kept as-is.
    pub fn select(&mut self, kind: PayloadKind) {
        self.active = kind;
        self.drafts
            .entry(kind)
            .or_insert_with(|| PayloadConfig::starter(kind));
    }

    /// The draft that will be encoded.
    pub fn active(&self) -> &PayloadConfig {
        // `new` and `select` always insert the active kind
        &self.drafts[&self.active]
    }

    /// Mutable access to the active draft.
    pub fn active_mut(&mut self) -> &mut PayloadConfig {
        let kind = self.active;
        self.drafts
            .entry(kind)
            .or_insert_with(|| PayloadConfig::starter(kind))
    }

    /// Replace a draft. Selects its kind.
    pub fn set(&mut self, config: PayloadConfig) {
        self.active = config.kind();
        self.drafts.insert(self.active, config);
    }

    /// Draft of any kind, if it was ever edited.
    pub fn draft(&self, kind: PayloadKind) -> Option<&PayloadConfig> {
        self.drafts.get(&kind)
    }

    /// Formatted string of the active draft.
    pub fn format(&self) -> String {
        super::format(self.active())
    }
}

//! Command template registry and placeholder substitution.
//!
//! Every CLI command an adapter sends is rendered from a per-vendor,
//! per-model template table. Templates use `{name}` placeholders; `{{` and
//! `}}` produce literal braces. A placeholder with no supplied value is a
//! hard error, never silently blanked: a half-rendered command reaching a
//! live OLT is worse than a failed call.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;

use crate::adapter::types::VlanMode;
use crate::device::Vendor;
use crate::error::{Result, TemplateError};

/// Command name → template string for one model.
pub type CommandTable = IndexMap<String, String>;

static SHARED: Lazy<Arc<CommandTemplateRegistry>> =
    Lazy::new(|| Arc::new(CommandTemplateRegistry::builtin()));

/// Substitution values for one rendered command.
///
/// Base parameters (addressing, model defaults) are merged with per-call
/// parameters; the later value wins on collision.
#[derive(Debug, Clone, Default)]
pub struct CommandParams {
    values: IndexMap<String, String>,
}

impl CommandParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one parameter, builder style.
    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(key.into(), value.to_string());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Overlay `other` on top of `self`; `other` wins on collision.
    pub fn merged_with(mut self, other: &CommandParams) -> Self {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
        self
    }

    /// Derive `desc_param`: `description "<text>"`, or empty when absent.
    pub fn with_description(self, description: Option<&str>) -> Self {
        let rendered = match description {
            Some(text) if !text.is_empty() => format!("description \"{text}\""),
            _ => String::new(),
        };
        self.set("desc_param", rendered)
    }

    /// Derive `mode` and `vlan_param`. The `vlan <id>` clause is emitted
    /// only for access mode with an id; trunk interfaces carry all VLANs
    /// and never embed one.
    pub fn with_vlan(self, mode: VlanMode, vlan_id: Option<u16>) -> Self {
        let rendered = match (mode, vlan_id) {
            (VlanMode::Access, Some(id)) => format!("vlan {id}"),
            _ => String::new(),
        };
        self.set("mode", mode.as_str()).set("vlan_param", rendered)
    }

    /// Derive `methods_param`: `notify <a,b>`, or empty when no methods.
    pub fn with_notify_methods(self, methods: &[String]) -> Self {
        let rendered = if methods.is_empty() {
            String::new()
        } else {
            format!("notify {}", methods.join(","))
        };
        self.set("methods_param", rendered)
    }
}

/// Render `template` with `params`. `command` names the template in errors.
pub fn render(template: &str, params: &CommandParams, command: &str) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut placeholder = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    placeholder.push(c);
                }
                if !closed || placeholder.is_empty() {
                    // Malformed braces stay literal; built-in tables never
                    // produce them but custom tables might.
                    out.push('{');
                    out.push_str(&placeholder);
                    if closed {
                        out.push('}');
                    }
                    continue;
                }
                match params.get(&placeholder) {
                    Some(value) => out.push_str(value),
                    None => {
                        return Err(TemplateError::MissingPlaceholder {
                            placeholder,
                            name: command.to_string(),
                        }
                        .into());
                    }
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            other => out.push(other),
        }
    }

    // Optional derived params render empty at the tail of a template.
    Ok(out.trim().to_string())
}

/// Per-vendor, per-model command tables.
#[derive(Debug, Default)]
pub struct CommandTemplateRegistry {
    tables: HashMap<Vendor, HashMap<String, CommandTable>>,
}

impl CommandTemplateRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in vendor tables registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::adapter::huawei::commands::register(&mut registry);
        crate::adapter::zte::commands::register(&mut registry);
        registry
    }

    /// The process-wide built-in registry.
    pub fn shared() -> Arc<CommandTemplateRegistry> {
        Arc::clone(&SHARED)
    }

    /// Register (or replace) the table for one model.
    pub fn register_model(&mut self, vendor: Vendor, model: impl Into<String>, table: CommandTable) {
        self.tables
            .entry(vendor)
            .or_default()
            .insert(model.into(), table);
    }

    pub fn has_model(&self, vendor: Vendor, model: &str) -> bool {
        self.tables
            .get(&vendor)
            .is_some_and(|models| models.contains_key(model))
    }

    /// Table for `model`, falling back to the vendor default model when the
    /// exact model has no table. The fallback is deliberate compatibility
    /// behavior: an unknown hardware revision still gets the vendor's
    /// baseline command set.
    fn table_for(&self, vendor: Vendor, model: &str) -> Option<&CommandTable> {
        let models = self.tables.get(&vendor)?;
        if let Some(table) = models.get(model) {
            return Some(table);
        }
        let fallback = vendor.default_model();
        debug!("no command table for {vendor} model '{model}', using {fallback} table");
        models.get(fallback)
    }

    /// Raw template string for one command.
    pub fn lookup(&self, vendor: Vendor, model: &str, command: &str) -> Result<&str> {
        self.table_for(vendor, model)
            .and_then(|table| table.get(command))
            .map(String::as_str)
            .ok_or_else(|| {
                TemplateError::UnknownCommand {
                    vendor: vendor.to_string(),
                    name: command.to_string(),
                }
                .into()
            })
    }

    /// Look up and render one command.
    pub fn get_command(
        &self,
        vendor: Vendor,
        model: &str,
        command: &str,
        params: &CommandParams,
    ) -> Result<String> {
        let template = self.lookup(vendor, model, command)?;
        render(template, params, command)
    }
}

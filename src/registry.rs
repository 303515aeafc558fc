use std::collections::HashMap;
use std::sync::OnceLock;

use crate::{
    command::{Command, CommandKind, constructors},
    foundation::error::WmfResult,
    record::store::RecordStore,
};

type Constructor = fn() -> CommandKind;

/// Opcode to constructor table, built once per process.
#[derive(Debug)]
pub struct CommandRegistry {
    table: HashMap<u16, (&'static str, Constructor)>,
}

static REGISTRY: OnceLock<CommandRegistry> = OnceLock::new();

impl CommandRegistry {
    /// Build the table from `(opcode, name, constructor)` entries.
    ///
    /// # Panics
    ///
    /// Panics when two entries share an opcode.
    pub(crate) fn from_entries(
        entries: impl IntoIterator<Item = (u16, &'static str, Constructor)>,
    ) -> Self {
        let mut table = HashMap::new();
        for (opcode, name, ctor) in entries {
            if let Some((existing, _)) = table.insert(opcode, (name, ctor)) {
                panic!("opcode 0x{opcode:04x} registered twice ({existing} and {name})");
            }
        }
        Self { table }
    }

    /// Populate the global table on first use; later calls return the same table.
    pub fn register_all_known_types() -> &'static Self {
        REGISTRY.get_or_init(|| {
            let registry = Self::from_entries(constructors());
            tracing::debug!(known = registry.table.len(), "command registry initialised");
            registry
        })
    }

    /// A fresh default command for `opcode`; unknown opcodes yield a placeholder.
    pub fn get(opcode: u16) -> Command {
        Self::register_all_known_types().create(opcode)
    }

    pub fn decode(record: &RecordStore) -> WmfResult<Command> {
        Self::get(record.opcode()).decode(record)
    }

    pub fn name(opcode: u16) -> Option<&'static str> {
        Self::register_all_known_types()
            .table
            .get(&opcode)
            .map(|(name, _)| *name)
    }

    /// Registered opcodes in ascending order.
    pub fn known_opcodes() -> Vec<u16> {
        let mut ops: Vec<u16> = Self::register_all_known_types()
            .table
            .keys()
            .copied()
            .collect();
        ops.sort_unstable();
        ops
    }

    pub fn len() -> usize {
        Self::register_all_known_types().table.len()
    }

    fn create(&self, opcode: u16) -> Command {
        match self.table.get(&opcode) {
            Some((_, ctor)) => Command::from(ctor()),
            None => Command::unknown(opcode),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/registry.rs"]
mod tests;

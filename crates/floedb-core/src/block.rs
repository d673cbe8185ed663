//! Dense row-by-register result blocks and their assembly into values.

use crate::{
    error::{ContractViolation, InternalError, contract_violation},
    value::Value,
};
use floedb_pack::Builder;

///
/// RegisterId
///
/// Column index within a [`RowBlock`].
///

pub type RegisterId = usize;

///
/// RowBlock
///
/// Rows × registers grid of values, stored row-major. Fresh cells hold
/// `none`. Out-of-bounds access is a contract violation.
///

#[derive(Clone, Debug, Default)]
pub struct RowBlock<'a> {
    rows: usize,
    registers: usize,
    values: Vec<Value<'a>>,
}

impl<'a> RowBlock<'a> {
    #[must_use]
    pub fn new(rows: usize, registers: usize) -> Self {
        Self {
            rows,
            registers,
            values: vec![Value::none(); rows.saturating_mul(registers)],
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn registers(&self) -> usize {
        self.registers
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[track_caller]
    fn index(&self, row: usize, register: RegisterId) -> usize {
        if row >= self.rows {
            contract_violation(ContractViolation::RowOutOfBounds {
                row,
                rows: self.rows,
            });
        }
        self.check_register(register);

        row * self.registers + register
    }

    #[track_caller]
    fn check_register(&self, register: RegisterId) {
        if register >= self.registers {
            contract_violation(ContractViolation::RegisterOutOfBounds {
                register,
                registers: self.registers,
            });
        }
    }

    #[must_use]
    #[track_caller]
    pub fn value(&self, row: usize, register: RegisterId) -> &Value<'a> {
        &self.values[self.index(row, register)]
    }

    /// Store `value`, dropping whatever the cell held.
    #[track_caller]
    pub fn set_value(&mut self, row: usize, register: RegisterId, value: Value<'a>) {
        let index = self.index(row, register);
        self.values[index] = value;
    }

    /// Move a value out, leaving `none` in the cell.
    #[must_use]
    #[track_caller]
    pub fn take_value(&mut self, row: usize, register: RegisterId) -> Value<'a> {
        let index = self.index(row, register);
        self.values[index].take()
    }

    /// Copy of rows `from..to`, clamped to the block.
    #[must_use]
    pub fn slice_rows(&self, from: usize, to: usize) -> Self {
        let to = to.min(self.rows);
        let from = from.min(to);

        Self {
            rows: to - from,
            registers: self.registers,
            values: self.values[from * self.registers..to * self.registers].to_vec(),
        }
    }

    /// Iterate one register top to bottom.
    #[track_caller]
    pub fn column(&self, register: RegisterId) -> impl Iterator<Item = &Value<'a>> {
        self.check_register(register);

        self.values
            .iter()
            .skip(register)
            .step_by(self.registers.max(1))
    }
}

///
/// Assembly
///

impl Value<'_> {
    /// One array holding `register` of every row of every block, in order.
    /// Empty cells become `null`. Blocks without rows are skipped, so their
    /// register count is never checked.
    #[track_caller]
    pub fn from_blocks_register(
        blocks: &[RowBlock<'_>],
        register: RegisterId,
    ) -> Result<Self, InternalError> {
        let mut builder = Builder::new();
        let mut rows = 0usize;

        builder.open_array();
        for block in blocks.iter().filter(|block| !block.is_empty()) {
            for value in block.column(register) {
                value.write_or_null(&mut builder);
            }
            rows += block.rows();
        }
        builder.close();

        tracing::debug!(blocks = blocks.len(), rows, register, "assembled register column");

        Self::from_assembled(builder)
    }

    /// One object per row mapping each non-empty name to the register at
    /// the same index. Empty cells become `null`; blocks without rows are
    /// skipped.
    #[track_caller]
    pub fn from_blocks(blocks: &[RowBlock<'_>], names: &[&str]) -> Result<Self, InternalError> {
        let mut builder = Builder::new();
        let mut rows = 0usize;

        builder.open_array();
        for block in blocks.iter().filter(|block| !block.is_empty()) {
            for (register, name) in names.iter().enumerate() {
                if !name.is_empty() {
                    block.check_register(register);
                }
            }

            for row in 0..block.rows() {
                builder.open_object();
                for (register, name) in names.iter().enumerate() {
                    if name.is_empty() {
                        continue;
                    }
                    builder.add_key(name);
                    block.value(row, register).write_or_null(&mut builder);
                }
                builder.close();
            }
            rows += block.rows();
        }
        builder.close();

        tracing::debug!(
            blocks = blocks.len(),
            rows,
            names = names.len(),
            "assembled row objects"
        );

        Self::from_assembled(builder)
    }

    fn from_assembled(builder: Builder) -> Result<Self, InternalError> {
        let bytes = builder
            .finish()
            .map_err(|err| InternalError::block_internal(err.to_string()))?;

        Ok(Self::from_buffer(bytes)?)
    }
}

///
/// TESTS
///

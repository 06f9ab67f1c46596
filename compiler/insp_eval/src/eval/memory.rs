//! Object storage.
//!
//! Every object lives in a [`Cell`] that is never reused: destroying an
//! object only clears its `alive` flag. A [`Place`] names a cell plus a path
//! of member indices into the value stored there, so references and
//! pointers to subobjects stay cheap to copy and a read through a
//! destroyed object is detected instead of silently seeing stale data.

use std::fmt;

use smallvec::SmallVec;

use insp_ir::Span;

use super::value::Value;
use crate::error::EvalError;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CellId(u32);

/// A cell and a member path within it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Place {
    cell: CellId,
    path: SmallVec<[u32; 4]>,
}

impl Place {
    pub fn root(cell: CellId) -> Self {
        Place {
            cell,
            path: SmallVec::new(),
        }
    }

    /// The `index`-th member, element or payload of this place.
    #[must_use]
    pub fn project(&self, index: u32) -> Place {
        let mut path = self.path.clone();
        path.push(index);
        Place {
            cell: self.cell,
            path,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.cell.0)?;
        for index in &self.path {
            write!(f, ".{index}")?;
        }
        Ok(())
    }
}

struct Cell {
    value: Value,
    alive: bool,
}

/// Why a path step failed.
enum Access {
    OutOfBounds { index: u32, len: usize },
    Inactive { requested: u32, active: u32 },
    Empty,
    Scalar,
}

#[derive(Default)]
pub struct Memory {
    cells: Vec<Cell>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, value: Value) -> CellId {
        let id = CellId(u32::try_from(self.cells.len()).unwrap_or(u32::MAX));
        self.cells.push(Cell { value, alive: true });
        id
    }

    /// End the lifetime of the object in `cell`.
    pub fn kill(&mut self, cell: CellId) {
        if let Some(cell) = self.cells.get_mut(cell.0 as usize) {
            cell.alive = false;
        }
    }

    pub fn read(&self, place: &Place, span: Span) -> Result<&Value, EvalError> {
        let cell = self.live_cell(place.cell, span)?;
        let mut value = &cell.value;
        for &index in &place.path {
            value = child(value, index).map_err(|access| access_error(access, span))?;
        }
        Ok(value)
    }

    pub fn write(&mut self, place: &Place, new: Value, span: Span) -> Result<(), EvalError> {
        self.live_cell(place.cell, span)?;
        let Some(cell) = self.cells.get_mut(place.cell.0 as usize) else {
            return Err(EvalError::DanglingReference { span });
        };
        let mut value = &mut cell.value;
        for &index in &place.path {
            value = child_mut(value, index).map_err(|access| access_error(access, span))?;
        }
        *value = new;
        Ok(())
    }

    fn live_cell(&self, cell: CellId, span: Span) -> Result<&Cell, EvalError> {
        match self.cells.get(cell.0 as usize) {
            Some(cell) if cell.alive => Ok(cell),
            _ => Err(EvalError::DanglingReference { span }),
        }
    }
}

fn child(value: &Value, index: u32) -> Result<&Value, Access> {
    match value {
        Value::Array(elements) | Value::Record {
            fields: elements, ..
        } => elements.get(index as usize).ok_or(Access::OutOfBounds {
            index,
            len: elements.len(),
        }),
        Value::Variant {
            index: active,
            payload,
        } if *active == index => Ok(&**payload),
        Value::Variant { index: active, .. } => Err(Access::Inactive {
            requested: index,
            active: *active,
        }),
        Value::Any(Some((_, payload))) if index == 0 => Ok(&**payload),
        Value::Any(_) => Err(Access::Empty),
        _ => Err(Access::Scalar),
    }
}

fn child_mut(value: &mut Value, index: u32) -> Result<&mut Value, Access> {
    match value {
        Value::Array(elements) | Value::Record {
            fields: elements, ..
        } => {
            let len = elements.len();
            elements
                .get_mut(index as usize)
                .ok_or(Access::OutOfBounds { index, len })
        }
        Value::Variant {
            index: active,
            payload,
        } => {
            if *active == index {
                Ok(&mut **payload)
            } else {
                Err(Access::Inactive {
                    requested: index,
                    active: *active,
                })
            }
        }
        Value::Any(Some((_, payload))) if index == 0 => Ok(&mut **payload),
        Value::Any(_) => Err(Access::Empty),
        _ => Err(Access::Scalar),
    }
}

fn access_error(access: Access, span: Span) -> EvalError {
    match access {
        Access::OutOfBounds { index, len } => EvalError::IndexOutOfBounds {
            index: i64::from(index),
            len,
            span,
        },
        Access::Inactive { requested, active } => EvalError::InactiveAlternative {
            requested,
            active,
            span,
        },
        Access::Empty => EvalError::EmptyBox { span },
        Access::Scalar => EvalError::Internal {
            message: "member access into a scalar".to_string(),
            span,
        },
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;

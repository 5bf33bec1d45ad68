//! Pure reordering of keyed sequences.
//!
//! Both operations only ever permute the input: no element is created,
//! dropped or duplicated.

use thiserror::Error;

/// Anything with a stable string identity inside its sequence.
pub trait Keyed {
    fn key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("unknown id {0}")]
    UnknownId(String),
    #[error("source and target are both {0}")]
    SameId(String),
}

pub fn position<T: Keyed>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.key() == id)
}

/// Swap the element at `index` with its neighbour in `direction`.
///
/// Returns `false` (and leaves the slice alone) at either boundary.
pub fn transpose<T>(items: &mut [T], index: usize, direction: Direction) -> bool {
    let neighbour = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|n| *n < items.len()),
    };
    match neighbour {
        Some(other) if index < items.len() => {
            items.swap(index, other);
            true
        }
        _ => false,
    }
}

/// Move `source_id` to sit directly before or after `target_id`.
pub fn reorder<T: Keyed + Clone>(
    items: &[T],
    source_id: &str,
    target_id: &str,
    placement: Placement,
) -> Result<Vec<T>, ReorderError> {
    if source_id == target_id {
        return Err(ReorderError::SameId(source_id.to_string()));
    }
    let source = position(items, source_id)
        .ok_or_else(|| ReorderError::UnknownId(source_id.to_string()))?;
    let mut target = position(items, target_id)
        .ok_or_else(|| ReorderError::UnknownId(target_id.to_string()))?;

    let mut out = items.to_vec();
    let moved = out.remove(source);
    // Removing the source shifts everything after it one slot left.
    if source < target {
        target -= 1;
    }
    let insert_at = match placement {
        Placement::Before => target,
        Placement::After => target + 1,
    };
    out.insert(insert_at, moved);
    Ok(out)
}

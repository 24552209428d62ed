//! The 1024-slot EVM operand stack.
//!
//! Backed by a fixed-capacity `ArrayVec<U256, 1024>`. `push`/`pop`/`dup`/
//! `swap` return `Result<_, ErrorKind>` rather than panicking: stack
//! underflow/overflow needs to surface as an ordinary `Status::Error`
//! value, not a process abort.

use arrayvec::ArrayVec;

use crate::common::ErrorKind;
use crate::word::Word;

pub const LIMIT: usize = 1024;

#[derive(Clone, Debug, Default)]
pub struct Stack(ArrayVec<Word, LIMIT>);

impl Stack {
    pub const fn limit() -> usize {
        LIMIT
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, v: Word) -> Result<(), ErrorKind> {
        self.0.try_push(v).map_err(|_| ErrorKind::StackOverflow)
    }

    pub fn pop(&mut self) -> Result<Word, ErrorKind> {
        self.0.pop().ok_or(ErrorKind::StackUnderflow)
    }

    /// Depth-`n` lookup from the top, `back(0)` being the top itself.
    fn index_from_top(&self, n: usize) -> Result<usize, ErrorKind> {
        self.0
            .len()
            .checked_sub(n + 1)
            .ok_or(ErrorKind::StackUnderflow)
    }

    pub fn back(&self, n: usize) -> Result<&Word, ErrorKind> {
        self.index_from_top(n).map(|i| &self.0[i])
    }

    pub fn back_mut(&mut self, n: usize) -> Result<&mut Word, ErrorKind> {
        let i = self.index_from_top(n)?;
        Ok(&mut self.0[i])
    }

    /// Duplicate the `n`-th element (1-indexed, `dup(1)` duplicates the top)
    /// onto the top of the stack.
    pub fn dup(&mut self, n: usize) -> Result<(), ErrorKind> {
        let v = *self.back(n - 1)?;
        self.push(v)
    }

    /// Swap the top of the stack with the element `n` slots below it
    /// (`swap(1)` exchanges the top two elements).
    pub fn swap(&mut self, n: usize) -> Result<(), ErrorKind> {
        let top = self.index_from_top(0)?;
        let other = self.index_from_top(n)?;
        self.0.swap(top, other);
        Ok(())
    }
}

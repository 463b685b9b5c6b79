//! symtable: a symbol table mapping owned string keys to values, with a
//! chained-hash backend and a linked-list backend behind one trait.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one contract ([`SymbolTable`]) with two storage strategies that
//!   are observably identical apart from cost.
//! - Layers:
//!   - `hash`: polynomial byte hash (`h * 65599 + b`, wrapping `u64`)
//!     reduced modulo the bucket count.
//!   - `binding`: a binding owns a copy of its key, its value, and the
//!     arena key of its successor. Bindings live in a `slotmap` arena
//!     owned by the table; [`Handle`] wraps the generational arena key.
//!   - `chain`: singly-linked chains threaded through the arena
//!     (find, append, push-front, unlink, visit, iterate).
//!   - [`HashTable`]: one chain head per bucket; new bindings go to the
//!     tail of their bucket's chain; stepped growth via `growth`.
//!   - [`ListTable`]: one chain; new bindings go to the front.
//!   - [`SymTable`]: picks a backend at construction time.
//!
//! Constraints
//! - Single-threaded use; mutation needs `&mut`, so sharing across threads
//!   requires the caller's own lock.
//! - Keys are immutable text, compared byte-for-byte. A key with an
//!   interior NUL byte is a caller bug and panics.
//! - Values are never inspected or cloned. Store `&T` to keep ownership
//!   with the caller; the table then never drops the referent.
//! - At most one binding per key; a second put of the same key fails
//!   without touching the table.
//!
//! Growth
//! - Bucket counts step through [`BUCKET_COUNTS`] (509 up to 65521).
//!   After each successful put, if `len > bucket_count` the table moves
//!   to the next count and re-homes every binding to the tail of its new
//!   chain. Bindings are moved, not rebuilt: handles stay valid.
//! - Past the last count chains simply lengthen.
//! - If the new bucket array cannot be allocated the step is abandoned
//!   and the put that triggered it still succeeds.
//!
//! Allocation failure
//! - Arena slots (`SlotMap::try_reserve`), key copies and bucket arrays
//!   (`try_reserve_exact`) are allocated fallibly and fail softly
//!   (`false`/`Err`/abandoned growth), leaving the table unchanged.
//!
//! Notes and non-goals
//! - No iteration order beyond bucket order (hash) or newest-first (list).
//! - Structural mutation while visiting is ruled out by the `&mut self`
//!   borrow that `map` holds.

mod binding;
mod chain;
mod error;
pub mod growth;
pub mod hash;
mod hash_table;
mod list_table;
mod table;
mod table_proptest;

// Public surface
pub use binding::Handle;
pub use chain::Iter;
pub use error::{InsertError, TableError};
pub use growth::BUCKET_COUNTS;
pub use hash_table::HashTable;
pub use list_table::ListTable;
pub use table::{Backend, SymTable, SymbolTable};

//! Form session workflow: owner search, type selection and submission

pub mod debounce;
pub mod owner_search;
pub mod payload;
pub mod session;

pub use debounce::{DebouncedInput, EditTicket, RequestTicket};
pub use owner_search::{OwnerMode, OwnerSearchSnapshot, OwnerSearchState, WorkflowModeController};
pub use payload::PayloadAssembler;
pub use session::{FormSession, SessionPorts, SubmitOutcome};

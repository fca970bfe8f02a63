mod io;
mod record;
mod store;

pub use io::{AlignmentsError, AlignmentsIo, JsonAlignmentsIo};
pub use record::{AlignmentRecord, PersistedFace};
pub use store::{AlignmentsStore, LoadPolicy};

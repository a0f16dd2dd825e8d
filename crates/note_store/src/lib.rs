mod clock;
mod error;
mod file;
mod repository;

pub use clock::{Clock, SystemClock};
pub use error::{Result, StoreError};
pub use file::{DEFAULT_NOTES_FILE, NoteFile, StoreConfig};
pub use repository::NoteRepository;

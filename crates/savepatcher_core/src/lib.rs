pub mod checksum;
pub mod error;
pub mod layout;
pub mod save_file;
pub mod section;

pub use error::{CoreError, CoreErrorCode};
pub use save_file::{Buffer, SaveFile, SaveState, SaveSummary};
pub use section::{Section, SectionInteger, SectionKind, TextEncoding};

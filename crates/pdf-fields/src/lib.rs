pub mod confirm_text;
pub mod constants;
mod consistency;
mod document;
pub mod geometry;
mod options;
mod placement;
mod record;
mod sequencer;
mod session;
mod storage;
mod store;
mod template;
mod types;

pub use confirm_text::{ConfirmTemplate, ConfirmTextEntry, MatchStatus, Verification};
pub use consistency::*;
pub use constants::LogicalSize;
pub use document::{DocumentInfo, PageSize, document_info, load_document_info};
pub use options::*;
pub use placement::*;
pub use record::{FieldRecord, TemplateRecord};
pub use sequencer::{TemplateProgress, TemplateSequencer};
pub use session::*;
pub use storage::{FieldStorage, JsonDirStorage};
pub use store::FieldStore;
pub use template::Template;
pub use types::*;

#![allow(clippy::doc_overindented_list_items)]

mod constants;
mod error;
mod reader;
mod record;
mod types;

pub mod utils;

pub use self::constants::{
    PLAYREADY_SIGNATURES, PRD_SIGNATURE, PRK_SIGNATURE, WIDEVINE_SIGNATURES, WVD_SIGNATURE,
};
pub use self::error::ParseError;
pub use self::reader::{ReadError, Reader};
pub use self::record::{FieldValue, Record};
pub use self::types::{DeviceFamily, FileKind};
pub use self::utils::{eq_ignore_ascii_case, group_thousands, title_case};

/*!
    Versioned PlayReady (`.prd`) and Widevine (`.wvd`) device file layouts,
    and the resolver that picks the layout a buffer matches.
*/
#![allow(clippy::doc_overindented_list_items)]

mod error;
mod layout;
mod resolver;

pub mod registry;

pub use self::error::{Attempt, FormatError, ParseFailure};
pub use self::layout::{FieldKind, FieldSpec, LayoutSpec, Length};
pub use self::resolver::{DeviceRecord, Resolver, VersionPolicy, resolve};

//! A reflective, type-driven JSON codec.
//!
//! Given the [`TypeInfo`] of a value, a [`Marshaller`] builds a codec for that type
//! once, caches it, and uses it to write the value as JSON or read JSON back into it,
//! without a generic intermediate tree.
//!
//! ## Menu
//!
//! - [`Marshaller`]: the entry point, owning the codec cache of one [`IOConfig`].
//! - [`IOConfig`] / [`CaseFormat`]: construction-time rendering options.
//! - [`Options`]: per-call [`Filter`]s, interceptors and caller context.
//! - [`codec`]: the [`Codec`](codec::Codec) capability and the user overrides
//!   [`MarshalCustom`](codec::MarshalCustom) / [`UnmarshalCustom`](codec::UnmarshalCustom).
//! - [`Decoder`] / [`writer`]: the token reader and literal writers custom codecs use.
//! - [`RawJson`]: a pre-encoded value written verbatim.
//! - [`Error`] / [`DecodeError`]: failures, decode errors carry the path of the field.
//!
//! Field annotations are read from `#[tag(..)]` attributes of
//! `#[derive(Reflect)]` structs:
//!
//! ```
//! use vc_json_codec::{CaseFormat, IOConfig, Marshaller, Options};
//! use vc_json_reflect::derive::Reflect;
//!
//! #[derive(Reflect, Default)]
//! struct Order {
//!     #[tag(json = "ID")]
//!     id: u64,
//!     #[tag(json = "note,omitempty")]
//!     note: String,
//!     #[tag(default = "value=1")]
//!     quantity: u32,
//!     lines: Vec<String>,
//! }
//!
//! let marshaller = Marshaller::new(IOConfig::new().with_case_format(CaseFormat::UpperCamel));
//! let order = Order { id: 5, ..Order::default() };
//!
//! let json = marshaller.marshal(&order, &Options::new()).unwrap();
//! assert_eq!(json, br#"{"ID":5,"Quantity":1,"Lines":[]}"#);
//! ```
//!
//! [`TypeInfo`]: vc_json_reflect::info::TypeInfo

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod config;
mod decoder;
mod error;
mod marshaller;
mod pool;
mod presence;
mod raw;
mod session;
mod tag;

pub mod codec;
pub mod writer;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use config::{CaseFormat, IOConfig};
pub use decoder::Decoder;
pub use error::{BoxError, DecodeError, Error};
pub use marshaller::Marshaller;
pub use raw::RawJson;
pub use session::{
    Filter, MarshalInterceptor, Options, Session, UnmarshalInterceptor, UnmarshalSession,
};

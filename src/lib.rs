#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_json_codec as codec;
pub use vc_json_reflect as reflect;

pub use vc_json_codec::{CaseFormat, Error, IOConfig, Marshaller, Options};

#[cfg(feature = "derive")]
pub use vc_json_reflect::derive::Reflect;

//! Compile-time constant values for the Scrivener source emitter.
//!
//! Native front ends hand over [`RawConstant`] records. [`decode`] turns each
//! one into a [`ConstantValue`], which prints in a canonical textual form
//! suitable for pasting into generated source. Decoding never fails: values
//! the model cannot represent become [`ConstantValue::Unsupported`].

mod decode;
pub mod format;
mod raw;
mod value;

pub use decode::decode;
pub use raw::{
    DecodeOptions, ForeignValueKind, RawConstant, RawConstantKind, RawPayload, StringEncoding,
    WideCharWidth, length_prefixed,
};
pub use value::{ConstantValue, IntegerConstant, NULL_POINTER_TOKEN};

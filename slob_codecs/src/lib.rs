//! Decompressors for slob dictionary containers.
//!
//! A slob header names its codec (`zlib`, `lzma2`, `bz2`). This crate maps
//! those names to [`Decompressor`] implementations through a [`Registry`].
//! `bz2` is part of the header grammar but has no bundled implementation;
//! containers using it open fine and fail when a group is first decoded.
mod decompressor;
mod lzma2_codec;
mod registry;
mod zlib_codec;

pub use decompressor::Decompressor;
pub use lzma2_codec::Lzma2Decompressor;
pub use registry::{registry, Registry};
pub use zlib_codec::ZlibDecompressor;

//! I/O utilities for byte sources
//!
//! This module provides the seekable reader abstraction, byte order
//! detection and the primitive slice codec used by every decoder.

pub mod seekable;
pub mod byte_order;
pub mod codec;

pub use byte_order::ByteOrder;
pub use codec::StringEncoding;
pub use seekable::SeekableReader;

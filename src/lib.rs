//! `wmf-replay` decodes Windows Metafiles into typed commands and replays them.
//!
//! # Pipeline overview
//!
//! 1. **Read**: `bytes -> Metafile` (placeable header, standard header, raw [`RecordStore`]s)
//! 2. **Decode**: `RecordStore -> Command` through the [`CommandRegistry`]
//! 3. **Replay**: `Command + ReplayContext -> DrawSurface calls` (a small GDI emulator)
//! 4. **Render** (optional): `DrawSurface = CpuSurface -> FrameRGBA`
//!
//! Encode-capable commands write back to records, and [`MetafileWriter`] reassembles a stream.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Per-session state**: all GDI state lives in a [`ReplayContext`]; the registry is immutable.
//! - **Premultiplied RGBA8**: decoded bitmaps and rendered frames carry premultiplied pixels.
#![forbid(unsafe_code)]

pub mod bitmap;
pub mod command;
pub mod config;
pub mod foundation;
pub mod gdi;
pub mod interpreter;
pub mod record;
pub mod registry;
pub mod render;
pub mod replay;

pub use bitmap::decode::{BitmapDecoder, DecodedBitmap, DibDecoder};
pub use command::{Command, CommandKind, MetaCommand};
pub use config::{ErrorPolicy, ReplaySettings};
pub use foundation::core::Color;
pub use foundation::error::{WmfError, WmfResult};
pub use foundation::math::{Scale, scale_coord, scale_length};
pub use gdi::objects::GdiObject;
pub use interpreter::{Interpreter, RecordFailure, ReplayReport};
pub use record::reader::{Metafile, PlaceableHeader};
pub use record::store::RecordStore;
pub use record::writer::MetafileWriter;
pub use registry::CommandRegistry;
pub use render::{FrameRGBA, cpu::CpuSurface, recording::RecordingSurface, render_metafile};
pub use replay::context::{DcState, ReplayContext};
pub use replay::surface::{DrawSurface, FillRule, Paint, StrokeStyle, TextRun};

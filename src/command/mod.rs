//! Metafile commands: one type per record function, gathered into [`CommandKind`].

pub mod bitmap;
pub mod drawing;
pub mod objects;
pub mod region;
pub mod state;
pub mod text;

use crate::{
    foundation::error::{WmfError, WmfResult},
    foundation::math::Scale,
    record::store::RecordStore,
    replay::{context::ReplayContext, surface::DrawSurface},
};

/// Behaviour shared by every record type.
pub trait MetaCommand: Default + Sized {
    const OPCODE: u16;
    const NAME: &'static str;

    /// Parse the record parameters. Scaled fields are filled later by [`MetaCommand::rescale`].
    fn decode(record: &RecordStore) -> WmfResult<Self>;

    fn encode(&self) -> WmfResult<RecordStore> {
        Err(WmfError::unsupported_encoding(Self::OPCODE, Self::NAME))
    }

    /// Recompute every derived scaled field from the raw fields.
    fn rescale(&mut self, _scale: Scale) {}

    fn replay(
        &self,
        scale: Scale,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()>;
}

macro_rules! commands {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        #[derive(Clone, Debug, PartialEq, serde::Serialize)]
        #[serde(tag = "record")]
        pub enum CommandKind {
            $($variant($ty),)*
            /// Placeholder for a function code with no decoder.
            Unknown { opcode: u16 },
        }

        $(
            impl From<$ty> for CommandKind {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*

        impl CommandKind {
            pub fn opcode(&self) -> u16 {
                match self {
                    $(Self::$variant(_) => <$ty as MetaCommand>::OPCODE,)*
                    Self::Unknown { opcode } => *opcode,
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$ty as MetaCommand>::NAME,)*
                    Self::Unknown { .. } => "Unknown",
                }
            }

            fn decode_same(&self, record: &RecordStore) -> WmfResult<Self> {
                match self {
                    $(Self::$variant(_) => <$ty as MetaCommand>::decode(record).map(Self::$variant),)*
                    Self::Unknown { opcode } => Ok(Self::Unknown { opcode: *opcode }),
                }
            }

            fn encode(&self) -> WmfResult<RecordStore> {
                match self {
                    $(Self::$variant(c) => c.encode(),)*
                    Self::Unknown { opcode } => {
                        Err(WmfError::unsupported_encoding(*opcode, "Unknown"))
                    }
                }
            }

            fn rescale(&mut self, scale: Scale) {
                match self {
                    $(Self::$variant(c) => c.rescale(scale),)*
                    Self::Unknown { .. } => {}
                }
            }

            fn replay(
                &self,
                scale: Scale,
                ctx: &mut ReplayContext,
                surface: &mut dyn DrawSurface,
            ) -> WmfResult<()> {
                match self {
                    $(Self::$variant(c) => c.replay(scale, ctx, surface),)*
                    Self::Unknown { .. } => Ok(()),
                }
            }
        }

        /// `(opcode, name, constructor)` for every known record type.
        pub(crate) fn constructors() -> Vec<(u16, &'static str, fn() -> CommandKind)> {
            vec![
                $((
                    <$ty as MetaCommand>::OPCODE,
                    <$ty as MetaCommand>::NAME,
                    construct::<$ty> as fn() -> CommandKind,
                ),)*
            ]
        }
    };
}

fn construct<T>() -> CommandKind
where
    T: MetaCommand,
    CommandKind: From<T>,
{
    CommandKind::from(T::default())
}

commands! {
    Eof => state::Eof,
    SaveDc => state::SaveDc,
    RestoreDc => state::RestoreDc,
    SetBkColor => state::SetBkColor,
    SetBkMode => state::SetBkMode,
    SetMapMode => state::SetMapMode,
    SetRop2 => state::SetRop2,
    SetRelAbs => state::SetRelAbs,
    SetPolyFillMode => state::SetPolyFillMode,
    SetStretchBltMode => state::SetStretchBltMode,
    SetLayout => state::SetLayout,
    SetWindowOrg => state::SetWindowOrg,
    SetWindowExt => state::SetWindowExt,
    SetViewportOrg => state::SetViewportOrg,
    SetViewportExt => state::SetViewportExt,
    OffsetWindowOrg => state::OffsetWindowOrg,
    OffsetViewportOrg => state::OffsetViewportOrg,
    ScaleWindowExt => state::ScaleWindowExt,
    ScaleViewportExt => state::ScaleViewportExt,
    Escape => state::Escape,

    SetTextColor => text::SetTextColor,
    SetTextAlign => text::SetTextAlign,
    SetTextCharExtra => text::SetTextCharExtra,
    SetTextJustification => text::SetTextJustification,
    SetMapperFlags => text::SetMapperFlags,
    TextOut => text::TextOut,
    ExtTextOut => text::ExtTextOut,

    MoveTo => drawing::MoveTo,
    LineTo => drawing::LineTo,
    Rectangle => drawing::Rectangle,
    Ellipse => drawing::Ellipse,
    RoundRect => drawing::RoundRect,
    Arc => drawing::EllipticArc,
    Chord => drawing::Chord,
    Pie => drawing::Pie,
    Polygon => drawing::Polygon,
    Polyline => drawing::Polyline,
    PolyPolygon => drawing::PolyPolygon,
    SetPixel => drawing::SetPixel,
    FloodFill => drawing::FloodFill,
    ExtFloodFill => drawing::ExtFloodFill,
    PatBlt => drawing::PatBlt,

    CreatePenIndirect => objects::CreatePenIndirect,
    CreateBrushIndirect => objects::CreateBrushIndirect,
    CreateFontIndirect => objects::CreateFontIndirect,
    CreatePalette => objects::CreatePalette,
    CreatePatternBrush => objects::CreatePatternBrush,
    DibCreatePatternBrush => objects::DibCreatePatternBrush,
    SelectObject => objects::SelectObject,
    DeleteObject => objects::DeleteObject,
    SelectPalette => objects::SelectPalette,
    RealizePalette => objects::RealizePalette,
    SetPalEntries => objects::SetPalEntries,
    AnimatePalette => objects::AnimatePalette,
    ResizePalette => objects::ResizePalette,

    CreateRegion => region::CreateRegion,
    FillRegion => region::FillRegion,
    FrameRegion => region::FrameRegion,
    PaintRegion => region::PaintRegion,
    InvertRegion => region::InvertRegion,
    SelectClipRegion => region::SelectClipRegion,
    OffsetClipRgn => region::OffsetClipRgn,
    ExcludeClipRect => region::ExcludeClipRect,
    IntersectClipRect => region::IntersectClipRect,

    BitBlt => bitmap::BitBlt,
    StretchBlt => bitmap::StretchBlt,
    DibBitBlt => bitmap::DibBitBlt,
    DibStretchBlt => bitmap::DibStretchBlt,
    SetDibToDev => bitmap::SetDibToDev,
    StretchDib => bitmap::StretchDib,
}

/// A decoded record together with the scale its derived geometry was computed for.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Command {
    scale: Scale,
    #[serde(flatten)]
    kind: CommandKind,
}

impl From<CommandKind> for Command {
    fn from(kind: CommandKind) -> Self {
        let mut cmd = Self {
            scale: Scale::IDENTITY,
            kind,
        };
        cmd.kind.rescale(cmd.scale);
        cmd
    }
}

impl Command {
    pub fn unknown(opcode: u16) -> Self {
        Self::from(CommandKind::Unknown { opcode })
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn into_kind(self) -> CommandKind {
        self.kind
    }

    pub fn opcode(&self) -> u16 {
        self.kind.opcode()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, CommandKind::Unknown { .. })
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Decode `record` into a fresh command of this command's type, with identity scale.
    pub fn decode(&self, record: &RecordStore) -> WmfResult<Command> {
        if record.opcode() != self.opcode() {
            return Err(WmfError::malformed(
                record.opcode(),
                format!("{} cannot decode this record", self.name()),
            ));
        }
        self.kind.decode_same(record).map(Command::from)
    }

    pub fn encode(&self) -> WmfResult<RecordStore> {
        self.kind.encode()
    }

    /// Set the horizontal/vertical scale and recompute derived geometry.
    pub fn set_scale(&mut self, x: f64, y: f64) {
        self.scale = Scale::new(x, y);
        self.kind.rescale(self.scale);
    }

    pub fn replay(
        &self,
        ctx: &mut ReplayContext,
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<()> {
        self.kind.replay(self.scale, ctx, surface)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/command/mod.rs"]
mod tests;

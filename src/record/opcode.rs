//! WMF function codes.
//!
//! The low byte identifies the function; the high byte historically carried the parameter
//! count, which is why several codes share a low byte with different high bytes.

pub const EOF: u16 = 0x0000;
pub const SAVE_DC: u16 = 0x001E;
pub const REALIZE_PALETTE: u16 = 0x0035;
pub const SET_PAL_ENTRIES: u16 = 0x0037;
pub const CREATE_PALETTE: u16 = 0x00F7;
pub const SET_BK_MODE: u16 = 0x0102;
pub const SET_MAP_MODE: u16 = 0x0103;
pub const SET_ROP2: u16 = 0x0104;
pub const SET_REL_ABS: u16 = 0x0105;
pub const SET_POLY_FILL_MODE: u16 = 0x0106;
pub const SET_STRETCH_BLT_MODE: u16 = 0x0107;
pub const SET_TEXT_CHAR_EXTRA: u16 = 0x0108;
pub const RESTORE_DC: u16 = 0x0127;
pub const INVERT_REGION: u16 = 0x012A;
pub const PAINT_REGION: u16 = 0x012B;
pub const SELECT_CLIP_REGION: u16 = 0x012C;
pub const SELECT_OBJECT: u16 = 0x012D;
pub const SET_TEXT_ALIGN: u16 = 0x012E;
pub const RESIZE_PALETTE: u16 = 0x0139;
pub const DIB_CREATE_PATTERN_BRUSH: u16 = 0x0142;
pub const SET_LAYOUT: u16 = 0x0149;
pub const DELETE_OBJECT: u16 = 0x01F0;
pub const CREATE_PATTERN_BRUSH: u16 = 0x01F9;
pub const SET_BK_COLOR: u16 = 0x0201;
pub const SET_TEXT_COLOR: u16 = 0x0209;
pub const SET_TEXT_JUSTIFICATION: u16 = 0x020A;
pub const SET_WINDOW_ORG: u16 = 0x020B;
pub const SET_WINDOW_EXT: u16 = 0x020C;
pub const SET_VIEWPORT_ORG: u16 = 0x020D;
pub const SET_VIEWPORT_EXT: u16 = 0x020E;
pub const OFFSET_WINDOW_ORG: u16 = 0x020F;
pub const OFFSET_VIEWPORT_ORG: u16 = 0x0211;
pub const LINE_TO: u16 = 0x0213;
pub const MOVE_TO: u16 = 0x0214;
pub const OFFSET_CLIP_RGN: u16 = 0x0220;
pub const FILL_REGION: u16 = 0x0228;
pub const SET_MAPPER_FLAGS: u16 = 0x0231;
pub const SELECT_PALETTE: u16 = 0x0234;
pub const CREATE_PEN_INDIRECT: u16 = 0x02FA;
pub const CREATE_FONT_INDIRECT: u16 = 0x02FB;
pub const CREATE_BRUSH_INDIRECT: u16 = 0x02FC;
pub const POLYGON: u16 = 0x0324;
pub const POLYLINE: u16 = 0x0325;
pub const SCALE_WINDOW_EXT: u16 = 0x0410;
pub const SCALE_VIEWPORT_EXT: u16 = 0x0412;
pub const EXCLUDE_CLIP_RECT: u16 = 0x0415;
pub const INTERSECT_CLIP_RECT: u16 = 0x0416;
pub const ELLIPSE: u16 = 0x0418;
pub const FLOOD_FILL: u16 = 0x0419;
pub const RECTANGLE: u16 = 0x041B;
pub const SET_PIXEL: u16 = 0x041F;
pub const FRAME_REGION: u16 = 0x0429;
pub const ANIMATE_PALETTE: u16 = 0x0436;
pub const TEXT_OUT: u16 = 0x0521;
pub const POLY_POLYGON: u16 = 0x0538;
pub const EXT_FLOOD_FILL: u16 = 0x0548;
pub const ROUND_RECT: u16 = 0x061C;
pub const PAT_BLT: u16 = 0x061D;
pub const ESCAPE: u16 = 0x0626;
pub const CREATE_REGION: u16 = 0x06FF;
pub const ARC: u16 = 0x0817;
pub const PIE: u16 = 0x081A;
pub const CHORD: u16 = 0x0830;
pub const BIT_BLT: u16 = 0x0922;
pub const DIB_BIT_BLT: u16 = 0x0940;
pub const EXT_TEXT_OUT: u16 = 0x0A32;
pub const STRETCH_BLT: u16 = 0x0B23;
pub const DIB_STRETCH_BLT: u16 = 0x0B41;
pub const SET_DIB_TO_DEV: u16 = 0x0D33;
pub const STRETCH_DIB: u16 = 0x0F43;

//! WOFF2 container around an existing TrueType binary.
//!
//! Every table is stored with the null transform (`glyf`/`loca` use
//! transform version 3, all others version 0), so the decompressed stream
//! holds the exact table bytes of the source font.

use std::io::Write;

use write_fonts::read::{FontRef, TableProvider};
use write_fonts::types::Tag;

use crate::FontBuildError;

const SIGNATURE: &[u8; 4] = b"wOF2";
const TRUETYPE_FLAVOR: u32 = 0x0001_0000;
const HEADER_LEN: usize = 48;

const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;
const BROTLI_BUFFER: usize = 4096;

/// Tag index 63 means an explicit tag follows the flags byte.
const CUSTOM_TAG_INDEX: u8 = 0x3F;
const NULL_TRANSFORM_GLYF_LOCA: u8 = 3 << 6;

/// Tags with a one-byte directory encoding, in index order.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

/// Re-encode a TrueType binary as WOFF2.
pub fn encode_woff2(ttf: &[u8]) -> Result<Vec<u8>, FontBuildError> {
    let font = FontRef::new(ttf)?;
    let mut tables: Vec<(Tag, &[u8])> = Vec::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        let data = font
            .table_data(tag)
            .ok_or(FontBuildError::MissingTable("table data"))?;
        tables.push((tag, data.as_bytes()));
    }
    // the version fields are informational; mirror the font revision
    let (major, minor) = match font.head() {
        Ok(head) => revision_parts(head.font_revision().to_f64()),
        Err(_) => (1, 0),
    };

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    let mut sfnt_size = 12 + 16 * tables.len();
    for (tag, data) in &tables {
        write_directory_entry(&mut directory, *tag, data.len() as u32);
        stream.extend_from_slice(data);
        sfnt_size += pad4(data.len());
    }
    let compressed = compress(&stream)?;

    let unpadded = HEADER_LEN + directory.len() + compressed.len();
    let total = pad4(unpadded);

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&TRUETYPE_FLAVOR.to_be_bytes());
    out.extend_from_slice(&(total as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    // metadata and private blocks: offset, length, original length, offset, length
    out.extend_from_slice(&[0u8; 20]);
    debug_assert_eq!(out.len(), HEADER_LEN);

    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(total, 0);

    log::debug!(
        "encoded WOFF2: {} tables, {} -> {} bytes",
        tables.len(),
        ttf.len(),
        out.len()
    );
    Ok(out)
}

fn write_directory_entry(out: &mut Vec<u8>, tag: Tag, orig_length: u32) {
    let index = KNOWN_TAGS
        .iter()
        .position(|known| Tag::new(known) == tag)
        .map(|i| i as u8)
        .unwrap_or(CUSTOM_TAG_INDEX);
    let is_glyf_or_loca = tag == Tag::new(b"glyf") || tag == Tag::new(b"loca");
    let flags = if is_glyf_or_loca {
        index | NULL_TRANSFORM_GLYF_LOCA
    } else {
        index
    };
    out.push(flags);
    if index == CUSTOM_TAG_INDEX {
        out.extend_from_slice(&tag.to_be_bytes());
    }
    write_uint_base128(out, orig_length);
}

/// Big-endian base-128 varint, no leading zero groups.
fn write_uint_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut len = 0;
    let mut v = value;
    loop {
        groups[len] = (v & 0x7F) as u8;
        len += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(groups[i] | continuation);
    }
}

fn compress(data: &[u8]) -> Result<Vec<u8>, FontBuildError> {
    let mut writer =
        brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER, BROTLI_QUALITY, BROTLI_WINDOW);
    writer.write_all(data)?;
    writer.flush()?;
    Ok(writer.into_inner())
}

fn revision_parts(revision: f64) -> (u16, u16) {
    let major = revision.trunc().clamp(0.0, u16::MAX as f64) as u16;
    let minor = ((revision - revision.trunc()) * 1000.0)
        .round()
        .clamp(0.0, u16::MAX as f64) as u16;
    (major, minor)
}

#[inline]
fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

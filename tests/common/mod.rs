//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

pub const NANO: f64 = 1_000_000_000.0;

fn varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn varint_field(field: u32, value: u64, out: &mut Vec<u8>) {
    varint(u64::from(field) << 3, out);
    varint(value, out);
}

fn bytes_field(field: u32, bytes: &[u8], out: &mut Vec<u8>) {
    varint((u64::from(field) << 3) | 2, out);
    varint(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
}

fn frame(block_type: &str, data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();

    let mut blob = Vec::new();
    varint_field(2, data.len() as u64, &mut blob);
    bytes_field(3, &encoder.finish().unwrap(), &mut blob);

    let mut header = Vec::new();
    bytes_field(1, block_type.as_bytes(), &mut header);
    varint_field(3, blob.len() as u64, &mut header);

    let mut out = (header.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(&header);
    out.extend_from_slice(&blob);
    out
}

/// Raw extract whose header block covers the given box (degrees)
pub fn raw_extract(north_east: (f64, f64), south_west: (f64, f64)) -> Vec<u8> {
    let scaled = |degrees: f64| zigzag((degrees * NANO).round() as i64);

    let mut bbox = Vec::new();
    varint_field(1, scaled(south_west.0), &mut bbox);
    varint_field(2, scaled(north_east.0), &mut bbox);
    varint_field(3, scaled(north_east.1), &mut bbox);
    varint_field(4, scaled(south_west.1), &mut bbox);

    let mut header_block = Vec::new();
    bytes_field(1, &bbox, &mut header_block);
    bytes_field(4, b"OsmSchema-V0.6", &mut header_block);

    let mut stream = frame("OSMHeader", &header_block);
    stream.extend(frame("OSMData", &[0u8; 64]));
    stream
}

pub fn write_raw_extract(path: &Path, north_east: (f64, f64), south_west: (f64, f64)) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, raw_extract(north_east, south_west)).unwrap();
}

pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"").unwrap();
}

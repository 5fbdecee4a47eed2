//! Test-only slob writer. Builds containers in memory so the reader can be
//! exercised against known contents for every codec.
#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use slob_core::MAGIC;

pub const IDENTITY: [u8; 16] = [
    0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef,
];

pub struct Fixture {
    pub codec: &'static str,
    pub tags: Vec<(String, String)>,
    pub content_types: Vec<String>,
    /// Each group is a list of `(content type index, payload)`.
    pub groups: Vec<Vec<(u8, Vec<u8>)>>,
    /// `(key, group, slot, fragment)` in index order.
    pub keys: Vec<(String, u32, u16, String)>,
}

impl Fixture {
    /// Two groups, four keys. `earth` maps to "Hello, Earth!".
    pub fn planets(codec: &'static str) -> Self {
        Self {
            codec,
            tags: vec![
                ("label".into(), "Planets".into()),
                ("license.name".into(), "CC0".into()),
            ],
            content_types: vec![
                "text/plain; charset=utf-8".into(),
                "text/html; charset=utf-8".into(),
            ],
            groups: vec![
                vec![
                    (0, b"Hello, Earth!".to_vec()),
                    (1, b"<h1>Mars</h1><p id=\"surface\">Red dust</p>".to_vec()),
                ],
                vec![(1, b"<h1>Jupiter</h1>".to_vec())],
            ],
            keys: vec![
                ("earth".into(), 0, 0, "".into()),
                ("jupiter".into(), 1, 0, "".into()),
                ("mars".into(), 0, 1, "".into()),
                ("mars surface".into(), 0, 1, "surface".into()),
            ],
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&IDENTITY);
        tiny(&mut out, "utf-8");
        tiny(&mut out, self.codec);
        out.push(self.tags.len() as u8);
        for (k, v) in &self.tags {
            tiny(&mut out, k);
            tiny(&mut out, v);
        }
        out.push(self.content_types.len() as u8);
        for t in &self.content_types {
            text(&mut out, t);
        }
        out.extend_from_slice(&(self.groups.len() as u32).to_be_bytes());
        let store_offset_at = out.len();
        out.extend_from_slice(&0u64.to_be_bytes());
        let size_at = out.len();
        out.extend_from_slice(&0u64.to_be_bytes());

        // Key index, immediately after the header.
        let records: Vec<Vec<u8>> = self
            .keys
            .iter()
            .map(|(key, group, slot, fragment)| {
                let mut r = Vec::new();
                text(&mut r, key);
                r.extend_from_slice(&group.to_be_bytes());
                r.extend_from_slice(&slot.to_be_bytes());
                tiny(&mut r, fragment);
                r
            })
            .collect();
        positional_table(&mut out, &records);

        // Group index.
        let store_offset = out.len() as u64;
        let groups: Vec<Vec<u8>> = self.groups.iter().map(|g| self.group_record(g)).collect();
        positional_table(&mut out, &groups);

        let size = out.len() as u64;
        out[store_offset_at..store_offset_at + 8].copy_from_slice(&store_offset.to_be_bytes());
        out[size_at..size_at + 8].copy_from_slice(&size.to_be_bytes());
        out
    }

    fn group_record(&self, items: &[(u8, Vec<u8>)]) -> Vec<u8> {
        let mut r = (items.len() as u32).to_be_bytes().to_vec();
        r.extend(items.iter().map(|(t, _)| *t));
        let packed = compress(self.codec, &group_layout(items));
        r.extend_from_slice(&(packed.len() as u32).to_be_bytes());
        r.extend_from_slice(&packed);
        r
    }
}

/// Decompressed group: local pointers, then length-prefixed payloads.
pub fn group_layout(items: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut pointers = Vec::new();
    let mut data = Vec::new();
    for (_, payload) in items {
        pointers.extend_from_slice(&(data.len() as u32).to_be_bytes());
        data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        data.extend_from_slice(payload);
    }
    pointers.extend(data);
    pointers
}

pub fn compress(codec: &str, raw: &[u8]) -> Vec<u8> {
    match codec {
        "zlib" => {
            let mut enc = ZlibEncoder::new(Vec::new(), Compression::best());
            enc.write_all(raw).unwrap();
            enc.finish().unwrap()
        }
        "lzma2" => {
            let mut out = Vec::new();
            lzma_rs::lzma2_compress(&mut &raw[..], &mut out).unwrap();
            out
        }
        // No encoder for anything else; store verbatim.
        _ => raw.to_vec(),
    }
}

fn positional_table(out: &mut Vec<u8>, records: &[Vec<u8>]) {
    out.extend_from_slice(&(records.len() as u32).to_be_bytes());
    let mut offset = 0u64;
    for r in records {
        out.extend_from_slice(&offset.to_be_bytes());
        offset += r.len() as u64;
    }
    for r in records {
        out.extend_from_slice(r);
    }
}

fn tiny(out: &mut Vec<u8>, s: &str) {
    out.push(s.len() as u8);
    out.extend_from_slice(s.as_bytes());
}

fn text(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// Generate `len` deterministic bytes using a simple LCG.
pub fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

/// Deterministic stream of `u64`s from the same LCG.
pub struct Lcg(pub u64);

impl Lcg {
    pub fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            0
        } else {
            self.next() % n
        }
    }
}

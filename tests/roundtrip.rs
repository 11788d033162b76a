//! Integration tests exercising the full stack (container + entry + package
//! + patch) against real files on disk.

use std::path::Path;

use sgpack::chunk::CompressionType;
use sgpack::container::{PackageReader, PackageWriter};
use sgpack::entry::{AtlasEntry, AtlasTexture, Entry, IncludeEntry, Point, Rect, SubAtlas, TextureEntry};
use sgpack::package::{ManifestedEntry, PackageWithManifestReader, PackageWithManifestWriter};
use sgpack::patch_package;

fn write_package(path: &Path, compression: CompressionType, version: i32, entries: &[Entry]) {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .unwrap();
    let mut w = PackageWriter::new(file, compression, version).unwrap();
    for entry in entries {
        entry.write_body(&mut w).unwrap();
    }
    w.close().unwrap();
}

fn read_package(path: &Path) -> Vec<Entry> {
    let raw = std::fs::File::open(path).unwrap();
    let mut reader = PackageReader::new(raw, false).unwrap();
    let mut out = Vec::new();
    while let Some(code) = reader.next_entry_code().unwrap() {
        out.push(Entry::read_body(code, &mut reader, reader.version(), false).unwrap());
    }
    out
}

#[test]
fn header_round_trips_for_every_compression_and_version() {
    let dir = tempfile::tempdir().unwrap();
    for compression in [
        CompressionType::Uncompressed,
        CompressionType::Lz4,
        CompressionType::Lzf,
    ] {
        for version in [5, 7] {
            let path = dir.path().join(format!("{:?}-{}.pkg", compression, version));
            write_package(&path, compression, version, &[]);

            let raw = std::fs::File::open(&path).unwrap();
            let reader = PackageReader::new(raw, false).unwrap();
            assert_eq!(reader.compression(), compression);
            assert_eq!(reader.version(), version);
        }
    }
}

#[test]
fn entry_order_is_preserved_across_many_chunk_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ordered.pkg");

    let entries: Vec<Entry> = (0..5000)
        .map(|i| {
            Entry::Include(IncludeEntry {
                name: format!("entry-{:04}", i),
            })
        })
        .collect();
    write_package(&path, CompressionType::Uncompressed, 7, &entries);

    let back = read_package(&path);
    assert_eq!(back.len(), entries.len());
    for (original, round_tripped) in entries.iter().zip(back.iter()) {
        assert_eq!(original.name(), round_tripped.name());
    }
}

#[test]
fn chunk_boundary_is_transparent_to_entry_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big_texture.pkg");

    // A texture large enough that its body straddles the uncompressed
    // chunk window; the writer must flush a fresh chunk before it rather
    // than split the record.
    let data = vec![0x5A; 4 * 1024 * 1024];
    let texture = Entry::Texture(TextureEntry {
        name: "Giant".to_string(),
        size: data.len() as i32,
        data,
    });
    write_package(
        &path,
        CompressionType::Uncompressed,
        7,
        &[texture.clone(), Entry::Include(IncludeEntry { name: "after".to_string() })],
    );

    let back = read_package(&path);
    assert_eq!(back.len(), 2);
    match &back[0] {
        Entry::Texture(t) => assert_eq!(t.data, match &texture {
            Entry::Texture(orig) => orig.data.clone(),
            _ => unreachable!(),
        }),
        other => panic!("expected texture, got {:?}", other),
    }
    assert_eq!(back[1].name(), "after");
}

#[test]
fn seek_then_read_is_consistent_with_sequential_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seekable.pkg");
    write_package(
        &path,
        CompressionType::Uncompressed,
        7,
        &[
            Entry::Include(IncludeEntry { name: "a".to_string() }),
            Entry::Include(IncludeEntry { name: "b".to_string() }),
        ],
    );

    let raw = std::fs::File::open(&path).unwrap();
    let mut reader = PackageReader::new(raw, false).unwrap();
    reader.seek_to(4).unwrap();
    let code = reader.next_entry_code().unwrap().unwrap();
    let first = Entry::read_body(code, &mut reader, reader.version(), false).unwrap();
    assert_eq!(first.name(), "a");

    reader.seek_to(4).unwrap();
    let all = {
        let mut v = Vec::new();
        while let Some(code) = reader.next_entry_code().unwrap() {
            v.push(Entry::read_body(code, &mut reader, reader.version(), false).unwrap());
        }
        v
    };
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name(), "a");
    assert_eq!(all[1].name(), "b");
}

#[test]
fn patch_replaces_existing_and_appends_new_entries() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("Base.pkg");
    let overlay_path = dir.path().join("Overlay.pkg");

    write_package(
        &base,
        CompressionType::Uncompressed,
        7,
        &[
            Entry::Include(IncludeEntry { name: "keep".to_string() }),
            Entry::Include(IncludeEntry { name: "replace-me".to_string() }),
        ],
    );
    write_package(
        &overlay_path,
        CompressionType::Uncompressed,
        7,
        &[
            Entry::Atlas(AtlasEntry {
                name: "replace-me".to_string(),
                version: 3,
                sub_atlases: vec![SubAtlas {
                    name: "Icon".to_string(),
                    rect: Rect { x: 0, y: 0, width: 16, height: 16 },
                    top_left: Point { x: 0, y: 0 },
                    original_size: Point { x: 16, y: 16 },
                    scale_ratio: (1.0, 1.0),
                    is_multi: false,
                    is_mip: false,
                    is_alpha8: false,
                    hull: vec![
                        Point { x: 0, y: 0 },
                        Point { x: 16, y: 0 },
                        Point { x: 16, y: 16 },
                        Point { x: 0, y: 16 },
                    ],
                }],
                texture: AtlasTexture::Reference("replace-me_Texture".to_string()),
            }),
            Entry::Include(IncludeEntry { name: "brand-new".to_string() }),
        ],
    );

    patch_package(&base, &[overlay_path], &|_| {}).unwrap();

    let mut names: Vec<String> = read_package(&base).iter().map(|e| e.name().to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["brand-new", "keep", "replace-me"]);
    assert!(!dir.path().join("Base.pkg.old").exists());

    let replaced = read_package(&base)
        .into_iter()
        .find(|e| e.name() == "replace-me")
        .unwrap();
    assert!(matches!(replaced, Entry::Atlas(_)));
}

#[test]
fn manifest_sidecar_pairs_entries_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let primary = dir.path().join("WithManifest.pkg");
    let manifest = dir.path().join("WithManifest.pkg_manifest");

    write_package(
        &primary,
        CompressionType::Uncompressed,
        7,
        &[Entry::Include(IncludeEntry { name: "asset".to_string() })],
    );
    write_package(
        &manifest,
        CompressionType::Uncompressed,
        7,
        &[Entry::Include(IncludeEntry { name: "asset".to_string() })],
    );

    let mut reader = PackageWithManifestReader::open(&primary).unwrap();
    assert!(reader.has_manifest());
    let all = reader.read_all().unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].manifest.is_some());
}

#[test]
fn package_with_manifest_writer_writes_both_files_when_needed() {
    let dir = tempfile::tempdir().unwrap();
    let primary = dir.path().join("Out.pkg");

    let entries = vec![ManifestedEntry {
        entry: Entry::Include(IncludeEntry { name: "a".to_string() }),
        manifest: Some(Entry::Include(IncludeEntry { name: "a".to_string() })),
    }];
    PackageWithManifestWriter::create(&primary, CompressionType::Uncompressed, 7)
        .unwrap()
        .write_all(&entries)
        .unwrap();

    assert!(primary.exists());
    assert!(dir.path().join("Out.pkg_manifest").exists());
}

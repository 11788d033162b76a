//! Public entry points: `list`, `extract`, `pack`, and `patch` over package
//! files on disk, with glob-based entry selection and a pluggable log sink
//! mirroring the callback-style logging the original tooling exposed.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, info};
use serde_json::{json, Value};

use crate::chunk::CompressionType;
use crate::entry::{AtlasEntry, AtlasTexture, Entry, Point, Rect, SubAtlas, TextureEntry};
use crate::errors::{PackageError, Result};
use crate::package::{ManifestedEntry, PackageWithManifestReader, PackageWithManifestWriter};
use crate::patch;

/// The segment of an entry name after the last backslash, the form glob
/// patterns are actually matched against (entry names are full in-game
/// paths like `Packages\Menus\Button`).
fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

fn entry_matches(name: &str, pattern: Option<&str>) -> bool {
    match pattern {
        None => true,
        Some(p) => Pattern::new(p)
            .map(|glob| glob.matches(short_name(name)))
            .unwrap_or(false),
    }
}

fn emit(log: &dyn Fn(&str), message: &str) {
    debug!("{}", message);
    log(message);
}

/// Lists the names of entries in `package_path` matching `pattern` (a glob,
/// or `None` for everything).
pub fn list(package_path: &Path, pattern: Option<&str>, log: &dyn Fn(&str)) -> Result<Vec<String>> {
    info!("listing entries in {}", package_path.display());
    let mut reader = PackageWithManifestReader::open(package_path)?;
    let mut names = Vec::new();
    for item in reader.read_all()? {
        if entry_matches(item.entry.name(), pattern) {
            emit(log, &format!("matched {}", item.entry.name()));
            names.push(item.entry.name().to_string());
        }
    }
    Ok(names)
}

/// Extracts entries matching `pattern` from `package_path` into `out_dir`,
/// one loose file per entry, named `<entry name>.<export extension>`.
pub fn extract(
    package_path: &Path,
    pattern: Option<&str>,
    out_dir: &Path,
    log: &dyn Fn(&str),
) -> Result<Vec<PathBuf>> {
    info!("extracting entries from {}", package_path.display());
    fs::create_dir_all(out_dir)?;

    let mut reader = PackageWithManifestReader::open(package_path)?;
    let mut written = Vec::new();
    for item in reader.read_all()? {
        if !entry_matches(item.entry.name(), pattern) {
            continue;
        }
        let dest = out_dir.join(format!(
            "{}.{}",
            sanitize_name(item.entry.name()),
            item.entry.export_extension()
        ));
        emit(log, &format!("extracting {} -> {}", item.entry.name(), dest.display()));
        write_export(&item.entry, &dest)?;
        written.push(dest);
    }
    Ok(written)
}

/// Packs a loose asset tree back into a package. `source_dir` is expected to
/// hold a `manifest/*.json` atlas descriptor for every packed texture, and
/// its paired atlas sheet at `textures/atlases/<name>.png`; entries with no
/// matching sheet are skipped. Packages built this way are always written
/// LZ4-compressed.
pub fn pack(source_dir: &Path, package_path: &Path, version: i32, log: &dyn Fn(&str)) -> Result<()> {
    info!("packing {} into {}", source_dir.display(), package_path.display());
    let manifest_dir = source_dir.join("manifest");
    let atlases_dir = source_dir.join("textures").join("atlases");

    let mut entries = Vec::new();
    if manifest_dir.is_dir() {
        for dir_entry in fs::read_dir(&manifest_dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
            let name = file_name
                .strip_suffix(".atlas.json")
                .or_else(|| file_name.strip_suffix(".json"))
                .unwrap_or(file_name)
                .to_string();

            let sheet_path = atlases_dir.join(format!("{}.png", name));
            if !sheet_path.is_file() {
                continue;
            }

            let text = fs::read_to_string(&path)?;
            let value: Value = serde_json::from_str(&text)?;
            let atlas = atlas_from_json(name.clone(), &value)?;
            let data = fs::read(&sheet_path)?;

            emit(log, &format!("packing {}", name));
            entries.push(ManifestedEntry {
                entry: Entry::Texture(TextureEntry {
                    name,
                    size: data.len() as i32,
                    data,
                }),
                manifest: Some(Entry::Atlas(atlas)),
            });
        }
    }

    let writer = PackageWithManifestWriter::create(package_path, CompressionType::Lz4, version)?;
    writer.write_all(&entries)
}

/// Applies `patch_paths`, in order, to the package at `package_path`.
pub fn patch(package_path: &Path, patch_paths: &[PathBuf], log: &dyn Fn(&str)) -> Result<()> {
    info!("patching {}", package_path.display());
    patch::patch(package_path, patch_paths, log)
}

fn sanitize_name(name: &str) -> String {
    name.replace('\\', "_").replace('/', "_")
}

fn write_export(entry: &Entry, dest: &Path) -> Result<()> {
    match entry {
        Entry::Atlas(atlas) => fs::write(dest, serde_json::to_vec_pretty(&atlas_to_json(atlas))?)?,
        Entry::Texture(e) => fs::write(dest, &e.data)?,
        Entry::Texture3D(e) => fs::write(dest, &e.data)?,
        _ => {
            let mut file = fs::File::create(dest)?;
            entry.write_body(&mut file)?;
        }
    }
    Ok(())
}

fn point_to_json(p: &Point) -> Value {
    json!({ "x": p.x, "y": p.y })
}

fn sub_atlas_to_json(sub_atlas: &SubAtlas) -> Value {
    json!({
        "name": sub_atlas.name,
        "rect": {
            "x": sub_atlas.rect.x,
            "y": sub_atlas.rect.y,
            "width": sub_atlas.rect.width,
            "height": sub_atlas.rect.height,
        },
        "topLeft": point_to_json(&sub_atlas.top_left),
        "originalSize": point_to_json(&sub_atlas.original_size),
        "scaleRatio": { "x": sub_atlas.scale_ratio.0, "y": sub_atlas.scale_ratio.1 },
        "isMulti": sub_atlas.is_multi,
        "isMip": sub_atlas.is_mip,
        "isAlpha8": sub_atlas.is_alpha8,
        "hull": sub_atlas.hull.iter().map(point_to_json).collect::<Vec<_>>(),
    })
}

fn atlas_to_json(atlas: &AtlasEntry) -> Value {
    let (is_reference, referenced_texture_name) = match &atlas.texture {
        AtlasTexture::Reference(name) => (true, name.clone()),
        AtlasTexture::Inline(texture) => (false, texture.name.clone()),
    };
    json!({
        "version": atlas.version,
        "subAtlases": atlas.sub_atlases.iter().map(sub_atlas_to_json).collect::<Vec<_>>(),
        "isReference": is_reference,
        "referencedTextureName": referenced_texture_name,
    })
}

fn point_from_json(value: &Value) -> Point {
    Point {
        x: value["x"].as_i64().unwrap_or(0) as i32,
        y: value["y"].as_i64().unwrap_or(0) as i32,
    }
}

fn rect_from_json(value: &Value) -> Rect {
    Rect {
        x: value["x"].as_i64().unwrap_or(0) as i32,
        y: value["y"].as_i64().unwrap_or(0) as i32,
        width: value["width"].as_i64().unwrap_or(0) as i32,
        height: value["height"].as_i64().unwrap_or(0) as i32,
    }
}

fn sub_atlas_from_json(value: &Value) -> SubAtlas {
    let scale = &value["scaleRatio"];
    SubAtlas {
        name: value["name"].as_str().unwrap_or_default().to_string(),
        rect: rect_from_json(&value["rect"]),
        top_left: point_from_json(&value["topLeft"]),
        original_size: point_from_json(&value["originalSize"]),
        scale_ratio: (
            scale["x"].as_f64().unwrap_or(1.0) as f32,
            scale["y"].as_f64().unwrap_or(1.0) as f32,
        ),
        is_multi: value["isMulti"].as_bool().unwrap_or(false),
        is_mip: value["isMip"].as_bool().unwrap_or(false),
        is_alpha8: value["isAlpha8"].as_bool().unwrap_or(false),
        hull: value["hull"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(point_from_json)
            .collect(),
    }
}

fn atlas_from_json(name: String, value: &Value) -> Result<AtlasEntry> {
    let obj = value
        .as_object()
        .ok_or_else(|| PackageError::MalformedInput("atlas JSON is not an object".to_string()))?;

    let sub_atlases = obj
        .get("subAtlases")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(sub_atlas_from_json)
        .collect();
    let version = obj.get("version").and_then(Value::as_i64).unwrap_or(0) as i32;
    let referenced_texture_name = obj
        .get("referencedTextureName")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(&name)
        .to_string();

    // Loose JSON exports only ever carry a texture by reference, never the
    // inline bytes, so `isReference: false` in the source file is ignored.
    Ok(AtlasEntry {
        name,
        version,
        sub_atlases,
        texture: AtlasTexture::Reference(referenced_texture_name),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn glob_pattern_matches_expected_names() {
        assert!(entry_matches("Packages/Menus/Button", Some("Packages/Menus/*")));
        assert!(!entry_matches("Packages/Game/Button", Some("Packages/Menus/*")));
        assert!(entry_matches("anything", None));
    }

    #[test]
    fn glob_matches_against_short_name_not_full_path() {
        assert!(entry_matches("Packages\\Menus\\Button", Some("Button")));
        assert!(!entry_matches("Packages\\Menus\\Button", Some("Packages*")));
    }

    #[test]
    fn sanitize_name_strips_path_separators() {
        assert_eq!(sanitize_name("Packages\\Menus"), "Packages_Menus");
    }

    #[test]
    fn atlas_json_round_trips_through_export_shape() {
        let atlas = AtlasEntry {
            name: "UIAtlas".to_string(),
            version: 2,
            sub_atlases: vec![SubAtlas {
                name: "Button".to_string(),
                rect: Rect { x: 0, y: 0, width: 64, height: 32 },
                top_left: Point { x: 0, y: 0 },
                original_size: Point { x: 64, y: 32 },
                scale_ratio: (1.0, 1.0),
                is_multi: true,
                is_mip: false,
                is_alpha8: false,
                hull: Vec::new(),
            }],
            texture: AtlasTexture::Reference("UIAtlas_Texture".to_string()),
        };
        let value = atlas_to_json(&atlas);
        assert_eq!(value["isReference"], json!(true));
        assert_eq!(value["referencedTextureName"], json!("UIAtlas_Texture"));
        assert!(value.get("name").is_none());

        let back = atlas_from_json("UIAtlas".to_string(), &value).unwrap();
        assert_eq!(back.version, atlas.version);
        assert_eq!(back.sub_atlases.len(), 1);
        assert!(matches!(back.texture, AtlasTexture::Reference(n) if n == "UIAtlas_Texture"));
    }
}

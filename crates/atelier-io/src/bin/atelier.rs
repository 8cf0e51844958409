//! `atelier`: pack, unpack and inspect document files.
//!
//! ```text
//! atelier pack <snapshot.json> <out.atelier>
//! atelier unpack <in.atelier> <snapshot.json>
//! atelier info <file>
//! ```
//!
//! Image assets live in an `images/` directory next to the snapshot.

use atelier_core::Document;
use atelier_io::filetype::{FileType, detect};
use atelier_io::{IoError, archive, snapshot};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "usage:
  atelier pack <snapshot.json> <out.atelier>
  atelier unpack <in.atelier> <snapshot.json>
  atelier info <file>";

fn images_dir(snapshot_path: &Path) -> PathBuf {
    snapshot_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("images")
}

fn read_images(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>, IoError> {
    let mut images = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(images);
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let key = entry.file_name().to_string_lossy().into_owned();
        images.insert(key, std::fs::read(entry.path())?);
    }
    Ok(images)
}

fn pack(input: &Path, output: &Path) -> Result<(), IoError> {
    let snapshot = snapshot::from_json(&std::fs::read_to_string(input)?)?;
    let images = read_images(&images_dir(input))?;
    let bytes = archive::snapshot_to_archive(&snapshot, &images)?;
    std::fs::write(output, &bytes)?;
    log::info!(
        "packed {} ({} images, {} bytes)",
        output.display(),
        images.len(),
        bytes.len()
    );
    Ok(())
}

fn unpack(input: &Path, output: &Path) -> Result<(), IoError> {
    let mut unpacked = archive::unpack(&std::fs::read(input)?)?;
    let images = std::mem::take(&mut unpacked.images);
    if !images.is_empty() {
        let dir = images_dir(output);
        std::fs::create_dir_all(&dir)?;
        for (key, bytes) in &images {
            let path = dir.join(key);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, bytes)?;
        }
    }
    let snapshot = archive::archive_to_snapshot(unpacked);
    std::fs::write(output, snapshot::to_json_pretty(&snapshot)?)?;
    log::info!("unpacked {} ({} images)", output.display(), images.len());
    Ok(())
}

fn summarize(version: &str, document: &Document) -> String {
    format!(
        "version {version}, {} scenes, {} nodes, {} images, {} bitmaps",
        document.scenes_ref.len(),
        document.nodes.len(),
        document.images.len(),
        document.bitmaps.len()
    )
}

fn info(path: &Path) -> Result<(), IoError> {
    let bytes = std::fs::read(path)?;
    let name = path.file_name().and_then(|n| n.to_str());
    match detect(&bytes, name) {
        FileType::Archive => {
            let unpacked = archive::unpack(&bytes)?;
            println!("archive: {}", summarize(&unpacked.version, &unpacked.document));
            for (key, image) in &unpacked.manifest.images {
                println!("  image {key} ({} bytes)", image.bytes);
            }
        }
        FileType::Json => {
            let text = String::from_utf8_lossy(&bytes);
            let snapshot = snapshot::from_json(&text)?;
            println!("snapshot: {}", summarize(&snapshot.version, &snapshot.document));
        }
        FileType::Svg => println!("svg ({} bytes)", bytes.len()),
        FileType::Image(kind) => println!("{} ({} bytes)", kind.mime(), bytes.len()),
        FileType::Unknown => {
            return Err(IoError::UnsupportedFileType(path.display().to_string()));
        }
    }
    Ok(())
}

/// `None` when the arguments don't form a command.
fn run(args: &[String]) -> Option<Result<(), IoError>> {
    Some(match args {
        [cmd, input, output] if cmd == "pack" => pack(Path::new(input), Path::new(output)),
        [cmd, input, output] if cmd == "unpack" => unpack(Path::new(input), Path::new(output)),
        [cmd, file] if cmd == "info" => info(Path::new(file)),
        _ => return None,
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Some(Ok(())) => ExitCode::SUCCESS,
        Some(Err(e)) => {
            eprintln!("atelier: {e}");
            ExitCode::FAILURE
        }
        None => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

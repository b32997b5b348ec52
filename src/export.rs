use std::fmt::Write;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Writes the displayed frame as an ASCII PPM under out/ and points the
/// latest.ppm symlink at it. `pixels` are packed little-endian RGBA words
/// with row 0 at the bottom of the image.
pub fn write_ppm(pixels: &[u32], width: u32, height: u32) -> io::Result<PathBuf> {
    fs::create_dir_all("out")?;

    let path = PathBuf::from(format!(
        "out/{}-{}x{}.ppm",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"),
        width,
        height,
    ));

    let mut contents = format!("P3\n{width} {height}\n255\n");
    for row in pixels.chunks_exact(width as usize).rev() {
        for &pixel in row {
            let [r, g, b, _a] = pixel.to_le_bytes();
            let _ = write!(contents, "{r} {g} {b} ");
        }
        contents.push('\n');
    }
    fs::write(&path, contents)?;

    #[cfg(unix)]
    {
        let _ = fs::remove_file("latest.ppm");
        if std::os::unix::fs::symlink(&path, "latest.ppm").is_err() {
            log::warn!("Could not update latest.ppm, image is at {}", path.display());
        }
    }

    Ok(path)
}

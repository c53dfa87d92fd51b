//! PNG export with embedded metadata (tEXt chunks).

use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use fractalbox_core::{Complex, Rectangle};

use crate::buffer::RgbaBuffer;

/// Metadata to embed in an exported PNG as tEXt chunks.
pub struct ExportMetadata {
    /// `"Mandelbrot"` or `"Julia"`.
    pub family: String,
    /// The plane rectangle the image covers.
    pub rect: Rectangle,
    pub max_iterations: u32,
    pub palette_name: String,
    /// The Julia constant, when the family is Julia.
    pub julia_c: Option<Complex>,
}

/// Write an RGBA buffer as a PNG file with embedded fractal metadata.
///
/// Uses the `png` crate directly so the chunks are readable by exiftool,
/// IrfanView, XnView, etc. The pipeline itself does no file I/O; this is a
/// convenience for the host's export flow.
pub fn export_png(
    buffer: &RgbaBuffer,
    path: &Path,
    metadata: &ExportMetadata,
) -> crate::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "fractalbox".to_string())?;
    encoder.add_text_chunk("Description".to_string(), build_description(metadata))?;
    for (key, value) in build_metadata_pairs(buffer, metadata) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&buffer.pixels)?;

    debug!(
        width = buffer.width,
        height = buffer.height,
        path = %path.display(),
        "exported PNG"
    );
    Ok(())
}

fn build_description(meta: &ExportMetadata) -> String {
    let mut desc = format!(
        "{} - Plane: ({}, {})..({}, {}), Iterations: {}",
        meta.family, meta.rect.x1, meta.rect.y1, meta.rect.x2, meta.rect.y2, meta.max_iterations,
    );
    if let Some(c) = meta.julia_c {
        desc.push_str(&format!(", Julia C: {c}"));
    }
    desc
}

fn build_metadata_pairs(buffer: &RgbaBuffer, meta: &ExportMetadata) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("Fractalbox.Family".into(), meta.family.clone()),
        ("Fractalbox.PlaneX1".into(), meta.rect.x1.to_string()),
        ("Fractalbox.PlaneY1".into(), meta.rect.y1.to_string()),
        ("Fractalbox.PlaneX2".into(), meta.rect.x2.to_string()),
        ("Fractalbox.PlaneY2".into(), meta.rect.y2.to_string()),
        (
            "Fractalbox.MaxIterations".into(),
            meta.max_iterations.to_string(),
        ),
        ("Fractalbox.Palette".into(), meta.palette_name.clone()),
        (
            "Fractalbox.Resolution".into(),
            format!("{}x{}", buffer.width, buffer.height),
        ),
    ];
    if let Some(c) = meta.julia_c {
        pairs.push(("Fractalbox.JuliaC_Re".into(), c.re.to_string()));
        pairs.push(("Fractalbox.JuliaC_Im".into(), c.im.to_string()));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample_metadata() -> ExportMetadata {
        ExportMetadata {
            family: "Mandelbrot".into(),
            rect: Rectangle::new(-2.0, 2.0, 2.0, -2.0),
            max_iterations: 200,
            palette_name: "RGB".into(),
            julia_c: None,
        }
    }

    #[test]
    fn export_creates_valid_png() {
        let buffer = RgbaBuffer::new(4, 4);
        let dir = std::env::temp_dir().join("fractalbox_test_export");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("test_export.png");
        export_png(&buffer, &path, &sample_metadata()).expect("export should succeed");

        let mut file = std::fs::File::open(&path).expect("file should exist");
        let mut header = [0u8; 8];
        file.read_exact(&mut header).expect("should read header");
        assert_eq!(&header, b"\x89PNG\r\n\x1a\n", "valid PNG signature");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_embeds_text_chunks() {
        let buffer = RgbaBuffer::new(2, 2);
        let meta = ExportMetadata {
            family: "Julia".into(),
            rect: Rectangle::new(-2.0, 2.0, 2.0, -2.0),
            max_iterations: 100,
            palette_name: "HSL".into(),
            julia_c: Some(Complex::new(-0.7, 0.27015)),
        };
        let dir = std::env::temp_dir().join("fractalbox_test_export_meta");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("test_meta.png");
        export_png(&buffer, &path, &meta).expect("export should succeed");

        let decoder = png::Decoder::new(std::fs::File::open(&path).expect("file should exist"));
        let reader = decoder.read_info().expect("should read info");
        let info = reader.info();
        let texts: Vec<_> = info.uncompressed_latin1_text.iter().collect();
        assert!(
            texts
                .iter()
                .any(|t| t.keyword == "Software" && t.text == "fractalbox"),
            "should contain Software text chunk"
        );
        assert!(
            texts
                .iter()
                .any(|t| t.keyword == "Fractalbox.Family" && t.text == "Julia"),
            "should contain family chunk"
        );
        assert!(
            texts.iter().any(|t| t.keyword == "Fractalbox.JuliaC_Re"),
            "should contain Julia constant chunk"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}

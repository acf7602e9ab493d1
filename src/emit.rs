// PDF assembly and persistence.
//
// The canvas hands over finished per-page command streams; this module turns
// them into a single document (page tree, font and image resources,
// flate-compressed content) and writes it under a timestamped name. The
// returned path always refers to a fully written file.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use pdf_writer::{Filter, Name, Pdf, Rect, Ref};
use thiserror::Error;

use crate::analysis;
use crate::canvas::{Canvas, PageMetrics};
use crate::compose;
use crate::fonts::Font;
use crate::types::IncidentRecord;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

const LOGO_RESOURCE: &str = "Im1";

enum LogoEncoding {
    /// JPEG bytes pass through untouched with a DCT filter.
    Jpeg,
    /// Anything else is decoded and re-encoded as zlib RGB.
    Flate,
}

/// A banner logo, pre-encoded for embedding as an image XObject.
pub struct LogoImage {
    encoding: LogoEncoding,
    data: Vec<u8>,
    smask: Option<Vec<u8>>,
    width: u32,
    height: u32,
}

impl LogoImage {
    pub fn resource_name(&self) -> &'static str {
        LOGO_RESOURCE
    }
}

/// Read and prepare the banner logo. The logo is decorative, so every
/// failure path degrades to `None` instead of an error.
pub fn load_logo(path: &Path) -> Option<LogoImage> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(_) => {
            log::info!("no logo at {}, skipping", path.display());
            return None;
        }
    };
    match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Jpeg) => {
            let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
                .with_guessed_format()
                .ok()?
                .into_dimensions()
                .ok()?;
            Some(LogoImage {
                encoding: LogoEncoding::Jpeg,
                data: bytes,
                smask: None,
                width,
                height,
            })
        }
        Ok(_) => {
            let decoded = match image::load_from_memory(&bytes) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("could not decode logo {}: {}", path.display(), e);
                    return None;
                }
            };
            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
            let rgb: Vec<u8> = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let data = miniz_oxide::deflate::compress_to_vec_zlib(&rgb, 6);
            let smask = if has_alpha {
                let alpha: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                Some(miniz_oxide::deflate::compress_to_vec_zlib(&alpha, 6))
            } else {
                None
            };
            Some(LogoImage {
                encoding: LogoEncoding::Flate,
                data,
                smask,
                width,
                height,
            })
        }
        Err(_) => {
            log::warn!("unrecognized logo format at {}, skipping", path.display());
            None
        }
    }
}

/// Serialize the drawn pages into a complete PDF byte vector.
pub fn assemble(canvas: Canvas, logo: Option<&LogoImage>) -> Vec<u8> {
    let metrics: PageMetrics = canvas.metrics();
    let pages = canvas.into_pages();

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let font_regular_id = alloc();
    let font_bold_id = alloc();
    let logo_id = logo.map(|_| alloc());
    let smask_id = logo.and_then(|l| l.smask.as_ref()).map(|_| alloc());
    let page_ids: Vec<Ref> = (0..pages.len()).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..pages.len()).map(|_| alloc()).collect();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(pages.len() as i32);

    pdf.type1_font(font_regular_id)
        .base_font(Name(Font::Helvetica.base_name().as_bytes()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(font_bold_id)
        .base_font(Name(Font::HelveticaBold.base_name().as_bytes()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    if let (Some(l), Some(id)) = (logo, logo_id) {
        if let (Some(mask), Some(mid)) = (l.smask.as_ref(), smask_id) {
            let mut xobj = pdf.image_xobject(mid, mask);
            xobj.filter(Filter::FlateDecode);
            xobj.width(l.width as i32);
            xobj.height(l.height as i32);
            xobj.color_space().device_gray();
            xobj.bits_per_component(8);
        }
        let mut xobj = pdf.image_xobject(id, &l.data);
        xobj.filter(match l.encoding {
            LogoEncoding::Jpeg => Filter::DctDecode,
            LogoEncoding::Flate => Filter::FlateDecode,
        });
        xobj.width(l.width as i32);
        xobj.height(l.height as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        if let Some(mid) = smask_id {
            xobj.s_mask(mid);
        }
    }

    for (i, content) in pages.into_iter().enumerate() {
        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    for (i, page_id) in page_ids.iter().enumerate() {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, metrics.width, metrics.height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            fonts.pair(
                Name(Font::Helvetica.resource_name().as_bytes()),
                font_regular_id,
            );
            fonts.pair(
                Name(Font::HelveticaBold.resource_name().as_bytes()),
                font_bold_id,
            );
        }
        if let Some(id) = logo_id {
            resources.x_objects().pair(Name(LOGO_RESOURCE.as_bytes()), id);
        }
    }

    pdf.finish()
}

/// Generate one report from already-parsed rows: aggregate, compose, write.
///
/// Each call builds its own canvas, so concurrent generations share nothing.
/// The path is returned only after the file write has completed; write
/// failures propagate and leave no reference to a partial document.
pub fn generate_report(
    records: &[IncidentRecord],
    reports_dir: &Path,
    logo_path: Option<&Path>,
) -> Result<PathBuf, ReportError> {
    let t0 = Instant::now();
    let data = analysis::aggregate(records);
    let t_aggregate = t0.elapsed();

    let logo = logo_path.and_then(load_logo);
    let mut canvas = Canvas::new(PageMetrics::default());
    let summary = compose::compose(
        &data,
        records,
        &mut canvas,
        logo.as_ref().map(|l| l.resource_name()),
    );
    let t_compose = t0.elapsed();

    let bytes = assemble(canvas, logo.as_ref());
    let t_assemble = t0.elapsed();

    fs::create_dir_all(reports_dir)?;
    let name = format!("incident_analysis_{}.pdf", Local::now().timestamp_millis());
    let path = reports_dir.join(name);
    fs::write(&path, &bytes)?;

    log::info!(
        "report {}: {} pages, {} table rows over {} pages, {} bytes; aggregate={:.1}ms, compose={:.1}ms, assemble={:.1}ms, write={:.1}ms",
        path.display(),
        summary.pages,
        summary.table_rows,
        summary.table_pages,
        bytes.len(),
        t_aggregate.as_secs_f64() * 1000.0,
        (t_compose - t_aggregate).as_secs_f64() * 1000.0,
        (t_assemble - t_compose).as_secs_f64() * 1000.0,
        (t0.elapsed() - t_assemble).as_secs_f64() * 1000.0,
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Rgb, TextStyle};

    #[test]
    fn assemble_produces_a_pdf_header() {
        let mut canvas = Canvas::new(PageMetrics::default());
        canvas.text(
            "hello",
            50.0,
            50.0,
            &TextStyle::new(Font::Helvetica, 12.0, Rgb::from_hex(0x000000)),
        );
        canvas.add_page();
        let bytes = assemble(canvas, None);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.len() > 200);
    }

    #[test]
    fn missing_logo_is_not_an_error() {
        assert!(load_logo(Path::new("definitely/not/here.jpg")).is_none());
    }

    #[test]
    fn generate_report_writes_a_timestamped_file() {
        let records = vec![IncidentRecord {
            route_id: "5".to_string(),
            bus_no: "NB-1234".to_string(),
            start_time: "06:30".to_string(),
            offense: "Speeding".to_string(),
            fine: 100.0,
            fine_display: "100".to_string(),
        }];
        let dir = std::env::temp_dir().join(format!("incident_report_{}", std::process::id()));
        let path = generate_report(&records, &dir, None).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("incident_analysis_"));
        assert!(name.ends_with(".pdf"));
        let written = fs::read(&path).unwrap();
        assert!(written.starts_with(b"%PDF-"));

        fs::remove_dir_all(&dir).ok();
    }
}

use std::fs::File;
use std::io::Read;
use std::os::unix::io::{FromRawFd, RawFd};
use std::path::Path;

use log::{info, warn};
use lopdf::{Document, Object};
use serde::Serialize;

use crate::error::MarkerError;
use crate::features::geometry::Size;

pub const PDF_MIME: &str = "application/pdf";

/// The document currently shown in the host viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedDocument {
    pub source_uri: Option<String>,
    pub display_name: String,
    pub page_count: u32,
    /// Page sizes in PDF points, in page order.
    pub page_sizes: Vec<Size>,
}

impl LoadedDocument {
    /// Content area of the pages stacked vertically, scaled to viewport pixels.
    pub fn content_size(&self, px_per_point: f64) -> Size {
        let width = self
            .page_sizes
            .iter()
            .map(|s| s.width)
            .fold(0.0_f64, f64::max);
        let height: f64 = self.page_sizes.iter().map(|s| s.height).sum();
        Size::new(width * px_per_point, height * px_per_point)
    }
}

/// Where the picked file comes from.
pub enum DocumentSource<'a> {
    Fd(RawFd),
    Path(&'a str),
}

/// Read, validate and measure a picked file. `declared_mime` is what the host
/// file picker reported, if anything.
pub fn load_document(
    source: DocumentSource<'_>,
    uri: Option<&str>,
    declared_mime: Option<&str>,
) -> Result<LoadedDocument, MarkerError> {
    // Take ownership of the descriptor before any check can bail out.
    let opened = match source {
        DocumentSource::Fd(fd) => Opened::File(own_fd(fd)?),
        DocumentSource::Path(path) => Opened::Path(path),
    };

    if let Some(mime) = declared_mime.map(str::trim).filter(|m| !m.is_empty()) {
        if !mime.eq_ignore_ascii_case(PDF_MIME) {
            warn!("rejecting document with declared mime {mime}");
            return Err(MarkerError::InvalidFileType);
        }
    }

    let bytes = match opened {
        Opened::File(file) => read_file(file)?,
        Opened::Path(path) => {
            std::fs::read(path).map_err(|e| MarkerError::ReadFailed(e.to_string()))?
        }
    };
    let doc = parse_pdf(&bytes)?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(MarkerError::NoPages);
    }
    let page_sizes: Vec<Size> = pages
        .values()
        .map(|id| page_dimensions(&doc, *id))
        .collect();

    let display_name = uri
        .map(display_name_for)
        .unwrap_or_else(|| "document.pdf".to_string());
    info!(
        "loaded {display_name}: {} page(s), {} bytes",
        page_sizes.len(),
        bytes.len()
    );
    Ok(LoadedDocument {
        source_uri: uri.map(str::to_string),
        display_name,
        page_count: page_sizes.len() as u32,
        page_sizes,
    })
}

enum Opened<'a> {
    File(File),
    Path(&'a str),
}

fn own_fd(fd: RawFd) -> Result<File, MarkerError> {
    if fd < 0 {
        return Err(MarkerError::InvalidFd);
    }
    Ok(unsafe { File::from_raw_fd(fd) })
}

fn read_file(mut file: File) -> Result<Vec<u8>, MarkerError> {
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|e| MarkerError::ReadFailed(e.to_string()))?;
    Ok(buffer)
}

/// Sniff the magic bytes before handing the buffer to the parser.
fn parse_pdf(bytes: &[u8]) -> Result<Document, MarkerError> {
    let sniffed = infer::get(bytes).map(|kind| kind.mime_type());
    if sniffed != Some(PDF_MIME) {
        warn!("rejecting document sniffed as {sniffed:?}");
        return Err(MarkerError::InvalidFileType);
    }
    Document::load_mem(bytes).map_err(|e| MarkerError::PdfParseFailed(e.to_string()))
}

fn display_name_for(uri: &str) -> String {
    let trimmed = uri.trim_end_matches('/');
    let tail = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let tail = tail.rsplit("%2F").next().unwrap_or(tail);
    if tail.is_empty() {
        return uri.to_string();
    }
    Path::new(tail)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(tail)
        .to_string()
}

/// Walk up the page tree until a MediaBox turns up.
fn page_dimensions(doc: &Document, page_id: lopdf::ObjectId) -> Size {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let Ok(dict) = doc.get_object(id).and_then(|o| o.as_dict()) else {
            break;
        };
        if let Some(size) = extract_media_box(doc, dict) {
            return size;
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    // A4 when the file does not say.
    Size::new(595.0, 842.0)
}

fn extract_media_box(doc: &Document, dict: &lopdf::Dictionary) -> Option<Size> {
    let raw = dict.get(b"MediaBox").ok()?;
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = obj_to_f64(&arr[0])?;
    let lly = obj_to_f64(&arr[1])?;
    let urx = obj_to_f64(&arr[2])?;
    let ury = obj_to_f64(&arr[3])?;
    Some(Size::new((urx - llx).abs(), (ury - lly).abs()))
}

fn obj_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some((*f).into()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::{dictionary, Document, Object};

    /// A small PDF with one page per `(width, height)` entry.
    pub fn pdf_bytes(pages: &[(i64, i64)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = pages
            .iter()
            .map(|(w, h)| {
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(*w),
                        Object::Integer(*h),
                    ],
                });
                Object::Reference(page_id)
            })
            .collect();
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).expect("fixture pdf should serialize");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::io::IntoRawFd;
    use tempfile::NamedTempFile;

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_pdf_from_path_and_measures_pages() {
        let file = write_temp(&fixtures::pdf_bytes(&[(595, 842), (612, 792)]));
        let path = file.path().to_string_lossy().into_owned();
        let doc = load_document(DocumentSource::Path(&path), Some(&path), Some(PDF_MIME))
            .expect("valid pdf should load");

        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.page_sizes[0], Size::new(595.0, 842.0));
        assert_eq!(doc.content_size(1.0), Size::new(612.0, 1634.0));
        assert_eq!(doc.content_size(2.0), Size::new(1224.0, 3268.0));
        assert!(!doc.display_name.contains('/'));
    }

    #[test]
    fn loads_pdf_from_fd() {
        let file = write_temp(&fixtures::pdf_bytes(&[(300, 400)]));
        let fd = File::open(file.path()).unwrap().into_raw_fd();
        let doc = load_document(DocumentSource::Fd(fd), Some("content://docs/contract.pdf"), None)
            .expect("fd source should load");
        assert_eq!(doc.display_name, "contract.pdf");
        assert_eq!(doc.page_sizes, vec![Size::new(300.0, 400.0)]);
    }

    #[test]
    fn rejects_wrong_declared_mime() {
        let file = write_temp(&fixtures::pdf_bytes(&[(595, 842)]));
        let path = file.path().to_string_lossy().into_owned();
        let err = load_document(DocumentSource::Path(&path), None, Some("image/png")).unwrap_err();
        assert_eq!(err, MarkerError::InvalidFileType);
    }

    #[test]
    fn rejects_non_pdf_content() {
        let file = write_temp(b"just some notes, definitely not a pdf");
        let path = file.path().to_string_lossy().into_owned();
        let err = load_document(DocumentSource::Path(&path), None, Some(PDF_MIME)).unwrap_err();
        assert_eq!(err, MarkerError::InvalidFileType);
    }

    #[test]
    fn rejects_truncated_pdf() {
        let file = write_temp(b"%PDF-1.5\n%garbage");
        let path = file.path().to_string_lossy().into_owned();
        let err = load_document(DocumentSource::Path(&path), None, None).unwrap_err();
        assert!(matches!(err, MarkerError::PdfParseFailed(_)), "got {err:?}");
    }

    fn fd_points_at(fd: RawFd, path: &Path) -> bool {
        std::fs::read_link(format!("/proc/self/fd/{fd}"))
            .map(|target| target == path)
            .unwrap_or(false)
    }

    #[test]
    fn rejected_fd_upload_is_closed() {
        let file = write_temp(&fixtures::pdf_bytes(&[(595, 842)]));
        let target = std::fs::canonicalize(file.path()).unwrap();
        let fd = File::open(&target).unwrap().into_raw_fd();
        assert!(fd_points_at(fd, &target));

        let err = load_document(DocumentSource::Fd(fd), None, Some("text/plain")).unwrap_err();
        assert_eq!(err, MarkerError::InvalidFileType);
        assert!(!fd_points_at(fd, &target), "fd {fd} still open after rejection");
    }

    #[test]
    fn invalid_fd_is_reported() {
        let err = load_document(DocumentSource::Fd(-1), None, None).unwrap_err();
        assert_eq!(err, MarkerError::InvalidFd);
    }

    #[test]
    fn display_name_handles_content_uris() {
        assert_eq!(display_name_for("file:///sdcard/Download/a.pdf"), "a.pdf");
        assert_eq!(
            display_name_for("content://com.android.providers/document/primary%3ADownload%2Fb.pdf"),
            "b.pdf"
        );
    }
}

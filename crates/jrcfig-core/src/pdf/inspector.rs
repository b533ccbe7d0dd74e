//! Embedded image discovery and placement lookup using lopdf.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, trace};

use super::geometry::{Matrix, PageBox, Rect};
use super::{ImageSource, Result};
use crate::error::PdfError;

/// Nesting limit for Form XObjects and page-tree inheritance lookups.
const MAX_DEPTH: usize = 16;

/// An image XObject reachable from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Indirect object id of the image stream.
    pub id: ObjectId,
    /// Resource name the image was first found under (e.g. `Im3`).
    pub name: String,
    /// Width in image pixels.
    pub width: u32,
    /// Height in image pixels.
    pub height: u32,
}

/// Read-only view of a PDF's structure.
pub struct PdfInspector {
    document: Document,
    pages: Vec<ObjectId>,
}

impl PdfInspector {
    /// Read and parse a PDF file.
    pub fn open(path: &Path) -> crate::error::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::load_mem(&data)?)
    }

    /// Parse a PDF held in memory.
    pub fn load_mem(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Self::from_document(document)
    }

    /// Wrap an already loaded document.
    pub fn from_document(document: Document) -> Result<Self> {
        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", pages.len());
        Ok(Self { document, pages })
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        self.pages
            .get(page)
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }

    /// Follow indirect references to the underlying object.
    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        self.document
            .dereference(object)
            .map(|(_, resolved)| resolved)
            .unwrap_or(object)
    }

    fn resolve_dict<'a>(&'a self, object: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(object).as_dict().ok()
    }

    /// Look up a page attribute, walking up the page tree for inherited
    /// values (`Resources`, `MediaBox`, `CropBox`, `Rotate`).
    fn inherited(&self, node_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = node_id;
        for _ in 0..MAX_DEPTH {
            let dict = self.document.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current = *parent_id,
                _ => return None,
            }
        }
        None
    }

    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        self.inherited(page_id, b"Resources")
            .and_then(|resources| self.resolve_dict(resources))
    }

    fn page_box(&self, page_id: ObjectId) -> PageBox {
        let bounds = self
            .inherited(page_id, b"CropBox")
            .and_then(|o| rect_from_array(self.resolve(o)))
            .or_else(|| {
                self.inherited(page_id, b"MediaBox")
                    .and_then(|o| rect_from_array(self.resolve(o)))
            });

        let rotate = self
            .inherited(page_id, b"Rotate")
            .and_then(|o| self.resolve(o).as_i64().ok())
            .unwrap_or(0);
        let rotate = (rotate.rem_euclid(360) / 90 * 90) as i32;

        match bounds {
            Some((x0, y0, x1, y1)) => PageBox {
                x0,
                y0,
                x1,
                y1,
                rotate,
            },
            None => PageBox {
                rotate,
                ..PageBox::LETTER
            },
        }
    }

    /// Named XObject from a resources dictionary, as `(id, stream)`.
    fn xobject<'a>(
        &'a self,
        resources: Option<&'a Dictionary>,
        name: &[u8],
    ) -> Option<(ObjectId, &'a Stream)> {
        let xobjects = self.resolve_dict(resources?.get(b"XObject").ok()?)?;
        match xobjects.get(name).ok()? {
            Object::Reference(id) => {
                let stream = self.document.get_object(*id).ok()?.as_stream().ok()?;
                Some((*id, stream))
            }
            _ => None,
        }
    }

    fn collect_images(
        &self,
        resources: &Dictionary,
        depth: usize,
        seen: &mut HashSet<ObjectId>,
        images: &mut Vec<PageImage>,
    ) {
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|o| self.resolve_dict(o))
        else {
            return;
        };

        for (name, entry) in xobjects.iter() {
            let Object::Reference(id) = entry else {
                continue;
            };
            let Ok(stream) = self.document.get_object(*id).and_then(Object::as_stream) else {
                continue;
            };

            match subtype(&stream.dict) {
                Some(b"Image") => {
                    if seen.insert(*id) {
                        let dimension = |key: &[u8]| {
                            stream
                                .dict
                                .get(key)
                                .ok()
                                .and_then(|o| self.resolve(o).as_i64().ok())
                                .unwrap_or(0) as u32
                        };
                        images.push(PageImage {
                            id: *id,
                            name: String::from_utf8_lossy(name).into_owned(),
                            width: dimension(b"Width".as_slice()),
                            height: dimension(b"Height".as_slice()),
                        });
                    }
                }
                Some(b"Form") if depth < MAX_DEPTH => {
                    if let Some(form_resources) = stream
                        .dict
                        .get(b"Resources")
                        .ok()
                        .and_then(|o| self.resolve_dict(o))
                    {
                        self.collect_images(form_resources, depth + 1, seen, images);
                    }
                }
                _ => {}
            }
        }
    }

    /// Walk a content stream and record the user-space bounds of every
    /// `Do` that paints `target`, descending into Form XObjects.
    fn walk_content(
        &self,
        data: &[u8],
        resources: Option<&Dictionary>,
        base: Matrix,
        target: ObjectId,
        depth: usize,
        bounds: &mut Vec<(f32, f32, f32, f32)>,
    ) -> std::result::Result<(), String> {
        let content = Content::decode(data).map_err(|e| format!("bad content stream: {}", e))?;

        let mut ctm = base;
        let mut saved: Vec<Matrix> = Vec::new();

        for operation in &content.operations {
            match operation.operator.as_str() {
                "q" => saved.push(ctm),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        ctm = previous;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from_operands(&operation.operands) {
                        ctm = m.concat(&ctm);
                    }
                }
                "Do" => {
                    let Some(name) = operation.operands.first().and_then(|o| o.as_name().ok())
                    else {
                        continue;
                    };
                    let Some((id, stream)) = self.xobject(resources, name) else {
                        trace!("Unresolved XObject {}", String::from_utf8_lossy(name));
                        continue;
                    };

                    if id == target {
                        bounds.push(ctm.unit_square_bounds());
                    } else if matches!(subtype(&stream.dict), Some(b"Form")) && depth < MAX_DEPTH {
                        let form_matrix = stream
                            .dict
                            .get(b"Matrix")
                            .ok()
                            .and_then(|o| self.resolve(o).as_array().ok())
                            .and_then(|values| matrix_from_operands(values))
                            .unwrap_or_default();
                        let form_resources = stream
                            .dict
                            .get(b"Resources")
                            .ok()
                            .and_then(|o| self.resolve_dict(o))
                            .or(resources);
                        let form_data = stream
                            .decompressed_content()
                            .unwrap_or_else(|_| stream.content.clone());

                        self.walk_content(
                            &form_data,
                            form_resources,
                            form_matrix.concat(&ctm),
                            target,
                            depth + 1,
                            bounds,
                        )?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl ImageSource for PdfInspector {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_images(&self, page: usize) -> Result<Vec<PageImage>> {
        let page_id = self.page_id(page)?;

        let mut images = Vec::new();
        if let Some(resources) = self.page_resources(page_id) {
            let mut seen = HashSet::new();
            self.collect_images(resources, 0, &mut seen, &mut images);
        }

        trace!("Page index {} references {} images", page, images.len());
        Ok(images)
    }

    fn image_rects(&self, page: usize, image: &PageImage) -> Result<Vec<Rect>> {
        let page_id = self.page_id(page)?;
        let placement_error = |reason: String| PdfError::Placement {
            page,
            image: image.name.clone(),
            reason,
        };

        let data = self
            .document
            .get_page_content(page_id)
            .map_err(|e| placement_error(e.to_string()))?;

        let mut bounds = Vec::new();
        self.walk_content(
            &data,
            self.page_resources(page_id),
            Matrix::IDENTITY,
            image.id,
            0,
            &mut bounds,
        )
        .map_err(placement_error)?;

        let page_box = self.page_box(page_id);
        Ok(bounds
            .into_iter()
            .map(|(min_x, min_y, max_x, max_y)| page_box.to_display(min_x, min_y, max_x, max_y))
            .collect())
    }
}

fn subtype(dict: &Dictionary) -> Option<&[u8]> {
    dict.get(b"Subtype").ok()?.as_name().ok()
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn matrix_from_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() != 6 {
        return None;
    }
    let values: Vec<f32> = operands.iter().map(number).collect::<Option<_>>()?;
    Some(Matrix::new(
        values[0], values[1], values[2], values[3], values[4], values[5],
    ))
}

fn rect_from_array(object: &Object) -> Option<(f32, f32, f32, f32)> {
    let values = object.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let (x0, y0) = (number(&values[0])?, number(&values[1])?);
    let (x1, y1) = (number(&values[2])?, number(&values[3])?);
    Some((x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{draw, PdfBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_images_listed_in_resource_order() {
        let mut pdf = PdfBuilder::new();
        let chart = pdf.image(40, 30);
        let logo = pdf.image(8, 8);
        let mut ops = draw("ImA", [200, 0, 0, 150, 50, 100]);
        ops.extend(draw("ImB", [20, 0, 0, 20, 10, 10]));
        pdf.page(&[("ImA", chart), ("ImB", logo)], ops);
        pdf.page(&[], vec![]);

        let inspector = PdfInspector::from_document(pdf.build()).unwrap();
        assert_eq!(inspector.page_count(), 2);

        let images = inspector.page_images(0).unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ImA", "ImB"]);
        assert_eq!((images[0].width, images[0].height), (40, 30));
        assert!(inspector.page_images(1).unwrap().is_empty());
    }

    #[test]
    fn test_same_image_under_two_names_listed_once() {
        let mut pdf = PdfBuilder::new();
        let chart = pdf.image(10, 10);
        pdf.page(&[("ImA", chart), ("ImCopy", chart)], vec![]);

        let inspector = PdfInspector::from_document(pdf.build()).unwrap();
        let images = inspector.page_images(0).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, chart);
    }

    #[test]
    fn test_every_placement_is_reported() {
        let mut pdf = PdfBuilder::new();
        let chart = pdf.image(10, 10);
        let mut ops = draw("ImA", [200, 0, 0, 150, 50, 100]);
        ops.extend(draw("ImA", [100, 0, 0, 100, 300, 600]));
        pdf.page(&[("ImA", chart)], ops);

        let inspector = PdfInspector::from_document(pdf.build()).unwrap();
        let image = &inspector.page_images(0).unwrap()[0];
        let rects = inspector.image_rects(0, image).unwrap();

        // MediaBox 0 0 595 842 is inherited from the page tree root
        assert_eq!(
            rects,
            vec![
                Rect::new(50.0, 592.0, 250.0, 742.0),
                Rect::new(300.0, 142.0, 400.0, 242.0),
            ]
        );
    }

    #[test]
    fn test_nested_form_placement() {
        let mut pdf = PdfBuilder::new();
        let chart = pdf.image(10, 10);
        let form = pdf.form(
            &[("ImF", chart)],
            draw("ImF", [100, 0, 0, 100, 0, 0]),
            [1, 0, 0, 1, 20, 30],
        );
        pdf.page(&[("Fm1", form)], draw("Fm1", [1, 0, 0, 1, 100, 200]));

        let inspector = PdfInspector::from_document(pdf.build()).unwrap();
        let images = inspector.page_images(0).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "ImF");

        let rects = inspector.image_rects(0, &images[0]).unwrap();
        assert_eq!(rects, vec![Rect::new(120.0, 512.0, 220.0, 612.0)]);
    }

    #[test]
    fn test_listed_but_unpainted_image_has_no_rects() {
        let mut pdf = PdfBuilder::new();
        let chart = pdf.image(10, 10);
        pdf.page(&[("ImA", chart)], vec![]);

        let inspector = PdfInspector::from_document(pdf.build()).unwrap();
        let image = &inspector.page_images(0).unwrap()[0];
        assert!(inspector.image_rects(0, image).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_page_index() {
        let mut pdf = PdfBuilder::new();
        pdf.page(&[], vec![]);
        let inspector = PdfInspector::from_document(pdf.build()).unwrap();
        assert!(matches!(
            inspector.page_images(5),
            Err(PdfError::InvalidPage(5))
        ));
    }

    #[test]
    fn test_load_mem_roundtrip_and_garbage() {
        let mut pdf = PdfBuilder::new();
        pdf.page(&[], vec![]);
        pdf.page(&[], vec![]);
        let inspector = PdfInspector::load_mem(&pdf.to_bytes()).unwrap();
        assert_eq!(inspector.page_count(), 2);

        assert!(matches!(
            PdfInspector::load_mem(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        let mut pdf = PdfBuilder::new();
        pdf.page(&[], vec![]);
        std::fs::write(&path, pdf.to_bytes()).unwrap();

        assert_eq!(PdfInspector::open(&path).unwrap().page_count(), 1);
        assert!(matches!(
            PdfInspector::open(&dir.path().join("missing.pdf")),
            Err(crate::error::JrcfigError::Io(_))
        ));
    }
}

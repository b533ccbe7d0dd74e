//! Small PDF documents built with lopdf for tests.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Builds A4 documents whose pages draw image and form XObjects.
pub(crate) struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Add a grayscale image XObject.
    pub fn image(&mut self, width: i64, height: i64) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(width),
            "Height" => Object::Integer(height),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => Object::Integer(8),
        };
        self.doc
            .add_object(Stream::new(dict, vec![0u8; (width * height) as usize]))
    }

    /// Add a Form XObject drawing its own XObjects.
    pub fn form(
        &mut self,
        xobjects: &[(&str, ObjectId)],
        operations: Vec<Operation>,
        matrix: [i64; 6],
    ) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => integers(&[0, 0, 595, 842]),
            "Matrix" => integers(&matrix),
            "Resources" => resources(xobjects),
        };
        let content = Content { operations }.encode().unwrap();
        self.doc.add_object(Stream::new(dict, content))
    }

    /// Append a page. The page inherits its MediaBox from the page tree.
    pub fn page(&mut self, xobjects: &[(&str, ObjectId)], operations: Vec<Operation>) -> ObjectId {
        let content = Content { operations }.encode().unwrap();
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources(xobjects),
        });
        self.kids.push(page_id.into());
        page_id
    }

    pub fn build(mut self) -> Document {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => Object::Integer(count),
            "MediaBox" => integers(&[0, 0, 595, 842]),
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }

    pub fn to_bytes(self) -> Vec<u8> {
        let mut doc = self.build();
        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }
}

/// `q <matrix> cm /<name> Do Q`
pub(crate) fn draw(name: &str, matrix: [i64; 6]) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("cm", matrix.iter().map(|v| Object::Integer(*v)).collect()),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

fn integers(values: &[i64]) -> Object {
    Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
}

fn resources(xobjects: &[(&str, ObjectId)]) -> Dictionary {
    let mut entries = Dictionary::new();
    for (name, id) in xobjects {
        entries.set(*name, *id);
    }
    dictionary! { "XObject" => entries }
}

//! PDF document model.
//!
//! [`Document`] is the read-only object graph a validation run walks: the
//! object table, the cross-reference data and the trailer of the current
//! revision. The engine never mutates it, so one document can back any number
//! of sequential validation runs.
//!
//! Documents are assembled through [`DocumentBuilder`], which stands in for
//! the byte-level parser (an external collaborator of the engine).

use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use crate::xref::XrefTable;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Maximum indirection depth followed while resolving a reference chain.
const MAX_RESOLVE_DEPTH: u32 = 32;

/// Maximum page-tree depth walked while collecting pages.
const MAX_PAGE_TREE_DEPTH: u32 = 64;

/// A loaded PDF document: typed object graph plus cross-reference data.
///
/// # Example
///
/// ```
/// use pdf_preflight::document::Document;
/// use pdf_preflight::object::{Dictionary, Object, ObjectRef};
///
/// let catalog = ObjectRef::new(1, 0);
/// let mut catalog_dict = Dictionary::new();
/// catalog_dict.insert("Type".to_string(), Object::Name("Catalog".to_string()));
///
/// let doc = Document::builder()
///     .version(1, 4)
///     .object(catalog, Object::Dictionary(catalog_dict))
///     .build();
/// assert_eq!(doc.version(), (1, 4));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// PDF version (major, minor)
    version: (u8, u8),
    /// Indirect objects in file order
    objects: IndexMap<ObjectRef, Object>,
    /// Cross-reference table and revision trailers
    xref: XrefTable,
    /// Trailer dictionary of the current revision
    trailer: Dictionary,
}

/// A leaf page reached while walking the page tree, in document order.
#[derive(Debug, Clone, Copy)]
pub struct PageObject<'a> {
    /// Zero-based page index in document order
    pub index: usize,
    /// Indirect reference of the page object, when it is one
    pub id: Option<ObjectRef>,
    /// The page dictionary
    pub dict: &'a Dictionary,
}

impl Document {
    /// Start building a document.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// PDF version as (major, minor).
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Trailer dictionary of the current revision.
    pub fn trailer(&self) -> &Dictionary {
        &self.trailer
    }

    /// Cross-reference table.
    pub fn xref(&self) -> &XrefTable {
        &self.xref
    }

    /// Look up an indirect object.
    pub fn get(&self, obj_ref: ObjectRef) -> Option<&Object> {
        self.objects.get(&obj_ref)
    }

    /// All indirect objects in file order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectRef, &Object)> {
        self.objects.iter().map(|(r, o)| (*r, o))
    }

    /// Resolve an object, following indirect references through the
    /// cross-reference table.
    ///
    /// Returns `None` for dangling references and for reference chains that
    /// loop or exceed the depth limit. Non-reference objects resolve to
    /// themselves.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        let mut current = obj;
        let mut seen: HashSet<ObjectRef> = HashSet::new();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                Object::Reference(r) => {
                    if !seen.insert(*r) {
                        log::warn!("reference cycle while resolving {}", r);
                        return None;
                    }
                    match self.objects.get(r) {
                        Some(target) => current = target,
                        None => {
                            log::debug!("dangling reference {}", r);
                            return None;
                        }
                    }
                }
                _ => return Some(current),
            }
        }
        None
    }

    /// Look up an indirect object, failing on a dangling reference.
    ///
    /// The engine itself tolerates dangling references through [`resolve`](Self::resolve)
    /// and reports them as findings; this strict variant is for callers that
    /// need the cause.
    pub fn try_get(&self, obj_ref: ObjectRef) -> Result<&Object> {
        self.get(obj_ref).ok_or(Error::DanglingReference(obj_ref))
    }

    /// Resolve an object like [`resolve`](Self::resolve), but report why
    /// resolution failed instead of returning `None`.
    pub fn resolve_strict<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        let mut current = obj;
        let mut seen: HashSet<ObjectRef> = HashSet::new();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                Object::Reference(r) => {
                    if !seen.insert(*r) {
                        return Err(Error::ReferenceCycle(*r));
                    }
                    current = self.try_get(*r)?;
                }
                _ => return Ok(current),
            }
        }
        Err(Error::ResolveDepthExceeded(MAX_RESOLVE_DEPTH))
    }

    /// Resolve an entry and return it as a dictionary (streams included).
    pub fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj).and_then(Object::as_dict)
    }

    /// The document catalog, reached through the trailer `Root` entry.
    pub fn catalog(&self) -> Option<&Dictionary> {
        let root = self.trailer.get("Root")?;
        match self.resolve(root)? {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// All indirect dictionary or stream objects whose `Type` entry matches
    /// `type_name`, in file order.
    pub fn objects_of_type(&self, type_name: &str) -> Vec<(ObjectRef, &Dictionary)> {
        self.objects
            .iter()
            .filter_map(|(r, o)| {
                let dict = o.as_dict()?;
                let ty = dict.get("Type")?.as_name()?;
                (ty == type_name).then_some((*r, dict))
            })
            .collect()
    }

    /// Leaf pages of the page tree in document order.
    ///
    /// Cyclic `Kids` chains are cut instead of looped over; the affected
    /// subtree simply contributes no pages.
    pub fn pages(&self) -> Vec<PageObject<'_>> {
        let mut out = Vec::new();
        let Some(catalog) = self.catalog() else {
            return out;
        };
        let Some(root) = catalog.get("Pages").and_then(|o| self.resolve_dict(o)) else {
            return out;
        };
        let mut visited = HashSet::new();
        if let Some(r) = catalog.get("Pages").and_then(|o| o.as_reference()) {
            visited.insert(r);
        }
        self.collect_pages(root, None, &mut visited, &mut out, 0);
        for (index, page) in out.iter_mut().enumerate() {
            page.index = index;
        }
        out
    }

    fn collect_pages<'a>(
        &'a self,
        node: &'a Dictionary,
        id: Option<ObjectRef>,
        visited: &mut HashSet<ObjectRef>,
        out: &mut Vec<PageObject<'a>>,
        depth: u32,
    ) {
        if depth > MAX_PAGE_TREE_DEPTH {
            log::warn!("page tree deeper than {} levels, cutting walk", MAX_PAGE_TREE_DEPTH);
            return;
        }
        let kids = node.get("Kids").and_then(|o| self.resolve(o)).and_then(Object::as_array);
        match kids {
            Some(kids) => {
                for kid in kids {
                    let kid_ref = kid.as_reference();
                    if let Some(r) = kid_ref {
                        if !visited.insert(r) {
                            log::warn!("page tree cycle at {}", r);
                            continue;
                        }
                    }
                    if let Some(kid_dict) = self.resolve_dict(kid) {
                        self.collect_pages(kid_dict, kid_ref, visited, out, depth + 1);
                    }
                }
            }
            None => out.push(PageObject { index: 0, id, dict: node }),
        }
    }
}

/// Builder assembling a [`Document`] from objects and revision trailers.
///
/// Object byte offsets are assigned in insertion order unless given
/// explicitly, so "first object in the file" and "lowest offset" agree the
/// way they do for parsed documents.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    version: (u8, u8),
    objects: IndexMap<ObjectRef, Object>,
    xref: XrefTable,
    trailer: Option<Dictionary>,
    next_offset: u64,
}

impl DocumentBuilder {
    /// Create a builder for an empty PDF 1.4 document.
    pub fn new() -> Self {
        Self {
            version: (1, 4),
            next_offset: 15,
            ..Default::default()
        }
    }

    /// Set the PDF version.
    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.version = (major, minor);
        self
    }

    /// Add an indirect object at the next free byte offset.
    pub fn object(self, obj_ref: ObjectRef, obj: Object) -> Self {
        let offset = self.next_offset;
        self.object_at(obj_ref, obj, offset)
    }

    /// Add an indirect object at an explicit byte offset.
    pub fn object_at(mut self, obj_ref: ObjectRef, obj: Object, offset: u64) -> Self {
        self.xref.insert_offset(obj_ref, offset);
        self.next_offset = self.next_offset.max(offset) + 100;
        self.objects.insert(obj_ref, obj);
        self
    }

    /// Append a revision with the given trailer dictionary (file order).
    pub fn revision(mut self, trailer: Dictionary) -> Self {
        self.xref.push_revision(trailer);
        self
    }

    /// Set the trailer of the current revision.
    ///
    /// Defaults to the last revision trailer when revisions were added.
    pub fn trailer(mut self, trailer: Dictionary) -> Self {
        self.trailer = Some(trailer);
        self
    }

    /// Finish building.
    pub fn build(mut self) -> Document {
        let trailer = match self.trailer {
            Some(t) => t,
            None => self.xref.last_trailer().cloned().unwrap_or_default(),
        };
        if self.xref.revision_count() == 0 && !trailer.is_empty() {
            self.xref.push_revision(trailer.clone());
        }
        Document {
            version: self.version,
            objects: self.objects,
            xref: self.xref,
            trailer,
        }
    }
}

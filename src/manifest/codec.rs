use super::{Document, NodeData, NodeId};
use crate::error::{Result, SyncError};
use quick_xml::Writer;
use quick_xml::errors::{Error as XmlError, IllFormedError};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Encoding name written into the XML declaration
pub const ENCODING: &str = "iso-8859-1";

/// Decode ISO-8859-1 bytes; every byte maps to the code point of equal value.
#[must_use]
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode to ISO-8859-1, writing code points above U+00FF as character references.
///
/// References are not expanded inside comments, so a wide character in a
/// comment reads back as its `&#N;` text on the next load.
#[must_use]
pub fn encode_latin1(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match u8::try_from(u32::from(ch)) {
            Ok(byte) => out.push(byte),
            Err(_) => out.extend_from_slice(format!("&#{};", u32::from(ch)).as_bytes()),
        }
    }
    out
}

impl Document {
    /// Read and parse an ISO-8859-1 manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not well-formed XML or
    /// has no root element.
    pub fn load(path: &Path) -> Result<Self> {
        let span = span!(Level::DEBUG, "load_manifest", path = %path.display());
        let _guard = span.enter();

        let bytes = std::fs::read(path).map_err(|e| SyncError::io(path, e))?;
        let doc = Self::parse(&decode_latin1(&bytes), path)?;

        debug!(nodes = doc.len(), "Manifest loaded");
        Ok(doc)
    }

    /// Parse a manifest held in memory.
    ///
    /// # Errors
    ///
    /// Same as [`Document::load`], minus the I/O.
    pub fn from_xml(xml: &str) -> Result<Self> {
        Self::parse(xml, Path::new("<input>"))
    }

    /// Serialize with `indent` spaces per level (0 writes everything on one line).
    ///
    /// Layout whitespace between elements was dropped on load, so the
    /// indentation produced here is the only layout in the output. Text of
    /// leaf elements is written back exactly as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn to_xml(&self, indent: usize) -> Result<String> {
        let mut writer = if indent > 0 {
            Writer::new_with_indent(Vec::new(), b' ', indent)
        } else {
            Writer::new(Vec::new())
        };

        let memory = || PathBuf::from("<output>");
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some(ENCODING), None)))
            .map_err(|e| SyncError::io(memory(), e))?;
        self.write_tree(&mut writer)
            .map_err(|e| SyncError::io(memory(), e))?;

        let mut xml = String::from_utf8(writer.into_inner()).map_err(|e| {
            SyncError::io(
                memory(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        xml.push('\n');
        Ok(xml)
    }

    /// Overwrite `path` with the serialized document in one write.
    ///
    /// The handle is closed when this returns, whether or not the write
    /// succeeded. An interrupted write leaves a truncated file behind.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, creating or writing the file fails.
    pub fn save(&self, path: &Path, indent: usize) -> Result<()> {
        let span = span!(Level::DEBUG, "save_manifest", path = %path.display());
        let _guard = span.enter();

        let bytes = encode_latin1(&self.to_xml(indent)?);
        let mut file = File::create(path).map_err(|e| SyncError::io(path, e))?;
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|e| SyncError::io(path, e))?;

        debug!(bytes = bytes.len(), "Manifest written");
        Ok(())
    }

    /// Build a tree from XML text, attributing errors to `origin`
    fn parse(xml: &str, origin: &Path) -> Result<Self> {
        let parse_error = |source| SyncError::Parse {
            path: origin.to_path_buf(),
            source,
        };

        let mut reader = Reader::from_str(xml);

        let mut doc: Option<Self> = None;
        let mut open: Vec<NodeId> = Vec::new();
        // Whitespace-only text of the innermost open element; kept only if
        // that element turns out to hold no elements or comments
        let mut layout: Option<String> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(XmlError::IllFormed(IllFormedError::MissingEndTag(tag))) => {
                    return Err(SyncError::structure(format!(
                        "{} ends before <{tag}> is closed",
                        origin.display()
                    )));
                }
                Err(e) => return Err(parse_error(e)),
            };

            match event {
                Event::Start(start) => {
                    layout = None;
                    let id = Self::open_element(&mut doc, &open, &start, origin)
                        .map_err(|e| e.into_sync_error(parse_error))?;
                    open.push(id);
                }
                Event::Empty(start) => {
                    layout = None;
                    Self::open_element(&mut doc, &open, &start, origin)
                        .map_err(|e| e.into_sync_error(parse_error))?;
                }
                Event::End(_) => {
                    if let (Some(text), Some(doc), Some(&id)) =
                        (layout.take(), doc.as_mut(), open.last())
                        && doc.holds_only_text(id)
                    {
                        doc.append_text(id, &text);
                    }
                    open.pop();
                }
                Event::Text(raw) => {
                    let layout_only = raw.iter().all(u8::is_ascii_whitespace);
                    let text = raw.unescape().map_err(parse_error)?;
                    match (doc.as_mut(), open.last()) {
                        (Some(_), Some(_)) if layout_only => layout = Some(text.into_owned()),
                        (Some(doc), Some(&parent)) => {
                            doc.append_text(parent, &text);
                        }
                        _ if layout_only => {}
                        _ => return Err(Self::outside_root(origin)),
                    }
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    let (Some(doc), Some(&parent)) = (doc.as_mut(), open.last()) else {
                        return Err(Self::outside_root(origin));
                    };
                    if let Some(text) = layout.take() {
                        doc.append_text(parent, &text);
                    }
                    doc.append_text(parent, &String::from_utf8_lossy(&data));
                }
                Event::Comment(body) => {
                    layout = None;
                    // Comments outside the root element are not kept
                    if let (Some(doc), Some(&parent)) = (doc.as_mut(), open.last()) {
                        doc.append_comment(parent, &String::from_utf8_lossy(&body));
                    }
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if !open.is_empty() {
            return Err(SyncError::structure(format!(
                "{} ends before <{}> is closed",
                origin.display(),
                doc.as_ref()
                    .and_then(|d| open.last().and_then(|&id| d.tag(id)))
                    .unwrap_or("?")
            )));
        }

        doc.ok_or_else(|| {
            SyncError::structure(format!("{} has no root element", origin.display()))
        })
    }

    /// Whether every child of `id` is text
    fn holds_only_text(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .all(|&child| matches!(self.data(child), NodeData::Text(_)))
    }

    /// Character data found before or after the root element
    fn outside_root(origin: &Path) -> SyncError {
        SyncError::structure(format!(
            "{} has text outside the root element",
            origin.display()
        ))
    }

    /// Create the element for `start`: the root if none exists yet, else a
    /// child of the innermost open element.
    fn open_element(
        doc: &mut Option<Self>,
        open: &[NodeId],
        start: &BytesStart<'_>,
        origin: &Path,
    ) -> std::result::Result<NodeId, OpenError> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let id = match doc {
            Some(existing) => {
                let Some(&parent) = open.last() else {
                    return Err(OpenError::Done(SyncError::structure(format!(
                        "{} has more than one root element (found <{tag}>)",
                        origin.display()
                    ))));
                };
                existing.append_element(parent, &tag)
            }
            None => doc.insert(Self::new(&tag)).root(),
        };

        if let Some(doc) = doc.as_mut() {
            for attr in start.attributes() {
                let attr = attr.map_err(|e| OpenError::Xml(e.into()))?;
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr.unescape_value().map_err(OpenError::Xml)?;
                doc.set_attribute(id, &key, &value);
            }
        }

        Ok(id)
    }

    /// Emit the whole tree, walking it with an explicit stack
    fn write_tree<W: Write>(&self, writer: &mut Writer<W>) -> std::io::Result<()> {
        let mut stack = vec![Step::Enter(self.root())];

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Enter(id) => id,
                Step::Leave(tag) => {
                    writer.write_event(Event::End(BytesEnd::new(tag)))?;
                    continue;
                }
            };

            match self.data(id) {
                NodeData::Element { tag, attributes } => {
                    let mut start = BytesStart::new(tag.as_str());
                    for (key, value) in attributes {
                        start.push_attribute((key.as_str(), value.as_str()));
                    }

                    if self.children(id).is_empty() {
                        writer.write_event(Event::Empty(start))?;
                    } else {
                        writer.write_event(Event::Start(start))?;
                        stack.push(Step::Leave(tag));
                        stack.extend(self.children(id).iter().rev().map(|&c| Step::Enter(c)));
                    }
                }
                NodeData::Text(text) => {
                    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
                }
                NodeData::Comment(body) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(body.as_str())))?;
                }
            }
        }
        Ok(())
    }
}

/// Pending work in [`Document::write_tree`]
enum Step<'a> {
    /// Write a node, pushing its children
    Enter(NodeId),
    /// Close the element with this tag
    Leave(&'a str),
}

/// Failure inside [`Document::open_element`]
enum OpenError {
    /// Raw parser error, attributed by the caller
    Xml(quick_xml::Error),
    /// Fully formed error
    Done(SyncError),
}

impl OpenError {
    /// Turn into a [`SyncError`], wrapping raw parser errors with `wrap`
    fn into_sync_error(self, wrap: impl FnOnce(quick_xml::Error) -> SyncError) -> SyncError {
        match self {
            Self::Xml(e) => wrap(e),
            Self::Done(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::EntryKind;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="iso-8859-1"?>
<project>
    <fileVersion>3</fileVersion>
    <configuration>
        <name>Debug</name>
        <toolchain><name>ARM</name></toolchain>
    </configuration>
    <group>
        <name>drivers</name>
        <file>
            <name>$PROJ_DIR$/drivers/uart.c</name>
        </file>
    </group>
</project>
"#;

    #[test]
    fn test_parse_drops_layout_whitespace() {
        let doc = Document::from_xml(SAMPLE).unwrap();
        let root = doc.root();

        assert_eq!(doc.tag(root), Some("project"));
        let tags: Vec<_> = doc.children(root).iter().filter_map(|&c| doc.tag(c)).collect();
        assert_eq!(tags, vec!["fileVersion", "configuration", "group"]);
        assert_eq!(doc.children(root).len(), 3);
    }

    #[test]
    fn test_reindents_with_two_spaces() {
        let doc = Document::from_xml(SAMPLE).unwrap();
        let xml = doc.to_xml(2).unwrap();

        let expected = r#"<?xml version="1.0" encoding="iso-8859-1"?>
<project>
  <fileVersion>3</fileVersion>
  <configuration>
    <name>Debug</name>
    <toolchain>
      <name>ARM</name>
    </toolchain>
  </configuration>
  <group>
    <name>drivers</name>
    <file>
      <name>$PROJ_DIR$/drivers/uart.c</name>
    </file>
  </group>
</project>
"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_serialization_is_stable() {
        let first = Document::from_xml(SAMPLE).unwrap().to_xml(2).unwrap();
        let second = Document::from_xml(&first).unwrap().to_xml(2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_root_is_self_closing() {
        let doc = Document::from_xml("<project></project>").unwrap();
        assert_eq!(
            doc.to_xml(2).unwrap(),
            "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n<project/>\n"
        );
    }

    #[test]
    fn test_attributes_comments_and_escapes_survive() {
        let xml = r#"<project kind="ewp"><!-- keep me --><group><name>a &amp; b</name></group></project>"#;
        let doc = Document::from_xml(xml).unwrap();
        let out = doc.to_xml(0).unwrap();

        assert!(out.contains(r#"<project kind="ewp">"#));
        assert!(out.contains("<!-- keep me -->"));
        assert!(out.contains("<name>a &amp; b</name>"));

        let group = doc.child_elements(doc.root(), "group").next().unwrap();
        assert_eq!(doc.entry_name(group).unwrap(), "a & b");
    }

    #[test]
    fn test_latin1_roundtrip_on_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("project.ewp");
        let mut bytes = b"<project><group><name>Ger".to_vec();
        bytes.push(0xE4); // a-umlaut
        bytes.extend_from_slice(b"te</name></group></project>");
        std::fs::write(&path, &bytes).unwrap();

        let doc = Document::load(&path).unwrap();
        let group = doc.child_elements(doc.root(), "group").next().unwrap();
        assert_eq!(doc.entry_name(group).unwrap(), "Ger\u{e4}te");

        doc.save(&path, 2).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert!(written.windows(6).any(|w| w == b"Ger\xE4te"));
    }

    #[test]
    fn test_encode_latin1_references_wide_chars() {
        assert_eq!(encode_latin1("a\u{e9}"), vec![b'a', 0xE9]);
        assert_eq!(encode_latin1("\u{2713}"), b"&#10003;".to_vec());
    }

    #[test]
    fn test_missing_root_is_structural() {
        let err = Document::from_xml("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_unclosed_root_is_rejected() {
        assert!(Document::from_xml("<project><group>").is_err());
    }

    #[test]
    fn test_mismatched_tags_are_parse_errors() {
        let err = Document::from_xml("<project><group></file></project>").unwrap_err();
        assert!(matches!(err, SyncError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = Document::load(&temp.path().join("absent.ewp")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn test_leaf_text_is_kept_verbatim() {
        let xml = "<project>\n  <settings>\n    <state>  -DFOO </state>\n    <blank> </blank>\n  </settings>\n</project>";
        let doc = Document::from_xml(xml).unwrap();

        let compact = doc.to_xml(0).unwrap();
        assert!(compact.contains("<settings><state>  -DFOO </state><blank> </blank></settings>"));

        let indented = doc.to_xml(2).unwrap();
        assert!(indented.contains("    <state>  -DFOO </state>\n"));
        assert!(indented.contains("    <blank> </blank>\n"));
        assert_eq!(Document::from_xml(&indented).unwrap().to_xml(2).unwrap(), indented);
    }

    #[test]
    fn test_whitespace_before_cdata_is_content() {
        let doc = Document::from_xml("<project><state> <![CDATA[x]]></state></project>").unwrap();
        let state = doc.child_elements(doc.root(), "state").next().unwrap();
        assert_eq!(doc.text(state), " x");
    }

    #[test]
    fn test_text_outside_root_is_rejected() {
        for xml in ["<project/>garbage", "garbage<project/>", "<project/><![CDATA[x]]>"] {
            let err = Document::from_xml(xml).unwrap_err();
            assert!(err.is_structural(), "{xml}");
        }
        assert!(Document::from_xml("\n  <project/>\n\n").is_ok());
    }

    #[test]
    fn test_wide_chars_in_comments_stay_references() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("project.ewp");

        let mut doc = Document::new("project");
        let root = doc.root();
        doc.append_comment(root, " \u{2713} ");
        doc.save(&path, 2).unwrap();

        let loaded = Document::load(&path).unwrap();
        let comment = loaded.children(loaded.root())[0];
        assert_eq!(
            loaded.data(comment),
            &NodeData::Comment(" &#10003; ".to_string())
        );
    }

    #[test]
    fn test_deep_nesting_is_written_iteratively() {
        let depth = 100_000;
        let mut doc = Document::new("project");
        let mut parent = doc.root();
        for _ in 0..depth {
            parent = doc.append_element(parent, "group");
        }

        let xml = doc.to_xml(0).unwrap();
        assert_eq!(xml.matches("<group>").count(), depth - 1);
        assert_eq!(xml.matches("</group>").count(), depth - 1);
        assert!(xml.contains("<group/>"));
    }

    #[test]
    fn test_save_then_load_preserves_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("project.ewp");

        let mut doc = Document::new("project");
        let root = doc.root();
        let group = doc.append_entry(root, EntryKind::Group, "src");
        doc.append_entry(group, EntryKind::File, "$PROJ_DIR$/src/main.c");
        doc.save(&path, 2).unwrap();

        let loaded = Document::load(&path).unwrap();
        assert_eq!(
            loaded.entries(EntryKind::File).unwrap()[0].1,
            "$PROJ_DIR$/src/main.c"
        );
    }
}

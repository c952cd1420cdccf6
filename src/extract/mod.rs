//! Subcellular location extraction from UniProt XML.
//!
//! Walks the document with a streaming XML reader and collects the text of
//! every `<location>` element found inside a
//! `<comment type="subcellular location">` block.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

const COMMENT_TAG: &[u8] = b"comment";
const LOCATION_TAG: &[u8] = b"location";
const SUBCELLULAR_COMMENT_TYPE: &str = "subcellular location";

/// Errors raised while reading a record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed XML near byte {position}: {source}")]
    Malformed {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
}

/// Extract subcellular location labels, in document order.
///
/// Duplicates are kept. A document without any subcellular-location
/// comment, or with comments that hold no `<location>`, yields an empty
/// vector. Attributes on `<location>` (e.g. `evidence`) are ignored and
/// the text is returned as written, apart from entity unescaping.
pub fn extract_subcellular_locations(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut locations = Vec::new();

    // Open <comment> elements since entering a subcellular block; 0 when outside.
    let mut region_depth = 0usize;
    let mut current: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|source| malformed(&reader, source))?;

        match event {
            Event::Start(ref start) => {
                let name = start.local_name();
                if region_depth > 0 {
                    if name.as_ref() == COMMENT_TAG {
                        region_depth += 1;
                    } else if name.as_ref() == LOCATION_TAG && current.is_none() {
                        current = Some(String::new());
                    }
                } else if name.as_ref() == COMMENT_TAG
                    && is_subcellular_comment(start).map_err(|source| malformed(&reader, source))?
                {
                    region_depth = 1;
                }
            }
            Event::Text(ref text) => {
                if let Some(buffer) = current.as_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|source| malformed(&reader, source))?;
                    buffer.push_str(&unescaped);
                }
            }
            Event::CData(ref data) => {
                if let Some(buffer) = current.as_mut() {
                    buffer.push_str(&String::from_utf8_lossy(data));
                }
            }
            Event::End(ref end) => {
                let name = end.local_name();
                if name.as_ref() == LOCATION_TAG {
                    if let Some(location) = current.take() {
                        locations.push(location);
                    }
                } else if name.as_ref() == COMMENT_TAG && region_depth > 0 {
                    region_depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(locations)
}

fn is_subcellular_comment(start: &BytesStart<'_>) -> Result<bool, quick_xml::Error> {
    match start.try_get_attribute("type")? {
        Some(attr) => Ok(attr.unescape_value()? == SUBCELLULAR_COMMENT_TYPE),
        None => Ok(false),
    }
}

fn malformed(reader: &Reader<&[u8]>, source: quick_xml::Error) -> ExtractError {
    ExtractError::Malformed {
        position: reader.buffer_position(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_comment_blocks() {
        let xml = r#"<entry>
<comment type="subcellular location">
  <subcellularLocation><location>Membrane</location></subcellularLocation>
</comment>
<comment type="subcellular location">
  <subcellularLocation><location>Cytoplasm</location></subcellularLocation>
</comment>
</entry>"#;

        let locations = extract_subcellular_locations(xml).unwrap();
        assert_eq!(locations, vec!["Membrane", "Cytoplasm"]);
    }

    #[test]
    fn test_uniprot_fixture() {
        let xml = include_str!("../../fixtures/P19338.xml");
        let locations = extract_subcellular_locations(xml).unwrap();
        assert_eq!(locations, vec!["Nucleus", "Nucleolus", "Cytoplasm", "Nucleus"]);
    }

    #[test]
    fn test_location_attributes_ignored() {
        let xml = r#"<comment type="subcellular location"><location evidence="3 7">Cell membrane</location></comment>"#;
        let locations = extract_subcellular_locations(xml).unwrap();
        assert_eq!(locations, vec!["Cell membrane"]);
    }

    #[test]
    fn test_other_comment_types_ignored() {
        let xml = r#"<entry>
<comment type="function"><location>Nowhere</location></comment>
<location>Outside</location>
</entry>"#;
        assert!(extract_subcellular_locations(xml).unwrap().is_empty());
    }

    #[test]
    fn test_region_without_locations() {
        let xml = r#"<comment type="subcellular location"><text>Unknown.</text></comment>"#;
        assert!(extract_subcellular_locations(xml).unwrap().is_empty());
    }

    #[test]
    fn test_empty_and_plain_text_documents() {
        assert!(extract_subcellular_locations("").unwrap().is_empty());
        assert!(extract_subcellular_locations("Not found").unwrap().is_empty());
    }

    #[test]
    fn test_text_kept_verbatim_and_unescaped() {
        let xml = r#"<comment type="subcellular location"><location> Golgi apparatus &amp; ER </location></comment>"#;
        let locations = extract_subcellular_locations(xml).unwrap();
        assert_eq!(locations, vec![" Golgi apparatus & ER "]);
    }

    #[test]
    fn test_multiline_region() {
        let xml = "<comment\n type=\"subcellular location\">\n<subcellularLocation>\n<location>\nSecreted</location>\n</subcellularLocation>\n</comment>";
        let locations = extract_subcellular_locations(xml).unwrap();
        assert_eq!(locations, vec!["\nSecreted"]);
    }

    #[test]
    fn test_mismatched_tags_are_errors() {
        let xml = r#"<comment type="subcellular location"><location>Nucleus</topology></comment>"#;
        assert!(matches!(
            extract_subcellular_locations(xml),
            Err(ExtractError::Malformed { .. })
        ));
    }
}

//! XML report fallback
//!
//! Concentrators answer some report queries with attribute-heavy XML rather
//! than JSON. This converts such a body into records:
//!
//! 1. Find the "record tag": the repeated leaf element whose occurrences
//!    carry the most attributes; if nothing repeats, the single richest leaf.
//! 2. Each record row merges, in order: the root element's attributes, every
//!    ancestor's attributes as dotted `Tag.Attr` columns (never overwriting),
//!    the record's own attributes (dotted-prefixed on collision), the record
//!    element's text as `value`, and finally a `recordTag` column.
//!
//! Any parse failure returns `None`; the caller falls back to raw display.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

use super::shape::Record;

struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Element {
    /// Leaves with neither attributes nor text cannot be records
    fn leaf_score(&self) -> usize {
        self.attrs.len() + usize::from(!self.text.trim().is_empty())
    }
}

/// Convert an XML report body into records, or `None` if it does not parse
/// or holds nothing record-like.
pub fn records_from_xml(xml: &str) -> Option<Vec<Record>> {
    let (arena, root) = build_tree(xml)?;

    let leaves: Vec<usize> = (0..arena.len())
        .filter(|&i| arena[i].children.is_empty())
        .collect();

    let record_elems = pick_record_elements(&arena, &leaves)?;
    let record_tag = arena[record_elems[0]].tag.clone();

    let root_attrs: Vec<(String, String)> = arena[root].attrs.clone();

    let mut rows = Vec::with_capacity(record_elems.len());
    for &rec in &record_elems {
        let mut row = Record::new();
        for (k, v) in &root_attrs {
            row.insert(k.clone(), Value::String(v.clone()));
        }

        // Ancestor attributes, nearest parent first, as Tag.Attr columns
        let mut cur = arena[rec].parent;
        while let Some(idx) = cur {
            let anc = &arena[idx];
            for (k, v) in &anc.attrs {
                let col = format!("{}.{}", anc.tag, k);
                if !row.contains_key(&col) {
                    row.insert(col, Value::String(v.clone()));
                }
            }
            cur = anc.parent;
        }

        for (k, v) in &arena[rec].attrs {
            let col = if row.contains_key(k) {
                format!("{}.{}", record_tag, k)
            } else {
                k.clone()
            };
            row.insert(col, Value::String(v.clone()));
        }

        let text = arena[rec].text.trim();
        if !text.is_empty() {
            let col = if row.contains_key("value") {
                format!("{}.value", record_tag)
            } else {
                "value".to_string()
            };
            row.insert(col, Value::String(text.to_string()));
        }

        if !row.contains_key("recordTag") {
            row.insert("recordTag".to_string(), Value::String(record_tag.clone()));
        }

        rows.push(row);
    }

    if rows.is_empty() {
        None
    } else {
        Some(rows)
    }
}

/// Prefer the repeated leaf group with the most occurrences (ties broken by
/// average attribute count); otherwise the single richest leaf.
fn pick_record_elements(arena: &[Element], leaves: &[usize]) -> Option<Vec<usize>> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for &i in leaves {
        if arena[i].leaf_score() == 0 {
            continue;
        }
        groups.entry(arena[i].tag.as_str()).or_default().push(i);
    }

    let mut best: (usize, usize) = (0, 0);
    let mut chosen: Option<Vec<usize>> = None;
    for elems in groups.values() {
        if elems.len() < 2 {
            continue;
        }
        let avg_attrs = elems.iter().map(|&i| arena[i].attrs.len()).sum::<usize>() / elems.len();
        let key = (elems.len(), avg_attrs);
        if key > best {
            best = key;
            chosen = Some(elems.clone());
        }
    }
    if let Some(mut elems) = chosen {
        // Document order keeps rows in the order the concentrator emitted them
        elems.sort_unstable();
        return Some(elems);
    }

    let mut best_leaf = None;
    let mut best_score = 0;
    for &i in leaves {
        let score = arena[i].leaf_score();
        if score > best_score {
            best_score = score;
            best_leaf = Some(i);
        }
    }
    best_leaf.map(|i| vec![i])
}

/// Parse the document into an arena of elements; returns the arena and the
/// root index.
fn build_tree(xml: &str) -> Option<(Vec<Element>, usize)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut arena: Vec<Element> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut root: Option<usize> = None;

    loop {
        match reader.read_event().ok()? {
            Event::Start(start) => {
                let idx = push_element(&mut arena, &mut stack, &start, &mut root)?;
                stack.push(idx);
            }
            Event::Empty(start) => {
                push_element(&mut arena, &mut stack, &start, &mut root)?;
            }
            Event::End(_) => {
                stack.pop()?;
            }
            Event::Text(text) => {
                if let Some(&idx) = stack.last() {
                    let decoded = text.unescape().ok()?;
                    arena[idx].text.push_str(&decoded);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root = root?;
    Some((arena, root))
}

fn push_element(
    arena: &mut Vec<Element>,
    stack: &mut [usize],
    start: &quick_xml::events::BytesStart<'_>,
    root: &mut Option<usize>,
) -> Option<usize> {
    let tag = local_name(&String::from_utf8_lossy(start.name().as_ref()));

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.ok()?;
        let qname = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        if qname == "xmlns" || qname.starts_with("xmlns:") {
            continue;
        }
        let key = local_name(&qname);
        let value = attr.unescape_value().ok()?.to_string();
        attrs.push((key, value));
    }

    let parent = stack.last().copied();
    let idx = arena.len();
    arena.push(Element {
        tag,
        attrs,
        text: String::new(),
        parent,
        children: Vec::new(),
    });

    if let Some(p) = parent {
        arena[p].children.push(idx);
    } else if root.is_none() {
        *root = Some(idx);
    }
    Some(idx)
}

/// Strip a namespace prefix: `stg:Cnt` -> `Cnt`
fn local_name(qname: &str) -> String {
    match qname.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => qname.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVE_XML: &str = r#"<Report xmlns="http://stgdc/ws/S02" IdRpt="S02" IdPet="0" Version="4.0">
        <Cnc Id="CIR4621247550">
            <Cnt Id="CIR0141825620">
                <S02 Fh="2026-01-24T01:00:00" AI="123" AE="0"/>
                <S02 Fh="2026-01-24T02:00:00" AI="141" AE="0"/>
                <S02 Fh="2026-01-24T03:00:00" AI="97" AE="1"/>
            </Cnt>
        </Cnc>
    </Report>"#;

    #[test]
    fn test_repeated_leaf_becomes_record_tag() {
        let rows = records_from_xml(CURVE_XML).unwrap();
        assert_eq!(rows.len(), 3);

        let first = &rows[0];
        assert_eq!(first.get("Fh").unwrap(), "2026-01-24T01:00:00");
        assert_eq!(first.get("AI").unwrap(), "123");
        assert_eq!(first.get("recordTag").unwrap(), "S02");
        // Root and ancestor attributes carried onto every row
        assert_eq!(first.get("IdRpt").unwrap(), "S02");
        assert_eq!(first.get("Cnc.Id").unwrap(), "CIR4621247550");
        assert_eq!(first.get("Cnt.Id").unwrap(), "CIR0141825620");
        // Root attributes also appear under their dotted ancestor column
        assert_eq!(first.get("Report.IdRpt").unwrap(), "S02");
    }

    #[test]
    fn test_single_rich_leaf() {
        let xml = r#"<Report IdRpt="S01">
            <Cnt Id="CIR0141825620">
                <S01 Vf="230.1" L1v="229.8" Fh="2026-01-24T10:00:00"/>
            </Cnt>
        </Report>"#;

        let rows = records_from_xml(xml).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Vf").unwrap(), "230.1");
        assert_eq!(rows[0].get("recordTag").unwrap(), "S01");
    }

    #[test]
    fn test_leaf_text_becomes_value_column() {
        let xml = "<Report><Code>E-42</Code><Code>E-43</Code></Report>";
        let rows = records_from_xml(xml).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("value").unwrap(), "E-42");
        assert_eq!(rows[1].get("value").unwrap(), "E-43");
    }

    #[test]
    fn test_garbage_returns_none() {
        assert!(records_from_xml("not xml at all <<<").is_none());
        assert!(records_from_xml("").is_none());
    }

    #[test]
    fn test_namespace_prefixes_are_stripped() {
        let xml = r#"<stg:Report xmlns:stg="http://x" stg:IdRpt="S02">
            <stg:S02 stg:Fh="a" stg:AI="1"/>
            <stg:S02 stg:Fh="b" stg:AI="2"/>
        </stg:Report>"#;
        let rows = records_from_xml(xml).unwrap();
        assert_eq!(rows[0].get("Fh").unwrap(), "a");
        assert_eq!(rows[0].get("recordTag").unwrap(), "S02");
    }
}

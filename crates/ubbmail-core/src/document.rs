//! Locates the head and body cells of a notification document
//!
//! The bank renders every notification from one template:
//!
//! ```text
//! <table>
//!   tr[0]  header row (ignored)
//!   tr[1]  date | <x><y>reference</y></x> | value date | sum | entry type
//!   tr[2]  type + detail lines | (unused) | additional details (optional)
//! </table>
//! ```
//!
//! Nothing here searches heuristically. Each expected element is looked up by
//! position and a missing one fails with [`Error::MalformedDocument`].

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{Error, Result};

const HEAD_ROW: usize = 1;
const BODY_ROW: usize = 2;
const HEAD_CELLS: usize = 5;
const DETAIL_CELL: usize = 0;
const ADDITIONAL_DETAILS_CELL: usize = 2;

fn table_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table").expect("invalid table selector"))
}

fn tr_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("tr").expect("invalid tr selector"))
}

/// A piece of the detail cell as the renderer produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    /// `<br>`: ends a logical line
    LineBreak,
    /// `<wbr>`: visual wrap inside a logical line
    SoftWrap,
}

/// Raw head cell texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadCells {
    pub date: String,
    pub reference: String,
    pub value_date: String,
    pub sum: String,
    pub entry_type: String,
}

/// Raw body cells
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BodyCells {
    /// Children of the type/detail cell, in document order
    pub fragments: Vec<Fragment>,
    /// Text of the additional-details cell, `<br>` rendered as `\n`
    pub additional_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedDocument {
    pub head: HeadCells,
    pub body: BodyCells,
}

/// Find the head and body cells of the transaction table
pub fn locate_fields(html: &str) -> Result<LocatedDocument> {
    let doc = Html::parse_document(html);

    let table = doc
        .select(table_selector())
        .next()
        .ok_or_else(|| Error::malformed("no <table> element"))?;

    let rows: Vec<ElementRef> = table.select(tr_selector()).collect();
    if rows.len() <= BODY_ROW {
        return Err(Error::malformed(format!(
            "expected at least {} table rows, found {}",
            BODY_ROW + 1,
            rows.len()
        )));
    }

    let head = locate_head(rows[HEAD_ROW])?;
    let body = locate_body(rows[BODY_ROW])?;

    Ok(LocatedDocument { head, body })
}

fn cells(row: ElementRef) -> Vec<ElementRef> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| {
            let name = cell.value().name();
            name.eq_ignore_ascii_case("td") || name.eq_ignore_ascii_case("th")
        })
        .collect()
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn locate_head(row: ElementRef) -> Result<HeadCells> {
    let cells = cells(row);
    if cells.len() < HEAD_CELLS {
        return Err(Error::malformed(format!(
            "head row: expected {} cells, found {}",
            HEAD_CELLS,
            cells.len()
        )));
    }

    // The reference sits two elements below its cell
    let outer = first_child_element(cells[1])
        .ok_or_else(|| Error::malformed("head row: reference cell has no element"))?;
    let inner = first_child_element(outer)
        .ok_or_else(|| Error::malformed("head row: reference element is not nested"))?;

    Ok(HeadCells {
        date: cell_text(cells[0]),
        reference: cell_text(inner),
        value_date: cell_text(cells[2]),
        sum: cell_text(cells[3]),
        entry_type: cell_text(cells[4]),
    })
}

fn locate_body(row: ElementRef) -> Result<BodyCells> {
    let cells = cells(row);
    let detail = cells
        .get(DETAIL_CELL)
        .copied()
        .ok_or_else(|| Error::malformed("body row has no cells"))?;

    let mut fragments = Vec::new();
    collect_fragments(detail, &mut fragments);

    let additional_details = cells.get(ADDITIONAL_DETAILS_CELL).map(|cell| {
        let mut text = String::new();
        collect_text_with_breaks(*cell, &mut text);
        text
    });

    Ok(BodyCells {
        fragments,
        additional_details,
    })
}

fn first_child_element(el: ElementRef) -> Option<ElementRef> {
    el.children().filter_map(ElementRef::wrap).next()
}

fn collect_fragments(el: ElementRef, out: &mut Vec<Fragment>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push(Fragment::Text(text.text.to_string())),
            Node::Element(inner) => match inner.name() {
                "br" => out.push(Fragment::LineBreak),
                "wbr" => out.push(Fragment::SoftWrap),
                _ => {
                    if let Some(nested) = ElementRef::wrap(child) {
                        collect_fragments(nested, out);
                    }
                }
            },
            _ => {}
        }
    }
}

fn collect_text_with_breaks(el: ElementRef, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(inner) if inner.name() == "br" => out.push('\n'),
            Node::Element(_) => {
                if let Some(nested) = ElementRef::wrap(child) {
                    collect_text_with_breaks(nested, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> String {
        r#"<html><body>
<table>
  <tr><th>Дата</th><th>Референция</th><th>Вальор</th><th>Сума</th><th>Вид</th></tr>
  <tr>
    <td>05.03.2024 14:22:01</td>
    <td><span><b>1234ABCD5678</b></span></td>
    <td>05.03.2024</td>
    <td>4.48</td>
    <td>ДТ</td>
  </tr>
  <tr>
    <td>ОПЕРАЦИЯ С КАРТА<br>ПОС 4.48 BGN авт.код:833023-GLOBAL RET<wbr>AIL HOLDING EOO</td>
    <td>-</td>
    <td>BG80BNBG96611020345678<br>ИВАН ИВАНОВ</td>
  </tr>
</table>
</body></html>"#
            .to_string()
    }

    #[test]
    fn test_locate_head_cells() {
        let located = locate_fields(&sample()).unwrap();
        assert_eq!(located.head.date, "05.03.2024 14:22:01");
        assert_eq!(located.head.reference, "1234ABCD5678");
        assert_eq!(located.head.value_date, "05.03.2024");
        assert_eq!(located.head.sum, "4.48");
        assert_eq!(located.head.entry_type, "ДТ");
    }

    #[test]
    fn test_locate_body_fragments() {
        let located = locate_fields(&sample()).unwrap();
        assert_eq!(
            located.body.fragments,
            vec![
                Fragment::Text("ОПЕРАЦИЯ С КАРТА".to_string()),
                Fragment::LineBreak,
                Fragment::Text("ПОС 4.48 BGN авт.код:833023-GLOBAL RET".to_string()),
                Fragment::SoftWrap,
                Fragment::Text("AIL HOLDING EOO".to_string()),
            ]
        );
        assert_eq!(
            located.body.additional_details.as_deref(),
            Some("BG80BNBG96611020345678\nИВАН ИВАНОВ")
        );
    }

    #[test]
    fn test_missing_additional_details_cell() {
        let html = sample().replace("<td>-</td>", "").replace(
            "<td>BG80BNBG96611020345678<br>ИВАН ИВАНОВ</td>",
            "",
        );
        let located = locate_fields(&html).unwrap();
        assert_eq!(located.body.additional_details, None);
    }

    #[test]
    fn test_no_table_is_malformed() {
        let err = locate_fields("<html><body><p>hello</p></body></html>").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(_)));
    }

    #[test]
    fn test_missing_body_row_is_malformed() {
        let html = r#"<table><tr><th>h</th></tr><tr><td>1</td><td><a><b>r</b></a></td><td>2</td><td>3</td><td>ДТ</td></tr></table>"#;
        assert!(matches!(
            locate_fields(html),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_flat_reference_is_malformed() {
        let html = sample().replace("<span><b>1234ABCD5678</b></span>", "1234ABCD5678");
        let err = locate_fields(&html).unwrap_err();
        assert!(err.to_string().contains("reference"));
    }

    #[test]
    fn test_short_head_row_is_malformed() {
        let html = sample().replace("<td>ДТ</td>", "");
        assert!(matches!(
            locate_fields(&html),
            Err(Error::MalformedDocument(_))
        ));
    }
}
